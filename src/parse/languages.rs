//! Language detection — a pure mapping from path to `Language`.
//!
//! The recognized extensions form a closed, enumerated table (`spec.md` §4.2,
//! §6). This module is the *only* place extensions are listed.

use std::path::Path;

/// Supported languages, closed set per `spec.md` §2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Java,
    JavaScript,
    TypeScript,
    Python,
    CSharp,
    Php,
    Ruby,
    Sql,
    Cobol,
    Rust,
    Markdown,
}

impl Language {
    /// Detect a language from a file path. Case-insensitive on the file
    /// name. Returns `None` for any extension outside the closed set,
    /// including COBOL copybooks (`.cpy`), which are not analyzed as their
    /// own file but folded into the copybook repository (`spec.md` §4.5).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "java" => Some(Language::Java),
            "js" | "jsx" => Some(Language::JavaScript),
            "ts" | "tsx" => Some(Language::TypeScript),
            "py" => Some(Language::Python),
            "cs" => Some(Language::CSharp),
            "php" => Some(Language::Php),
            "rb" => Some(Language::Ruby),
            "sql" => Some(Language::Sql),
            "cbl" | "cob" => Some(Language::Cobol),
            "rs" => Some(Language::Rust),
            "md" => Some(Language::Markdown),
            _ => None,
        }
    }

    /// Whether `path` names a COBOL copybook fragment rather than a
    /// standalone analyzable program. Copybooks are consumed into the
    /// copybook repository (`spec.md` §4.5) instead of being emitted as
    /// their own `FileAnalysis`.
    pub fn is_cobol_copybook(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("cpy"))
            .unwrap_or(false)
    }

    /// Canonical lowercase name, used as both the JSON `language` field and
    /// the `analyzers` config map key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Java => "java",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Python => "python",
            Language::CSharp => "csharp",
            Language::Php => "php",
            Language::Ruby => "ruby",
            Language::Sql => "sql",
            Language::Cobol => "cobol",
            Language::Rust => "rust",
            Language::Markdown => "markdown",
        }
    }

    /// All languages in the closed set, for registry construction.
    pub fn all() -> &'static [Language] {
        &[
            Language::Java,
            Language::JavaScript,
            Language::TypeScript,
            Language::Python,
            Language::CSharp,
            Language::Php,
            Language::Ruby,
            Language::Sql,
            Language::Cobol,
            Language::Rust,
            Language::Markdown,
        ]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_closed_set() {
        assert_eq!(Language::from_path(Path::new("A.java")), Some(Language::Java));
        assert_eq!(Language::from_path(Path::new("a.JS")), Some(Language::JavaScript));
        assert_eq!(Language::from_path(Path::new("a.tsx")), Some(Language::TypeScript));
        assert_eq!(Language::from_path(Path::new("a.py")), Some(Language::Python));
        assert_eq!(Language::from_path(Path::new("a.cs")), Some(Language::CSharp));
        assert_eq!(Language::from_path(Path::new("a.php")), Some(Language::Php));
        assert_eq!(Language::from_path(Path::new("a.rb")), Some(Language::Ruby));
        assert_eq!(Language::from_path(Path::new("a.sql")), Some(Language::Sql));
        assert_eq!(Language::from_path(Path::new("a.cbl")), Some(Language::Cobol));
        assert_eq!(Language::from_path(Path::new("a.cob")), Some(Language::Cobol));
        assert_eq!(Language::from_path(Path::new("a.rs")), Some(Language::Rust));
        assert_eq!(Language::from_path(Path::new("a.md")), Some(Language::Markdown));
        assert_eq!(Language::from_path(Path::new("a.xyz")), None);
    }

    #[test]
    fn copybooks_are_not_top_level_languages() {
        assert_eq!(Language::from_path(Path::new("a.cpy")), None);
        assert!(Language::is_cobol_copybook(Path::new("a.CPY")));
    }

    #[test]
    fn case_insensitive_on_filename() {
        assert_eq!(Language::from_path(Path::new("FOO.RB")), Some(Language::Ruby));
    }
}
