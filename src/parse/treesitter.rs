//! Tree-sitter `Parser` construction for each general-purpose language.
//!
//! SQL, COBOL, and Markdown are not tree-sitter-backed in this crate (see
//! `analyzers::sql`, `analyzers::cobol`, `analyzers::markdown`); only the
//! eight general-purpose languages in `spec.md` §4.4 get a grammar here.

use crate::parse::languages::Language;
use tree_sitter::{Parser, Tree};

/// Tree-sitter grammar for a language, if one is wired up.
pub fn grammar(language: Language) -> Option<tree_sitter::Language> {
    match language {
        Language::Java => Some(tree_sitter_java::LANGUAGE.into()),
        Language::JavaScript => Some(tree_sitter_javascript::LANGUAGE.into()),
        Language::TypeScript => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        Language::Python => Some(tree_sitter_python::LANGUAGE.into()),
        Language::CSharp => Some(tree_sitter_c_sharp::LANGUAGE.into()),
        Language::Php => Some(tree_sitter_php::LANGUAGE_PHP.into()),
        Language::Ruby => Some(tree_sitter_ruby::LANGUAGE.into()),
        Language::Rust => Some(tree_sitter_rust::LANGUAGE.into()),
        Language::Sql | Language::Cobol | Language::Markdown => None,
    }
}

/// Parse `source` with the grammar for `language`. Returns `None` if there
/// is no grammar for the language, or if the underlying parser rejects the
/// language object (never expected given the fixed, version-pinned grammar
/// crates), or if tree-sitter itself fails to produce a tree (it almost
/// never does — tree-sitter always produces a best-effort tree, even for
/// malformed input, marking the damaged regions with ERROR nodes).
pub fn parse(language: Language, source: &str) -> Option<Tree> {
    let lang = grammar(language)?;
    let mut parser = Parser::new();
    parser.set_language(&lang).ok()?;
    parser.parse(source, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_general_purpose_language() {
        assert!(parse(Language::Java, "class A {}").is_some());
        assert!(parse(Language::JavaScript, "function f() {}").is_some());
        assert!(parse(Language::TypeScript, "function f(): void {}").is_some());
        assert!(parse(Language::Python, "def f():\n    pass\n").is_some());
        assert!(parse(Language::CSharp, "class A {}").is_some());
        assert!(parse(Language::Php, "<?php function f() {} ?>").is_some());
        assert!(parse(Language::Ruby, "def f; end").is_some());
        assert!(parse(Language::Rust, "fn f() {}").is_some());
    }

    #[test]
    fn no_grammar_for_non_treesitter_languages() {
        assert!(grammar(Language::Sql).is_none());
        assert!(grammar(Language::Cobol).is_none());
        assert!(grammar(Language::Markdown).is_none());
    }
}
