//! COBOL `COPY`/`REPLACE` preprocessing and the copybook repository
//! (`spec.md` §4.5 "Preprocessing").

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

static COPY_STATEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)\bCOPY\s+[\"']?([A-Za-z0-9_-]+)[\"']?(?:\s+(?:OF|IN)\s+[A-Za-z0-9_-]+)?(?:\s+REPLACING\s+(.+?))?\s*\.")
        .unwrap()
});

static REPLACING_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)==(.*?)==\s+BY\s+==(.*?)==").unwrap()
});

const MAX_EXPANSION_DEPTH: usize = 16;

/// Normalizes a copybook reference or file name into a lookup key: lowercase,
/// quotes/trailing punctuation stripped, backslashes folded to `/`, last
/// path segment only (`spec.md` §4.5).
fn normalize_key(raw: &str) -> String {
    let cleaned = raw.trim().trim_matches(|c| c == '"' || c == '\'').trim_end_matches('.');
    let forward = cleaned.replace('\\', "/");
    let last_segment = forward.rsplit('/').next().unwrap_or(&forward);
    last_segment.to_lowercase()
}

fn strip_extension(key: &str) -> String {
    match key.rsplit_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => key.to_string(),
    }
}

/// Run-scoped repository of copybook files, keyed both with and without
/// extension so `COPY CUSTREC` and `COPY CUSTREC.CPY` both resolve.
pub struct CopybookRepository {
    by_key: HashMap<String, PathBuf>,
}

impl CopybookRepository {
    pub fn build(copybook_paths: &[PathBuf]) -> Self {
        let mut candidates: HashMap<String, Vec<PathBuf>> = HashMap::new();
        for path in copybook_paths {
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else { continue };
            let with_ext = normalize_key(file_name);
            let without_ext = strip_extension(&with_ext);
            candidates.entry(with_ext).or_default().push(path.clone());
            candidates.entry(without_ext).or_default().push(path.clone());
        }

        let mut by_key = HashMap::new();
        for (key, mut paths) in candidates {
            paths.sort_by_key(|p| (p.as_os_str().len(), p.clone()));
            if paths.len() > 1 {
                tracing::warn!(key = %key, candidates = paths.len(), "duplicate copybook key; using shortest path");
            }
            by_key.insert(key, paths.remove(0));
        }

        Self { by_key }
    }

    pub fn lookup(&self, name: &str) -> Option<&Path> {
        self.by_key.get(&normalize_key(name)).map(|p| p.as_path())
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }
}

/// Expands every `COPY` directive in `source`, returning the expanded text
/// and the list of copybook names referenced (in encounter order, including
/// ones that failed to resolve). Recursion is bounded by
/// `MAX_EXPANSION_DEPTH` to guard against cyclic copybooks.
pub fn expand(source: &str, repo: &CopybookRepository) -> (String, Vec<String>) {
    let mut copy_statements = Vec::new();
    let expanded = expand_at_depth(source, repo, 0, &mut copy_statements);
    (expanded, copy_statements)
}

fn expand_at_depth(source: &str, repo: &CopybookRepository, depth: usize, copy_statements: &mut Vec<String>) -> String {
    if depth >= MAX_EXPANSION_DEPTH {
        return source.to_string();
    }

    COPY_STATEMENT
        .replace_all(source, |caps: &regex::Captures| {
            let name = caps[1].to_string();
            copy_statements.push(name.clone());
            let replacing = caps.get(2).map(|m| m.as_str());

            match repo.lookup(&name) {
                Some(path) => match std::fs::read_to_string(path) {
                    Ok(mut content) => {
                        if let Some(replacing) = replacing {
                            content = apply_replacing(&content, replacing);
                        }
                        expand_at_depth(&content, repo, depth + 1, copy_statements)
                    }
                    Err(_) => String::new(),
                },
                None => String::new(),
            }
        })
        .into_owned()
}

fn apply_replacing(content: &str, replacing_clause: &str) -> String {
    let mut result = content.to_string();
    for caps in REPLACING_PAIR.captures_iter(replacing_clause) {
        result = result.replace(&caps[1], &caps[2]);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_key_case_and_path() {
        assert_eq!(normalize_key("CUSTREC.CPY"), "custrec.cpy");
        assert_eq!(normalize_key("copybooks\\CUSTREC.cpy"), "custrec.cpy");
        assert_eq!(strip_extension(&normalize_key("CUSTREC.CPY")), "custrec");
    }

    #[test]
    fn expands_copy_statement() {
        let dir = tempfile::tempdir().unwrap();
        let copybook_path = dir.path().join("CUSTREC.CPY");
        std::fs::write(&copybook_path, "01 CUST-ID PIC 9(5).\n").unwrap();
        let repo = CopybookRepository::build(&[copybook_path]);

        let source = "       COPY CUSTREC.\n";
        let (expanded, names) = expand(source, &repo);
        assert!(expanded.contains("CUST-ID"));
        assert_eq!(names, vec!["CUSTREC".to_string()]);
    }

    #[test]
    fn unresolvable_copy_yields_empty_expansion() {
        let repo = CopybookRepository::build(&[]);
        let (expanded, names) = expand("COPY MISSING.\n", &repo);
        assert!(!expanded.contains("MISSING"));
        assert_eq!(names, vec!["MISSING".to_string()]);
    }
}
