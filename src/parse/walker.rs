//! Directory walking, respecting `.ignore` (and `.gitignore`) semantics.
//!
//! `spec.md` §1 treats filesystem walking as an external collaborator; this
//! is the small layer around it (§6: "Ignore file: `.ignore` in the working
//! directory, consumed by an ignore-matcher library with gitignore-like
//! semantics; non-existent file means no filtering").

use crate::core::error::Result;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Enumerates candidate files under `input`. If `input` is a single file, it
/// is returned as the sole candidate regardless of ignore rules (the user
/// named it explicitly). If `input` is a directory, it is walked with
/// `.ignore`/`.gitignore` semantics, matching the teacher's `FileWalker`
/// configuration.
pub fn walk(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files = Vec::new();
    let walker = WalkBuilder::new(input)
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .require_git(false)
        .build();

    for entry in walker.flatten() {
        let path = entry.path();
        if path.is_file() {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_directory_recursively() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.rs"), "fn a() {}").unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join("b.py"), "def b(): pass").unwrap();

        let files = walk(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn respects_ignore_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".ignore"), "skip.rs\n").unwrap();
        std::fs::write(dir.path().join("skip.rs"), "fn a() {}").unwrap();
        std::fs::write(dir.path().join("keep.rs"), "fn b() {}").unwrap();

        let files = walk(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert!(names.contains(&"keep.rs".to_string()));
        assert!(!names.contains(&"skip.rs".to_string()));
    }

    #[test]
    fn single_file_input_bypasses_ignore_rules() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".ignore"), "only.rs\n").unwrap();
        let file = dir.path().join("only.rs");
        std::fs::write(&file, "fn a() {}").unwrap();

        let files = walk(&file).unwrap();
        assert_eq!(files, vec![file]);
    }
}
