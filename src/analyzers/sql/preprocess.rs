//! SQL preprocessor (`spec.md` §4.6.2): a line-oriented transform that
//! strips batch separators and collapses MySQL's `DELIMITER $$` routine
//! bodies down to something a statement-oriented parser can swallow.

use once_cell::sync::Lazy;
use regex::Regex;

static GO_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*GO\s*$").unwrap());
static DELIMITER_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*DELIMITER\b").unwrap());
static CREATE_ROUTINE_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)CREATE\s+(OR\s+REPLACE\s+)?(FUNCTION|PROCEDURE)\b").unwrap());
static BEGIN_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*BEGIN\s*$").unwrap());
static END_DOLLAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*END\s*\$\$\s*$").unwrap());
static STANDALONE_END_DOLLAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*END\s*\$\$\s*$").unwrap());

/// Apply the line-oriented preprocessor described in `spec.md` §4.6.2.
pub fn preprocess(source: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut in_routine_header = false;
    let mut skipping_body = false;
    let mut depth_guard = 0usize;

    for line in source.lines() {
        if GO_LINE.is_match(line) {
            continue;
        }
        if DELIMITER_LINE.is_match(line) {
            continue;
        }

        if skipping_body {
            depth_guard += 1;
            if END_DOLLAR.is_match(line) || depth_guard > 100_000 {
                out.push("END;".to_string());
                skipping_body = false;
                in_routine_header = false;
            }
            continue;
        }

        if in_routine_header && BEGIN_LINE.is_match(line) {
            ensure_trailing_semicolon(&mut out);
            out.push("BEGIN;".to_string());
            skipping_body = true;
            depth_guard = 0;
            continue;
        }

        if CREATE_ROUTINE_HEADER.is_match(line) {
            in_routine_header = true;
        }

        if !in_routine_header && STANDALONE_END_DOLLAR.is_match(line) {
            out.push("END;".to_string());
            continue;
        }

        out.push(line.to_string());
    }

    out.join("\n")
}

fn ensure_trailing_semicolon(out: &mut Vec<String>) {
    for line in out.iter_mut().rev() {
        if line.trim().is_empty() {
            continue;
        }
        if !line.trim_end().ends_with(';') {
            line.push(';');
        }
        break;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_standalone_go_lines() {
        let out = preprocess("SELECT 1\nGO\nSELECT 2\n");
        assert!(!out.lines().any(|l| l.trim().eq_ignore_ascii_case("go")));
    }

    #[test]
    fn strips_delimiter_lines() {
        let out = preprocess("DELIMITER $$\nSELECT 1;\nDELIMITER ;\n");
        assert!(!out.to_uppercase().contains("DELIMITER"));
    }

    #[test]
    fn collapses_mysql_routine_body() {
        let src = "CREATE PROCEDURE p()\nBEGIN\n  SELECT 1;\n  SELECT 2;\nEND$$\n";
        let out = preprocess(src);
        assert!(out.contains("BEGIN;"));
        assert!(out.contains("END;"));
        assert!(!out.contains("SELECT 1"));
    }

    #[test]
    fn normalizes_standalone_end_dollar_outside_routine() {
        let out = preprocess("END$$\n");
        assert_eq!(out.trim(), "END;");
    }
}
