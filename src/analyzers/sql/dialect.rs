//! SQL dialect detection (`spec.md` §4.6.1 step 1, §6 priority table).
//!
//! Detection is a pure keyword scan over the raw source, applied before any
//! preprocessing. The priority order matters: earlier rules win even when a
//! later rule's markers are also present.

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    TSql,
    MySql,
    PlSql,
    PlPgSql,
    Unknown,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::TSql => "tsql",
            Dialect::MySql => "mysql",
            Dialect::PlSql => "plsql",
            Dialect::PlPgSql => "plpgsql",
            Dialect::Unknown => "unknown",
        }
    }
}

static CREATE_OR_ALTER_ROUTINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)CREATE\s+OR\s+ALTER\s+(PROCEDURE|FUNCTION)\b").unwrap());
static STANDALONE_GO: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?im)^\s*GO\s*$").unwrap());
static DELIMITER_DOLLAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?im)^\s*DELIMITER\s+\$\$").unwrap());
static ENGINE_INNODB: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)ENGINE\s*=\s*InnoDB").unwrap());
static CREATE_OR_REPLACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)CREATE\s+OR\s+REPLACE\b").unwrap());
static BEGIN_WITH_TRAILING_SLASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?im)\bBEGIN\b[\s\S]*?^\s*/\s*$").unwrap());
static LANGUAGE_PLPGSQL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)LANGUAGE\s+plpgsql").unwrap());
static BARE_DOLLAR_QUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\$").unwrap());

/// Detect the dialect from raw source, per the priority table in `spec.md`
/// §6: (1) `CREATE OR ALTER PROCEDURE|FUNCTION` → tsql; (2) standalone `GO`
/// line → tsql; (3) `DELIMITER $$` or `ENGINE=InnoDB` → mysql; (4)
/// `CREATE OR REPLACE` without plpgsql/MySQL markers → plsql; (5) `BEGIN`
/// with trailing `/` line → plsql; (6) `LANGUAGE plpgsql` or bare `$$` →
/// plpgsql; (7) unknown.
pub fn detect(source: &str) -> Dialect {
    if CREATE_OR_ALTER_ROUTINE.is_match(source) {
        return Dialect::TSql;
    }
    if STANDALONE_GO.is_match(source) {
        return Dialect::TSql;
    }
    if DELIMITER_DOLLAR.is_match(source) || ENGINE_INNODB.is_match(source) {
        return Dialect::MySql;
    }
    if CREATE_OR_REPLACE.is_match(source)
        && !LANGUAGE_PLPGSQL.is_match(source)
        && !DELIMITER_DOLLAR.is_match(source)
        && !ENGINE_INNODB.is_match(source)
    {
        return Dialect::PlSql;
    }
    if BEGIN_WITH_TRAILING_SLASH.is_match(source) {
        return Dialect::PlSql;
    }
    if LANGUAGE_PLPGSQL.is_match(source) || BARE_DOLLAR_QUOTE.is_match(source) {
        return Dialect::PlPgSql;
    }
    Dialect::Unknown
}

/// Classify the *dialect hint* of a routine body's text (`spec.md` §4.6.4
/// step 3). Distinct from top-level `detect` because it only ever looks at
/// the sliced body, not the whole file, and falls back to `mysql` for a bare
/// `BEGIN` rather than `unknown`.
pub fn body_hint(body: &str) -> Dialect {
    if LANGUAGE_PLPGSQL.is_match(body) {
        return Dialect::PlPgSql;
    }
    if DELIMITER_DOLLAR.is_match(body) || ENGINE_INNODB.is_match(body) {
        return Dialect::MySql;
    }
    if BARE_DOLLAR_QUOTE.is_match(body) {
        return Dialect::PlPgSql;
    }
    if Regex::new(r"(?i)\bAS\s+BEGIN\b|\bEXEC\b|\bEXECUTE\b|(?im)^\s*GO\s*$")
        .unwrap()
        .is_match(body)
    {
        return Dialect::TSql;
    }
    if Regex::new(r"(?i)\bBEGIN\b").unwrap().is_match(body) {
        return Dialect::MySql;
    }
    Dialect::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_tsql_from_create_or_alter() {
        assert_eq!(detect("CREATE OR ALTER PROCEDURE p AS BEGIN SELECT 1 END"), Dialect::TSql);
    }

    #[test]
    fn detects_tsql_from_standalone_go() {
        assert_eq!(detect("SELECT 1\nGO\n"), Dialect::TSql);
    }

    #[test]
    fn detects_mysql_from_engine_innodb() {
        assert_eq!(detect("CREATE TABLE t (id INT) ENGINE=InnoDB;"), Dialect::MySql);
    }

    #[test]
    fn detects_plsql_from_create_or_replace() {
        assert_eq!(detect("CREATE OR REPLACE PROCEDURE p IS BEGIN NULL; END;"), Dialect::PlSql);
    }

    #[test]
    fn detects_plpgsql_from_language_clause() {
        assert_eq!(detect("CREATE FUNCTION f() RETURNS INT AS $$ BEGIN RETURN 1; END; $$ LANGUAGE plpgsql;"), Dialect::PlPgSql);
    }

    #[test]
    fn unknown_when_no_markers() {
        assert_eq!(detect("SELECT * FROM orders;"), Dialect::Unknown);
    }
}
