//! Shared reference/call collector (`spec.md` §4.6.8): every ANTLR-style
//! extractor in this sub-core (views, routine bodies, top-level statements,
//! triggers) funnels through these two finders so dedup/trim/case rules stay
//! in one place. Deduplication happens via `ReferenceSet`/`CallSet`
//! (`crate::model::sql`), which trim whitespace and drop empties; this module
//! only locates candidate names inside a SQL text fragment.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static RELATION_CLAUSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(?:FROM|JOIN|INTO|UPDATE)\s+(?:ONLY\s+)?[\[`"]?([A-Za-z_][\w$]*(?:\s*\.\s*[A-Za-z_][\w$]*)?)[\]`"]?"#)
        .unwrap()
});
static INSERT_INTO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bINSERT\s+INTO\s+[\[`"]?([A-Za-z_][\w$]*(?:\s*\.\s*[A-Za-z_][\w$]*)?)[\]`"]?"#).unwrap()
});
static DELETE_FROM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bDELETE\s+FROM\s+[\[`"]?([A-Za-z_][\w$]*(?:\s*\.\s*[A-Za-z_][\w$]*)?)[\]`"]?"#).unwrap()
});

/// Qualified scalar-function invocation: `schema.name(` or a known built-in
/// excluded set otherwise — avoids capturing bare keywords like `LEFT`/
/// `RIGHT`/`COUNT` that also look like calls but are not the kind of
/// reference `spec.md` §4.6.4 wants recorded.
static QUALIFIED_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b([A-Za-z_][\w$]*\.[A-Za-z_][\w$]*)\s*\(").unwrap());

static EXEC_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(?:EXEC|EXECUTE|CALL)\s+[\[`"]?([A-Za-z_][\w$]*(?:\s*\.\s*[A-Za-z_][\w$]*)?)[\]`"]?\s*\("#)
        .unwrap()
});

fn normalize_dotted(raw: &str) -> String {
    raw.split('.').map(|p| p.trim()).collect::<Vec<_>>().join(".")
}

/// Table/view names referenced by `FROM`, `JOIN`, `INTO` (SELECT INTO),
/// `UPDATE`, `INSERT INTO`, and `DELETE FROM` clauses in `sql`.
pub fn find_relations(sql: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for re in [&*RELATION_CLAUSE, &*INSERT_INTO, &*DELETE_FROM] {
        for caps in re.captures_iter(sql) {
            let name = normalize_dotted(&caps[1]);
            if seen.insert(name.clone()) {
                out.push(name);
            }
        }
    }
    out
}

/// Qualified function calls (`schema.fn(...)`) appearing anywhere in `sql`.
pub fn find_qualified_function_calls(sql: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for caps in QUALIFIED_CALL.captures_iter(sql) {
        let name = normalize_dotted(&caps[1]);
        if seen.insert(name.clone()) {
            out.push(name);
        }
    }
    out
}

/// `EXEC`/`EXECUTE` calls without a following `(` — the bare T-SQL
/// `EXEC schema.proc @arg = 1` form.
static BARE_EXEC_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(?:EXEC|EXECUTE)\s+[\[`"]?([A-Za-z_][\w$]*(?:\s*\.\s*[A-Za-z_][\w$]*)?)[\]`"]?"#).unwrap()
});

/// All procedure invocations, qualified-paren and bare forms combined.
pub fn find_procedure_calls(sql: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for re in [&*EXEC_CALL, &*BARE_EXEC_CALL] {
        for caps in re.captures_iter(sql) {
            let name = normalize_dotted(&caps[1]);
            if seen.insert(name.clone()) {
                out.push(name);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_relations_across_clauses() {
        let sql = "SELECT * FROM orders o JOIN customers c ON o.customer_id = c.id";
        let rels = find_relations(sql);
        assert!(rels.contains(&"orders".to_string()));
        assert!(rels.contains(&"customers".to_string()));
    }

    #[test]
    fn finds_qualified_function_calls_only() {
        let sql = "SELECT s.fn(1), LEFT(name, 3) FROM t";
        let calls = find_qualified_function_calls(sql);
        assert_eq!(calls, vec!["s.fn".to_string()]);
    }

    #[test]
    fn finds_exec_and_call_targets() {
        assert_eq!(find_procedure_calls("EXEC dbo.my_proc @x = 1"), vec!["dbo.my_proc".to_string()]);
        assert_eq!(find_procedure_calls("CALL s.p(1, 2)"), vec!["s.p".to_string()]);
    }
}
