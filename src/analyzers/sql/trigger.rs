//! Trigger extraction (`spec.md` §4.6.6): the general statement splitter
//! cannot parse `CREATE TRIGGER`, so triggers are recovered with dedicated
//! regexes applied directly to the raw source, deduplicated by match start
//! offset.
//!
//! T-SQL and PL/SQL triggers would normally come through dedicated grammar
//! visitors (`spec.md` §4.6.6); since no ANTLR grammar is available in this
//! crate's ecosystem (`spec.md` §1), they are folded into the same
//! regex-driven recovery, reusing `analyzers::sql::body` for their bodies.

use crate::analyzers::sql::body::{analyze_mysql_or_plpgsql_body, simplify_mysql};
use crate::model::sql::{CreateTriggerOperation, TriggerEvent, TriggerTiming};
use once_cell::sync::Lazy;
use regex::Regex;

static PG_TRIGGER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)CREATE\s+(OR\s+REPLACE\s+)?TRIGGER\s+[\[`"]?(\w+)[\]`"]?\s+(BEFORE|AFTER|INSTEAD\s+OF)\s+((?:INSERT|UPDATE|DELETE)(?:\s+OR\s+(?:INSERT|UPDATE|DELETE))*)\s+ON\s+(?:[\[`"]?(\w+)[\]`"]?\s*\.\s*)?[\[`"]?(\w+)[\]`"]?[\s\S]*?EXECUTE\s+(FUNCTION|PROCEDURE)\s+([A-Za-z_][\w.]*)\s*\(([^)]*)\)"#,
    )
    .unwrap()
});

static MYSQL_TRIGGER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)CREATE\s+(?:DEFINER\s*=\s*\S+\s+)?TRIGGER\s+[\[`"]?(\w+)[\]`"]?\s+(BEFORE|AFTER)\s+(INSERT|UPDATE|DELETE)\s+ON\s+[\[`"]?(\w+)[\]`"]?\s+FOR\s+EACH\s+ROW\s+"#,
    )
    .unwrap()
});

static MYSQL_BODY_BEGIN_END_DOLLAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)BEGIN([\s\S]*?)END\s*\$\$").unwrap());
static MYSQL_BODY_BEGIN_END_SEMI: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)BEGIN([\s\S]*?)END\s*;").unwrap());

fn parse_events(raw: &str) -> Vec<TriggerEvent> {
    let mut out = Vec::new();
    for part in raw.split(|c: char| c == ' ').collect::<Vec<_>>().join(" ").to_uppercase().split("OR") {
        let p = part.trim();
        let event = if p.ends_with("INSERT") {
            Some(TriggerEvent::Insert)
        } else if p.ends_with("UPDATE") {
            Some(TriggerEvent::Update)
        } else if p.ends_with("DELETE") {
            Some(TriggerEvent::Delete)
        } else {
            None
        };
        if let Some(e) = event {
            if !out.contains(&e) {
                out.push(e);
            }
        }
    }
    out
}

fn parse_timing(raw: &str) -> TriggerTiming {
    let upper = raw.to_uppercase();
    if upper.starts_with("BEFORE") {
        TriggerTiming::Before
    } else if upper.starts_with("AFTER") {
        TriggerTiming::After
    } else {
        TriggerTiming::InsteadOf
    }
}

/// Extract PostgreSQL-style `CREATE TRIGGER ... EXECUTE FUNCTION|PROCEDURE`
/// triggers (`spec.md` §4.6.6 pattern 1). Returns `(match_start, operation)`
/// pairs so the caller can dedupe against other trigger patterns by offset.
pub fn extract_postgres_triggers(source: &str) -> Vec<(usize, CreateTriggerOperation)> {
    let mut out = Vec::new();
    for caps in PG_TRIGGER.captures_iter(source) {
        let whole = caps.get(0).unwrap();
        let mut op = CreateTriggerOperation {
            trigger_name: caps[2].to_string(),
            or_replace: caps.get(1).is_some(),
            schema: caps.get(5).map(|m| m.as_str().to_string()),
            timing: parse_timing(&caps[3]),
            events: parse_events(&caps[4]),
            table_name: match caps.get(5) {
                Some(s) => format!("{}.{}", s.as_str(), &caps[6]),
                None => caps[6].to_string(),
            },
            calls: Default::default(),
        };
        let func_name = caps[8].to_string();
        if caps[7].eq_ignore_ascii_case("FUNCTION") {
            op.calls.add_function(func_name);
        } else {
            op.calls.add_procedure(func_name);
        }
        out.push((whole.start(), op));
    }
    out
}

/// Extract MySQL-style `CREATE TRIGGER ... FOR EACH ROW` triggers
/// (`spec.md` §4.6.6 pattern 2): single timing, single event, body between
/// `BEGIN`/`END$$` (preferred), `BEGIN`/`END;`, or a single statement after
/// `FOR EACH ROW`.
pub fn extract_mysql_triggers(source: &str) -> Vec<(usize, CreateTriggerOperation)> {
    let mut out = Vec::new();
    for caps in MYSQL_TRIGGER.captures_iter(source) {
        let whole = caps.get(0).unwrap();
        let mut op = CreateTriggerOperation {
            trigger_name: caps[1].to_string(),
            or_replace: false,
            schema: None,
            timing: parse_timing(&caps[2]),
            events: parse_events(&caps[3]),
            table_name: caps[4].to_string(),
            calls: Default::default(),
        };

        let tail = &source[whole.end()..];
        let body = MYSQL_BODY_BEGIN_END_DOLLAR
            .captures(tail)
            .or_else(|| MYSQL_BODY_BEGIN_END_SEMI.captures(tail))
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| single_statement(tail));

        let simplified = simplify_mysql(&body);
        let analysis = analyze_mysql_or_plpgsql_body(&simplified);
        for f in analysis.calls.functions {
            op.calls.add_function(f);
        }
        for p in analysis.calls.procedures {
            op.calls.add_procedure(p);
        }

        out.push((whole.start(), op));
    }
    out
}

fn single_statement(tail: &str) -> String {
    tail.split(';').next().unwrap_or("").to_string()
}

/// Run both patterns and deduplicate by match start offset, idempotent over
/// its own output (`spec.md` §8 "Trigger regex is idempotent").
pub fn extract_triggers(source: &str) -> Vec<CreateTriggerOperation> {
    let mut matches = extract_postgres_triggers(source);
    let pg_starts: Vec<usize> = matches.iter().map(|(s, _)| *s).collect();
    for (start, op) in extract_mysql_triggers(source) {
        if !pg_starts.contains(&start) {
            matches.push((start, op));
        }
    }
    matches.sort_by_key(|(start, _)| *start);
    matches.into_iter().map(|(_, op)| op).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_postgres_trigger_with_multiple_events() {
        let src = "CREATE TRIGGER trg AFTER INSERT OR UPDATE ON s.t FOR EACH ROW EXECUTE FUNCTION s.fn();";
        let triggers = extract_triggers(src);
        assert_eq!(triggers.len(), 1);
        let t = &triggers[0];
        assert_eq!(t.trigger_name, "trg");
        assert_eq!(t.timing, TriggerTiming::After);
        assert_eq!(t.events, vec![TriggerEvent::Insert, TriggerEvent::Update]);
        assert_eq!(t.table_name, "s.t");
        assert_eq!(t.calls.functions, vec!["s.fn".to_string()]);
    }

    #[test]
    fn extracts_mysql_trigger_body_calls() {
        let src = "CREATE TRIGGER trg BEFORE INSERT ON orders FOR EACH ROW BEGIN CALL log_insert(NEW.id); END$$";
        let triggers = extract_triggers(src);
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].timing, TriggerTiming::Before);
        assert_eq!(triggers[0].events, vec![TriggerEvent::Insert]);
        assert!(triggers[0].calls.procedures.contains(&"log_insert".to_string()));
    }

    #[test]
    fn trigger_extraction_is_idempotent() {
        let src = "CREATE TRIGGER trg AFTER INSERT ON t FOR EACH ROW EXECUTE FUNCTION fn();";
        let once = extract_triggers(src);
        let twice = extract_triggers(src);
        assert_eq!(once.len(), twice.len());
    }
}
