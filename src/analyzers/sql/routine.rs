//! Routine analysis service (`spec.md` §4.6.4): signature parsing, body
//! location in the raw source, dialect-hinted body dispatch, and merging
//! the result back into the declaration's `Create.../Alter...` operation.

use crate::analyzers::sql::body::{analyze_mysql_or_plpgsql_body, analyze_tsql_body, simplify_mysql, simplify_plpgsql};
use crate::analyzers::sql::dialect::{body_hint, Dialect};
use crate::model::sql::{CreateFunctionOperation, CreateProcedureOperation, ParameterDirection, RoutineParameter};
use once_cell::sync::Lazy;
use regex::Regex;

static ROUTINE_SIGNATURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)CREATE\s+(OR\s+REPLACE\s+)?(FUNCTION|PROCEDURE)\s+(?:[\[`"]?([A-Za-z_]\w*)[\]`"]?\s*\.\s*)?[\[`"]?([A-Za-z_][\w$]*)[\]`"]?\s*\(([^)]*)\)\s*(?:RETURNS\s+([A-Za-z_][\w]*(?:\([^)]*\))?)|RETURN\s+([A-Za-z_][\w]*(?:\([^)]*\))?))?"#,
    )
    .unwrap()
});

static PARAMETER_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*(IN\s+OUT|INOUT|IN|OUT)?\s*([A-Za-z_]\w*)\s+(.+)$").unwrap());

pub struct RoutineSignature {
    pub or_replace: bool,
    pub is_function: bool,
    pub schema: Option<String>,
    pub name: String,
    pub parameters: Vec<RoutineParameter>,
    pub return_type: Option<String>,
}

fn strip_quotes(raw: &str) -> String {
    raw.trim().trim_matches(|c| c == '`' || c == '"' || c == '[' || c == ']').to_string()
}

/// Parse a `CREATE [OR REPLACE] FUNCTION|PROCEDURE name(params) [RETURNS
/// type]` declaration with a regex-based signature parser (`spec.md` §4.6.4
/// step 1).
pub fn parse_signature(declaration: &str) -> Option<RoutineSignature> {
    let caps = ROUTINE_SIGNATURE.captures(declaration)?;
    let or_replace = caps.get(1).is_some();
    let is_function = caps[2].eq_ignore_ascii_case("FUNCTION");
    let schema = caps.get(3).map(|m| strip_quotes(m.as_str()));
    let name = strip_quotes(&caps[4]);
    let params_raw = &caps[5];
    let return_type = caps.get(6).or_else(|| caps.get(7)).map(|m| m.as_str().trim().to_string());

    let parameters = params_raw
        .split(',')
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(parse_parameter)
        .collect();

    Some(RoutineSignature { or_replace, is_function, schema, name, parameters, return_type })
}

fn parse_parameter(raw: &str) -> RoutineParameter {
    if let Some(caps) = PARAMETER_SPLIT.captures(raw) {
        let direction = match caps.get(1).map(|m| m.as_str().to_uppercase()) {
            Some(d) if d == "OUT" => ParameterDirection::Out,
            Some(d) if d == "INOUT" || d == "IN OUT" => ParameterDirection::Inout,
            _ => ParameterDirection::In,
        };
        RoutineParameter { name: caps[2].to_string(), direction, type_name: caps[3].trim().to_string() }
    } else {
        RoutineParameter { name: raw.to_string(), direction: ParameterDirection::In, type_name: String::new() }
    }
}

static TABLE_VIEW_INDEX_FUNC_PROC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)CREATE\s+(TABLE|VIEW|INDEX|FUNCTION|PROCEDURE)\b").unwrap());

/// Locate a routine's body in the *raw* (un-preprocessed) source: from just
/// after the declaration's closing parenthesis to the next `END $$` or the
/// next `CREATE TABLE|VIEW|INDEX|FUNCTION|PROCEDURE`, whichever comes first
/// (`spec.md` §4.6.4 step 2).
pub fn locate_body<'a>(raw_source: &'a str, schema: Option<&str>, name: &str) -> Option<&'a str> {
    let header_pattern = match schema {
        Some(s) => format!(
            r#"(?is)CREATE\s+(?:OR\s+REPLACE\s+)?(?:FUNCTION|PROCEDURE)\s+[\[`"]?{}[\]`"]?\s*\.\s*[\[`"]?{}[\]`"]?\s*\("#,
            regex::escape(s),
            regex::escape(name)
        ),
        None => format!(
            r#"(?is)CREATE\s+(?:OR\s+REPLACE\s+)?(?:FUNCTION|PROCEDURE)\s+[\[`"]?{}[\]`"]?\s*\("#,
            regex::escape(name)
        ),
    };
    let header_re = Regex::new(&header_pattern).ok()?;
    let header_match = header_re.find(raw_source)?;

    let after_header = &raw_source[header_match.end() - 1..];
    let paren_end = matching_paren_end(after_header)?;
    let body_start = header_match.end() - 1 + paren_end;
    let rest = &raw_source[body_start..];

    let end_dollar = Regex::new(r"(?i)END\s*\$\$").unwrap().find(rest).map(|m| m.end());
    let next_create = TABLE_VIEW_INDEX_FUNC_PROC.find(rest).map(|m| m.start());

    let end = match (end_dollar, next_create) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => rest.len(),
    };

    Some(&rest[..end])
}

fn matching_paren_end(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

pub struct RoutineResult {
    pub relations: Vec<String>,
    pub calls: crate::model::sql::CallSet,
}

/// Dispatch a located body to the right analyzer based on its dialect hint
/// (`spec.md` §4.6.4 steps 3-4).
pub fn analyze_body(body: &str) -> RoutineResult {
    let analysis = match body_hint(body) {
        Dialect::PlPgSql => analyze_mysql_or_plpgsql_body(&simplify_plpgsql(body)),
        Dialect::MySql => analyze_mysql_or_plpgsql_body(&simplify_mysql(body)),
        Dialect::TSql => analyze_tsql_body(body),
        Dialect::PlSql | Dialect::Unknown => analyze_mysql_or_plpgsql_body(&simplify_plpgsql(body)),
    };
    RoutineResult { relations: analysis.relations, calls: analysis.calls }
}

/// Build a `CreateFunctionOperation` from a signature and merged body
/// results (`spec.md` §4.6.4 step 5).
pub fn build_function(sig: RoutineSignature, body: RoutineResult) -> CreateFunctionOperation {
    let mut op = CreateFunctionOperation {
        schema: sig.schema,
        name: sig.name,
        parameters: sig.parameters,
        return_type: sig.return_type,
        references: Default::default(),
        calls: body.calls,
        or_replace: sig.or_replace,
    };
    for r in body.relations {
        op.references.add(r);
    }
    op
}

/// Build a `CreateProcedureOperation` from a signature and merged body
/// results (`spec.md` §4.6.4 step 5).
pub fn build_procedure(sig: RoutineSignature, body: RoutineResult) -> CreateProcedureOperation {
    let mut op = CreateProcedureOperation {
        schema: sig.schema,
        name: sig.name,
        parameters: sig.parameters,
        references: Default::default(),
        calls: body.calls,
        or_replace: sig.or_replace,
    };
    for r in body.relations {
        op.references.add(r);
    }
    op
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_signature_with_schema_and_return_type() {
        let sig = parse_signature("CREATE OR REPLACE FUNCTION s.f(a IN INT, b OUT VARCHAR) RETURNS INT").unwrap();
        assert!(sig.or_replace);
        assert!(sig.is_function);
        assert_eq!(sig.schema.as_deref(), Some("s"));
        assert_eq!(sig.name, "f");
        assert_eq!(sig.parameters.len(), 2);
        assert_eq!(sig.parameters[0].direction, ParameterDirection::In);
        assert_eq!(sig.parameters[1].direction, ParameterDirection::Out);
        assert_eq!(sig.return_type.as_deref(), Some("INT"));
    }

    #[test]
    fn locates_mysql_routine_body_and_stops_at_end_dollar() {
        let src = "CREATE PROCEDURE p()\nBEGIN\n  SELECT 1 FROM t;\nEND$$\nCREATE TABLE x(id INT);";
        let body = locate_body(src, None, "p").unwrap();
        assert!(body.contains("SELECT 1 FROM t"));
        assert!(!body.contains("CREATE TABLE"));
    }

    #[test]
    fn analyzes_mysql_body_end_to_end() {
        let body = "BEGIN SELECT COUNT(*) INTO cnt FROM orders; END$$";
        let result = analyze_body(body);
        assert!(result.relations.contains(&"orders".to_string()));
    }
}
