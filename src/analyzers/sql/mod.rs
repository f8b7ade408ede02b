//! SQL analysis (`spec.md` §4.6): multi-dialect dispatch over DDL, routine
//! bodies, and triggers. No ANTLR grammar is available in this crate's
//! ecosystem (`spec.md` §1), so every stage below — dialect detection,
//! preprocessing, statement splitting, and the handlers themselves — is
//! regex/text driven rather than built on a SQL AST crate.

pub mod body;
pub mod ddl;
pub mod dialect;
pub mod plsql;
pub mod preprocess;
pub mod reference;
pub mod routine;
pub mod statements;
pub mod trigger;

use crate::analyzers::{AnalysisRecord, AnalyzeError, Analyzer};
use crate::model::sql::SqlFileAnalysis;
use statements::StatementKind;
use std::path::Path;

pub struct SqlAnalyzer;

impl Analyzer for SqlAnalyzer {
    fn analyze(&self, path: &Path, source: &str) -> Result<AnalysisRecord, AnalyzeError> {
        let mut analysis = SqlFileAnalysis::new(path.display().to_string());

        if dialect::detect(source) == dialect::Dialect::PlSql {
            let plsql = plsql::analyze(source);
            analysis.create_functions = plsql.functions;
            analysis.create_procedures = plsql.procedures;
            analysis.create_triggers = plsql.triggers;
            for r in plsql.top_level_relations {
                analysis.top_level_references.add(r);
            }
            analysis.top_level_calls = plsql.top_level_calls;
            return Ok(AnalysisRecord::Sql(analysis));
        }

        let preprocessed = preprocess::preprocess(source);
        for stmt in statements::split(&preprocessed) {
            dispatch_statement(&mut analysis, source, &stmt);
        }

        for trigger in trigger::extract_triggers(source) {
            analysis.create_triggers.push(trigger);
        }

        Ok(AnalysisRecord::Sql(analysis))
    }
}

/// Dispatch one split statement by kind (`spec.md` §4.6.1 step 3).
fn dispatch_statement(analysis: &mut SqlFileAnalysis, raw_source: &str, stmt: &statements::SplitStatement) {
    match stmt.kind {
        StatementKind::CreateTable => {
            if let Some(op) = ddl::parse_create_table(&stmt.text) {
                analysis.create_tables.push(op);
            }
        }
        StatementKind::CreateView => {
            if let Some((schema, view_name, relations)) = ddl::parse_create_view(&stmt.text) {
                if stmt.text.to_uppercase().contains("OR REPLACE") {
                    analysis.alter_views.push(ddl::build_alter_view(schema, view_name, relations));
                } else {
                    analysis.create_views.push(ddl::build_create_view(schema, view_name, relations));
                }
            }
        }
        StatementKind::CreateIndex => {
            if let Some(op) = ddl::parse_create_index(&stmt.text) {
                analysis.create_indexes.push(op);
            }
        }
        StatementKind::CreateFunction | StatementKind::CreateProcedure => {
            dispatch_routine(analysis, raw_source, &stmt.text, stmt.kind == StatementKind::CreateFunction);
        }
        StatementKind::Alter => {
            if ddl::is_alter_view(&stmt.text) {
                if let Some((schema, view_name, relations)) = ddl::parse_create_view(&stmt.text) {
                    analysis.alter_views.push(ddl::build_alter_view(schema, view_name, relations));
                }
            } else if let Some(op) = ddl::parse_alter_table(&stmt.text) {
                analysis.alter_tables.push(op);
            }
        }
        StatementKind::Drop => {
            if let Some(op) = ddl::parse_drop(&stmt.text) {
                analysis.drop_operations.push(op);
            }
        }
        StatementKind::CreateTrigger => {
            // Handled uniformly by `trigger::extract_triggers` over the raw
            // source after the main dispatch loop (`spec.md` §4.6.6).
        }
        StatementKind::Other => {
            for r in reference::find_relations(&stmt.text) {
                analysis.top_level_references.add(r);
            }
            for f in reference::find_qualified_function_calls(&stmt.text) {
                analysis.top_level_calls.add_function(f);
            }
            for p in reference::find_procedure_calls(&stmt.text) {
                analysis.top_level_calls.add_procedure(p);
            }
        }
    }
}

/// Locate a routine's body in the *raw* source — the split statement's text
/// may have been cut short at a semicolon inside the body, since the general
/// splitter only tracks parenthesis depth (`spec.md` §4.6.4 step 2).
fn dispatch_routine(analysis: &mut SqlFileAnalysis, raw_source: &str, declaration: &str, is_function: bool) {
    let Some(sig) = routine::parse_signature(declaration) else { return };
    let body = routine::locate_body(raw_source, sig.schema.as_deref(), &sig.name).unwrap_or("");
    let result = routine::analyze_body(body);

    if is_function {
        analysis.create_functions.push(routine::build_function(sig, result));
    } else {
        analysis.create_procedures.push(routine::build_procedure(sig, result));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyzes_create_table_and_trigger_together() {
        let source = "\
CREATE TABLE accounts (id INT PRIMARY KEY, balance INT NOT NULL);
CREATE TRIGGER trg AFTER UPDATE ON accounts FOR EACH ROW EXECUTE FUNCTION audit.log();
";
        let analyzer = SqlAnalyzer;
        let record = analyzer.analyze(Path::new("schema.sql"), source).unwrap();
        let AnalysisRecord::Sql(analysis) = record else { panic!("expected sql record") };

        assert_eq!(analysis.create_tables.len(), 1);
        assert_eq!(analysis.create_tables[0].table_name, "accounts");
        assert_eq!(analysis.create_triggers.len(), 1);
        assert_eq!(analysis.create_triggers[0].table_name, "accounts");
        assert_eq!(analysis.create_triggers[0].calls.functions, vec!["audit.log".to_string()]);
    }

    #[test]
    fn analyzes_mysql_procedure_with_body_references() {
        let source = "\
DELIMITER $$
CREATE PROCEDURE refresh_totals()
BEGIN
  UPDATE accounts SET balance = balance + 1;
  CALL audit_log(1);
END$$
DELIMITER ;
";
        let analyzer = SqlAnalyzer;
        let record = analyzer.analyze(Path::new("proc.sql"), source).unwrap();
        let AnalysisRecord::Sql(analysis) = record else { panic!("expected sql record") };

        assert_eq!(analysis.create_procedures.len(), 1);
        let proc = &analysis.create_procedures[0];
        assert_eq!(proc.name, "refresh_totals");
        assert!(proc.references.relations.contains(&"accounts".to_string()));
        assert!(proc.calls.procedures.contains(&"audit_log".to_string()));
    }

    #[test]
    fn dispatches_plsql_directly_without_general_split() {
        let source = "CREATE OR REPLACE PROCEDURE p (x IN INT) IS\nBEGIN\n  SELECT 1 FROM dual;\nEND p;\n";
        let analyzer = SqlAnalyzer;
        let record = analyzer.analyze(Path::new("p.sql"), source).unwrap();
        let AnalysisRecord::Sql(analysis) = record else { panic!("expected sql record") };
        assert_eq!(analysis.create_procedures.len(), 1);
        assert_eq!(analysis.create_procedures[0].name, "p");
    }
}
