//! COBOL analysis (`spec.md` §4.5): `COPY`/`REPLACING` preprocessing
//! followed by a hand-written sentence-level visitor.

pub mod preprocessor;
pub mod visitor;

use crate::analyzers::{AnalysisRecord, AnalyzeError, Analyzer};
use crate::model::cobol::CobolFileAnalysis;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use std::sync::Arc;

pub use preprocessor::CopybookRepository;

static EXEC_SQL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)EXEC\s+SQL\b").unwrap());
static EXEC_CICS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)EXEC\s+CICS\b").unwrap());
static EXEC_SQL_IMS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)EXEC\s+SQLIMS\b|EXEC\s+IMS\b").unwrap());

pub struct CobolAnalyzer {
    copybooks: Arc<CopybookRepository>,
}

impl CobolAnalyzer {
    pub fn new(copybooks: Arc<CopybookRepository>) -> Self {
        Self { copybooks }
    }
}

impl Analyzer for CobolAnalyzer {
    fn analyze(&self, path: &Path, source: &str) -> Result<AnalysisRecord, AnalyzeError> {
        let has_exec_sql = EXEC_SQL.is_match(source);
        let has_exec_cics = EXEC_CICS.is_match(source);
        let has_exec_sql_ims = EXEC_SQL_IMS.is_match(source);

        let (expanded, copy_statements) = preprocessor::expand(source, &self.copybooks);
        let sentences = visitor::split_sentences(&expanded);
        let parts = visitor::visit(&sentences);

        let analysis: CobolFileAnalysis =
            parts.into_analysis(path.display().to_string(), copy_statements, (has_exec_sql, has_exec_cics, has_exec_sql_ims));

        Ok(AnalysisRecord::Cobol(analysis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyzes_program_with_copy_and_perform() {
        let dir = tempfile::tempdir().unwrap();
        let copybook_path = dir.path().join("CUSTREC.CPY");
        std::fs::write(&copybook_path, "       01 CUSTOMER-ID PIC 9(5).\n").unwrap();
        let repo = Arc::new(CopybookRepository::build(&[copybook_path]));

        let source = "\
       IDENTIFICATION DIVISION.
       PROGRAM-ID. CUSTPROC.
       DATA DIVISION.
       WORKING-STORAGE SECTION.
       COPY CUSTREC.
       PROCEDURE DIVISION.
       MAIN-PARA.
           PERFORM SUB-RTN THRU SUB-RTN-EXIT.
           GOBACK.
       SUB-RTN.
           DISPLAY \"HELLO\".
";

        let analyzer = CobolAnalyzer::new(repo);
        let record = analyzer.analyze(Path::new("custproc.cbl"), source).unwrap();
        let AnalysisRecord::Cobol(analysis) = record else { panic!("expected cobol record") };

        assert_eq!(analysis.program_id.as_deref(), Some("CUSTPROC"));
        assert_eq!(analysis.copy_statements, vec!["CUSTREC".to_string()]);
        assert!(analysis.data_items.iter().any(|i| i.name == "CUSTOMER-ID"));

        let main = analysis.paragraphs.iter().find(|p| p.name == "MAIN-PARA").unwrap();
        assert_eq!(main.perform_calls[0].target_paragraph, "SUB-RTN");
        assert_eq!(main.perform_calls[0].thru_paragraph.as_deref(), Some("SUB-RTN-EXIT"));
        assert_eq!(main.control_flow_statements[0].kind, "GOBACK");
    }
}
