//! Analyzer dispatch: one implementation per supported language, selected by
//! the registry (`spec.md` §4.3) and invoked once per file by the
//! orchestrator.

pub mod cobol;
pub mod general;
pub mod markdown;
pub mod sql;

use crate::model::cobol::CobolFileAnalysis;
use crate::model::sql::SqlFileAnalysis;
use crate::model::FileAnalysis;
use std::path::Path;

/// One file's analysis, tagged by the shape it was produced in. Serialized
/// flat by the output writer (`crate::output`) — the `language` field inside
/// each variant is what a consumer discriminates on, not this enum.
pub enum AnalysisRecord {
    General(FileAnalysis),
    Cobol(CobolFileAnalysis),
    Sql(SqlFileAnalysis),
}

/// A per-file analysis failure. Never crosses a file boundary as a Rust
/// panic or propagated `Result::Err` out of the orchestrator — it is turned
/// into a `kind=error` record instead (`spec.md` §7).
#[derive(Debug, Clone)]
pub struct AnalyzeError(pub String);

impl std::fmt::Display for AnalyzeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for AnalyzeError {}

impl From<String> for AnalyzeError {
    fn from(s: String) -> Self {
        AnalyzeError(s)
    }
}

impl From<&str> for AnalyzeError {
    fn from(s: &str) -> Self {
        AnalyzeError(s.to_string())
    }
}

/// The capability every analyzer implements (`spec.md` §4.3, §9
/// "Polymorphic analyzers"): `analyze(path, source, root) -> Analysis`. The
/// parsed tree (when the language has one) is obtained inside `analyze`
/// itself, since COBOL and SQL do not share tree-sitter's `Tree` type.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, path: &Path, source: &str) -> Result<AnalysisRecord, AnalyzeError>;
}
