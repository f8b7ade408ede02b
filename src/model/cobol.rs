//! COBOL structural data model (`spec.md` §3, §4.5).

use serde::Serialize;

/// Which COBOL data division section a data item was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataSection {
    WorkingStorage,
    Linkage,
    LocalStorage,
    File,
}

/// One level-numbered data item, possibly owning nested items at a
/// strictly greater level (`spec.md` §3 invariant: levels 77 and 88 never
/// have children).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CobolDataItem {
    pub level: u32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redefines: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurs: Option<u32>,
    pub section: DataSection,
    pub children: Vec<CobolDataItem>,
}

impl CobolDataItem {
    pub fn new(level: u32, name: impl Into<String>, section: DataSection) -> Self {
        Self {
            level,
            name: name.into(),
            picture: None,
            usage: None,
            redefines: None,
            occurs: None,
            section,
            children: Vec::new(),
        }
    }

    /// Per `spec.md` §4.5 step 5: levels 77 (standalone) and 88 (condition
    /// names) never accept children.
    pub fn can_have_children(&self) -> bool {
        self.level != 77 && self.level != 88
    }
}

/// `PERFORM target [THRU thru]` — ignored entirely if no target was found.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformCall {
    pub target_paragraph: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thru_paragraph: Option<String>,
}

/// `CALL program [USING ...]`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalCall {
    pub program_name: String,
    pub is_dynamic: bool,
    pub parameter_count: usize,
}

/// `READ`/`WRITE`/`OPEN`/`CLOSE`/`REWRITE`/`DELETE`/`START`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOperation {
    pub verb: String,
    pub target: String,
}

/// `GOBACK`, `STOP [RUN|literal]`, `EXIT PROGRAM`, `RETURN`. Bare `EXIT` is
/// never captured (`spec.md` §4.5).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlFlowStatement {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// One paragraph, either nested under a `COBOLSection` or at file level
/// when no section is active.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CobolParagraph {
    pub name: String,
    pub perform_calls: Vec<PerformCall>,
    pub external_calls: Vec<ExternalCall>,
    pub file_operations: Vec<FileOperation>,
    pub control_flow_statements: Vec<ControlFlowStatement>,
    pub data_references: Vec<String>,
}

impl CobolParagraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            perform_calls: Vec::new(),
            external_calls: Vec::new(),
            file_operations: Vec::new(),
            control_flow_statements: Vec::new(),
            data_references: Vec::new(),
        }
    }

    /// Whether this paragraph captured any content at all — used to decide
    /// whether the synthetic prologue paragraph should be emitted.
    pub fn is_empty(&self) -> bool {
        self.perform_calls.is_empty()
            && self.external_calls.is_empty()
            && self.file_operations.is_empty()
            && self.control_flow_statements.is_empty()
            && self.data_references.is_empty()
    }
}

/// Name reserved for statements appearing before the first paragraph
/// header in the Procedure Division (`spec.md` §4.5).
pub const PROCEDURE_DIVISION_PROLOGUE: &str = "__PROCEDURE_DIVISION_PROLOGUE__";

/// A Procedure Division `SECTION`, emitted only when its header contains
/// the literal `SECTION` (`spec.md` §4.5).
#[derive(Debug, Clone, Serialize)]
pub struct CobolSection {
    pub name: String,
    pub paragraphs: Vec<CobolParagraph>,
}

/// One `SELECT ... ASSIGN TO ...` file-control entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileControlEntry {
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assign_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

/// One `FD`/`SD` record layout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDefinition {
    pub file_name: String,
    pub record_items: Vec<CobolDataItem>,
}

/// Whole-program COBOL analysis (`spec.md` §3).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CobolFileAnalysis {
    pub path: String,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_id: Option<String>,
    pub file_controls: Vec<FileControlEntry>,
    pub file_definitions: Vec<FileDefinition>,
    pub data_items: Vec<CobolDataItem>,
    pub sections: Vec<CobolSection>,
    pub paragraphs: Vec<CobolParagraph>,
    pub procedure_parameters: Vec<String>,
    pub copy_statements: Vec<String>,
    pub has_exec_sql: bool,
    pub has_exec_cics: bool,
    pub has_exec_sql_ims: bool,
}

impl CobolFileAnalysis {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            language: "cobol".to_string(),
            program_id: None,
            file_controls: Vec::new(),
            file_definitions: Vec::new(),
            data_items: Vec::new(),
            sections: Vec::new(),
            paragraphs: Vec::new(),
            procedure_parameters: Vec::new(),
            copy_statements: Vec::new(),
            has_exec_sql: false,
            has_exec_cics: false,
            has_exec_sql_ims: false,
        }
    }
}
