//! SQL structural data model (`spec.md` §3, §4.6).

use serde::Serialize;

/// A set of relation/function/procedure names referenced from one
/// statement or routine body. Deduplicated and non-empty by construction
/// (`spec.md` §3 invariant, §4.6.8 reference collector).
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ReferenceSet {
    pub relations: Vec<String>,
}

impl ReferenceSet {
    pub fn add(&mut self, name: impl Into<String>) {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return;
        }
        if !self.relations.iter().any(|r| r == trimmed) {
            self.relations.push(trimmed.to_string());
        }
    }
}

/// Calls collected from a routine body or a top-level statement, split by
/// call kind (`spec.md` §4.6.1, §4.6.4).
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CallSet {
    pub functions: Vec<String>,
    pub procedures: Vec<String>,
}

impl CallSet {
    pub fn add_function(&mut self, name: impl Into<String>) {
        Self::add(&mut self.functions, name);
    }

    pub fn add_procedure(&mut self, name: impl Into<String>) {
        Self::add(&mut self.procedures, name);
    }

    fn add(list: &mut Vec<String>, name: impl Into<String>) {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return;
        }
        if !list.iter().any(|r| r == trimmed) {
            list.push(trimmed.to_string());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParameterDirection {
    In,
    Out,
    Inout,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineParameter {
    pub name: String,
    pub direction: ParameterDirection,
    #[serde(rename = "type")]
    pub type_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub nullable: bool,
    /// Subset of `{NOT NULL, UNIQUE, PRIMARY KEY}`.
    pub constraints: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyDefinition {
    pub columns: Vec<String>,
    /// Schema-qualified as `schema.name` when a schema is present.
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_update: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTableOperation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub table_name: String,
    pub if_not_exists: bool,
    pub columns: Vec<ColumnDefinition>,
    pub primary_keys: Vec<String>,
    pub foreign_keys: Vec<ForeignKeyDefinition>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateViewOperation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub view_name: String,
    pub references: ReferenceSet,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlterViewOperation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub view_name: String,
    pub references: ReferenceSet,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIndexOperation {
    pub index_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub table_name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlterTableOperation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub table_name: String,
    pub added_columns: Vec<ColumnDefinition>,
    pub dropped_columns: Vec<String>,
    /// Canonical constraint strings, e.g.
    /// `"FOREIGN KEY (cols) REFERENCES t(cols) ON DELETE x ON UPDATE y"`.
    pub added_constraints: Vec<String>,
    pub dropped_constraints: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DropOperation {
    pub object_type: String,
    pub if_exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub object_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFunctionOperation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
    pub parameters: Vec<RoutineParameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    pub references: ReferenceSet,
    pub calls: CallSet,
    pub or_replace: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProcedureOperation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
    pub parameters: Vec<RoutineParameter>,
    pub references: ReferenceSet,
    pub calls: CallSet,
    pub or_replace: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriggerTiming {
    Before,
    After,
    #[serde(rename = "INSTEAD OF")]
    InsteadOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriggerEvent {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTriggerOperation {
    pub trigger_name: String,
    pub or_replace: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub timing: TriggerTiming,
    pub events: Vec<TriggerEvent>,
    /// Schema-qualified as `schema.table` when a schema is present.
    pub table_name: String,
    pub calls: CallSet,
}

/// Catch-all accumulator for statements not inside any routine body
/// (`spec.md` §4.6.1 step 4, "top-level statement handler").
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopLevelActivity {
    pub relations: Vec<String>,
    pub calls: CallSet,
}

/// Whole-file SQL analysis (`spec.md` §3).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlFileAnalysis {
    pub path: String,
    pub language: String,
    pub create_tables: Vec<CreateTableOperation>,
    pub alter_tables: Vec<AlterTableOperation>,
    pub create_views: Vec<CreateViewOperation>,
    pub alter_views: Vec<AlterViewOperation>,
    pub create_indexes: Vec<CreateIndexOperation>,
    pub create_functions: Vec<CreateFunctionOperation>,
    pub create_procedures: Vec<CreateProcedureOperation>,
    pub create_triggers: Vec<CreateTriggerOperation>,
    pub drop_operations: Vec<DropOperation>,
    pub top_level_references: ReferenceSet,
    pub top_level_calls: CallSet,
}

impl SqlFileAnalysis {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            language: "sql".to_string(),
            create_tables: Vec::new(),
            alter_tables: Vec::new(),
            create_views: Vec::new(),
            alter_views: Vec::new(),
            create_indexes: Vec::new(),
            create_functions: Vec::new(),
            create_procedures: Vec::new(),
            create_triggers: Vec::new(),
            drop_operations: Vec::new(),
            top_level_references: ReferenceSet::default(),
            top_level_calls: CallSet::default(),
        }
    }

    /// Hide column arrays from `CreateTableOperation`s, per the
    /// `hideSqlTableColumns` config option (`spec.md` §6).
    pub fn hide_table_columns(&mut self) {
        for table in &mut self.create_tables {
            table.columns.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_set_dedupes_and_trims() {
        let mut refs = ReferenceSet::default();
        refs.add(" orders ");
        refs.add("orders");
        refs.add("");
        assert_eq!(refs.relations, vec!["orders".to_string()]);
    }

    #[test]
    fn reference_normalizer_is_idempotent() {
        let mut once = ReferenceSet::default();
        once.add(" Orders ");
        let mut twice = once.clone();
        twice.add(once.relations[0].clone());
        assert_eq!(once, twice);
    }
}
