//! DDL handlers (`spec.md` §4.6.3): CREATE TABLE/VIEW/INDEX, ALTER, DROP.
//!
//! Regex-driven in the style of the secondary example teacher's
//! `schema::ddl` module, adapted to this crate's richer per-statement
//! operation shapes instead of a merged cross-statement `Schema`.

use crate::analyzers::sql::reference::find_relations;
use crate::model::sql::{
    AlterTableOperation, AlterViewOperation, ColumnDefinition, CreateIndexOperation, CreateTableOperation,
    CreateViewOperation, DropOperation, ForeignKeyDefinition,
};
use once_cell::sync::Lazy;
use regex::Regex;

static CREATE_TABLE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)CREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?(?:[\[\]`"\w]+\s*\.\s*)*[\[`"]?([^\[\]`"\s(]+)[\]`"]?\s*\("#)
        .unwrap()
});
static IF_NOT_EXISTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bIF\s+NOT\s+EXISTS\b").unwrap());
static SCHEMA_TABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)CREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?[\[`"]?([A-Za-z_]\w*)[\]`"]?\s*\.\s*[\[`"]?([^\[\]`"\s(]+)[\]`"]?\s*\("#).unwrap());

static PRIMARY_KEY_CLAUSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*PRIMARY\s+KEY\s*\(([^)]+)\)").unwrap());
static FOREIGN_KEY_CLAUSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)^\s*(?:CONSTRAINT\s+[\[`"]?\w+[\]`"]?\s+)?FOREIGN\s+KEY\s*\(([^)]+)\)\s*REFERENCES\s+[\[`"]?([A-Za-z_][\w]*(?:\s*\.\s*[A-Za-z_][\w]*)?)[\]`"]?\s*\(([^)]+)\)(.*)$"#,
    )
    .unwrap()
});
static ON_DELETE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)ON\s+DELETE\s+(CASCADE|SET\s+NULL|SET\s+DEFAULT|RESTRICT|NO\s+ACTION)").unwrap());
static ON_UPDATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)ON\s+UPDATE\s+(CASCADE|SET\s+NULL|SET\s+DEFAULT|RESTRICT|NO\s+ACTION)").unwrap());
static COLUMN_DEF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*[\[`"]?([A-Za-z_][\w$]*)[\]`"]?\s+([A-Za-z_][\w]*(?:\s*\([^)]*\))?(?:\s+UNSIGNED)?)"#).unwrap());
static NOT_NULL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bNOT\s+NULL\b").unwrap());
static UNIQUE_INLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bUNIQUE\b").unwrap());
static PRIMARY_KEY_INLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bPRIMARY\s+KEY\b").unwrap());

/// Parse `schema.name`/`name` out of a leading qualified identifier.
fn split_schema_qualified(qualified: &str) -> (Option<String>, String) {
    let trimmed = qualified.trim().trim_matches(|c| c == '`' || c == '"' || c == '[' || c == ']');
    match trimmed.split_once('.') {
        Some((schema, name)) => (Some(strip_quotes(schema)), strip_quotes(name)),
        None => (None, strip_quotes(trimmed)),
    }
}

fn strip_quotes(raw: &str) -> String {
    raw.trim().trim_matches(|c| c == '`' || c == '"' || c == '[' || c == ']').to_string()
}

/// Extract the text between the first `(` and its matching `)`.
fn extract_parenthesized_body(stmt: &str) -> Option<String> {
    let start = stmt.find('(')?;
    let bytes = stmt.as_bytes();
    let mut depth = 0i32;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(stmt[start + 1..i].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Split a definition body on top-level commas (ignoring commas nested
/// inside parentheses, e.g. `DECIMAL(10,2)`).
fn split_top_level(body: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    for c in body.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => {
                out.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        out.push(current.trim().to_string());
    }
    out
}

fn column_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|c| strip_quotes(c.trim())).filter(|c| !c.is_empty()).collect()
}

/// Parse a `CREATE TABLE` statement into a `CreateTableOperation`
/// (`spec.md` §4.6.3, scenario §8.3).
pub fn parse_create_table(stmt: &str) -> Option<CreateTableOperation> {
    let if_not_exists = IF_NOT_EXISTS.is_match(stmt);
    let (schema, table_name) = if let Some(caps) = SCHEMA_TABLE.captures(stmt) {
        (Some(strip_quotes(&caps[1])), strip_quotes(&caps[2]))
    } else {
        let caps = CREATE_TABLE_NAME.captures(stmt)?;
        (None, strip_quotes(&caps[1]))
    };

    let body = extract_parenthesized_body(stmt)?;
    let mut op = CreateTableOperation {
        schema,
        table_name,
        if_not_exists,
        columns: Vec::new(),
        primary_keys: Vec::new(),
        foreign_keys: Vec::new(),
    };

    for def in split_top_level(&body) {
        if let Some(caps) = PRIMARY_KEY_CLAUSE.captures(&def) {
            op.primary_keys.extend(column_list(&caps[1]));
            continue;
        }
        if let Some(caps) = FOREIGN_KEY_CLAUSE.captures(&def) {
            let (fk_schema, fk_table) = split_schema_qualified(&caps[2]);
            let referenced_table = match fk_schema {
                Some(s) => format!("{s}.{fk_table}"),
                None => fk_table,
            };
            let tail = &caps[4];
            op.foreign_keys.push(ForeignKeyDefinition {
                columns: column_list(&caps[1]),
                referenced_table,
                referenced_columns: column_list(&caps[3]),
                on_delete: ON_DELETE.captures(tail).map(|c| normalize_action(&c[1])),
                on_update: ON_UPDATE.captures(tail).map(|c| normalize_action(&c[1])),
            });
            continue;
        }
        if def.to_uppercase().starts_with("CONSTRAINT")
            || def.to_uppercase().starts_with("KEY")
            || def.to_uppercase().starts_with("INDEX")
            || def.to_uppercase().starts_with("UNIQUE KEY")
        {
            continue;
        }
        if let Some(col) = parse_column_definition(&def) {
            if col.constraints.iter().any(|c| c == "PRIMARY KEY") {
                op.primary_keys.push(col.name.clone());
            }
            op.columns.push(col);
        }
    }

    Some(op)
}

fn normalize_action(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase()
}

fn parse_column_definition(def: &str) -> Option<ColumnDefinition> {
    let caps = COLUMN_DEF.captures(def)?;
    let name = strip_quotes(&caps[1]);
    let type_name = caps[2].split_whitespace().collect::<Vec<_>>().join(" ");

    let mut constraints = Vec::new();
    let not_null = NOT_NULL.is_match(def);
    if not_null {
        constraints.push("NOT NULL".to_string());
    }
    if UNIQUE_INLINE.is_match(def) {
        constraints.push("UNIQUE".to_string());
    }
    if PRIMARY_KEY_INLINE.is_match(def) {
        constraints.push("PRIMARY KEY".to_string());
    }

    Some(ColumnDefinition { name, type_name, nullable: !not_null, constraints })
}

/// Parse a `CREATE VIEW` statement (`spec.md` §4.6.3). `OR REPLACE` is
/// handled by the caller, which decides whether to classify the result as a
/// create or an alter.
pub fn parse_create_view(stmt: &str) -> Option<(Option<String>, String, Vec<String>)> {
    let re = Regex::new(r#"(?i)CREATE\s+(?:OR\s+REPLACE\s+)?VIEW\s+(?:[\[`"]?([A-Za-z_]\w*)[\]`"]?\s*\.\s*)?[\[`"]?([^\[\]`"\s(]+)[\]`"]?\s+AS\s+([\s\S]+)$"#).unwrap();
    let caps = re.captures(stmt)?;
    let schema = caps.get(1).map(|m| strip_quotes(m.as_str()));
    let view_name = strip_quotes(&caps[2]);
    let select = &caps[3];
    Some((schema, view_name, find_relations(select)))
}

pub fn build_create_view(schema: Option<String>, view_name: String, relations: Vec<String>) -> CreateViewOperation {
    let mut op = CreateViewOperation { schema, view_name, references: Default::default() };
    for r in relations {
        op.references.add(r);
    }
    op
}

pub fn build_alter_view(schema: Option<String>, view_name: String, relations: Vec<String>) -> AlterViewOperation {
    let mut op = AlterViewOperation { schema, view_name, references: Default::default() };
    for r in relations {
        op.references.add(r);
    }
    op
}

static CREATE_INDEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)CREATE\s+(UNIQUE\s+)?(?:CLUSTERED\s+|NONCLUSTERED\s+)?INDEX\s+(?:IF\s+NOT\s+EXISTS\s+)?[\[`"]?(\w+)[\]`"]?\s+ON\s+(?:[\[`"]?([A-Za-z_]\w*)[\]`"]?\s*\.\s*)?[\[`"]?(\w+)[\]`"]?\s*(?:USING\s+\w+\s*)?\(([^)]+)\)"#,
    )
    .unwrap()
});

/// Parse a `CREATE INDEX` statement (`spec.md` §4.6.3).
pub fn parse_create_index(stmt: &str) -> Option<CreateIndexOperation> {
    let caps = CREATE_INDEX.captures(stmt)?;
    let unique = caps.get(1).is_some() || stmt.to_uppercase().contains("UNIQUE INDEX");
    Some(CreateIndexOperation {
        index_name: strip_quotes(&caps[2]),
        schema: caps.get(3).map(|m| strip_quotes(m.as_str())),
        table_name: strip_quotes(&caps[4]),
        columns: column_list(&caps[5]),
        unique,
    })
}

static DROP_STMT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)DROP\s+(TABLE|VIEW|INDEX|FUNCTION|PROCEDURE|TRIGGER|SEQUENCE|SCHEMA)\s+(IF\s+EXISTS\s+)?(?:[\[`"]?([A-Za-z_]\w*)[\]`"]?\s*\.\s*)?[\[`"]?([^\[\]`"\s;,]+)[\]`"]?"#).unwrap()
});

/// Parse a `DROP ...` statement (`spec.md` §4.6.3).
pub fn parse_drop(stmt: &str) -> Option<DropOperation> {
    let caps = DROP_STMT.captures(stmt)?;
    Some(DropOperation {
        object_type: caps[1].to_uppercase(),
        if_exists: caps.get(2).is_some(),
        schema: caps.get(3).map(|m| strip_quotes(m.as_str())),
        object_name: strip_quotes(&caps[4]),
    })
}

static ALTER_VIEW_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*ALTER\s+VIEW\b").unwrap());

/// Discriminate ALTER VIEW vs ALTER TABLE by a textual prefix scan, exactly
/// as the spec's "Open Question" decision requires (`spec.md` §4.6.3, §9).
pub fn is_alter_view(stmt: &str) -> bool {
    ALTER_VIEW_PREFIX.is_match(stmt)
}

static ALTER_TABLE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)ALTER\s+TABLE\s+(?:ONLY\s+)?(?:[\[`"]?([A-Za-z_]\w*)[\]`"]?\s*\.\s*)?[\[`"]?([^\[\]`"\s]+)[\]`"]?"#).unwrap());
static ADD_COLUMN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bADD\s+(?:COLUMN\s+)?([^,]+?)(?:,|$)").unwrap());
static ADD_CONSTRAINT_PK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bADD\s+CONSTRAINT\s+\w+\s+PRIMARY\s+KEY\s*\(([^)]+)\)").unwrap());
static ADD_CONSTRAINT_FK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bADD\s+CONSTRAINT\s+\w+\s+FOREIGN\s+KEY\s*\(([^)]+)\)\s*REFERENCES\s+[\[`"]?([A-Za-z_][\w]*(?:\s*\.\s*[A-Za-z_][\w]*)?)[\]`"]?\s*\(([^)]+)\)(.*)$"#).unwrap()
});
static DROP_COLUMN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bDROP\s+(?:COLUMN\s+)?[\[`"]?([A-Za-z_]\w*)[\]`"]?"#).unwrap());
static DROP_CONSTRAINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bDROP\s+CONSTRAINT\s+[\[`"]?(\w+)[\]`"]?"#).unwrap());

/// Parse an `ALTER TABLE` statement into the additive/removed change lists
/// `spec.md` §4.6.3 describes.
pub fn parse_alter_table(stmt: &str) -> Option<AlterTableOperation> {
    let caps = ALTER_TABLE_NAME.captures(stmt)?;
    let schema = caps.get(1).map(|m| strip_quotes(m.as_str()));
    let table_name = strip_quotes(&caps[2]);

    let mut op = AlterTableOperation {
        schema,
        table_name,
        added_columns: Vec::new(),
        dropped_columns: Vec::new(),
        added_constraints: Vec::new(),
        dropped_constraints: Vec::new(),
    };

    if let Some(c) = ADD_CONSTRAINT_PK.captures(stmt) {
        op.added_constraints.push(format!("PRIMARY KEY ({})", column_list(&c[1]).join(", ")));
    }
    if let Some(c) = ADD_CONSTRAINT_FK.captures(stmt) {
        let (fk_schema, fk_table) = split_schema_qualified(&c[2]);
        let referenced = match fk_schema {
            Some(s) => format!("{s}.{fk_table}"),
            None => fk_table,
        };
        let tail = &c[4];
        let mut text = format!(
            "FOREIGN KEY ({}) REFERENCES {}({})",
            column_list(&c[1]).join(", "),
            referenced,
            column_list(&c[3]).join(", ")
        );
        if let Some(d) = ON_DELETE.captures(tail) {
            text.push_str(&format!(" ON DELETE {}", normalize_action(&d[1])));
        }
        if let Some(u) = ON_UPDATE.captures(tail) {
            text.push_str(&format!(" ON UPDATE {}", normalize_action(&u[1])));
        }
        op.added_constraints.push(text);
    }
    if let Some(c) = DROP_CONSTRAINT.captures(stmt) {
        op.dropped_constraints.push(c[1].to_string());
    }

    // Column ADD/DROP: only attempted when the clause isn't already a
    // constraint clause (§4.6.3: "attempt constraint interpretation first").
    let upper = stmt.to_uppercase();
    if upper.contains(" ADD ") && !upper.contains("CONSTRAINT") {
        for caps in ADD_COLUMN.captures_iter(stmt) {
            if let Some(col) = parse_column_definition(caps[1].trim()) {
                op.added_columns.push(col);
            }
        }
    }
    if upper.contains(" DROP ") && !upper.contains("CONSTRAINT") {
        if let Some(c) = DROP_COLUMN.captures(stmt) {
            op.dropped_columns.push(strip_quotes(&c[1]));
        }
    }

    Some(op)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_create_table_with_pk_and_fk() {
        let stmt = "CREATE TABLE s.t(id INT PRIMARY KEY, name VARCHAR(10) NOT NULL);";
        let op = parse_create_table(stmt).unwrap();
        assert_eq!(op.schema.as_deref(), Some("s"));
        assert_eq!(op.table_name, "t");
        assert_eq!(op.columns.len(), 2);
        assert_eq!(op.columns[0].name, "id");
        assert_eq!(op.columns[0].type_name, "INT");
        assert!(op.columns[0].constraints.contains(&"PRIMARY KEY".to_string()));
        assert_eq!(op.primary_keys, vec!["id".to_string()]);
        assert!(!op.columns[1].nullable);
        assert!(op.columns[1].constraints.contains(&"NOT NULL".to_string()));
    }

    #[test]
    fn parses_foreign_key_with_actions() {
        let stmt = "CREATE TABLE orders(id INT, customer_id INT, FOREIGN KEY (customer_id) REFERENCES customers(id) ON DELETE CASCADE ON UPDATE RESTRICT);";
        let op = parse_create_table(stmt).unwrap();
        let fk = &op.foreign_keys[0];
        assert_eq!(fk.referenced_table, "customers");
        assert_eq!(fk.on_delete.as_deref(), Some("CASCADE"));
        assert_eq!(fk.on_update.as_deref(), Some("RESTRICT"));
    }

    #[test]
    fn parses_create_index_unique() {
        let op = parse_create_index("CREATE UNIQUE INDEX idx_email ON users (email);").unwrap();
        assert!(op.unique);
        assert_eq!(op.table_name, "users");
        assert_eq!(op.columns, vec!["email".to_string()]);
    }

    #[test]
    fn parses_drop_with_schema() {
        let op = parse_drop("DROP TABLE IF EXISTS s.t;").unwrap();
        assert_eq!(op.object_type, "TABLE");
        assert!(op.if_exists);
        assert_eq!(op.schema.as_deref(), Some("s"));
        assert_eq!(op.object_name, "t");
    }

    #[test]
    fn discriminates_alter_view_by_text_prefix() {
        assert!(is_alter_view("ALTER VIEW v AS SELECT 1"));
        assert!(!is_alter_view("ALTER TABLE t ADD COLUMN x INT"));
    }

    #[test]
    fn parses_alter_table_add_column() {
        let op = parse_alter_table("ALTER TABLE t ADD COLUMN age INT NOT NULL;").unwrap();
        assert_eq!(op.table_name, "t");
        assert_eq!(op.added_columns[0].name, "age");
    }
}
