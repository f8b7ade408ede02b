//! Statement splitting for the general parse path (`spec.md` §4.6.1 step 2).
//!
//! Splits preprocessed source on top-level `;` boundaries, tracking single-
//! and double-quoted strings, line/block comments, and parenthesis depth so
//! a semicolon inside a string literal or a nested `CREATE FUNCTION` body
//! does not end the statement early.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    CreateTable,
    CreateView,
    CreateIndex,
    CreateFunction,
    CreateProcedure,
    CreateTrigger,
    Alter,
    Drop,
    Other,
}

pub struct SplitStatement {
    pub text: String,
    pub kind: StatementKind,
}

/// Split `source` into top-level statements. Empty/whitespace-only
/// statements are dropped.
pub fn split(source: &str) -> Vec<SplitStatement> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut chars = source.char_indices().peekable();
    let bytes = source.as_bytes();

    while let Some((i, c)) = chars.next() {
        match c {
            '-' if bytes.get(i + 1) == Some(&b'-') => {
                current.push(c);
                while let Some((_, c2)) = chars.peek().copied() {
                    if c2 == '\n' {
                        break;
                    }
                    current.push(c2);
                    chars.next();
                }
            }
            '/' if bytes.get(i + 1) == Some(&b'*') => {
                current.push(c);
                chars.next();
                current.push('*');
                while let Some((j, c2)) = chars.next() {
                    current.push(c2);
                    if c2 == '/' && j > 0 && source.as_bytes()[j - 1] == b'*' {
                        break;
                    }
                }
            }
            '\'' | '"' => {
                current.push(c);
                for (_, c2) in chars.by_ref() {
                    current.push(c2);
                    if c2 == c {
                        break;
                    }
                }
            }
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth -= 1;
                current.push(c);
            }
            ';' if depth <= 0 => {
                push_if_nonempty(&mut out, &current);
                current.clear();
            }
            _ => current.push(c),
        }
    }
    push_if_nonempty(&mut out, &current);
    out
}

fn push_if_nonempty(out: &mut Vec<SplitStatement>, text: &str) {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return;
    }
    out.push(SplitStatement { text: trimmed.to_string(), kind: classify(trimmed) });
}

fn classify(stmt: &str) -> StatementKind {
    let upper = stmt.trim_start();
    let starts = |kw: &str| upper.len() >= kw.len() && upper[..kw.len()].eq_ignore_ascii_case(kw);

    if regex_lite_create(upper, "TABLE") {
        StatementKind::CreateTable
    } else if regex_lite_create(upper, "VIEW") {
        StatementKind::CreateView
    } else if regex_lite_create(upper, "INDEX") || regex_lite_create_unique_index(upper) {
        StatementKind::CreateIndex
    } else if regex_lite_create(upper, "FUNCTION") {
        StatementKind::CreateFunction
    } else if regex_lite_create(upper, "PROCEDURE") {
        StatementKind::CreateProcedure
    } else if regex_lite_create(upper, "TRIGGER") {
        StatementKind::CreateTrigger
    } else if starts("ALTER") {
        StatementKind::Alter
    } else if starts("DROP") {
        StatementKind::Drop
    } else {
        StatementKind::Other
    }
}

/// Matches `CREATE [OR REPLACE] [UNIQUE] <object> ...` loosely enough to
/// tolerate the keyword noise between `CREATE` and the object keyword
/// without pulling in a regex dependency for something this local.
fn regex_lite_create(stmt: &str, object: &str) -> bool {
    let upper = stmt.to_uppercase();
    if !upper.trim_start().starts_with("CREATE") {
        return false;
    }
    let after_create = &upper[6..];
    let tokens: Vec<&str> = after_create.split_whitespace().take(4).collect();
    tokens.iter().any(|t| *t == object)
}

fn regex_lite_create_unique_index(stmt: &str) -> bool {
    regex_lite_create(stmt, "UNIQUE") && stmt.to_uppercase().contains("INDEX")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_top_level_semicolons() {
        let stmts = split("CREATE TABLE t(id INT);\nSELECT 1;");
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0].kind, StatementKind::CreateTable);
        assert_eq!(stmts[1].kind, StatementKind::Other);
    }

    #[test]
    fn does_not_split_inside_string_literal() {
        let stmts = split("SELECT 'a;b' FROM t;");
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn classifies_create_or_replace_view() {
        let stmts = split("CREATE OR REPLACE VIEW v AS SELECT 1;");
        assert_eq!(stmts[0].kind, StatementKind::CreateView);
    }

    #[test]
    fn classifies_alter_and_drop() {
        let stmts = split("ALTER TABLE t ADD COLUMN x INT; DROP TABLE t;");
        assert_eq!(stmts[0].kind, StatementKind::Alter);
        assert_eq!(stmts[1].kind, StatementKind::Drop);
    }
}
