//! Shared machinery for the eight general-purpose structural extractors
//! (`spec.md` §4.4). Each language module supplies its own grammar-specific
//! node-kind vocabulary and calls into the helpers here for the parts of the
//! algorithm that generalize: call-target resolution, argument counting,
//! and method-call sorting.

pub mod csharp;
pub mod ecma;
pub mod java;
pub mod javascript;
pub mod php;
pub mod ruby;
pub mod rust_lang;
pub mod typescript;

use crate::model::MethodCall;
use std::collections::HashMap;
use tree_sitter::Node;

/// The receiver shape of a call-like node, already classified by the
/// language-specific extractor from its grammar's node kinds (`spec.md`
/// §4.4 receiver table).
pub enum Receiver<'a> {
    /// No receiver at all (bare call).
    None,
    /// Literal `self`/`this`.
    SelfKeyword,
    /// A plain local identifier.
    Identifier(&'a str),
    /// An unqualified constant/type name (`Foo`).
    Constant(&'a str),
    /// A namespaced constant (`A::B::C`, `A.B.C`, `A\B\C`).
    NamespacedConstant(&'a str),
    /// An instance/class/global variable (`@x`, `@@x`, `$x`).
    Variable(&'a str),
    /// The result of another call (`a().b()`) — never resolved further.
    Chained,
}

/// Resolve `(objectName, objectType)` from a classified receiver, per the
/// table in `spec.md` §4.4. `enclosing_type` is the name of the type whose
/// body the call appears in, if any. `local_var_types` maps a local
/// variable name to an inferred type name, populated only when the
/// extractor saw a literal assignment (`spec.md`: "looked up in
/// local-variable-type map if assigned from a literal").
pub fn resolve_call_target(
    receiver: Receiver,
    enclosing_type: Option<&str>,
    local_var_types: &HashMap<String, String>,
) -> (Option<String>, Option<String>) {
    match receiver {
        Receiver::None => (None, None),
        Receiver::SelfKeyword => (Some("self".to_string()), enclosing_type.map(|s| s.to_string())),
        Receiver::Identifier(name) => {
            let object_type = local_var_types.get(name).cloned();
            (Some(name.to_string()), object_type)
        }
        Receiver::Constant(name) => (None, Some(name.to_string())),
        Receiver::NamespacedConstant(name) => (Some(name.to_string()), None),
        Receiver::Variable(name) => (Some(name.to_string()), None),
        Receiver::Chained => (None, None),
    }
}

/// Count top-level argument expressions in an argument-list node. Because
/// tree-sitter grammars expose punctuation (commas, parens) as anonymous
/// children, `named_child_count` already gives one count per top-level
/// expression — matching `spec.md` §4.4's rule that strings, keyword-pair
/// runs, splats, and whole hash/array literals each count as exactly one.
pub fn count_arguments(args_node: Node) -> usize {
    args_node.named_child_count()
}

/// Infer a canonical type name for a literal value node, by grammar-level
/// node kind. Used for field type inference and for populating
/// `local_var_types` when a call receiver was assigned from a literal.
/// Returns `None` for anything that isn't one of the literal kinds named in
/// `spec.md` §4.4 ("Infer field type for literals").
pub fn infer_literal_type(kind: &str) -> Option<&'static str> {
    match kind {
        "string" | "string_literal" | "interpolated_string_expression" | "raw_string_literal" => {
            Some("string")
        }
        "integer" | "integer_literal" => Some("integer"),
        "float" | "float_literal" => Some("float"),
        "true" | "false" | "boolean_literal" | "true_literal" | "false_literal" => Some("boolean"),
        "array" | "array_literal" | "array_creation_expression" | "list_literal" => Some("array"),
        "hash" | "hash_literal" | "object_creation_expression" | "dictionary" | "dictionary_literal" => {
            Some("hash")
        }
        _ => None,
    }
}

/// Sort and return `calls`, delegating to the canonical comparator in
/// `crate::model` (`spec.md` §4.4 "Sorting").
pub fn finalize_calls(calls: &mut Vec<MethodCall>) {
    crate::model::sort_method_calls(calls);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_self_with_enclosing_type() {
        let map = HashMap::new();
        let (name, ty) = resolve_call_target(Receiver::SelfKeyword, Some("Widget"), &map);
        assert_eq!(name.as_deref(), Some("self"));
        assert_eq!(ty.as_deref(), Some("Widget"));
    }

    #[test]
    fn resolves_identifier_via_local_var_map() {
        let mut map = HashMap::new();
        map.insert("x".to_string(), "string".to_string());
        let (name, ty) = resolve_call_target(Receiver::Identifier("x"), None, &map);
        assert_eq!(name.as_deref(), Some("x"));
        assert_eq!(ty.as_deref(), Some("string"));
    }

    #[test]
    fn resolves_namespaced_constant_as_object_name() {
        let map = HashMap::new();
        let (name, ty) = resolve_call_target(Receiver::NamespacedConstant("A::B::C"), None, &map);
        assert_eq!(name.as_deref(), Some("A::B::C"));
        assert!(ty.is_none());
    }
}
