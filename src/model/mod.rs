//! The general-purpose structural data model (`spec.md` §3).
//!
//! `FileAnalysis` and everything it owns are built once per file by an
//! extractor and never mutated afterward — fields are public for
//! construction convenience within this crate, but no code outside the
//! analyzer that built a value should need to (or does) mutate it.

pub mod cobol;
pub mod sql;

use serde::Serialize;

/// Visibility as tracked across the general-purpose languages. Not every
/// language distinguishes all variants; extractors pick the closest fit
/// (e.g. Python has no visibility keyword and defaults to `Public` unless a
/// leading underscore signals convention-based privacy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Protected,
    Private,
    Internal,
    PackagePrivate,
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::Public
    }
}

/// Kind of a top-level or nested type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
    Module,
    Struct,
    Enum,
    Record,
    Trait,
}

/// Kind of a property accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessorKind {
    Get,
    Set,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessor {
    pub kind: AccessorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

/// A parameter of a method. Block-parameter names (Ruby `&block`) are
/// stored with the `&` prefix already applied to `name`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), type_name: None }
    }

    pub fn with_type(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self { name: name.into(), type_name: Some(type_name.into()) }
    }
}

/// A single call-like expression found inside a method body or at file
/// level (module-level statements).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MethodCall {
    pub method_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_name: Option<String>,
    pub parameter_count: usize,
}

/// Canonical sort key used everywhere `methodCalls` is emitted: lexicographic
/// on `(methodName, objectType∥"", objectName∥"")` (`spec.md` §4.4, §8).
pub fn method_call_sort_key(call: &MethodCall) -> (String, String, String) {
    (
        call.method_name.clone(),
        call.object_type.clone().unwrap_or_default(),
        call.object_name.clone().unwrap_or_default(),
    )
}

/// Sort a list of calls in place by the canonical comparator.
pub fn sort_method_calls(calls: &mut [MethodCall]) {
    calls.sort_by(|a, b| method_call_sort_key(a).cmp(&method_call_sort_key(b)));
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodInfo {
    pub name: String,
    pub visibility: Visibility,
    pub modifiers: Vec<String>,
    pub parameters: Vec<Parameter>,
    #[serde(rename = "returnType", skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    pub local_variables: Vec<String>,
    pub method_calls: Vec<MethodCall>,
}

impl MethodInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            modifiers: Vec::new(),
            parameters: Vec::new(),
            return_type: None,
            local_variables: Vec::new(),
            method_calls: Vec::new(),
        }
    }

    /// Sorts `method_calls` by the canonical comparator. Must be called
    /// before the method is emitted — extractors append calls in traversal
    /// order and sort once at the end (`spec.md` §8 invariant).
    pub fn finalize(&mut self) {
        sort_method_calls(&mut self.method_calls);
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldInfo {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    pub visibility: Visibility,
    pub modifiers: Vec<String>,
    pub annotations: Vec<String>,
}

impl FieldInfo {
    pub fn new(name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            type_name: None,
            visibility,
            modifiers: Vec::new(),
            annotations: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInfo {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    pub visibility: Visibility,
    pub accessors: Vec<Accessor>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeInfo {
    pub name: String,
    pub kind: TypeKind,
    pub visibility: Visibility,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub mixins: Vec<String>,
    pub annotations: Vec<String>,
    pub fields: Vec<FieldInfo>,
    pub properties: Vec<PropertyInfo>,
    pub methods: Vec<MethodInfo>,
    /// Nested types, tree-structured — see `spec.md` §4.4 "Nested types".
    pub types: Vec<TypeInfo>,
}

impl TypeInfo {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            visibility: Visibility::Public,
            extends: None,
            implements: Vec::new(),
            mixins: Vec::new(),
            annotations: Vec::new(),
            fields: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            types: Vec::new(),
        }
    }
}

/// A single Markdown heading (`spec.md` §4.7).
#[derive(Debug, Clone, Serialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

/// The general-purpose per-file record (`spec.md` §3, §4.4). Markdown
/// (`spec.md` §4.7) reuses this shape, populating only `headings`/`links`
/// and leaving the structural fields empty.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAnalysis {
    pub path: String,
    pub language: String,
    pub imports: Vec<String>,
    pub types: Vec<TypeInfo>,
    pub methods: Vec<MethodInfo>,
    pub fields: Vec<FieldInfo>,
    pub method_calls: Vec<MethodCall>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub headings: Vec<Heading>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
}

impl FileAnalysis {
    pub fn new(path: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            language: language.into(),
            imports: Vec::new(),
            types: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            method_calls: Vec::new(),
            headings: Vec::new(),
            links: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_method_calls_canonically() {
        let mut calls = vec![
            MethodCall { method_name: "g".into(), object_type: None, object_name: Some("b".into()), parameter_count: 1 },
            MethodCall { method_name: "a".into(), object_type: None, object_name: None, parameter_count: 0 },
            MethodCall { method_name: "g".into(), object_type: None, object_name: Some("a".into()), parameter_count: 1 },
        ];
        sort_method_calls(&mut calls);
        let names: Vec<_> = calls.iter().map(|c| (c.method_name.as_str(), c.object_name.as_deref())).collect();
        assert_eq!(names, vec![("a", None), ("g", Some("a")), ("g", Some("b"))]);
    }
}
