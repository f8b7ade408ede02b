//! Rust structural extractor (`spec.md` §4.4). Rust's `impl` blocks are not
//! types themselves; this extractor attaches their methods to the matching
//! `struct`/`enum`/`trait` found at the same scope, falling back to
//! file-level methods when no matching type is declared in this file (e.g.
//! a blanket impl over a type from another module).

use crate::analyzers::general::{count_arguments, resolve_call_target, Receiver};
use crate::analyzers::{AnalysisRecord, AnalyzeError, Analyzer};
use crate::model::{FieldInfo, FileAnalysis, MethodCall, MethodInfo, Parameter, TypeInfo, TypeKind, Visibility};
use crate::parse::tree_helpers::text;
use crate::parse::{treesitter, Language};
use std::collections::HashMap;
use std::path::Path;
use tree_sitter::Node;

pub struct RustAnalyzer;

impl Analyzer for RustAnalyzer {
    fn analyze(&self, path: &Path, source: &str) -> Result<AnalysisRecord, AnalyzeError> {
        let tree = treesitter::parse(Language::Rust, source)
            .ok_or_else(|| AnalyzeError::from("tree-sitter produced no tree for Rust source"))?;
        let root = tree.root_node();

        let mut analysis = FileAnalysis::new(path.display().to_string(), "rust");
        extract_scope(root, source, &mut analysis);
        Ok(AnalysisRecord::General(analysis))
    }
}

fn extract_scope(node: Node, source: &str, analysis: &mut FileAnalysis) {
    let mut type_index: HashMap<String, usize> = HashMap::new();
    let mut cursor = node.walk();

    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "use_declaration" => analysis.imports.push(text(child, source).trim().trim_end_matches(';').trim().to_string()),
            "struct_item" | "enum_item" | "trait_item" => {
                let type_info = extract_type(child, source);
                type_index.insert(type_info.name.clone(), analysis.types.len());
                analysis.types.push(type_info);
            }
            "mod_item" => {
                if let Some(body) = child.child_by_field_name("body") {
                    let mut module = TypeInfo::new(
                        child.child_by_field_name("name").map(|n| text(n, source)).unwrap_or("").to_string(),
                        TypeKind::Module,
                    );
                    let mut nested = FileAnalysis::new(String::new(), "rust");
                    extract_scope(body, source, &mut nested);
                    module.types = nested.types;
                    module.methods = nested.methods;
                    analysis.imports.extend(nested.imports);
                    analysis.types.push(module);
                }
            }
            _ => {}
        }
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "impl_item" {
            continue;
        }
        let Some(type_node) = child.child_by_field_name("type") else { continue };
        let type_name = text(type_node, source).to_string();
        let trait_name = child.child_by_field_name("trait").map(|n| text(n, source).to_string());

        let Some(body) = child.child_by_field_name("body") else { continue };
        let mut methods = Vec::new();
        let mut body_cursor = body.walk();
        for member in body.named_children(&mut body_cursor) {
            if member.kind() == "function_item" {
                methods.push(extract_method(member, source, Some(&type_name)));
            }
        }

        match type_index.get(&type_name) {
            Some(&idx) => {
                if let Some(trait_name) = trait_name {
                    analysis.types[idx].implements.push(trait_name);
                }
                analysis.types[idx].methods.extend(methods);
            }
            None => analysis.methods.extend(methods),
        }
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "function_item" {
            analysis.methods.push(extract_method(child, source, None));
        }
    }
}

fn extract_type(node: Node, source: &str) -> TypeInfo {
    let kind = match node.kind() {
        "enum_item" => TypeKind::Enum,
        "trait_item" => TypeKind::Trait,
        _ => TypeKind::Struct,
    };
    let name = node.child_by_field_name("name").map(|n| text(n, source)).unwrap_or("").to_string();
    let mut type_info = TypeInfo::new(name, kind);
    type_info.visibility = if has_pub(node, source) { Visibility::Public } else { Visibility::Private };

    if node.kind() == "struct_item" {
        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for field_node in body.named_children(&mut cursor) {
                if field_node.kind() != "field_declaration" {
                    continue;
                }
                let fname = field_node.child_by_field_name("name").map(|n| text(n, source)).unwrap_or("").to_string();
                if fname.is_empty() {
                    continue;
                }
                let ftype = field_node.child_by_field_name("type").map(|n| text(n, source).to_string());
                let visibility = if has_pub(field_node, source) { Visibility::Public } else { Visibility::Private };
                let mut field = FieldInfo::new(fname, visibility);
                field.type_name = ftype;
                type_info.fields.push(field);
            }
        }
    }

    type_info
}

fn has_pub(node: Node, source: &str) -> bool {
    node.child(0).map(|c| c.kind() == "visibility_modifier" && text(c, source).starts_with("pub")).unwrap_or(false)
}

fn extract_method(node: Node, source: &str, enclosing_type: Option<&str>) -> MethodInfo {
    let name = node.child_by_field_name("name").map(|n| text(n, source)).unwrap_or("").to_string();
    let mut method = MethodInfo::new(name);
    method.visibility = if has_pub(node, source) { Visibility::Public } else { Visibility::Private };
    method.return_type = node.child_by_field_name("return_type").map(|n| text(n, source).to_string());

    if let Some(params) = node.child_by_field_name("parameters") {
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            match param.kind() {
                "self_parameter" => method.parameters.push(Parameter::new("self")),
                "parameter" => {
                    let pname = param.child_by_field_name("pattern").map(|n| text(n, source)).unwrap_or("").to_string();
                    let ptype = param.child_by_field_name("type").map(|n| text(n, source).to_string());
                    method.parameters.push(Parameter { name: pname, type_name: ptype });
                }
                _ => {}
            }
        }
    }

    if let Some(body) = node.child_by_field_name("body") {
        let mut local_var_types = HashMap::new();
        collect_local_var_types(body, source, &mut local_var_types);
        collect_calls(body, source, enclosing_type, &local_var_types, &mut method.method_calls);
    }

    method.finalize();
    method
}

fn collect_local_var_types(node: Node, source: &str, out: &mut HashMap<String, String>) {
    if node.kind() == "let_declaration" {
        if let (Some(pattern), Some(value)) = (node.child_by_field_name("pattern"), node.child_by_field_name("value")) {
            if pattern.kind() == "identifier" {
                if let Some(ty) = crate::analyzers::general::infer_literal_type(value.kind()) {
                    out.insert(text(pattern, source).to_string(), ty.to_string());
                }
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_local_var_types(child, source, out);
    }
}

fn collect_calls(
    node: Node,
    source: &str,
    enclosing_type: Option<&str>,
    local_var_types: &HashMap<String, String>,
    out: &mut Vec<MethodCall>,
) {
    match node.kind() {
        "call_expression" => {
            if let Some(func) = node.child_by_field_name("function") {
                let parameter_count = node.child_by_field_name("arguments").map(count_arguments).unwrap_or(0);
                match func.kind() {
                    "field_expression" => {
                        if let Some(field) = func.child_by_field_name("field") {
                            let method_name = text(field, source).to_string();
                            let receiver = func.child_by_field_name("value");
                            let (object_name, object_type) = match receiver {
                                Some(r) if r.kind() == "self" => {
                                    resolve_call_target(Receiver::SelfKeyword, enclosing_type, local_var_types)
                                }
                                Some(r) if r.kind() == "identifier" => {
                                    resolve_call_target(Receiver::Identifier(text(r, source)), enclosing_type, local_var_types)
                                }
                                _ => resolve_call_target(Receiver::Chained, enclosing_type, local_var_types),
                            };
                            out.push(MethodCall { method_name, object_type, object_name, parameter_count });
                        }
                    }
                    "scoped_identifier" => {
                        let method_name = func.child_by_field_name("name").map(|n| text(n, source)).unwrap_or("").to_string();
                        let path_text = text(func, source).to_string();
                        if !method_name.is_empty() {
                            let (object_name, object_type) =
                                resolve_call_target(Receiver::NamespacedConstant(&path_text), enclosing_type, local_var_types);
                            out.push(MethodCall { method_name, object_type, object_name, parameter_count });
                        }
                    }
                    "identifier" => {
                        let method_name = text(func, source).to_string();
                        let (object_name, object_type) = resolve_call_target(Receiver::None, enclosing_type, local_var_types);
                        out.push(MethodCall { method_name, object_type, object_name, parameter_count });
                    }
                    _ => {}
                }
            }
        }
        "macro_invocation" => {
            if let Some(macro_name) = node.child_by_field_name("macro") {
                let method_name = format!("{}!", text(macro_name, source));
                let (object_name, object_type) = resolve_call_target(Receiver::None, enclosing_type, local_var_types);
                out.push(MethodCall { method_name, object_type, object_name, parameter_count: 0 });
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_calls(child, source, enclosing_type, local_var_types, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attaches_impl_methods_to_struct() {
        let src = "struct A { x: i32 }\nimpl A {\n    fn f(&self) {\n        b.g(1, 2);\n    }\n}\n";
        let analyzer = RustAnalyzer;
        let record = analyzer.analyze(Path::new("a.rs"), src).unwrap();
        let AnalysisRecord::General(analysis) = record else { panic!("expected general record") };
        assert_eq!(analysis.types.len(), 1);
        assert_eq!(analysis.types[0].methods.len(), 1);
        assert_eq!(analysis.types[0].methods[0].method_calls[0].method_name, "g");
    }

    #[test]
    fn orphan_impl_methods_are_file_level() {
        let src = "impl std::fmt::Display for Foreign {\n    fn fmt(&self) {}\n}\n";
        let analyzer = RustAnalyzer;
        let record = analyzer.analyze(Path::new("a.rs"), src).unwrap();
        let AnalysisRecord::General(analysis) = record else { panic!("expected general record") };
        assert!(analysis.types.is_empty());
        assert_eq!(analysis.methods.len(), 1);
    }
}
