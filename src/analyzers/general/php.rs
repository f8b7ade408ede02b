//! PHP structural extractor (`spec.md` §4.4).

use crate::analyzers::general::{count_arguments, resolve_call_target, Receiver};
use crate::analyzers::{AnalysisRecord, AnalyzeError, Analyzer};
use crate::model::{FieldInfo, FileAnalysis, MethodCall, MethodInfo, Parameter, TypeInfo, TypeKind, Visibility};
use crate::parse::tree_helpers::text;
use crate::parse::{treesitter, Language};
use std::collections::HashMap;
use std::path::Path;
use tree_sitter::Node;

pub struct PhpAnalyzer;

impl Analyzer for PhpAnalyzer {
    fn analyze(&self, path: &Path, source: &str) -> Result<AnalysisRecord, AnalyzeError> {
        let tree = treesitter::parse(Language::Php, source)
            .ok_or_else(|| AnalyzeError::from("tree-sitter produced no tree for PHP source"))?;
        let root = tree.root_node();

        let mut analysis = FileAnalysis::new(path.display().to_string(), "php");

        walk_top_level(root, source, &mut analysis);
        Ok(AnalysisRecord::General(analysis))
    }
}

fn walk_top_level(node: Node, source: &str, analysis: &mut FileAnalysis) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "namespace_use_declaration" => analysis.imports.push(text(child, source).trim().trim_end_matches(';').trim().to_string()),
            "class_declaration" | "interface_declaration" => analysis.types.push(extract_type(child, source)),
            "function_definition" => analysis.methods.push(extract_method(child, source, None)),
            "namespace_definition" | "compound_statement" => walk_top_level(child, source, analysis),
            _ => {}
        }
    }
}

fn apply_modifiers(node: Node, source: &str, visibility: &mut Visibility, modifiers: &mut Vec<String>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "visibility_modifier" => match text(child, source) {
                "public" => *visibility = Visibility::Public,
                "private" => *visibility = Visibility::Private,
                "protected" => *visibility = Visibility::Protected,
                _ => {}
            },
            "static_modifier" | "abstract_modifier" | "final_modifier" | "readonly_modifier" => {
                modifiers.push(text(child, source).to_string());
            }
            _ => {}
        }
    }
}

fn extract_type(node: Node, source: &str) -> TypeInfo {
    let kind = if node.kind() == "interface_declaration" { TypeKind::Interface } else { TypeKind::Class };
    let name = node.child_by_field_name("name").map(|n| text(n, source)).unwrap_or("").to_string();
    let mut type_info = TypeInfo::new(name.clone(), kind);

    if let Some(base) = node.child_by_field_name("base_clause") {
        if let Some(n) = base.named_child(0) {
            type_info.extends = Some(text(n, source).to_string());
        }
    }
    if let Some(interfaces) = node.child_by_field_name("interfaces") {
        let mut cursor = interfaces.walk();
        for n in interfaces.named_children(&mut cursor) {
            type_info.implements.push(text(n, source).to_string());
        }
    }

    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            match member.kind() {
                "property_declaration" => extract_fields(member, source, &mut type_info),
                "method_declaration" => type_info.methods.push(extract_method(member, source, Some(&name))),
                "class_declaration" | "interface_declaration" => type_info.types.push(extract_type(member, source)),
                _ => {}
            }
        }
    }

    type_info
}

fn extract_fields(node: Node, source: &str, type_info: &mut TypeInfo) {
    let mut visibility = Visibility::Public;
    let mut modifiers = Vec::new();
    apply_modifiers(node, source, &mut visibility, &mut modifiers);

    let mut cursor = node.walk();
    for element in node.named_children(&mut cursor) {
        if element.kind() != "property_element" {
            continue;
        }
        if let Some(name_node) = element.child_by_field_name("name").or_else(|| element.named_child(0)) {
            let mut field = FieldInfo::new(text(name_node, source).trim_start_matches('$').to_string(), visibility);
            field.modifiers = modifiers.clone();
            type_info.fields.push(field);
        }
    }
}

fn extract_method(node: Node, source: &str, enclosing_type: Option<&str>) -> MethodInfo {
    let name = node.child_by_field_name("name").map(|n| text(n, source)).unwrap_or("").to_string();
    let mut method = MethodInfo::new(name);
    method.visibility = Visibility::Public;
    apply_modifiers(node, source, &mut method.visibility, &mut method.modifiers);

    if let Some(params) = node.child_by_field_name("parameters") {
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            if param.kind() != "simple_parameter" && param.kind() != "variadic_parameter" {
                continue;
            }
            let pname = param
                .child_by_field_name("name")
                .map(|n| text(n, source).trim_start_matches('$').to_string())
                .unwrap_or_default();
            let ptype = param.child_by_field_name("type").map(|n| text(n, source).to_string());
            method.parameters.push(Parameter { name: pname, type_name: ptype });
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
    if node.kind() == "assignment_expression" {
        if let (Some(target), Some(value)) = (node.child_by_field_name("left"), node.child_by_field_name("right")) {
            if target.kind() == "variable_name" {
                if let Some(ty) = crate::analyzers::general::infer_literal_type(value.kind()) {
                    out.insert(text(target, source).trim_start_matches('$').to_string(), ty.to_string());
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
        "member_call_expression" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let method_name = text(name_node, source).to_string();
                let parameter_count = node.child_by_field_name("arguments").map(count_arguments).unwrap_or(0);
                let receiver = node.child_by_field_name("object");
                let (object_name, object_type) = match receiver {
                    Some(r) if r.kind() == "variable_name" && text(r, source) == "$this" => {
                        resolve_call_target(Receiver::SelfKeyword, enclosing_type, local_var_types)
                    }
                    Some(r) if r.kind() == "variable_name" => {
                        let rtext = text(r, source).trim_start_matches('$');
                        resolve_call_target(Receiver::Identifier(rtext), enclosing_type, local_var_types)
                    }
                    _ => resolve_call_target(Receiver::Chained, enclosing_type, local_var_types),
                };
                out.push(MethodCall { method_name, object_type, object_name, parameter_count });
            }
        }
        "function_call_expression" => {
            if let Some(func) = node.child_by_field_name("function") {
                if func.kind() == "name" {
                    let method_name = text(func, source).to_string();
                    let parameter_count = node.child_by_field_name("arguments").map(count_arguments).unwrap_or(0);
                    let (object_name, object_type) = resolve_call_target(Receiver::None, enclosing_type, local_var_types);
                    out.push(MethodCall { method_name, object_type, object_name, parameter_count });
                }
            }
        }
        "scoped_call_expression" => {
            if let (Some(scope), Some(name_node)) = (node.child_by_field_name("scope"), node.child_by_field_name("name")) {
                let method_name = text(name_node, source).to_string();
                let parameter_count = node.child_by_field_name("arguments").map(count_arguments).unwrap_or(0);
                let (object_name, object_type) = resolve_call_target(Receiver::Constant(text(scope, source)), enclosing_type, local_var_types);
                out.push(MethodCall { method_name, object_type, object_name, parameter_count });
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
    fn extracts_class_method_call() {
        let src = "<?php\nclass A {\n  public function f() {\n    $b->g(1, 2);\n  }\n}\n";
        let analyzer = PhpAnalyzer;
        let record = analyzer.analyze(Path::new("a.php"), src).unwrap();
        let AnalysisRecord::General(analysis) = record else { panic!("expected general record") };
        assert_eq!(analysis.types.len(), 1);
        let method = &analysis.types[0].methods[0];
        assert_eq!(method.method_calls[0].method_name, "g");
        assert_eq!(method.method_calls[0].parameter_count, 2);
    }
}
