//! C# structural extractor (`spec.md` §4.4).

use crate::analyzers::general::{count_arguments, resolve_call_target, Receiver};
use crate::analyzers::{AnalysisRecord, AnalyzeError, Analyzer};
use crate::model::{FieldInfo, FileAnalysis, MethodCall, MethodInfo, Parameter, TypeInfo, TypeKind, Visibility};
use crate::parse::tree_helpers::{all_children, text};
use crate::parse::{treesitter, Language};
use std::collections::HashMap;
use std::path::Path;
use tree_sitter::Node;

pub struct CSharpAnalyzer;

impl Analyzer for CSharpAnalyzer {
    fn analyze(&self, path: &Path, source: &str) -> Result<AnalysisRecord, AnalyzeError> {
        let tree = treesitter::parse(Language::CSharp, source)
            .ok_or_else(|| AnalyzeError::from("tree-sitter produced no tree for C# source"))?;
        let root = tree.root_node();

        let mut analysis = FileAnalysis::new(path.display().to_string(), "csharp");
        collect_top_level(root, source, &mut analysis);
        Ok(AnalysisRecord::General(analysis))
    }
}

fn collect_top_level(node: Node, source: &str, analysis: &mut FileAnalysis) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "using_directive" => analysis.imports.push(text(child, source).trim().trim_end_matches(';').trim().to_string()),
            "namespace_declaration" | "file_scoped_namespace_declaration" => {
                if let Some(body) = child.child_by_field_name("body") {
                    collect_top_level(body, source, analysis);
                } else {
                    collect_top_level(child, source, analysis);
                }
            }
            "class_declaration" | "interface_declaration" | "struct_declaration" | "enum_declaration" | "record_declaration" => {
                analysis.types.push(extract_type(child, source));
            }
            _ => {}
        }
    }
}

fn type_kind(kind: &str) -> TypeKind {
    match kind {
        "interface_declaration" => TypeKind::Interface,
        "struct_declaration" => TypeKind::Struct,
        "enum_declaration" => TypeKind::Enum,
        "record_declaration" => TypeKind::Record,
        _ => TypeKind::Class,
    }
}

fn apply_modifiers(node: Node, source: &str, visibility: &mut Visibility, modifiers: &mut Vec<String>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() != "modifier" {
            continue;
        }
        match text(child, source) {
            "public" => *visibility = Visibility::Public,
            "private" => *visibility = Visibility::Private,
            "protected" => *visibility = Visibility::Protected,
            "internal" => *visibility = Visibility::Internal,
            other => modifiers.push(other.to_string()),
        }
    }
}

fn extract_type(node: Node, source: &str) -> TypeInfo {
    let name = node.child_by_field_name("name").map(|n| text(n, source)).unwrap_or("").to_string();
    let mut type_info = TypeInfo::new(name.clone(), type_kind(node.kind()));
    type_info.visibility = Visibility::Internal;
    apply_modifiers(node, source, &mut type_info.visibility, &mut Vec::new());

    if let Some(bases) = node.child_by_field_name("bases") {
        let mut cursor = bases.walk();
        let mut first = true;
        for base in bases.named_children(&mut cursor) {
            if first {
                type_info.extends = Some(text(base, source).to_string());
                first = false;
            } else {
                type_info.implements.push(text(base, source).to_string());
            }
        }
    }

    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            match member.kind() {
                "field_declaration" => extract_fields(member, source, &mut type_info),
                "method_declaration" | "constructor_declaration" => {
                    type_info.methods.push(extract_method(member, source, Some(&name)));
                }
                "class_declaration" | "interface_declaration" | "struct_declaration" | "enum_declaration" | "record_declaration" => {
                    type_info.types.push(extract_type(member, source));
                }
                _ => {}
            }
        }
    }

    type_info
}

fn extract_fields(node: Node, source: &str, type_info: &mut TypeInfo) {
    let mut visibility = Visibility::Private;
    let mut modifiers = Vec::new();
    apply_modifiers(node, source, &mut visibility, &mut modifiers);

    let Some(declaration) = node.child_by_field_name("declaration") else { return };
    let type_text = declaration.child_by_field_name("type").map(|n| text(n, source).to_string());

    for declarator in all_children(declaration, "variable_declarator") {
        let name = declarator.child_by_field_name("name").map(|n| text(n, source)).unwrap_or("").to_string();
        if name.is_empty() {
            continue;
        }
        let mut field = FieldInfo::new(name, visibility);
        field.type_name = type_text.clone();
        field.modifiers = modifiers.clone();
        type_info.fields.push(field);
    }
}

fn extract_method(node: Node, source: &str, enclosing_type: Option<&str>) -> MethodInfo {
    let name = node.child_by_field_name("name").map(|n| text(n, source)).unwrap_or("<ctor>").to_string();
    let mut method = MethodInfo::new(name);
    method.visibility = Visibility::Private;
    apply_modifiers(node, source, &mut method.visibility, &mut method.modifiers);
    method.return_type = node.child_by_field_name("type").map(|n| text(n, source).to_string());

    if let Some(params) = node.child_by_field_name("parameters") {
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            if param.kind() != "parameter" {
                continue;
            }
            let pname = param.child_by_field_name("name").map(|n| text(n, source)).unwrap_or("").to_string();
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
    if node.kind() == "variable_declarator" {
        if let (Some(name_node), Some(value_node)) = (
            node.child_by_field_name("name"),
            node.child_by_field_name("value"),
        ) {
            if let Some(ty) = crate::analyzers::general::infer_literal_type(value_node.kind()) {
                out.insert(text(name_node, source).to_string(), ty.to_string());
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
    if node.kind() == "invocation_expression" {
        if let Some(func) = node.child_by_field_name("function") {
            let parameter_count = node.child_by_field_name("arguments").map(count_arguments).unwrap_or(0);

            let (method_name, receiver) = match func.kind() {
                "member_access_expression" => {
                    let method_name = func.child_by_field_name("name").map(|n| text(n, source)).unwrap_or("").to_string();
                    (method_name, func.child_by_field_name("expression"))
                }
                "identifier" => (text(func, source).to_string(), None),
                _ => (String::new(), None),
            };

            if !method_name.is_empty() {
                let (object_name, object_type) = match receiver {
                    None => resolve_call_target(Receiver::None, enclosing_type, local_var_types),
                    Some(r) => match r.kind() {
                        "this_expression" => resolve_call_target(Receiver::SelfKeyword, enclosing_type, local_var_types),
                        "identifier" => {
                            let rtext = text(r, source);
                            if rtext.chars().next().map(|c| c.is_uppercase()).unwrap_or(false) {
                                resolve_call_target(Receiver::Constant(rtext), enclosing_type, local_var_types)
                            } else {
                                resolve_call_target(Receiver::Identifier(rtext), enclosing_type, local_var_types)
                            }
                        }
                        "member_access_expression" => {
                            resolve_call_target(Receiver::NamespacedConstant(text(r, source)), enclosing_type, local_var_types)
                        }
                        _ => resolve_call_target(Receiver::Chained, enclosing_type, local_var_types),
                    },
                };
                out.push(MethodCall { method_name, object_type, object_name, parameter_count });
            }
        }
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
    fn extracts_class_with_method_call() {
        let src = "public class A { public void F() { b.G(1, 2); } }";
        let analyzer = CSharpAnalyzer;
        let record = analyzer.analyze(Path::new("A.cs"), src).unwrap();
        let AnalysisRecord::General(analysis) = record else { panic!("expected general record") };
        assert_eq!(analysis.types[0].visibility, Visibility::Public);
        let method = &analysis.types[0].methods[0];
        assert_eq!(method.method_calls[0].method_name, "G");
        assert_eq!(method.method_calls[0].parameter_count, 2);
    }
}
