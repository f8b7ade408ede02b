//! Shared extraction logic for the ECMAScript-family grammars
//! (`tree-sitter-javascript`, `tree-sitter-typescript`), since both expose
//! near-identical `class_declaration`/`method_definition`/`call_expression`
//! shapes (`spec.md` §4.4). TypeScript-only constructs (interfaces, type
//! aliases, access modifiers) are layered on top by `typescript.rs`.

use crate::analyzers::general::{count_arguments, resolve_call_target, Receiver};
use crate::model::{FieldInfo, MethodCall, MethodInfo, Parameter, TypeInfo, TypeKind, Visibility};
use crate::parse::tree_helpers::text;
use std::collections::HashMap;
use tree_sitter::Node;

pub fn normalize_import(raw: &str, node: Node) -> Option<String> {
    if node.kind() == "export_statement" {
        // `export ... from "module"` still names a module; bare re-exports of
        // local declarations are not imports.
        if !raw.contains("from") {
            return None;
        }
    }
    Some(raw.trim().trim_end_matches(';').trim().to_string())
}

pub fn extract_class(node: Node, source: &str) -> TypeInfo {
    let name = node
        .child_by_field_name("name")
        .map(|n| text(n, source))
        .unwrap_or("")
        .to_string();
    let mut type_info = TypeInfo::new(name.clone(), TypeKind::Class);

    if let Some(heritage) = node.child_by_field_name("superclass") {
        type_info.extends = Some(text(heritage, source).to_string());
    }

    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            match member.kind() {
                "method_definition" => type_info.methods.push(extract_method(member, source, Some(&name))),
                "field_definition" | "public_field_definition" => extract_field(member, source, &mut type_info),
                "class_declaration" => type_info.types.push(extract_class(member, source)),
                _ => {}
            }
        }
    }

    type_info
}

fn field_visibility(name: &str) -> Visibility {
    if name.starts_with('#') || name.starts_with('_') {
        Visibility::Private
    } else {
        Visibility::Public
    }
}

fn extract_field(node: Node, source: &str, type_info: &mut TypeInfo) {
    let Some(name_node) = node.child_by_field_name("property") else { return };
    let name = text(name_node, source).to_string();
    let mut field = FieldInfo::new(name.clone(), field_visibility(&name));
    if let Some(value) = node.child_by_field_name("value") {
        field.type_name = crate::analyzers::general::infer_literal_type(value.kind()).map(|s| s.to_string());
    }
    type_info.fields.push(field);
}

pub fn extract_method(node: Node, source: &str, enclosing_type: Option<&str>) -> MethodInfo {
    let name = node
        .child_by_field_name("name")
        .map(|n| text(n, source))
        .unwrap_or("")
        .to_string();
    let visibility = field_visibility(&name);
    let mut method = MethodInfo::new(name);
    method.visibility = visibility;

    if let Some(params) = node.child_by_field_name("parameters") {
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            let pname = match param.kind() {
                "identifier" => text(param, source).to_string(),
                "required_parameter" | "optional_parameter" => param
                    .child_by_field_name("pattern")
                    .map(|n| text(n, source))
                    .unwrap_or("")
                    .to_string(),
                _ => text(param, source).to_string(),
            };
            method.parameters.push(Parameter::new(pname));
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
            if name_node.kind() == "identifier" {
                if let Some(ty) = crate::analyzers::general::infer_literal_type(value_node.kind()) {
                    out.insert(text(name_node, source).to_string(), ty.to_string());
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
    if node.kind() == "call_expression" {
        if let Some(func) = node.child_by_field_name("function") {
            let parameter_count = node
                .child_by_field_name("arguments")
                .map(count_arguments)
                .unwrap_or(0);

            let (method_name, receiver) = match func.kind() {
                "member_expression" => {
                    let method_name = func
                        .child_by_field_name("property")
                        .map(|n| text(n, source))
                        .unwrap_or("")
                        .to_string();
                    let object = func.child_by_field_name("object");
                    (method_name, object)
                }
                "identifier" => (text(func, source).to_string(), None),
                _ => (String::new(), None),
            };

            if !method_name.is_empty() {
                let (object_name, object_type) = match receiver {
                    None => resolve_call_target(Receiver::None, enclosing_type, local_var_types),
                    Some(r) => match r.kind() {
                        "this" => resolve_call_target(Receiver::SelfKeyword, enclosing_type, local_var_types),
                        "identifier" => {
                            let rtext = text(r, source);
                            if rtext.chars().next().map(|c| c.is_uppercase()).unwrap_or(false) {
                                resolve_call_target(Receiver::Constant(rtext), enclosing_type, local_var_types)
                            } else {
                                resolve_call_target(Receiver::Identifier(rtext), enclosing_type, local_var_types)
                            }
                        }
                        "member_expression" => {
                            let rtext = text(r, source);
                            resolve_call_target(Receiver::NamespacedConstant(rtext), enclosing_type, local_var_types)
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
