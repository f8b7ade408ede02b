//! Java structural extractor (`spec.md` §4.4), grounded on
//! `tree-sitter-java`'s grammar shapes.

use crate::analyzers::general::{count_arguments, resolve_call_target, Receiver};
use crate::analyzers::{AnalysisRecord, AnalyzeError, Analyzer};
use crate::model::{FieldInfo, FileAnalysis, MethodCall, MethodInfo, Parameter, TypeInfo, TypeKind, Visibility};
use crate::parse::tree_helpers::{all_children, text};
use crate::parse::{treesitter, Language};
use std::collections::HashMap;
use std::path::Path;
use tree_sitter::Node;

pub struct JavaAnalyzer;

impl Analyzer for JavaAnalyzer {
    fn analyze(&self, path: &Path, source: &str) -> Result<AnalysisRecord, AnalyzeError> {
        let tree = treesitter::parse(Language::Java, source)
            .ok_or_else(|| AnalyzeError::from("tree-sitter produced no tree for Java source"))?;
        let root = tree.root_node();

        let mut analysis = FileAnalysis::new(path.display().to_string(), "java");

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "import_declaration" => analysis.imports.push(normalize_import(text(child, source))),
                "class_declaration" | "interface_declaration" | "enum_declaration" | "record_declaration" => {
                    analysis.types.push(extract_type(child, source));
                }
                _ => {}
            }
        }

        Ok(AnalysisRecord::General(analysis))
    }
}

fn normalize_import(raw: &str) -> String {
    raw.trim().trim_end_matches(';').trim().to_string()
}

fn type_kind(node_kind: &str) -> TypeKind {
    match node_kind {
        "interface_declaration" => TypeKind::Interface,
        "enum_declaration" => TypeKind::Enum,
        "record_declaration" => TypeKind::Record,
        _ => TypeKind::Class,
    }
}

fn extract_type(node: Node, source: &str) -> TypeInfo {
    let name_node = node.child_by_field_name("name");
    let name = name_node.map(|n| text(n, source)).unwrap_or("").to_string();
    let mut type_info = TypeInfo::new(name.clone(), type_kind(node.kind()));

    if let Some(modifiers) = first_modifiers(node) {
        apply_modifiers(modifiers, source, &mut type_info.visibility, &mut Vec::new());
    }

    if let Some(superclass) = node.child_by_field_name("superclass") {
        type_info.extends = Some(text(superclass, source).trim_start_matches("extends").trim().to_string());
    }
    if let Some(interfaces) = node.child_by_field_name("interfaces") {
        for iface in all_children(interfaces, "type_identifier") {
            type_info.implements.push(text(iface, source).to_string());
        }
        if type_info.implements.is_empty() {
            let raw = text(interfaces, source);
            let cleaned = raw.trim_start_matches("implements").trim();
            for part in cleaned.split(',') {
                let part = part.trim();
                if !part.is_empty() {
                    type_info.implements.push(part.to_string());
                }
            }
        }
    }

    if let Some(body) = node.child_by_field_name("body") {
        let mut body_cursor = body.walk();
        for member in body.named_children(&mut body_cursor) {
            match member.kind() {
                "field_declaration" => extract_fields(member, source, &mut type_info),
                "method_declaration" | "constructor_declaration" => {
                    type_info.methods.push(extract_method(member, source, Some(&name)));
                }
                "class_declaration" | "interface_declaration" | "enum_declaration" | "record_declaration" => {
                    type_info.types.push(extract_type(member, source));
                }
                _ => {}
            }
        }
    }

    type_info
}

fn first_modifiers(node: Node) -> Option<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).find(|c| c.kind() == "modifiers")
}

fn apply_modifiers(modifiers: Node, source: &str, visibility: &mut Visibility, modifier_list: &mut Vec<String>) {
    let mut cursor = modifiers.walk();
    for child in modifiers.children(&mut cursor) {
        let word = text(child, source);
        match word {
            "public" => *visibility = Visibility::Public,
            "private" => *visibility = Visibility::Private,
            "protected" => *visibility = Visibility::Protected,
            "static" | "final" | "abstract" | "synchronized" | "native" | "transient" | "volatile" | "default" => {
                modifier_list.push(word.to_string());
            }
            "@" | "marker_annotation" | "annotation" => {}
            _ => {}
        }
    }
}

fn extract_fields(node: Node, source: &str, type_info: &mut TypeInfo) {
    let type_node = node.child_by_field_name("type");
    let type_text = type_node.map(|n| text(n, source).to_string());

    let mut visibility = Visibility::PackagePrivate;
    let mut modifiers = Vec::new();
    if let Some(mods) = first_modifiers(node) {
        apply_modifiers(mods, source, &mut visibility, &mut modifiers);
    }

    for declarator in all_children(node, "variable_declarator") {
        let name = declarator
            .child_by_field_name("name")
            .map(|n| text(n, source))
            .unwrap_or("")
            .to_string();
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
    let name = node
        .child_by_field_name("name")
        .map(|n| text(n, source))
        .unwrap_or("<init>")
        .to_string();
    let mut method = MethodInfo::new(name);

    if let Some(mods) = first_modifiers(node) {
        apply_modifiers(mods, source, &mut method.visibility, &mut method.modifiers);
    } else {
        method.visibility = Visibility::PackagePrivate;
    }

    method.return_type = node.child_by_field_name("type").map(|n| text(n, source).to_string());

    if let Some(params) = node.child_by_field_name("parameters") {
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            if param.kind() != "formal_parameter" && param.kind() != "spread_parameter" {
                continue;
            }
            let pname = param
                .child_by_field_name("name")
                .map(|n| text(n, source))
                .unwrap_or("")
                .to_string();
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
    if node.kind() == "local_variable_declaration" {
        for declarator in all_children(node, "variable_declarator") {
            if let (Some(name_node), Some(value_node)) = (
                declarator.child_by_field_name("name"),
                declarator.child_by_field_name("value"),
            ) {
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
    if node.kind() == "method_invocation" {
        if let Some(name_node) = node.child_by_field_name("name") {
            let method_name = text(name_node, source).to_string();
            let receiver = node.child_by_field_name("object");
            let parameter_count = node
                .child_by_field_name("arguments")
                .map(count_arguments)
                .unwrap_or(0);

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
                    "field_access" => {
                        let rtext = text(r, source);
                        resolve_call_target(Receiver::NamespacedConstant(rtext), enclosing_type, local_var_types)
                    }
                    _ => resolve_call_target(Receiver::Chained, enclosing_type, local_var_types),
                },
            };

            out.push(MethodCall { method_name, object_type, object_name, parameter_count });
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
        let src = "class A { void f(){ b.g(1,2); } }";
        let analyzer = JavaAnalyzer;
        let record = analyzer.analyze(Path::new("A.java"), src).unwrap();
        let AnalysisRecord::General(analysis) = record else { panic!("expected general record") };
        assert_eq!(analysis.types.len(), 1);
        let ty = &analysis.types[0];
        assert_eq!(ty.name, "A");
        assert_eq!(ty.kind, TypeKind::Class);
        assert_eq!(ty.methods.len(), 1);
        let method = &ty.methods[0];
        assert_eq!(method.name, "f");
        assert_eq!(method.method_calls.len(), 1);
        let call = &method.method_calls[0];
        assert_eq!(call.method_name, "g");
        assert_eq!(call.object_name.as_deref(), Some("b"));
        assert_eq!(call.parameter_count, 2);
    }

    #[test]
    fn tracks_field_visibility() {
        let src = "class A { private int x; public String y; }";
        let analyzer = JavaAnalyzer;
        let record = analyzer.analyze(Path::new("A.java"), src).unwrap();
        let AnalysisRecord::General(analysis) = record else { panic!("expected general record") };
        let ty = &analysis.types[0];
        assert_eq!(ty.fields.len(), 2);
        assert_eq!(ty.fields[0].visibility, Visibility::Private);
        assert_eq!(ty.fields[1].visibility, Visibility::Public);
    }
}
