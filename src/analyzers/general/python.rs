//! Python structural extractor (`spec.md` §4.4).

use crate::analyzers::general::{count_arguments, resolve_call_target, Receiver};
use crate::analyzers::{AnalysisRecord, AnalyzeError, Analyzer};
use crate::model::{FieldInfo, FileAnalysis, MethodCall, MethodInfo, Parameter, TypeInfo, TypeKind, Visibility};
use crate::parse::tree_helpers::{all_children, text};
use crate::parse::{treesitter, Language};
use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;
use tree_sitter::Node;

pub struct PythonAnalyzer;

impl Analyzer for PythonAnalyzer {
    fn analyze(&self, path: &Path, source: &str) -> Result<AnalysisRecord, AnalyzeError> {
        let tree = treesitter::parse(Language::Python, source)
            .ok_or_else(|| AnalyzeError::from("tree-sitter produced no tree for Python source"))?;
        let root = tree.root_node();

        let mut analysis = FileAnalysis::new(path.display().to_string(), "python");

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "import_statement" | "import_from_statement" => {
                    analysis.imports.push(text(child, source).trim().to_string());
                }
                "class_definition" => analysis.types.push(extract_class(child, source)),
                "function_definition" => analysis.methods.push(extract_method(child, source, None)),
                _ => {}
            }
        }

        Ok(AnalysisRecord::General(analysis))
    }
}

fn convention_visibility(name: &str) -> Visibility {
    if name.starts_with("__") && !name.ends_with("__") {
        Visibility::Private
    } else if name.starts_with('_') {
        Visibility::Protected
    } else {
        Visibility::Public
    }
}

fn extract_class(node: Node, source: &str) -> TypeInfo {
    let name = node
        .child_by_field_name("name")
        .map(|n| text(n, source))
        .unwrap_or("")
        .to_string();
    let mut type_info = TypeInfo::new(name.clone(), TypeKind::Class);
    type_info.visibility = convention_visibility(&type_info.name);

    if let Some(superclasses) = node.child_by_field_name("superclasses") {
        let mut cursor = superclasses.walk();
        for entry in superclasses.named_children(&mut cursor) {
            type_info.implements.push(text(entry, source).to_string());
        }
    }

    let mut seen_fields = HashSet::new();

    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            match member.kind() {
                "function_definition" => {
                    let method = extract_method(member, source, Some(&name));
                    collect_self_assignments(member, source, &mut type_info.fields, &mut seen_fields);
                    type_info.methods.push(method);
                }
                "expression_statement" => {
                    if let Some(assignment) = all_children(member, "assignment").into_iter().next() {
                        if let Some(target) = assignment.child_by_field_name("left") {
                            if target.kind() == "identifier" {
                                let fname = text(target, source).to_string();
                                if seen_fields.insert(fname.clone()) {
                                    let vis = if fname.starts_with('_') { Visibility::Protected } else { Visibility::Public };
                                    let mut field = FieldInfo::new(fname, vis);
                                    if let Some(value) = assignment.child_by_field_name("right") {
                                        field.type_name = crate::analyzers::general::infer_literal_type(value.kind())
                                            .map(|s| s.to_string());
                                    }
                                    type_info.fields.push(field);
                                }
                            }
                        }
                    }
                }
                "class_definition" => type_info.types.push(extract_class(member, source)),
                _ => {}
            }
        }
    }

    type_info
}

fn collect_self_assignments(method: Node, source: &str, fields: &mut Vec<FieldInfo>, seen: &mut HashSet<String>) {
    fn walk(node: Node, source: &str, fields: &mut Vec<FieldInfo>, seen: &mut HashSet<String>) {
        if node.kind() == "assignment" {
            if let Some(target) = node.child_by_field_name("left") {
                if target.kind() == "attribute" {
                    if let (Some(obj), Some(attr)) = (
                        target.child_by_field_name("object"),
                        target.child_by_field_name("attribute"),
                    ) {
                        if obj.kind() == "identifier" && text(obj, source) == "self" {
                            let fname = text(attr, source).to_string();
                            if seen.insert(fname.clone()) {
                                let vis = if fname.starts_with('_') { Visibility::Protected } else { Visibility::Private };
                                fields.push(FieldInfo::new(fname, vis));
                            }
                        }
                    }
                }
            }
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            walk(child, source, fields, seen);
        }
    }
    walk(method, source, fields, seen);
}

fn extract_method(node: Node, source: &str, enclosing_type: Option<&str>) -> MethodInfo {
    let name = node
        .child_by_field_name("name")
        .map(|n| text(n, source))
        .unwrap_or("")
        .to_string();
    let mut method = MethodInfo::new(name.clone());
    method.visibility = convention_visibility(&name);

    if let Some(params) = node.child_by_field_name("parameters") {
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            match param.kind() {
                "identifier" => method.parameters.push(Parameter::new(text(param, source))),
                "typed_parameter" => {
                    let pname = param.named_child(0).map(|n| text(n, source)).unwrap_or("").to_string();
                    let ptype = param.child_by_field_name("type").map(|n| text(n, source).to_string());
                    method.parameters.push(Parameter { name: pname, type_name: ptype });
                }
                "default_parameter" | "typed_default_parameter" => {
                    let pname = param
                        .child_by_field_name("name")
                        .map(|n| text(n, source))
                        .unwrap_or("")
                        .to_string();
                    method.parameters.push(Parameter::new(pname));
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
    if node.kind() == "assignment" {
        if let (Some(target), Some(value)) = (node.child_by_field_name("left"), node.child_by_field_name("right")) {
            if target.kind() == "identifier" {
                if let Some(ty) = crate::analyzers::general::infer_literal_type(value.kind()) {
                    out.insert(text(target, source).to_string(), ty.to_string());
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
    if node.kind() == "call" {
        if let Some(func) = node.child_by_field_name("function") {
            let parameter_count = node
                .child_by_field_name("arguments")
                .map(count_arguments)
                .unwrap_or(0);

            let (method_name, receiver) = match func.kind() {
                "attribute" => {
                    let method_name = func
                        .child_by_field_name("attribute")
                        .map(|n| text(n, source))
                        .unwrap_or("")
                        .to_string();
                    (method_name, func.child_by_field_name("object"))
                }
                "identifier" => (text(func, source).to_string(), None),
                _ => (String::new(), None),
            };

            if !method_name.is_empty() {
                let (object_name, object_type) = match receiver {
                    None => resolve_call_target(Receiver::None, enclosing_type, local_var_types),
                    Some(r) => match r.kind() {
                        "identifier" if text(r, source) == "self" => {
                            resolve_call_target(Receiver::SelfKeyword, enclosing_type, local_var_types)
                        }
                        "identifier" => {
                            let rtext = text(r, source);
                            if rtext.chars().next().map(|c| c.is_uppercase()).unwrap_or(false) {
                                resolve_call_target(Receiver::Constant(rtext), enclosing_type, local_var_types)
                            } else {
                                resolve_call_target(Receiver::Identifier(rtext), enclosing_type, local_var_types)
                            }
                        }
                        "attribute" => {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_class_and_init_fields() {
        let src = "class A:\n    def __init__(self):\n        self.x = 1\n    def f(self):\n        b.g(1, 2)\n";
        let analyzer = PythonAnalyzer;
        let record = analyzer.analyze(Path::new("a.py"), src).unwrap();
        let AnalysisRecord::General(analysis) = record else { panic!("expected general record") };
        let ty = &analysis.types[0];
        assert!(ty.fields.iter().any(|f| f.name == "x"));
        let f = ty.methods.iter().find(|m| m.name == "f").unwrap();
        assert_eq!(f.method_calls[0].method_name, "g");
        assert_eq!(f.method_calls[0].parameter_count, 2);
    }

    #[test]
    fn underscore_prefixed_method_is_protected() {
        let src = "class A:\n    def _helper(self):\n        pass\n";
        let analyzer = PythonAnalyzer;
        let record = analyzer.analyze(Path::new("a.py"), src).unwrap();
        let AnalysisRecord::General(analysis) = record else { panic!("expected general record") };
        assert_eq!(analysis.types[0].methods[0].visibility, Visibility::Protected);
    }
}
