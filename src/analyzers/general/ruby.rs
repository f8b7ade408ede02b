//! Ruby structural extractor (`spec.md` §4.4) — the extractor the rest of
//! the general-purpose pattern generalizes from. Implements the visibility
//! cursor, mixin detection, `attr_*` accessors, Rails-style DSL annotations,
//! and alias recording described there.

use crate::analyzers::general::{resolve_call_target, Receiver};
use crate::analyzers::{AnalysisRecord, AnalyzeError, Analyzer};
use crate::model::{
    Accessor, AccessorKind, FieldInfo, FileAnalysis, MethodCall, MethodInfo, Parameter, PropertyInfo, TypeInfo,
    TypeKind, Visibility,
};
use crate::parse::tree_helpers::text;
use crate::parse::{treesitter, Language};
use std::collections::HashMap;
use std::path::Path;
use tree_sitter::Node;

pub struct RubyAnalyzer;

impl Analyzer for RubyAnalyzer {
    fn analyze(&self, path: &Path, source: &str) -> Result<AnalysisRecord, AnalyzeError> {
        let tree = treesitter::parse(Language::Ruby, source)
            .ok_or_else(|| AnalyzeError::from("tree-sitter produced no tree for Ruby source"))?;
        let root = tree.root_node();

        let mut analysis = FileAnalysis::new(path.display().to_string(), "ruby");

        let mut cursor = root.walk();
        for stmt in root.named_children(&mut cursor) {
            match stmt.kind() {
                "class" => analysis.types.push(extract_type(stmt, source, TypeKind::Class)),
                "module" => analysis.types.push(extract_type(stmt, source, TypeKind::Module)),
                "method" | "singleton_method" => analysis.methods.push(extract_method(stmt, source, None)),
                _ => {}
            }
        }

        let mut imports = Vec::new();
        let mut calls = Vec::new();
        let mut local_var_types = HashMap::new();
        for stmt in root.named_children(&mut root.walk()) {
            if matches!(stmt.kind(), "class" | "module" | "method" | "singleton_method") {
                continue;
            }
            collect_local_var_types(stmt, source, &mut local_var_types);
        }
        for stmt in root.named_children(&mut root.walk()) {
            if matches!(stmt.kind(), "class" | "module" | "method" | "singleton_method") {
                continue;
            }
            collect_calls(stmt, source, None, &local_var_types, &mut imports, &mut calls);
        }
        analysis.imports.extend(imports);
        crate::model::sort_method_calls(&mut calls);
        analysis.method_calls = calls;

        Ok(AnalysisRecord::General(analysis))
    }
}

fn require_target(node: Node, source: &str) -> Option<String> {
    let method = node.child_by_field_name("method")?;
    let method_name = text(method, source);
    if method_name != "require" && method_name != "require_relative" {
        return None;
    }
    let args = node.child_by_field_name("arguments")?;
    let first = args.named_child(0)?;
    Some(strip_quotes(text(first, source)))
}

fn strip_quotes(raw: &str) -> String {
    raw.trim().trim_matches(|c| c == '"' || c == '\'').to_string()
}

fn strip_symbol(raw: &str) -> String {
    strip_quotes(raw.trim_start_matches(':'))
}

fn extract_type(node: Node, source: &str, kind: TypeKind) -> TypeInfo {
    let name_node = node.child_by_field_name("name");
    let name = name_node.map(|n| text(n, source)).unwrap_or("").to_string();
    let mut type_info = TypeInfo::new(name, kind);

    if let Some(superclass) = node.child_by_field_name("superclass") {
        type_info.extends = Some(text(superclass, source).to_string());
    }

    if let Some(body) = node.child_by_field_name("body") {
        let mut visibility_cursor = Visibility::Public;
        let mut cursor = body.walk();
        for stmt in body.named_children(&mut cursor) {
            process_body_statement(stmt, source, &mut type_info, &mut visibility_cursor);
        }
    }

    type_info
}

fn process_body_statement(stmt: Node, source: &str, type_info: &mut TypeInfo, cursor: &mut Visibility) {
    match stmt.kind() {
        "class" => type_info.types.push(extract_type(stmt, source, TypeKind::Class)),
        "module" => type_info.types.push(extract_type(stmt, source, TypeKind::Module)),
        "method" | "singleton_method" => {
            let mut method = extract_method(stmt, source, Some(&type_info.name));
            method.visibility = *cursor;
            type_info.methods.push(method);
        }
        "identifier" => {
            if let Some(vis) = visibility_from_word(text(stmt, source)) {
                *cursor = vis;
            }
        }
        "call" => process_type_level_call(stmt, source, type_info, cursor),
        "assignment" => process_type_level_assignment(stmt, source, type_info),
        "alias" => process_alias(stmt, source, type_info),
        _ => {}
    }
}

fn visibility_from_word(word: &str) -> Option<Visibility> {
    match word {
        "public" => Some(Visibility::Public),
        "private" => Some(Visibility::Private),
        "protected" => Some(Visibility::Protected),
        _ => None,
    }
}

fn symbol_or_text(node: Node, source: &str) -> String {
    match node.kind() {
        "simple_symbol" => strip_symbol(text(node, source)),
        "string" => strip_quotes(text(node, source)),
        _ => text(node, source).to_string(),
    }
}

fn process_type_level_call(node: Node, source: &str, type_info: &mut TypeInfo, cursor: &mut Visibility) {
    let Some(method_field) = node.child_by_field_name("method") else { return };
    let method_name = text(method_field, source).to_string();
    let args = node.child_by_field_name("arguments");

    if let Some(vis) = visibility_from_word(&method_name) {
        match args {
            None => *cursor = vis,
            Some(args_node) => {
                let mut symbol_targets = Vec::new();
                let mut applied_inline = false;
                let mut acursor = args_node.walk();
                for arg in args_node.named_children(&mut acursor) {
                    match arg.kind() {
                        "simple_symbol" | "string" => symbol_targets.push(symbol_or_text(arg, source)),
                        "method" | "singleton_method" => {
                            let mut method = extract_method(arg, source, Some(&type_info.name));
                            method.visibility = vis;
                            type_info.methods.push(method);
                            applied_inline = true;
                        }
                        _ => {}
                    }
                }
                if !symbol_targets.is_empty() {
                    for method in type_info.methods.iter_mut() {
                        if symbol_targets.iter().any(|t| t == &method.name) {
                            method.visibility = vis;
                        }
                    }
                } else if !applied_inline {
                    *cursor = vis;
                }
            }
        }
        return;
    }

    match method_name.as_str() {
        "include" | "extend" | "prepend" => {
            if let Some(args_node) = args {
                if let Some(first) = args_node.named_child(0) {
                    if matches!(first.kind(), "constant" | "scope_resolution") {
                        type_info.mixins.push(text(first, source).to_string());
                    }
                }
            }
        }
        "attr_reader" | "attr_writer" | "attr_accessor" => {
            let kinds: &[AccessorKind] = match method_name.as_str() {
                "attr_reader" => &[AccessorKind::Get],
                "attr_writer" => &[AccessorKind::Set],
                _ => &[AccessorKind::Get, AccessorKind::Set],
            };
            if let Some(args_node) = args {
                let mut acursor = args_node.walk();
                for arg in args_node.named_children(&mut acursor) {
                    if arg.kind() != "simple_symbol" {
                        continue;
                    }
                    type_info.properties.push(PropertyInfo {
                        name: strip_symbol(text(arg, source)),
                        type_name: None,
                        visibility: Visibility::Public,
                        accessors: kinds.iter().map(|k| Accessor { kind: *k, visibility: None }).collect(),
                    });
                }
            }
        }
        "has_many" | "belongs_to" | "has_one" => {
            let target = args
                .and_then(|a| a.named_child(0))
                .map(|n| symbol_or_text(n, source))
                .unwrap_or_default();
            type_info.annotations.push(format!("@{}({})", method_name, target));
        }
        "validates" => {
            if let Some(args_node) = args {
                let mut acursor = args_node.walk();
                for arg in args_node.named_children(&mut acursor) {
                    if arg.kind() == "simple_symbol" {
                        type_info.annotations.push(format!("@validates({})", strip_symbol(text(arg, source))));
                    }
                }
            }
        }
        "scope" => {
            if let Some(name) = args.and_then(|a| a.named_child(0)) {
                type_info.annotations.push(format!("@scope({})", symbol_or_text(name, source)));
            }
        }
        "alias_method" => {
            if let Some(args_node) = args {
                let symbols: Vec<String> = args_node
                    .named_children(&mut args_node.walk())
                    .filter(|n| matches!(n.kind(), "simple_symbol" | "string"))
                    .map(|n| symbol_or_text(n, source))
                    .collect();
                if symbols.len() >= 2 {
                    type_info.annotations.push(format!("@alias({}={})", symbols[0], symbols[1]));
                }
            }
        }
        other if other.starts_with("before_") || other.starts_with("after_") || other.starts_with("around_") => {
            let target = args.and_then(|a| a.named_child(0)).map(|n| symbol_or_text(n, source)).unwrap_or_default();
            type_info.annotations.push(format!("@{}({})", other, target));
        }
        _ => {}
    }
}

fn process_type_level_assignment(node: Node, source: &str, type_info: &mut TypeInfo) {
    let Some(target) = node.child_by_field_name("left") else { return };
    let value = node.child_by_field_name("right");
    let type_hint = value.and_then(|v| crate::analyzers::general::infer_literal_type(v.kind())).map(|s| s.to_string());

    match target.kind() {
        "constant" => {
            let mut field = FieldInfo::new(text(target, source), Visibility::Public);
            field.type_name = type_hint;
            type_info.fields.push(field);
        }
        "instance_variable" | "class_variable" => {
            let mut field = FieldInfo::new(text(target, source), Visibility::Private);
            field.type_name = type_hint;
            type_info.fields.push(field);
        }
        _ => {}
    }
}

fn process_alias(node: Node, source: &str, type_info: &mut TypeInfo) {
    let mut names: Vec<String> = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.is_named() {
            names.push(symbol_or_text(child, source));
        }
    }
    if names.len() >= 2 {
        type_info.annotations.push(format!("@alias({}={})", names[0], names[1]));
    }
}

fn extract_method(node: Node, source: &str, enclosing_type: Option<&str>) -> MethodInfo {
    let name = node
        .child_by_field_name("name")
        .map(|n| text(n, source))
        .unwrap_or("")
        .to_string();
    let mut method = MethodInfo::new(name);
    method.visibility = Visibility::Public;

    if let Some(params) = node.child_by_field_name("parameters") {
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            match param.kind() {
                "identifier" => method.parameters.push(Parameter::new(text(param, source))),
                "optional_parameter" | "keyword_parameter" => {
                    let pname = param.child_by_field_name("name").map(|n| text(n, source)).unwrap_or("").to_string();
                    method.parameters.push(Parameter::new(pname));
                }
                "splat_parameter" | "hash_splat_parameter" | "block_parameter" => {
                    method.parameters.push(Parameter::new(text(param, source)));
                }
                _ => {}
            }
        }
    }

    if let Some(body) = node.child_by_field_name("body") {
        let mut imports = Vec::new();
        let mut local_var_types = HashMap::new();
        collect_local_var_types(body, source, &mut local_var_types);
        collect_calls(body, source, enclosing_type, &local_var_types, &mut imports, &mut method.method_calls);
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
    imports: &mut Vec<String>,
    out: &mut Vec<MethodCall>,
) {
    if node.kind() == "call" {
        if let Some(target) = require_target(node, source) {
            imports.push(target);
        } else if let Some(method_field) = node.child_by_field_name("method") {
            let method_name = text(method_field, source).to_string();
            let parameter_count = node.child_by_field_name("arguments").map(count_ruby_arguments).unwrap_or(0);
            let receiver = node.child_by_field_name("receiver");

            let (object_name, object_type) = match receiver {
                None => resolve_call_target(Receiver::None, enclosing_type, local_var_types),
                Some(r) => match r.kind() {
                    "self" => resolve_call_target(Receiver::SelfKeyword, enclosing_type, local_var_types),
                    "identifier" => resolve_call_target(Receiver::Identifier(text(r, source)), enclosing_type, local_var_types),
                    "constant" => resolve_call_target(Receiver::Constant(text(r, source)), enclosing_type, local_var_types),
                    "scope_resolution" => {
                        resolve_call_target(Receiver::NamespacedConstant(text(r, source)), enclosing_type, local_var_types)
                    }
                    "instance_variable" | "class_variable" | "global_variable" => {
                        resolve_call_target(Receiver::Variable(text(r, source)), enclosing_type, local_var_types)
                    }
                    _ => resolve_call_target(Receiver::Chained, enclosing_type, local_var_types),
                },
            };

            out.push(MethodCall { method_name, object_type, object_name, parameter_count });
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_calls(child, source, enclosing_type, local_var_types, imports, out);
    }
}

fn count_ruby_arguments(args: Node) -> usize {
    let mut count = 0;
    let mut in_pair_run = false;
    let mut cursor = args.walk();
    for child in args.named_children(&mut cursor) {
        if child.kind() == "pair" {
            if !in_pair_run {
                count += 1;
                in_pair_run = true;
            }
        } else {
            in_pair_run = false;
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_list_sets_retroactive_visibility() {
        let src = "class C; def a; end; def b; end; private :b; end";
        let analyzer = RubyAnalyzer;
        let record = analyzer.analyze(Path::new("c.rb"), src).unwrap();
        let AnalysisRecord::General(analysis) = record else { panic!("expected general record") };
        let ty = &analysis.types[0];
        assert_eq!(ty.methods.len(), 2);
        let a = ty.methods.iter().find(|m| m.name == "a").unwrap();
        let b = ty.methods.iter().find(|m| m.name == "b").unwrap();
        assert_eq!(a.visibility, Visibility::Public);
        assert_eq!(b.visibility, Visibility::Private);
    }

    #[test]
    fn bare_visibility_call_affects_subsequent_methods() {
        let src = "class C\n  private\n  def a; end\nend\n";
        let analyzer = RubyAnalyzer;
        let record = analyzer.analyze(Path::new("c.rb"), src).unwrap();
        let AnalysisRecord::General(analysis) = record else { panic!("expected general record") };
        assert_eq!(analysis.types[0].methods[0].visibility, Visibility::Private);
    }

    #[test]
    fn attr_accessor_produces_get_and_set() {
        let src = "class C\n  attr_accessor :name\nend\n";
        let analyzer = RubyAnalyzer;
        let record = analyzer.analyze(Path::new("c.rb"), src).unwrap();
        let AnalysisRecord::General(analysis) = record else { panic!("expected general record") };
        let prop = &analysis.types[0].properties[0];
        assert_eq!(prop.name, "name");
        assert_eq!(prop.accessors.len(), 2);
    }

    #[test]
    fn local_var_assigned_from_literal_resolves_object_type() {
        let src = "def f\n  x = \"s\"\n  x.foo\nend\n";
        let analyzer = RubyAnalyzer;
        let record = analyzer.analyze(Path::new("c.rb"), src).unwrap();
        let AnalysisRecord::General(analysis) = record else { panic!("expected general record") };
        let call = &analysis.methods[0].method_calls[0];
        assert_eq!(call.method_name, "foo");
        assert_eq!(call.object_name.as_deref(), Some("x"));
        assert_eq!(call.object_type.as_deref(), Some("string"));
    }

    #[test]
    fn require_calls_become_imports_not_calls() {
        let src = "require 'json'\nclass C\nend\n";
        let analyzer = RubyAnalyzer;
        let record = analyzer.analyze(Path::new("c.rb"), src).unwrap();
        let AnalysisRecord::General(analysis) = record else { panic!("expected general record") };
        assert_eq!(analysis.imports, vec!["json".to_string()]);
        assert!(analysis.method_calls.is_empty());
    }
}
