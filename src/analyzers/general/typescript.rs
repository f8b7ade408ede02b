//! TypeScript structural extractor (`spec.md` §4.4). Reuses the ECMAScript
//! class/method/call machinery and layers interface extraction on top,
//! since `tree-sitter-typescript`'s class grammar is a superset of
//! `tree-sitter-javascript`'s.

use crate::analyzers::general::ecma;
use crate::analyzers::{AnalysisRecord, AnalyzeError, Analyzer};
use crate::model::{FileAnalysis, PropertyInfo, TypeInfo, TypeKind, Visibility};
use crate::parse::tree_helpers::text;
use crate::parse::{treesitter, Language};
use std::path::Path;
use tree_sitter::Node;

pub struct TypeScriptAnalyzer;

impl Analyzer for TypeScriptAnalyzer {
    fn analyze(&self, path: &Path, source: &str) -> Result<AnalysisRecord, AnalyzeError> {
        let tree = treesitter::parse(Language::TypeScript, source)
            .ok_or_else(|| AnalyzeError::from("tree-sitter produced no tree for TypeScript source"))?;
        let root = tree.root_node();

        let mut analysis = FileAnalysis::new(path.display().to_string(), "typescript");

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "import_statement" | "export_statement" => {
                    if let Some(import) = ecma::normalize_import(text(child, source), child) {
                        analysis.imports.push(import);
                    }
                    if let Some(declared) = child.child_by_field_name("declaration") {
                        push_declaration(declared, source, &mut analysis);
                    }
                }
                "class_declaration" | "interface_declaration" => push_declaration(child, source, &mut analysis),
                "function_declaration" => {
                    analysis.methods.push(ecma::extract_method(child, source, None));
                }
                _ => {}
            }
        }

        Ok(AnalysisRecord::General(analysis))
    }
}

fn push_declaration(node: Node, source: &str, analysis: &mut FileAnalysis) {
    match node.kind() {
        "class_declaration" => analysis.types.push(ecma::extract_class(node, source)),
        "interface_declaration" => analysis.types.push(extract_interface(node, source)),
        _ => {}
    }
}

fn extract_interface(node: Node, source: &str) -> TypeInfo {
    let name = node
        .child_by_field_name("name")
        .map(|n| text(n, source))
        .unwrap_or("")
        .to_string();
    let mut type_info = TypeInfo::new(name, TypeKind::Interface);

    if let Some(heritage) = node.child_by_field_name("extends_clause") {
        let mut cursor = heritage.walk();
        for entry in heritage.named_children(&mut cursor) {
            type_info.implements.push(text(entry, source).to_string());
        }
    }

    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            if member.kind() == "property_signature" {
                if let Some(name_node) = member.child_by_field_name("name") {
                    let prop_name = text(name_node, source).to_string();
                    let prop_type = member.child_by_field_name("type").map(|n| text(n, source).to_string());
                    type_info.properties.push(PropertyInfo {
                        name: prop_name,
                        type_name: prop_type,
                        visibility: Visibility::Public,
                        accessors: Vec::new(),
                    });
                }
            }
        }
    }

    type_info
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_interface_properties() {
        let src = "interface Point { x: number; y: number; }\n";
        let analyzer = TypeScriptAnalyzer;
        let record = analyzer.analyze(Path::new("a.ts"), src).unwrap();
        let AnalysisRecord::General(analysis) = record else { panic!("expected general record") };
        assert_eq!(analysis.types.len(), 1);
        assert_eq!(analysis.types[0].kind, TypeKind::Interface);
        assert_eq!(analysis.types[0].properties.len(), 2);
    }

    #[test]
    fn extracts_class_with_call() {
        let src = "class A {\n  f(): void {\n    b.g(1);\n  }\n}\n";
        let analyzer = TypeScriptAnalyzer;
        let record = analyzer.analyze(Path::new("a.ts"), src).unwrap();
        let AnalysisRecord::General(analysis) = record else { panic!("expected general record") };
        assert_eq!(analysis.types[0].methods[0].method_calls[0].method_name, "g");
    }
}
