//! JavaScript structural extractor (`spec.md` §4.4).

use crate::analyzers::general::ecma;
use crate::analyzers::{AnalysisRecord, AnalyzeError, Analyzer};
use crate::model::FileAnalysis;
use crate::parse::tree_helpers::text;
use crate::parse::{treesitter, Language};
use std::path::Path;

pub struct JavaScriptAnalyzer;

impl Analyzer for JavaScriptAnalyzer {
    fn analyze(&self, path: &Path, source: &str) -> Result<AnalysisRecord, AnalyzeError> {
        let tree = treesitter::parse(Language::JavaScript, source)
            .ok_or_else(|| AnalyzeError::from("tree-sitter produced no tree for JavaScript source"))?;
        let root = tree.root_node();

        let mut analysis = FileAnalysis::new(path.display().to_string(), "javascript");

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "import_statement" | "export_statement" => {
                    if let Some(import) = ecma::normalize_import(text(child, source), child) {
                        analysis.imports.push(import);
                    }
                    if let Some(class) = find_exported_class(child) {
                        analysis.types.push(ecma::extract_class(class, source));
                    }
                }
                "class_declaration" => analysis.types.push(ecma::extract_class(child, source)),
                "function_declaration" => {
                    analysis.methods.push(ecma::extract_method(child, source, None));
                }
                _ => {}
            }
        }

        Ok(AnalysisRecord::General(analysis))
    }
}

fn find_exported_class(export_node: tree_sitter::Node) -> Option<tree_sitter::Node> {
    export_node
        .child_by_field_name("declaration")
        .filter(|d| d.kind() == "class_declaration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_class_method_and_call() {
        let src = "class A {\n  f() {\n    b.g(1, 2);\n  }\n}\n";
        let analyzer = JavaScriptAnalyzer;
        let record = analyzer.analyze(Path::new("a.js"), src).unwrap();
        let AnalysisRecord::General(analysis) = record else { panic!("expected general record") };
        assert_eq!(analysis.types.len(), 1);
        let method = &analysis.types[0].methods[0];
        assert_eq!(method.name, "f");
        assert_eq!(method.method_calls[0].method_name, "g");
        assert_eq!(method.method_calls[0].parameter_count, 2);
    }

    #[test]
    fn collects_import_statement() {
        let src = "import { a } from \"./a\";\n";
        let analyzer = JavaScriptAnalyzer;
        let record = analyzer.analyze(Path::new("a.js"), src).unwrap();
        let AnalysisRecord::General(analysis) = record else { panic!("expected general record") };
        assert_eq!(analysis.imports, vec!["import { a } from \"./a\"".to_string()]);
    }
}
