//! Analyzer registry (`spec.md` §4.3): maps a `Language` to the analyzer
//! instance that handles it, built once per run from the `analyzers`
//! section of `RunConfig` and immutable afterward.

use crate::analyzers::cobol::{CobolAnalyzer, CopybookRepository};
use crate::analyzers::general::{
    csharp::CSharpAnalyzer, java::JavaAnalyzer, javascript::JavaScriptAnalyzer, php::PhpAnalyzer,
    python::PythonAnalyzer, ruby::RubyAnalyzer, rust_lang::RustAnalyzer, typescript::TypeScriptAnalyzer,
};
use crate::analyzers::markdown::MarkdownAnalyzer;
use crate::analyzers::sql::SqlAnalyzer;
use crate::analyzers::Analyzer;
use crate::core::config::RunConfig;
use crate::parse::Language;
use std::collections::HashMap;
use std::sync::Arc;

/// `Language -> Analyzer` map, built once per run (`spec.md` §4.3). Unknown
/// entries in the config's `analyzers` map are ignored by construction,
/// since lookups only ever use names drawn from the closed `Language` set;
/// a language missing from the map defaults to enabled.
pub struct AnalyzerRegistry {
    analyzers: HashMap<Language, Arc<dyn Analyzer>>,
}

impl AnalyzerRegistry {
    /// Build the registry for one run. `copybooks` backs the COBOL
    /// analyzer's `COPY` expansion (`spec.md` §4.5) and is shared
    /// read-only across every worker.
    pub fn build(config: &RunConfig, copybooks: Arc<CopybookRepository>) -> Self {
        let mut analyzers: HashMap<Language, Arc<dyn Analyzer>> = HashMap::new();

        let mut insert = |language: Language, analyzer: Arc<dyn Analyzer>| {
            if config.is_analyzer_enabled(language.as_str()) {
                analyzers.insert(language, analyzer);
            }
        };

        insert(Language::Java, Arc::new(JavaAnalyzer));
        insert(Language::JavaScript, Arc::new(JavaScriptAnalyzer));
        insert(Language::TypeScript, Arc::new(TypeScriptAnalyzer));
        insert(Language::Python, Arc::new(PythonAnalyzer));
        insert(Language::CSharp, Arc::new(CSharpAnalyzer));
        insert(Language::Php, Arc::new(PhpAnalyzer));
        insert(Language::Ruby, Arc::new(RubyAnalyzer));
        insert(Language::Rust, Arc::new(RustAnalyzer));
        insert(Language::Markdown, Arc::new(MarkdownAnalyzer));
        insert(Language::Sql, Arc::new(SqlAnalyzer));
        insert(Language::Cobol, Arc::new(CobolAnalyzer::new(copybooks)));

        Self { analyzers }
    }

    /// Look up the analyzer for `language`, or `None` if its config entry
    /// disabled it.
    pub fn get(&self, language: Language) -> Option<&Arc<dyn Analyzer>> {
        self.analyzers.get(&language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_language_is_absent() {
        let mut config = RunConfig::default();
        config.analyzers.insert("cobol".to_string(), false);
        let registry = AnalyzerRegistry::build(&config, Arc::new(CopybookRepository::build(&[])));

        assert!(registry.get(Language::Cobol).is_none());
        assert!(registry.get(Language::Java).is_some());
    }

    #[test]
    fn defaults_to_all_enabled() {
        let config = RunConfig::default();
        let registry = AnalyzerRegistry::build(&config, Arc::new(CopybookRepository::build(&[])));
        for language in Language::all() {
            assert!(registry.get(*language).is_some(), "{language} should be enabled by default");
        }
    }
}
