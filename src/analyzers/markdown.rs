//! Markdown analyzer (`spec.md` §4.7): heading and link extraction only,
//! emitted in the same `FileAnalysis` shape the general-purpose extractors
//! use, with every structural field left empty. Line-oriented regex
//! scanning, in the style of the fallback extractor this crate's general
//! extractors replaced.

use crate::analyzers::{AnalysisRecord, AnalyzeError, Analyzer};
use crate::model::{FileAnalysis, Heading};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static ATX_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.+?)\s*#*\s*$").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]*\]\(([^)\s]+)(?:\s+\"[^\"]*\")?\)").unwrap());

pub struct MarkdownAnalyzer;

impl Analyzer for MarkdownAnalyzer {
    fn analyze(&self, path: &Path, source: &str) -> Result<AnalysisRecord, AnalyzeError> {
        let mut analysis = FileAnalysis::new(path.display().to_string(), "markdown");

        for line in source.lines() {
            if let Some(caps) = ATX_HEADING.captures(line) {
                let level = caps[1].len() as u8;
                let text = caps[2].trim().to_string();
                analysis.headings.push(Heading { level, text });
            }
            for caps in LINK.captures_iter(line) {
                analysis.links.push(caps[1].to_string());
            }
        }

        Ok(AnalysisRecord::General(analysis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_headings_and_links() {
        let src = "# Title\n\nSome [link](https://example.com) here.\n\n## Section\n";
        let analyzer = MarkdownAnalyzer;
        let record = analyzer.analyze(Path::new("a.md"), src).unwrap();
        let AnalysisRecord::General(analysis) = record else { panic!("expected general record") };
        assert_eq!(analysis.headings.len(), 2);
        assert_eq!(analysis.headings[0].level, 1);
        assert_eq!(analysis.headings[0].text, "Title");
        assert_eq!(analysis.links, vec!["https://example.com".to_string()]);
        assert!(analysis.types.is_empty());
    }
}
