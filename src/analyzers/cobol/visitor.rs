//! Hand-written COBOL sentence scanner and data/procedure division visitor
//! (`spec.md` §4.5). There is no mature ANTLR/tree-sitter COBOL grammar in
//! this ecosystem, so — per the teacher's own preference for hand-rolled
//! recursive scanners over fabricating a grammar dependency — this walks a
//! stream of period-terminated sentences directly.

use crate::model::cobol::{
    CobolDataItem, CobolFileAnalysis, CobolParagraph, CobolSection, ControlFlowStatement,
    DataSection, ExternalCall, FileControlEntry, FileDefinition, FileOperation, PerformCall,
    PROCEDURE_DIVISION_PROLOGUE,
};
use once_cell::sync::Lazy;
use regex::Regex;

/// Splits preprocessed COBOL source into period-terminated sentences,
/// respecting quoted literals so a `.` inside a string doesn't split early.
/// Sequence-number and indicator-area columns are stripped first for lines
/// that look like classic fixed-format source.
pub fn split_sentences(source: &str) -> Vec<String> {
    let mut content = String::new();
    for raw_line in source.lines() {
        if let Some(stripped) = strip_fixed_format_columns(raw_line) {
            content.push_str(&stripped);
            content.push(' ');
        }
    }

    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut in_quote: Option<char> = None;
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        match in_quote {
            Some(q) if c == q => {
                current.push(c);
                in_quote = None;
            }
            Some(_) => current.push(c),
            None => match c {
                '"' | '\'' => {
                    in_quote = Some(c);
                    current.push(c);
                }
                '.' if chars.peek().map(|n| n.is_whitespace()).unwrap_or(true) => {
                    let trimmed = current.trim();
                    if !trimmed.is_empty() {
                        sentences.push(trimmed.to_string());
                    }
                    current.clear();
                }
                _ => current.push(c),
            },
        }
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    sentences
}

/// Classic fixed-format COBOL: columns 1-6 sequence area, column 7
/// indicator (`*`/`/` comment, `-` continuation — folded in as a plain
/// continuation here since sentence joining already spans lines), columns
/// 8-72 content, 73-80 ignored. Lines that don't look fixed-format (no
/// leading sequence/indicator columns — common in modern free-format
/// samples) pass through unchanged so both styles parse.
fn strip_fixed_format_columns(line: &str) -> Option<String> {
    let chars: Vec<char> = line.chars().collect();
    if chars.len() >= 7 {
        let seq_area_is_blank_or_digits = chars[0..6].iter().all(|c| c.is_ascii_digit() || *c == ' ');
        let indicator = chars[6];
        if seq_area_is_blank_or_digits {
            if indicator == '*' || indicator == '/' {
                return None;
            }
            let end = chars.len().min(72);
            if end > 7 {
                return Some(chars[7..end].iter().collect());
            }
            return Some(String::new());
        }
    }
    Some(line.to_string())
}

fn tokenize(sentence: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quote: Option<char> = None;
    for c in sentence.chars() {
        match in_quote {
            Some(q) if c == q => {
                current.push(c);
                tokens.push(std::mem::take(&mut current));
                in_quote = None;
            }
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                in_quote = Some(c);
                current.push(c);
            }
            None if c.is_whitespace() || c == ',' || c == ';' => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            None => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn is_quoted(token: &str) -> bool {
    let mut chars = token.chars();
    match (chars.next(), token.chars().last()) {
        (Some('"'), Some('"')) | (Some('\''), Some('\'')) => token.len() >= 2,
        _ => false,
    }
}

fn unquote(token: &str) -> String {
    if is_quoted(token) {
        token[1..token.len() - 1].to_string()
    } else {
        token.to_string()
    }
}

static DATA_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(\d{1,2})\s+([A-Z0-9][A-Z0-9-]*)\b(.*)$").unwrap());
static PIC_CLAUSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)PIC(?:TURE)?\s+(?:IS\s+)?(\S+)").unwrap());
static USAGE_CLAUSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)USAGE\s+(?:IS\s+)?(\S+)|\bCOMP(?:-\d)?\b|\bBINARY\b|\bDISPLAY\b|\bPACKED-DECIMAL\b").unwrap());
static REDEFINES_CLAUSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)REDEFINES\s+([A-Z0-9][A-Z0-9-]*)").unwrap());
static OCCURS_CLAUSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)OCCURS\s+(\d+)").unwrap());

fn parse_data_item_clauses(item: &mut CobolDataItem, rest: &str) {
    if let Some(caps) = PIC_CLAUSE.captures(rest) {
        item.picture = Some(caps[1].to_string());
    }
    if let Some(m) = USAGE_CLAUSE.find(rest) {
        item.usage = Some(m.as_str().to_uppercase());
    }
    if let Some(caps) = REDEFINES_CLAUSE.captures(rest) {
        item.redefines = Some(caps[1].to_string());
    }
    if let Some(caps) = OCCURS_CLAUSE.captures(rest) {
        item.occurs = caps[1].parse().ok();
    }
}

/// Pushes a new data item onto the correct parent using a level-number
/// stack: an item attaches as a child of the closest preceding item with a
/// strictly lower level that still accepts children (`spec.md` §4.5 steps
/// 1-5). `stack` holds `(level, path-into-items)` entries as a scratch
/// structure alongside the real tree.
struct DataItemStack {
    roots: Vec<CobolDataItem>,
    stack: Vec<Vec<usize>>,
}

impl DataItemStack {
    fn new() -> Self {
        Self { roots: Vec::new(), stack: Vec::new() }
    }

    fn push(&mut self, item: CobolDataItem) {
        let level = item.level;
        while let Some(top) = self.stack.last() {
            let top_level = self.item_at(top).level;
            if top_level >= level {
                self.stack.pop();
            } else {
                break;
            }
        }

        if level == 1 || level == 77 || self.stack.is_empty() {
            self.roots.push(item);
            let idx = self.roots.len() - 1;
            if self.roots[idx].can_have_children() {
                self.stack.push(vec![idx]);
            }
        } else {
            let parent_path = self.stack.last().cloned().unwrap();
            let parent = self.item_at_mut(&parent_path);
            if parent.can_have_children() {
                parent.children.push(item);
                let mut child_path = parent_path.clone();
                child_path.push(parent.children.len() - 1);
                if parent.children.last().unwrap().can_have_children() {
                    self.stack.push(child_path);
                }
            } else {
                self.roots.push(item);
            }
        }
    }

    fn item_at(&self, path: &[usize]) -> &CobolDataItem {
        let mut node = &self.roots[path[0]];
        for &idx in &path[1..] {
            node = &node.children[idx];
        }
        node
    }

    fn item_at_mut(&mut self, path: &[usize]) -> &mut CobolDataItem {
        let mut node = &mut self.roots[path[0]];
        for &idx in &path[1..] {
            node = &mut node.children[idx];
        }
        node
    }

    fn into_items(self) -> Vec<CobolDataItem> {
        self.roots
    }
}

#[derive(PartialEq)]
enum Division {
    Identification,
    Environment,
    Data,
    Procedure,
}

static PROGRAM_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^PROGRAM-ID\.?\s+([A-Z0-9][A-Z0-9-]*)").unwrap());
static SELECT_CLAUSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^SELECT\s+(?:OPTIONAL\s+)?([A-Z0-9][A-Z0-9-]*)(?:\s+ASSIGN\s+(?:TO\s+)?(\S+))?(?:.*?ORGANIZATION\s+(?:IS\s+)?(\S+))?").unwrap()
});
static FD_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(?:FD|SD)\s+([A-Z0-9][A-Z0-9-]*)").unwrap());

pub fn visit(sentences: &[String]) -> CobolFileAnalysisParts {
    let mut parts = CobolFileAnalysisParts::default();
    let mut division = Division::Identification;
    let mut data_section: Option<DataSection> = None;
    let mut ws_stack = DataItemStack::new();
    let mut link_stack = DataItemStack::new();
    let mut local_stack = DataItemStack::new();
    let mut current_fd: Option<FileDefinition> = None;

    let mut current_section: Option<CobolSection> = None;
    let mut current_paragraph: Option<CobolParagraph> = None;
    let mut sections: Vec<CobolSection> = Vec::new();
    let mut file_level_paragraphs: Vec<CobolParagraph> = Vec::new();
    let mut prologue = CobolParagraph::new(PROCEDURE_DIVISION_PROLOGUE);
    let mut seen_paragraph_header = false;

    for sentence in sentences {
        let upper = sentence.to_uppercase();

        if let Some(rest) = division_header(&upper, "IDENTIFICATION DIVISION") {
            let _ = rest;
            division = Division::Identification;
            continue;
        }
        if division_header(&upper, "ENVIRONMENT DIVISION").is_some() {
            division = Division::Environment;
            continue;
        }
        if division_header(&upper, "DATA DIVISION").is_some() {
            division = Division::Data;
            continue;
        }
        if let Some(params) = procedure_division_header(&upper) {
            division = Division::Procedure;
            parts.procedure_parameters = params;
            continue;
        }

        match division {
            Division::Identification => {
                if let Some(caps) = PROGRAM_ID.captures(sentence) {
                    parts.program_id = Some(caps[1].to_string());
                }
            }
            Division::Environment => {
                if let Some(caps) = SELECT_CLAUSE.captures(sentence) {
                    parts.file_controls.push(FileControlEntry {
                        file_name: caps[1].to_string(),
                        assign_to: caps.get(2).map(|m| m.as_str().trim_matches('"').to_string()),
                        organization: caps.get(3).map(|m| m.as_str().to_string()),
                    });
                }
            }
            Division::Data => {
                if upper.starts_with("WORKING-STORAGE SECTION") {
                    flush_fd(&mut current_fd, &mut parts);
                    data_section = Some(DataSection::WorkingStorage);
                    continue;
                }
                if upper.starts_with("LINKAGE SECTION") {
                    flush_fd(&mut current_fd, &mut parts);
                    data_section = Some(DataSection::Linkage);
                    continue;
                }
                if upper.starts_with("LOCAL-STORAGE SECTION") {
                    flush_fd(&mut current_fd, &mut parts);
                    data_section = Some(DataSection::LocalStorage);
                    continue;
                }
                if upper.starts_with("FILE SECTION") {
                    data_section = Some(DataSection::File);
                    continue;
                }
                if let Some(caps) = FD_HEADER.captures(sentence) {
                    flush_fd(&mut current_fd, &mut parts);
                    current_fd = Some(FileDefinition { file_name: caps[1].to_string(), record_items: Vec::new() });
                    data_section = Some(DataSection::File);
                    continue;
                }
                if let Some(caps) = DATA_ITEM.captures(sentence) {
                    let level: u32 = caps[1].parse().unwrap_or(1);
                    let name = caps[2].to_string();
                    let rest = &caps[3];
                    let section = data_section.unwrap_or(DataSection::WorkingStorage);
                    let mut item = CobolDataItem::new(level, name, section);
                    parse_data_item_clauses(&mut item, rest);

                    match section {
                        DataSection::WorkingStorage => ws_stack.push(item),
                        DataSection::Linkage => link_stack.push(item),
                        DataSection::LocalStorage => local_stack.push(item),
                        DataSection::File => {
                            if let Some(fd) = current_fd.as_mut() {
                                fd.record_items.push(item);
                            }
                        }
                    }
                }
            }
            Division::Procedure => {
                if let Some((name, is_section)) = paragraph_or_section_header(sentence) {
                    seen_paragraph_header = true;
                    if let Some(p) = current_paragraph.take() {
                        attach_paragraph(p, &mut current_section, &mut file_level_paragraphs);
                    }
                    if is_section {
                        if let Some(s) = current_section.take() {
                            sections.push(s);
                        }
                        current_section = Some(CobolSection { name, paragraphs: Vec::new() });
                    } else {
                        current_paragraph = Some(CobolParagraph::new(name));
                    }
                    continue;
                }

                let target = if seen_paragraph_header {
                    current_paragraph.get_or_insert_with(|| CobolParagraph::new("__unnamed__"))
                } else {
                    &mut prologue
                };
                apply_statement(target, sentence, &upper);
            }
        }
    }

    flush_fd(&mut current_fd, &mut parts);
    if let Some(p) = current_paragraph.take() {
        attach_paragraph(p, &mut current_section, &mut file_level_paragraphs);
    }
    if let Some(s) = current_section.take() {
        sections.push(s);
    }

    parts.data_items.extend(ws_stack.into_items());
    parts.data_items.extend(link_stack.into_items());
    parts.data_items.extend(local_stack.into_items());
    parts.sections = sections;
    parts.paragraphs = file_level_paragraphs;
    if !prologue.is_empty() {
        parts.paragraphs.insert(0, prologue);
    }
    parts
}

fn flush_fd(current_fd: &mut Option<FileDefinition>, parts: &mut CobolFileAnalysisParts) {
    if let Some(fd) = current_fd.take() {
        parts.file_definitions.push(fd);
    }
}

fn attach_paragraph(paragraph: CobolParagraph, current_section: &mut Option<CobolSection>, file_level: &mut Vec<CobolParagraph>) {
    match current_section {
        Some(section) => section.paragraphs.push(paragraph),
        None => file_level.push(paragraph),
    }
}

fn division_header<'a>(upper: &'a str, name: &str) -> Option<&'a str> {
    if upper == name || upper.starts_with(name) {
        Some(upper)
    } else {
        None
    }
}

fn procedure_division_header(upper: &str) -> Option<Vec<String>> {
    if !upper.starts_with("PROCEDURE DIVISION") {
        return None;
    }
    let mut params = Vec::new();
    if let Some(using_idx) = upper.find("USING") {
        let rest = &upper[using_idx + 5..];
        let rest = rest.split("RETURNING").next().unwrap_or(rest);
        for token in rest.split_whitespace() {
            if matches!(token, "BY" | "REFERENCE" | "VALUE" | "CONTENT") {
                continue;
            }
            params.push(token.trim_matches(',').to_string());
        }
    }
    Some(params)
}

/// A standalone sentence is a paragraph header (or section header, if its
/// last token is the literal `SECTION`).
fn paragraph_or_section_header(sentence: &str) -> Option<(String, bool)> {
    let tokens: Vec<&str> = sentence.split_whitespace().collect();
    match tokens.as_slice() {
        [name] if is_identifier(name) => Some((name.to_string(), false)),
        [name, section] if section.eq_ignore_ascii_case("SECTION") && is_identifier(name) => {
            Some((name.to_string(), true))
        }
        _ => None,
    }
}

fn is_identifier(token: &str) -> bool {
    !token.is_empty()
        && token.chars().next().map(|c| c.is_ascii_alphanumeric()).unwrap_or(false)
        && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

const DATA_REFERENCE_VERBS: &[&str] = &[
    "MOVE", "COMPUTE", "ADD", "SUBTRACT", "MULTIPLY", "DIVIDE", "SET", "STRING", "UNSTRING",
    "EVALUATE", "INITIALIZE", "DISPLAY", "ACCEPT", "IF",
];

const KEYWORD_NOISE: &[&str] = &[
    "TO", "FROM", "BY", "GIVING", "INTO", "USING", "THEN", "ELSE", "END-IF", "WHEN", "IS",
    "ARE", "NOT", "EQUAL", "GREATER", "LESS", "THAN", "OR", "AND", "REFERENCE", "VALUE",
    "CONTENT", "DELIMITED", "SIZE", "ALL", "SPACES", "ZEROS", "END-EVALUATE", "END-STRING",
    "END-UNSTRING", "END-COMPUTE", "END-ADD", "END-SUBTRACT", "END-MULTIPLY", "END-DIVIDE",
];

fn apply_statement(paragraph: &mut CobolParagraph, sentence: &str, upper: &str) {
    let tokens = tokenize(sentence);
    let Some(verb_token) = tokens.first() else { return };
    let verb = verb_token.to_uppercase();

    match verb.as_str() {
        "PERFORM" => {
            if let Some(call) = parse_perform(&tokens) {
                paragraph.perform_calls.push(call);
            }
        }
        "CALL" => {
            if let Some(call) = parse_call(&tokens) {
                paragraph.external_calls.push(call);
            }
            for token in call_argument_identifiers(&tokens) {
                paragraph.data_references.push(token);
            }
        }
        "READ" | "WRITE" | "OPEN" | "CLOSE" | "REWRITE" | "DELETE" | "START" => {
            if let Some(target) = tokens.get(1) {
                paragraph.file_operations.push(FileOperation { verb: verb.clone(), target: target.clone() });
            }
        }
        "GOBACK" => paragraph.control_flow_statements.push(ControlFlowStatement { kind: "GOBACK".to_string(), target: None }),
        "STOP" => {
            let target = tokens.get(1).cloned();
            match target.as_deref() {
                Some(t) if t.eq_ignore_ascii_case("RUN") => {
                    paragraph.control_flow_statements.push(ControlFlowStatement { kind: "STOP_RUN".to_string(), target: None })
                }
                Some(t) => paragraph
                    .control_flow_statements
                    .push(ControlFlowStatement { kind: "STOP".to_string(), target: Some(unquote(t)) }),
                None => {}
            }
        }
        "EXIT" => {
            if upper.contains("PROGRAM") {
                paragraph.control_flow_statements.push(ControlFlowStatement { kind: "EXIT_PROGRAM".to_string(), target: None });
            }
        }
        "RETURN" => paragraph.control_flow_statements.push(ControlFlowStatement { kind: "RETURN".to_string(), target: None }),
        v if DATA_REFERENCE_VERBS.contains(&v) => {
            for token in &tokens[1..] {
                if is_identifier(token) && !KEYWORD_NOISE.contains(&token.to_uppercase().as_str()) {
                    if let Some(normalized) = strip_addressof(token) {
                        paragraph.data_references.push(normalized);
                    }
                }
            }
        }
        _ => {}
    }
}

/// Strips a leading `ADDRESSOF` (case-insensitive) from a data-reference
/// token (`spec.md` §4.5: "strip the prefix ADDRESSOF ... when present").
/// `ADDRESSOF` itself tokenizes as a standalone word ahead of the identifier
/// it qualifies, so a token that is *only* `ADDRESSOF` carries no reference
/// of its own and is dropped (`None`) rather than recorded as an empty name.
fn strip_addressof(token: &str) -> Option<String> {
    if token.len() >= 9 && token.is_char_boundary(9) && token[..9].eq_ignore_ascii_case("ADDRESSOF") {
        let rest = &token[9..];
        if rest.is_empty() { None } else { Some(rest.to_string()) }
    } else {
        Some(token.to_string())
    }
}

/// Identifier-like arguments in a `CALL ... USING ...` clause, excluding the
/// `BY REFERENCE`/`VALUE`/`CONTENT` noise words and the `RETURNING` tail,
/// with any `ADDRESSOF` prefix stripped (`spec.md` §4.5).
fn call_argument_identifiers(tokens: &[String]) -> Vec<String> {
    let Some(using_idx) = tokens.iter().position(|t| t.eq_ignore_ascii_case("USING")) else {
        return Vec::new();
    };
    tokens[using_idx + 1..]
        .iter()
        .take_while(|t| !t.eq_ignore_ascii_case("RETURNING"))
        .filter(|t| is_identifier(t) && !matches!(t.to_uppercase().as_str(), "BY" | "REFERENCE" | "VALUE" | "CONTENT"))
        .filter_map(|t| strip_addressof(t))
        .collect()
}

fn parse_perform(tokens: &[String]) -> Option<PerformCall> {
    let target = tokens.get(1)?;
    if !is_identifier(target) {
        return None;
    }
    let thru = tokens
        .iter()
        .position(|t| t.eq_ignore_ascii_case("THRU") || t.eq_ignore_ascii_case("THROUGH"))
        .and_then(|idx| tokens.get(idx + 1))
        .cloned();
    Some(PerformCall { target_paragraph: target.clone(), thru_paragraph: thru })
}

fn parse_call(tokens: &[String]) -> Option<ExternalCall> {
    let program = tokens.get(1)?;
    let is_dynamic = !is_quoted(program);
    let program_name = unquote(program);

    let parameter_count = tokens
        .iter()
        .position(|t| t.eq_ignore_ascii_case("USING"))
        .map(|using_idx| {
            tokens[using_idx + 1..]
                .iter()
                .take_while(|t| !t.eq_ignore_ascii_case("RETURNING"))
                .filter(|t| !matches!(t.to_uppercase().as_str(), "BY" | "REFERENCE" | "VALUE" | "CONTENT"))
                .count()
        })
        .unwrap_or(0);

    Some(ExternalCall { program_name, is_dynamic, parameter_count })
}

#[derive(Default)]
pub struct CobolFileAnalysisParts {
    pub program_id: Option<String>,
    pub file_controls: Vec<FileControlEntry>,
    pub file_definitions: Vec<FileDefinition>,
    pub data_items: Vec<CobolDataItem>,
    pub sections: Vec<CobolSection>,
    pub paragraphs: Vec<CobolParagraph>,
    pub procedure_parameters: Vec<String>,
}

impl CobolFileAnalysisParts {
    pub fn into_analysis(self, path: impl Into<String>, copy_statements: Vec<String>, exec_flags: (bool, bool, bool)) -> CobolFileAnalysis {
        let mut analysis = CobolFileAnalysis::new(path);
        analysis.program_id = self.program_id;
        analysis.file_controls = self.file_controls;
        analysis.file_definitions = self.file_definitions;
        analysis.data_items = self.data_items;
        analysis.sections = self.sections;
        analysis.paragraphs = self.paragraphs;
        analysis.procedure_parameters = self.procedure_parameters;
        analysis.copy_statements = copy_statements;
        analysis.has_exec_sql = exec_flags.0;
        analysis.has_exec_cics = exec_flags.1;
        analysis.has_exec_sql_ims = exec_flags.2;
        analysis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_sentences_respecting_quoted_periods() {
        let source = "       DISPLAY \"DONE.\" MAIN-PARA.\n";
        let sentences = split_sentences(source);
        assert_eq!(sentences, vec!["DISPLAY \"DONE.\" MAIN-PARA".to_string()]);
    }

    #[test]
    fn perform_thru_is_parsed() {
        let sentences = vec!["MAIN.".to_string(), "PERFORM SUB-RTN THRU SUB-RTN-EXIT.".to_string()];
        let parts = visit(&sentences);
        let paragraph = &parts.paragraphs[0];
        assert_eq!(paragraph.name, "MAIN");
        assert_eq!(paragraph.perform_calls[0].target_paragraph, "SUB-RTN");
        assert_eq!(paragraph.perform_calls[0].thru_paragraph.as_deref(), Some("SUB-RTN-EXIT"));
    }

    #[test]
    fn data_items_nest_by_level() {
        let sentences = vec![
            "01 CUSTOMER-RECORD.".to_string(),
            "05 CUSTOMER-ID PIC 9(5).".to_string(),
            "05 CUSTOMER-NAME PIC X(30).".to_string(),
        ];
        let mut stack = DataItemStack::new();
        for s in &sentences {
            let caps = DATA_ITEM.captures(s).unwrap();
            let level: u32 = caps[1].parse().unwrap();
            let mut item = CobolDataItem::new(level, caps[2].to_string(), DataSection::WorkingStorage);
            parse_data_item_clauses(&mut item, &caps[3]);
            stack.push(item);
        }
        let items = stack.into_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].children.len(), 2);
        assert_eq!(items[0].children[0].picture.as_deref(), Some("9(5)"));
    }

    #[test]
    fn call_counts_parameters_and_detects_dynamic() {
        let tokens = tokenize("CALL WS-PROGRAM-NAME USING BY REFERENCE A B BY VALUE C");
        let call = parse_call(&tokens).unwrap();
        assert!(call.is_dynamic);
        assert_eq!(call.parameter_count, 3);
    }

    #[test]
    fn addressof_prefix_is_stripped_from_data_references() {
        let sentences = vec!["MAIN".to_string(), "MOVE ADDRESSOF WS-PTR TO OTHER-PTR".to_string()];
        let parts = visit(&sentences);
        let paragraph = &parts.paragraphs[0];
        assert!(paragraph.data_references.contains(&"WS-PTR".to_string()));
        assert!(!paragraph.data_references.iter().any(|r| r.to_uppercase().contains("ADDRESSOF")));
    }

    #[test]
    fn call_argument_identifiers_strip_addressof_and_feed_data_references() {
        let sentences = vec!["MAIN".to_string(), "CALL \"SUB1\" USING BY REFERENCE ADDRESSOF X Y".to_string()];
        let parts = visit(&sentences);
        let paragraph = &parts.paragraphs[0];
        assert_eq!(paragraph.data_references, vec!["X".to_string(), "Y".to_string()]);
    }
}
