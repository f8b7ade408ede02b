//! Generic syntax-tree navigation (`spec.md` §4.1).
//!
//! These helpers never mutate and treat absent nodes as empty results rather
//! than panicking — extractors call them freely without null-checking first.

use tree_sitter::Node;

/// First named child of `node` whose kind is `kind`.
pub fn first_child<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).find(|c| c.kind() == kind)
}

/// All named children of `node` whose kind is `kind`, in source order.
pub fn all_children<'a>(node: Node<'a>, kind: &str) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() == kind)
        .collect()
}

/// All descendants of `node` whose kind is `kind`, depth-first pre-order.
/// Does not descend past a match's own subtree boundary — it still visits
/// the match's children, matching tree-sitter's natural walk order.
pub fn all_descendants<'a>(node: Node<'a>, kind: &str) -> Vec<Node<'a>> {
    let mut out = Vec::new();
    walk_descendants(node, kind, &mut out);
    out
}

fn walk_descendants<'a>(node: Node<'a>, kind: &str, out: &mut Vec<Node<'a>>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == kind {
            out.push(child);
        }
        walk_descendants(child, kind, out);
    }
}

/// Byte-range text slice for `node`, using exactly the byte offsets
/// tree-sitter reports (so this works for any source encoding the parser
/// accepts, not just UTF-8 ranges aligned to codepoint boundaries).
pub fn text<'a>(node: Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Text of the node at byte range `[start, end)`, clamped to the source
/// length. Useful for reconstructing token-stream slices (preserving
/// whitespace) rather than a single node's concatenated text.
pub fn text_range(source: &str, start: usize, end: usize) -> &str {
    let len = source.len();
    let start = start.min(len);
    let end = end.min(len).max(start);
    &source[start..end]
}

/// The labeled field name of the child at `child_index`, if the grammar
/// exposes field names for this node's children.
pub fn field_name(node: Node, child_index: usize) -> Option<&'static str> {
    node.field_name_for_child(child_index as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::treesitter;
    use crate::parse::languages::Language;

    #[test]
    fn navigates_rust_tree() {
        let src = "fn a() {}\nfn b() {}\n";
        let tree = treesitter::parse(Language::Rust, src).unwrap();
        let root = tree.root_node();
        let fns = all_children(root, "function_item");
        assert_eq!(fns.len(), 2);
        let first = first_child(root, "function_item").unwrap();
        assert_eq!(text(first, src), "fn a() {}");
    }

    #[test]
    fn empty_on_absent_kind() {
        let src = "fn a() {}\n";
        let tree = treesitter::parse(Language::Rust, src).unwrap();
        let root = tree.root_node();
        assert!(all_children(root, "struct_item").is_empty());
        assert!(first_child(root, "struct_item").is_none());
        assert!(all_descendants(root, "struct_item").is_empty());
    }
}
