//! Parsing: language detection, tree-sitter grammar loading, generic tree
//! navigation, and directory walking.

pub mod languages;
pub mod tree_helpers;
pub mod treesitter;
pub mod walker;

pub use languages::Language;
