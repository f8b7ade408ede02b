//! codeframe - multi-language source-code structural analyzer
//!
//! Scans a directory tree, identifies files written in one of a fixed set
//! of supported languages, parses each into a syntax tree, extracts a
//! uniform structural summary, and emits one record per file as a
//! newline-delimited stream of self-describing JSON objects.

pub mod analyzers;
pub mod cli;
pub mod core;
pub mod model;
pub mod orchestrator;
pub mod output;
pub mod parse;
pub mod registry;

pub use core::config::RunConfig;
pub use core::error::{Error, Result};
