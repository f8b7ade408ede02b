//! Command-line front end (`spec.md` §6): two positional arguments — the
//! input path (file or directory) and the output path for the
//! newline-delimited record stream.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "codeframe")]
#[command(author, version)]
#[command(about = "Multi-language source-code structural analyzer")]
#[command(after_help = "Examples:
  codeframe ./src out.jsonl        Analyze a directory, write the record stream to out.jsonl
  codeframe Main.java out.jsonl    Analyze a single file")]
pub struct Cli {
    /// File or directory to analyze
    pub input: PathBuf,

    /// Path to write the newline-delimited JSON record stream to
    pub output: PathBuf,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
