//! codeframe CLI entry point

use clap::Parser;
use codeframe::cli::Cli;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_env("CODEFRAME_LOG"))
        .init();

    let cli = Cli::parse();
    let working_dir = std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));

    match codeframe::orchestrator::run_to_file(&cli.input, &cli.output, &working_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "run failed");
            eprintln!("codeframe: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
