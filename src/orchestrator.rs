//! Run orchestrator (`spec.md` §4.8, §5): the per-file driver. Walks the
//! input, builds the copybook repository and analyzer registry once, then
//! fans file processing out across a rayon thread pool. Each worker reads,
//! strips the BOM, detects the language, obtains a parse tree inside its
//! analyzer, and writes exactly one record (analysis or error) through the
//! shared output writer.

use crate::analyzers::Analyzer;
use crate::core::config::RunConfig;
use crate::core::error::{Error, Result};
use crate::output::OutputWriter;
use crate::parse::{walker, Language};
use crate::registry::AnalyzerRegistry;
use chrono::Utc;
use rayon::prelude::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// BOM `U+FEFF`, stripped before analysis (`spec.md` §6).
const BOM: &str = "\u{feff}";

fn strip_bom(source: &str) -> &str {
    source.strip_prefix(BOM).unwrap_or(source)
}

fn count_lines(source: &str) -> usize {
    source.lines().count()
}

/// One candidate file, already classified by language and copybook status.
struct Candidate {
    path: PathBuf,
    language: Language,
}

/// Partition the walked file list into (copybooks, analyzable candidates),
/// per `spec.md` §4.2, §4.5: `.cpy` files never get their own `FileAnalysis`
/// — they are folded into the copybook repository instead.
fn classify(files: Vec<PathBuf>) -> (Vec<PathBuf>, Vec<Candidate>) {
    let mut copybooks = Vec::new();
    let mut candidates = Vec::new();
    for path in files {
        if Language::is_cobol_copybook(&path) {
            copybooks.push(path);
        } else if let Some(language) = Language::from_path(&path) {
            candidates.push(Candidate { path, language });
        }
    }
    (copybooks, candidates)
}

/// Process one candidate file end-to-end: read, filter on `maxFileLines`,
/// dispatch to its analyzer, and write exactly one record. Returns `true`
/// if an analysis record was written, `false` if either a skip (no record)
/// or an error record occurred — the caller distinguishes those via the
/// counters it already bumped.
fn process_file<W: std::io::Write + Send>(
    candidate: &Candidate,
    config: &RunConfig,
    registry: &AnalyzerRegistry,
    writer: &OutputWriter<W>,
    successes: &AtomicUsize,
    errors: &AtomicUsize,
) -> Result<()> {
    let Some(analyzer) = registry.get(candidate.language) else {
        return Ok(());
    };

    let display_path = candidate.path.display().to_string();
    tracing::debug!(file = %display_path, language = %candidate.language, "analyzing file");

    let bytes = match std::fs::read(&candidate.path) {
        Ok(bytes) => bytes,
        Err(e) => {
            errors.fetch_add(1, Ordering::Relaxed);
            return writer.write_error(&display_path, candidate.language.as_str(), &e.to_string());
        }
    };
    let source = String::from_utf8_lossy(&bytes);
    let source = strip_bom(&source);

    if count_lines(source) > config.max_file_lines {
        return Ok(());
    }

    match analyze(analyzer.as_ref(), &candidate.path, source, config) {
        Ok(record) => {
            successes.fetch_add(1, Ordering::Relaxed);
            writer.write_analysis(&record)
        }
        Err(e) => {
            errors.fetch_add(1, Ordering::Relaxed);
            writer.write_error(&display_path, candidate.language.as_str(), &e.to_string())
        }
    }
}

fn analyze(
    analyzer: &dyn Analyzer,
    path: &Path,
    source: &str,
    config: &RunConfig,
) -> std::result::Result<crate::analyzers::AnalysisRecord, crate::analyzers::AnalyzeError> {
    let mut record = analyzer.analyze(path, source)?;
    if config.hide_sql_table_columns {
        if let crate::analyzers::AnalysisRecord::Sql(ref mut sql) = record {
            sql.hide_table_columns();
        }
    }
    Ok(record)
}

/// Run one full analysis pass: walk `input`, process every candidate in
/// parallel, and write the run/done envelopes around the stream
/// (`spec.md` §5, §6, §8).
pub fn run<W: std::io::Write + Send>(
    input: &Path,
    config: &RunConfig,
    writer: OutputWriter<W>,
) -> Result<()> {
    if !input.exists() {
        return Err(Error::InputNotFound { path: input.to_path_buf() });
    }

    let started_at = Utc::now();
    let start = Instant::now();

    let all_files = walker::walk(input)?;
    let (copybook_paths, candidates) = classify(all_files);

    let writer = Arc::new(writer);
    writer.write_run(started_at, &input.display().to_string(), candidates.len())?;

    let copybooks = Arc::new(crate::analyzers::cobol::CopybookRepository::build(&copybook_paths));
    let registry = AnalyzerRegistry::build(config, copybooks);

    let successes = AtomicUsize::new(0);
    let errors = AtomicUsize::new(0);

    candidates.par_iter().for_each(|candidate| {
        if let Err(e) = process_file(candidate, config, &registry, writer.as_ref(), &successes, &errors) {
            tracing::error!(file = %candidate.path.display(), error = %e, "failed to write output record");
        }
    });

    let files_analyzed = successes.load(Ordering::Relaxed);
    let files_with_errors = errors.load(Ordering::Relaxed);
    writer.write_done(Utc::now(), files_analyzed, files_with_errors, start.elapsed().as_secs_f64())?;

    Ok(())
}

/// Convenience entry point used by the CLI: opens `output_path`, loads
/// `RunConfig` from `working_dir`, and delegates to [`run`].
pub fn run_to_file(input: &Path, output_path: &Path, working_dir: &Path) -> Result<()> {
    let config = RunConfig::load(working_dir)?;
    let file = File::create(output_path).map_err(|e| Error::OutputUnwritable { path: output_path.to_path_buf(), source: e })?;
    let writer = OutputWriter::new(BufWriter::new(file));
    run(input, &config, writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct SharedBuf(Arc<Mutex<Vec<u8>>>);
    impl std::io::Write for SharedBuf {
        fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(data)
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn run_emits_envelopes_and_records() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.rs"), "fn f() {}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not analyzed").unwrap();

        let buf = Arc::new(Mutex::new(Vec::new()));
        let writer = OutputWriter::new(SharedBuf(buf.clone()));
        let config = RunConfig::default();

        run(dir.path(), &config, writer).unwrap();

        let content = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.first().map(|l| l.contains("\"kind\":\"run\"")), Some(true));
        assert_eq!(lines.last().map(|l| l.contains("\"kind\":\"done\"")), Some(true));
        assert!(lines.iter().any(|l| l.contains("\"language\":\"rust\"")));
    }

    #[test]
    fn skips_files_over_max_line_limit() {
        let dir = tempfile::tempdir().unwrap();
        let huge = "fn f() {}\n".repeat(10);
        std::fs::write(dir.path().join("big.rs"), huge).unwrap();

        let buf = Arc::new(Mutex::new(Vec::new()));
        let writer = OutputWriter::new(SharedBuf(buf.clone()));
        let mut config = RunConfig::default();
        config.max_file_lines = 2;

        run(dir.path(), &config, writer).unwrap();

        let content = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn missing_input_path_is_fatal() {
        let config = RunConfig::default();
        let buf = Arc::new(Mutex::new(Vec::new()));
        let writer = OutputWriter::new(SharedBuf(buf));
        let err = run(Path::new("/no/such/path"), &config, writer).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }
}
