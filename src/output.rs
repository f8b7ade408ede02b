//! JSON-line record writer (`spec.md` §5, §6).
//!
//! Every record is one `serde_json`-serialized object followed by a
//! newline, written under a single mutex with an explicit flush after each
//! write (`spec.md` §5 "Shared resources: Output writer"). The stream
//! always opens with a `kind=run` envelope and closes with a `kind=done`
//! envelope; everything between is either an analysis record or a
//! `kind=error` record, in completion order rather than submission order.

use crate::analyzers::AnalysisRecord;
use crate::core::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::sync::Mutex;

#[derive(Serialize)]
struct RunEnvelope<'a> {
    kind: &'static str,
    started_at: DateTime<Utc>,
    input_path: &'a str,
    total_files: usize,
}

#[derive(Serialize)]
struct DoneEnvelope {
    kind: &'static str,
    ended_at: DateTime<Utc>,
    files_analyzed: usize,
    files_with_errors: usize,
    duration_seconds: f64,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    kind: &'static str,
    file: &'a str,
    language: &'a str,
    error: &'a str,
}

/// The single writer through which every record in a run passes. `W` is
/// generic so tests can target an in-memory buffer instead of a file.
pub struct OutputWriter<W: Write> {
    inner: Mutex<W>,
}

impl<W: Write> OutputWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { inner: Mutex::new(writer) }
    }

    fn write_line(&self, line: &str) -> Result<()> {
        let mut guard = self.inner.lock().expect("output writer mutex poisoned");
        guard.write_all(line.as_bytes())?;
        guard.write_all(b"\n")?;
        guard.flush()?;
        Ok(())
    }

    /// The first record of any run (`spec.md` §5, §8).
    pub fn write_run(&self, started_at: DateTime<Utc>, input_path: &str, total_files: usize) -> Result<()> {
        let envelope = RunEnvelope { kind: "run", started_at, input_path, total_files };
        self.write_line(&serde_json::to_string(&envelope)?)
    }

    /// The last record of any run (`spec.md` §5, §8).
    pub fn write_done(
        &self,
        ended_at: DateTime<Utc>,
        files_analyzed: usize,
        files_with_errors: usize,
        duration_seconds: f64,
    ) -> Result<()> {
        let envelope = DoneEnvelope { kind: "done", ended_at, files_analyzed, files_with_errors, duration_seconds };
        self.write_line(&serde_json::to_string(&envelope)?)
    }

    /// A per-file failure (`spec.md` §7 "Per-file failure").
    pub fn write_error(&self, file: &str, language: &str, error: &str) -> Result<()> {
        let envelope = ErrorEnvelope { kind: "error", file, language, error };
        self.write_line(&serde_json::to_string(&envelope)?)
    }

    /// A successful analysis record, discriminated downstream by its own
    /// `language` field rather than a `kind` wrapper (`spec.md` §6).
    pub fn write_analysis(&self, record: &AnalysisRecord) -> Result<()> {
        let line = match record {
            AnalysisRecord::General(a) => serde_json::to_string(a)?,
            AnalysisRecord::Cobol(a) => serde_json::to_string(a)?,
            AnalysisRecord::Sql(a) => serde_json::to_string(a)?,
        };
        self.write_line(&line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileAnalysis;
    use std::sync::Arc;

    #[test]
    fn writes_newline_delimited_records() {
        let buf: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));

        struct SharedBuf(Arc<Mutex<Vec<u8>>>);
        impl Write for SharedBuf {
            fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().write(data)
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let writer = OutputWriter::new(SharedBuf(buf.clone()));
        writer.write_run(Utc::now(), "/tmp/in", 2).unwrap();
        writer.write_analysis(&AnalysisRecord::General(FileAnalysis::new("a.rs", "rust"))).unwrap();
        writer.write_error("b.rs", "rust", "boom").unwrap();
        writer.write_done(Utc::now(), 1, 1, 0.5).unwrap();

        let content = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("\"kind\":\"run\""));
        assert!(lines[1].contains("\"language\":\"rust\""));
        assert!(lines[2].contains("\"kind\":\"error\""));
        assert!(lines[3].contains("\"kind\":\"done\""));
    }
}
