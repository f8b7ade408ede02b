//! Run configuration: `codeframe-config.yml` in the working directory.

use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Default config file name, looked up in the process working directory.
pub const CONFIG_FILE_NAME: &str = "codeframe-config.yml";

/// Default `.ignore` file name, also looked up in the working directory.
pub const IGNORE_FILE_NAME: &str = ".ignore";

/// Files with strictly more lines than this are skipped before parsing.
pub const DEFAULT_MAX_FILE_LINES: usize = 20_000;

/// Per-run configuration, as described in `spec.md` §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunConfig {
    pub max_file_lines: usize,
    pub hide_sql_table_columns: bool,
    pub analyzers: HashMap<String, bool>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_file_lines: DEFAULT_MAX_FILE_LINES,
            hide_sql_table_columns: false,
            analyzers: HashMap::new(),
        }
    }
}

impl RunConfig {
    /// Load `codeframe-config.yml` from `working_dir`, or fall back to
    /// defaults if the file does not exist.
    pub fn load(working_dir: &Path) -> Result<Self> {
        let path = working_dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: RunConfig = serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::ConfigError { message: format!("{}: {e}", path.display()) })?;
        Ok(config)
    }

    /// Whether a language's analyzer is enabled. Unknown entries in the
    /// config map are ignored by construction (the registry only ever looks
    /// up names from the closed `Language` set); missing entries default to
    /// enabled.
    pub fn is_analyzer_enabled(&self, language_name: &str) -> bool {
        self.analyzers.get(language_name).copied().unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig::load(dir.path()).unwrap();
        assert_eq!(config.max_file_lines, DEFAULT_MAX_FILE_LINES);
        assert!(!config.hide_sql_table_columns);
        assert!(config.is_analyzer_enabled("java"));
    }

    #[test]
    fn parses_partial_yaml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "maxFileLines: 500\nanalyzers:\n  cobol: false\n",
        )
        .unwrap();
        let config = RunConfig::load(dir.path()).unwrap();
        assert_eq!(config.max_file_lines, 500);
        assert!(!config.hide_sql_table_columns);
        assert!(!config.is_analyzer_enabled("cobol"));
        assert!(config.is_analyzer_enabled("java"));
    }

    #[test]
    fn malformed_yaml_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "maxFileLines: [this is not a number\n").unwrap();
        let err = RunConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigError { .. }));
    }
}
