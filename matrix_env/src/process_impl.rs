//! Production implementation of CiEnvironment backed by the process.

use crate::context::CiEnvironment;
use crate::error::EnvError;
use crate::output::heredoc_entry;
use crate::types::vars;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment backed by `std::env` and the GitHub Actions output files.
#[derive(Debug, Clone, Default)]
pub struct ProcessEnvironment {
    /// Key/value output file (`GITHUB_OUTPUT`)
    output_path: Option<PathBuf>,

    /// Job summary file (`GITHUB_STEP_SUMMARY`)
    summary_path: Option<PathBuf>,
}

impl ProcessEnvironment {
    /// Reads the output channel locations from the process environment.
    pub fn new() -> Self {
        let path = |key: &str| {
            std::env::var_os(key)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        Self {
            output_path: path(vars::GITHUB_OUTPUT),
            summary_path: path(vars::GITHUB_STEP_SUMMARY),
        }
    }

    /// Overrides the output file.
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Overrides the summary file.
    pub fn with_summary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.summary_path = Some(path.into());
        self
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    pub fn summary_path(&self) -> Option<&Path> {
        self.summary_path.as_deref()
    }
}

fn append(path: &Path, text: &str) -> Result<(), EnvError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| EnvError::io(path.display(), e))?;
    file.write_all(text.as_bytes())
        .map_err(|e| EnvError::io(path.display(), e))
}

impl CiEnvironment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn append_output(&self, key: &str, value: &str) -> Result<bool, EnvError> {
        let Some(path) = &self.output_path else {
            return Ok(false);
        };
        append(path, &heredoc_entry(key, value)?)?;
        debug!(key, path = %path.display(), "appended CI output");
        Ok(true)
    }

    fn append_summary(&self, markdown: &str) -> Result<bool, EnvError> {
        let Some(path) = &self.summary_path else {
            return Ok(false);
        };
        append(path, markdown)?;
        Ok(true)
    }
}
