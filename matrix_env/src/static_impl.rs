//! Fixed, in-memory implementation of CiEnvironment.

use crate::context::CiEnvironment;
use crate::error::EnvError;
use crate::output::heredoc_entry;
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Environment with a fixed variable map that captures its outputs.
///
/// Used to replay a CI run locally and in tests.
#[derive(Debug, Default)]
pub struct StaticEnvironment {
    vars: BTreeMap<String, String>,
    outputs: RefCell<String>,
    summary: RefCell<String>,
}

impl StaticEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a variable.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Everything appended to the output channel so far.
    pub fn outputs(&self) -> String {
        self.outputs.borrow().clone()
    }

    /// Everything appended to the summary so far.
    pub fn summary(&self) -> String {
        self.summary.borrow().clone()
    }
}

impl CiEnvironment for StaticEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn append_output(&self, key: &str, value: &str) -> Result<bool, EnvError> {
        let entry = heredoc_entry(key, value)?;
        self.outputs.borrow_mut().push_str(&entry);
        Ok(true)
    }

    fn append_summary(&self, markdown: &str) -> Result<bool, EnvError> {
        self.summary.borrow_mut().push_str(markdown);
        Ok(true)
    }
}
