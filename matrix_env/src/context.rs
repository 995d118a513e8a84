//! Core environment trait for the matrix generator.

use crate::error::EnvError;
use crate::types::vars;

/// The generator's view of the CI system.
///
/// Abstracts environment variables and output channels so that generation
/// runs the same way against the real process environment and against a
/// fixed in-memory one.
///
/// # Implementations
///
/// - **Production**: `ProcessEnvironment` - `std::env` and the files named by
///   `GITHUB_OUTPUT` / `GITHUB_STEP_SUMMARY`
/// - **Fixed**: `StaticEnvironment` - a variable map and captured outputs
pub trait CiEnvironment {
    /// Raw variable lookup.
    fn var(&self, key: &str) -> Option<String>;

    /// Appends `key=value` to the CI output channel.
    ///
    /// Returns `Ok(false)` when no output channel is configured.
    fn append_output(&self, key: &str, value: &str) -> Result<bool, EnvError>;

    /// Appends markdown to the job summary.
    ///
    /// Returns `Ok(false)` when no summary channel is configured.
    fn append_summary(&self, markdown: &str) -> Result<bool, EnvError>;

    /// Non-empty, trimmed variable value.
    fn non_empty_var(&self, key: &str) -> Option<String> {
        self.var(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Explicit seed override.
    fn seed_override(&self) -> Option<String> {
        self.non_empty_var(vars::RNG_SEED)
    }

    /// Pull-request id from `GITHUB_REF` (`refs/pull/<id>/...`), falling back
    /// to `GITHUB_PR_NUMBER`.
    fn pull_request_id(&self) -> Option<String> {
        self.non_empty_var(vars::GITHUB_REF)
            .and_then(|r| {
                r.strip_prefix("refs/pull/")
                    .and_then(|rest| rest.split('/').next())
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
            })
            .or_else(|| self.non_empty_var(vars::GITHUB_PR_NUMBER))
    }

    /// Row-count override from `MATRIX_JOBS`.
    fn jobs_override(&self) -> Result<Option<usize>, EnvError> {
        match self.non_empty_var(vars::MATRIX_JOBS) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<usize>()
                .map(Some)
                .map_err(|e| EnvError::invalid(vars::MATRIX_JOBS, &raw, e)),
        }
    }

    /// `owner/name` of the repository.
    fn repository(&self) -> Option<String> {
        self.non_empty_var(vars::GITHUB_REPOSITORY)
    }
}
