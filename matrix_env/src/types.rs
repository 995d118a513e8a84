//! Common types for the CI environment layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable names read by the generator.
pub mod vars {
    /// Explicit seed override
    pub const RNG_SEED: &str = "RNG_SEED";

    /// `refs/pull/<id>/merge` on pull-request builds
    pub const GITHUB_REF: &str = "GITHUB_REF";

    /// Pull-request number, when the workflow exports it directly
    pub const GITHUB_PR_NUMBER: &str = "GITHUB_PR_NUMBER";

    /// Number of random rows on top of the coverage rows
    pub const MATRIX_JOBS: &str = "MATRIX_JOBS";

    /// `owner/name` of the repository running the workflow
    pub const GITHUB_REPOSITORY: &str = "GITHUB_REPOSITORY";

    /// Append-only key/value output file
    pub const GITHUB_OUTPUT: &str = "GITHUB_OUTPUT";

    /// Markdown job summary file
    pub const GITHUB_STEP_SUMMARY: &str = "GITHUB_STEP_SUMMARY";
}

/// Where a seed came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum SeedSource {
    /// Supplied by the operator (`--seed` or `RNG_SEED`)
    Explicit,

    /// Derived from a pull-request id; stable across re-runs of the PR
    PullRequest(String),

    /// Freshly generated
    Random,
}

impl fmt::Display for SeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedSource::Explicit => write!(f, "explicit"),
            SeedSource::PullRequest(id) => write!(f, "pull request #{}", id),
            SeedSource::Random => write!(f, "random"),
        }
    }
}

/// A seed together with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSeed {
    pub value: u64,
    pub source: SeedSource,
}

impl ResolvedSeed {
    pub fn new(value: u64, source: SeedSource) -> Self {
        Self { value, source }
    }

    /// Environment assignment that reproduces this run.
    pub fn reproduce_hint(&self) -> String {
        format!("{}={}", vars::RNG_SEED, self.value)
    }
}

impl fmt::Display for ResolvedSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value, self.source)
    }
}
