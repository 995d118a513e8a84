//! Matrix runner - defines the profile, forces coverage rows, samples the
//! rest and enriches the result.

use crate::enrich::enrich_row;
use crate::error::GenError;
use crate::exporter::MatrixExport;
use crate::profile::PgjdbcProfile;

use matrix_core::{natural_cmp, MatrixBuilder, SearchBudget};
use tracing::{debug, info};

/// Random rows added on top of the coverage rows.
pub const DEFAULT_JOBS: usize = 5;

/// Results from one generator run.
#[derive(Debug, Clone)]
pub struct MatrixReport {
    /// Seed used
    pub seed: u64,

    /// Coverage rows that produced a new row
    pub forced_rows: usize,

    /// Random rows added afterwards
    pub random_rows: usize,

    /// Final document
    pub export: MatrixExport,
}

impl MatrixReport {
    pub fn total_rows(&self) -> usize {
        self.export.include.len()
    }
}

/// Generates the matrix for one seed.
#[derive(Debug, Clone)]
pub struct MatrixRunner {
    /// Seed for the single random stream
    seed: u64,

    /// Random rows requested after coverage
    jobs: usize,

    /// Matrix definition
    profile: PgjdbcProfile,

    /// Fail on unsatisfiable coverage rows
    strict: bool,

    /// Search bounds
    budget: SearchBudget,
}

impl MatrixRunner {
    /// Creates a new runner.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            jobs: DEFAULT_JOBS,
            profile: PgjdbcProfile::default(),
            strict: false,
            budget: SearchBudget::default(),
        }
    }

    /// Sets the number of random rows.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Sets the matrix definition.
    pub fn with_profile(mut self, profile: PgjdbcProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Makes unsatisfiable coverage rows fatal.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets the search budget.
    pub fn with_budget(mut self, budget: SearchBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Runs generation and returns the enriched, sorted matrix.
    pub fn run(&self) -> Result<MatrixReport, GenError> {
        info!(seed = self.seed, jobs = self.jobs, "generating matrix");

        let mut matrix = MatrixBuilder::seeded(self.seed).with_budget(self.budget);
        matrix.fail_on_unsatisfiable(self.strict);
        self.profile.define(&mut matrix)?;

        let mut forced_rows = 0;
        for selector in self.profile.coverage(&matrix) {
            if matrix.generate_row(&selector)?.is_some() {
                forced_rows += 1;
            }
        }
        debug!(forced_rows, "coverage rows generated");

        let before = matrix.rows().len();
        let random_rows = matrix.generate_rows(self.jobs).len() - before;

        let mut finished = matrix.finish()?;
        finished.rows.sort_by(|a, b| natural_cmp(a.name(), b.name()));

        // Enrichment draws continue the generation stream
        let include = finished
            .rows
            .iter()
            .map(|row| enrich_row(row, &mut finished.rng))
            .collect();

        let report = MatrixReport {
            seed: self.seed,
            forced_rows,
            random_rows,
            export: MatrixExport::new(include),
        };
        info!(
            rows = report.total_rows(),
            forced = forced_rows,
            random = random_rows,
            "matrix ready"
        );
        Ok(report)
    }
}
