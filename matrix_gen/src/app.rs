//! One generator invocation: resolve settings, generate, then deliver.
//!
//! Everything that can fail during rendering happens before the first byte
//! is written. Delivery order is export file, `GITHUB_OUTPUT`, step summary,
//! and stdout last, so a failed run never leaves a matrix on stdout.

use crate::error::GenError;
use crate::exporter::{summary_markdown, OUTPUT_KEY};
use crate::profile::PgjdbcProfile;
use crate::runner::{MatrixReport, MatrixRunner, DEFAULT_JOBS};

use matrix_core::SearchBudget;
use matrix_env::{heredoc_entry, resolve_seed, CiEnvironment};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

/// Settings for one run; unset fields fall back to the environment.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Seed text (number or any string)
    pub seed: Option<String>,

    /// Random rows on top of the coverage rows
    pub jobs: Option<usize>,

    /// `owner/name` of the repository
    pub repository: Option<String>,

    /// Extra file receiving the pretty document
    pub export: Option<PathBuf>,

    /// Fail on unsatisfiable coverage rows
    pub strict: bool,

    /// Search bounds
    pub budget: SearchBudget,

    /// Print the compact document instead of the pretty one
    pub json: bool,
}

/// Generates the matrix and delivers it to every configured channel.
pub fn execute<E, W>(options: &RunOptions, env: &E, stdout: &mut W) -> Result<MatrixReport, GenError>
where
    E: CiEnvironment + ?Sized,
    W: Write,
{
    let seed = resolve_seed(options.seed.as_deref(), env);
    info!(seed = seed.value, source = %seed.source, "using seed");
    info!("reproduce with {}", seed.reproduce_hint());

    let jobs = match options.jobs {
        Some(jobs) => jobs,
        None => env.jobs_override()?.unwrap_or(DEFAULT_JOBS),
    };
    let repository = options.repository.clone().or_else(|| env.repository());
    let profile = PgjdbcProfile::for_repository(repository.as_deref());
    debug!(?repository, self_hosted = profile.self_hosted, "profile selected");

    let report = MatrixRunner::new(seed.value)
        .with_jobs(jobs)
        .with_profile(profile)
        .with_strict(options.strict)
        .with_budget(options.budget)
        .run()?;

    // Render and validate everything up front
    let compact = report.export.to_compact_json()?;
    heredoc_entry(OUTPUT_KEY, &compact)?;
    let printed = if options.json {
        compact.clone()
    } else {
        report.export.to_pretty_json()?
    };
    let summary = summary_markdown(&seed, &report.export);

    if let Some(path) = &options.export {
        report.export.write_to_file(path)?;
        info!("exported {} rows to {}", report.total_rows(), path.display());
    }
    if !report.export.publish(env)? {
        debug!("no GITHUB_OUTPUT configured, matrix not published");
    }
    if !env.append_summary(&summary)? {
        debug!("no GITHUB_STEP_SUMMARY configured");
    }

    writeln!(stdout, "{}", printed).map_err(|source| GenError::Io {
        path: "stdout".to_string(),
        source,
    })?;
    Ok(report)
}
