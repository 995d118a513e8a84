//! Matrix generator CLI
//!
//! Prints the matrix and appends it to `GITHUB_OUTPUT` for the test job.

use clap::Parser;
use matrix_core::SearchBudget;
use matrix_env::ProcessEnvironment;
use matrix_gen::{execute, RunOptions};
use std::path::PathBuf;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

/// Seeded GitHub Actions test matrix generator
#[derive(Parser, Debug)]
#[command(name = "matrix-gen")]
#[command(about = "Generate a seeded CI test matrix for pgjdbc", long_about = None)]
struct Args {
    /// Seed (number or any text); overrides RNG_SEED and the PR-derived seed
    #[arg(short, long)]
    seed: Option<String>,

    /// Random rows on top of the coverage rows (default: MATRIX_JOBS or 5)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// owner/name of the repository (default: GITHUB_REPOSITORY)
    #[arg(long)]
    repository: Option<String>,

    /// Output file for the `matrix` key (default: GITHUB_OUTPUT)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Markdown summary file (default: GITHUB_STEP_SUMMARY)
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Also write the pretty JSON document to this file
    #[arg(long)]
    export: Option<PathBuf>,

    /// Fail when a coverage row cannot be satisfied
    #[arg(long)]
    strict: bool,

    /// Fresh search attempts per row
    #[arg(long, default_value_t = SearchBudget::default().max_attempts)]
    max_attempts: usize,

    /// Backtrack steps per search attempt
    #[arg(long, default_value_t = SearchBudget::default().max_backtracks)]
    max_backtracks: usize,

    /// Print only the compact JSON document
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the matrix
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("warning: tracing subscriber already installed");
    }

    if let Err(e) = run(args) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut env = ProcessEnvironment::new();
    if let Some(path) = &args.output {
        env = env.with_output_path(path);
    }
    if let Some(path) = &args.summary {
        env = env.with_summary_path(path);
    }

    let options = RunOptions {
        seed: args.seed,
        jobs: args.jobs,
        repository: args.repository,
        export: args.export,
        strict: args.strict,
        budget: SearchBudget {
            max_attempts: args.max_attempts,
            max_backtracks: args.max_backtracks,
        },
        json: args.json,
    };
    execute(&options, &env, &mut std::io::stdout().lock())?;
    Ok(())
}
