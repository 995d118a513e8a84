//! Matrix Gen - seeded GitHub Actions test matrix for the pgjdbc driver
//!
//! Builds a small, constraint-respecting sample of the full configuration
//! space instead of the Cartesian product. Coverage rows force the rare
//! and risky values (oldest/newest PostgreSQL, EA Java, same hashcode,
//! scram, ...); a handful of weighted random rows fill the rest.
//!
//! # Pipeline
//!
//! ```text
//!  seed ──► MatrixBuilder ──► coverage rows ──► random rows
//!                                                   │
//!            GITHUB_OUTPUT ◄── export ◄── enrich ◄── sort
//! ```
//!
//! # Usage
//!
//! ```
//! use matrix_gen::MatrixRunner;
//!
//! let report = MatrixRunner::new(42).with_jobs(3).run().unwrap();
//! assert!(report.total_rows() >= report.forced_rows);
//! ```

mod app;
mod enrich;
mod error;
mod exporter;
pub mod profile;
mod runner;

pub use app::{execute, RunOptions};
pub use enrich::enrich_row;
pub use error::GenError;
pub use exporter::{summary_markdown, MatrixExport, OUTPUT_KEY};
pub use profile::PgjdbcProfile;
pub use runner::{MatrixReport, MatrixRunner, DEFAULT_JOBS};
