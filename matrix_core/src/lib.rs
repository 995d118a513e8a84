//! Matrix Core - constraint-aware weighted sampling of CI build matrices
//!
//! A matrix is a set of axes (Java version, OS, PostgreSQL version, ...),
//! each with a closed list of weighted values. Constraints exclude invalid
//! combinations or make one choice imply another. The builder produces a
//! bounded, deduplicated list of rows that satisfy every constraint.
//!
//! All randomness comes from one [`RandomSource`] seeded with a 64-bit value,
//! so a failing CI matrix can be regenerated exactly from its seed.
//!
//! # Example
//!
//! ```
//! use matrix_core::{Axis, AxisValue, MatrixBuilder, Selector, ValueMatcher};
//!
//! let mut matrix = MatrixBuilder::seeded(42);
//! matrix.add_axis(Axis::new("scram", vec![
//!     AxisValue::new("yes").with_weight(10.0),
//!     AxisValue::new("no").with_weight(10.0),
//! ])).unwrap();
//! matrix.add_axis(Axis::new("pg_version", ["9.0", "10", "14"])).unwrap();
//! matrix.exclude(Selector::new()
//!     .eq("scram", "yes")
//!     .with("pg_version", ValueMatcher::version_below("10"))).unwrap();
//!
//! matrix.generate_row(&Selector::new().eq("scram", "yes")).unwrap();
//! matrix.generate_rows(3);
//! let finished = matrix.finish().unwrap();
//! assert!(finished.rows.iter().all(|r| !(r.token("scram") == "yes" && r.token("pg_version") == "9.0")));
//! ```

pub mod axis;
pub mod builder;
pub mod constraint;
pub mod error;
pub mod rng;
pub mod row;
pub mod selector;

// Re-export key types for convenience
pub use axis::{Axis, AxisValue};
pub use builder::{FinishedMatrix, MatrixBuilder, SearchBudget};
pub use constraint::Constraint;
pub use error::{ConfigError, MatrixError, Result};
pub use rng::RandomSource;
pub use row::{natural_cmp, Cell, Row};
pub use selector::{compare_versions, Assignment, Selector, ValueMatcher};
