//! Error types for matrix registration and generation.

use thiserror::Error;

/// Invalid axis or constraint registration.
///
/// Always raised at registration time, never during generation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Axis registered with an empty name
    #[error("axis name must not be empty")]
    EmptyAxisName,

    /// Axis name already in use
    #[error("axis `{0}` is already registered")]
    DuplicateAxis(String),

    /// Axis registered without any values
    #[error("axis `{0}` has no values")]
    EmptyAxis(String),

    /// Same token listed twice on one axis
    #[error("axis `{axis}` lists value `{token}` more than once")]
    DuplicateValue { axis: String, token: String },

    /// Weight that is zero, negative, NaN or infinite
    #[error("axis `{axis}` value `{token}` has weight {weight}; weights must be positive and finite")]
    InvalidWeight {
        axis: String,
        token: String,
        weight: f64,
    },

    /// Constraint, selector or name pattern naming an axis that does not exist
    #[error("{context} references unknown axis `{axis}`")]
    UnknownAxis { axis: String, context: String },

    /// Exclusion without any axis; it would reject every row
    #[error("{0} has an empty selector and would exclude every row")]
    EmptySelector(String),

    /// Axis added after rows were already emitted
    #[error("axis `{0}` registered after rows were generated")]
    AxisAfterGeneration(String),
}

/// Errors surfaced by [`MatrixBuilder`](crate::MatrixBuilder).
#[derive(Debug, Error)]
pub enum MatrixError {
    /// Registration failure
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A forced row could not be produced (strict mode only)
    #[error("no row satisfies {selector}: {reason}")]
    Unsatisfiable { selector: String, reason: String },

    /// Generation finished with zero rows
    #[error("matrix generation produced no rows")]
    EmptyResult,
}

impl MatrixError {
    /// Creates an unsatisfiable-selector error.
    pub fn unsatisfiable(selector: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        Self::Unsatisfiable {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MatrixError>;
