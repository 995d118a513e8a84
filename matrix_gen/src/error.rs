//! Error type for a generator run.

use matrix_core::{ConfigError, MatrixError};
use matrix_env::EnvError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error(transparent)]
    Env(#[from] EnvError),

    #[error("failed to serialize matrix")]
    Json(#[from] serde_json::Error),

    #[error("failed to write {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<ConfigError> for GenError {
    fn from(err: ConfigError) -> Self {
        GenError::Matrix(MatrixError::Config(err))
    }
}
