//! Error types for the CI environment layer.

use thiserror::Error;

/// Errors that can occur while reading the CI environment or writing its
/// output channels.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Variable present but not parseable
    #[error("invalid value for {var}: {value:?} ({reason})")]
    InvalidVar {
        var: String,
        value: String,
        reason: String,
    },

    /// Output value would terminate its own heredoc block early
    #[error("output `{key}` contains its delimiter line `{delimiter}`")]
    DelimiterCollision { key: String, delimiter: String },

    /// Writing an output channel failed
    #[error("failed to write {channel}")]
    Io {
        channel: String,
        #[source]
        source: std::io::Error,
    },
}

impl EnvError {
    /// Creates an invalid-variable error.
    pub fn invalid(var: &str, value: &str, reason: impl std::fmt::Display) -> Self {
        Self::InvalidVar {
            var: var.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates an I/O error for a named channel.
    pub fn io(channel: impl std::fmt::Display, source: std::io::Error) -> Self {
        Self::Io {
            channel: channel.to_string(),
            source,
        }
    }
}
