//! CLI error types.

use gm_mapping::MappingError;
use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Mapping workflow error.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// Workflow settings error.
    #[error(transparent)]
    Settings(#[from] gm_core::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    /// Returns the lines shown to the administrator for this error.
    ///
    /// Remote failures are listed one message per line; anything else is a
    /// single line.
    #[must_use]
    pub fn report_lines(&self) -> Vec<String> {
        match self {
            Self::Mapping(err) if err.is_remote() => err
                .display_message()
                .lines()
                .map(String::from)
                .collect(),
            other => vec![other.to_string()],
        }
    }

    /// Returns whether the error came from a commit attempt.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Mapping(err) if err.is_remote())
    }
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
