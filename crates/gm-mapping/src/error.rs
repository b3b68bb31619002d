//! Mapping workflow error types.
//!
//! Local errors (`DuplicateId`, `NotFound`, `LocalValidation`) are raised
//! before any remote call. Remote errors are produced by the commit
//! coordinator and retained by the workflow for display.

use thiserror::Error;

/// Errors that can occur while editing or committing mappings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// A candidate id is already in use.
    #[error("Duplicate mapping id '{id}'")]
    DuplicateId {
        /// Conflicting id.
        id: String,
    },

    /// No mapping has the requested id.
    #[error("Mapping not found: {id}")]
    NotFound {
        /// Requested id.
        id: String,
    },

    /// Required input is missing or malformed.
    #[error("Validation error: {0}")]
    LocalValidation(String),

    /// The remote authority rejected the candidate configuration.
    #[error("Configuration test failed: {}", .messages.join("; "))]
    RemoteValidation {
        /// Field-level messages reported by the authority.
        messages: Vec<String>,
    },

    /// The candidate was validated but could not be written.
    #[error("Configuration passed validation but was not saved: {0}")]
    Persistence(String),

    /// Any other failure while talking to the remote authority.
    #[error("An unexpected error occurred")]
    Unexpected(String),

    /// The configuration could not be loaded at session start.
    #[error("Configuration unavailable: {0}")]
    ConfigUnavailable(String),
}

impl MappingError {
    /// Creates a duplicate id error.
    #[must_use]
    pub fn duplicate(id: impl Into<String>) -> Self {
        Self::DuplicateId { id: id.into() }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Creates a local validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::LocalValidation(msg.into())
    }

    /// Returns whether this error was raised before any remote call.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(
            self,
            Self::DuplicateId { .. } | Self::NotFound { .. } | Self::LocalValidation(_)
        )
    }

    /// Returns whether this error came from the remote authority.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::RemoteValidation { .. }
                | Self::Persistence(_)
                | Self::Unexpected(_)
                | Self::ConfigUnavailable(_)
        )
    }

    /// Returns the text shown to the administrator.
    ///
    /// Remote validation messages are joined one per line. Unexpected
    /// failures only show a generic message; the detail is logged.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::RemoteValidation { messages } => messages.join("\n"),
            Self::Unexpected(_) => {
                "An unexpected error occurred. Check the logs for more details.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Result type for mapping operations.
pub type MappingResult<T> = Result<T, MappingError>;

/// Errors reported by a [`ConfigAuthority`](crate::authority::ConfigAuthority).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorityError {
    /// The authority answered and refused the request.
    #[error("Rejected by remote authority ({status}): {}", .messages.join("; "))]
    Rejected {
        /// Status code reported by the authority.
        status: u16,
        /// Messages reported by the authority, one per failing field.
        messages: Vec<String>,
    },

    /// The authority could not be reached or its answer could not be read.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl AuthorityError {
    /// Creates a rejection with a single message.
    #[must_use]
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            messages: vec![message.into()],
        }
    }

    /// Creates a transport error.
    #[must_use]
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}

/// Result type for remote authority calls.
pub type AuthorityResult<T> = Result<T, AuthorityError>;
