//! Shared error types for the nimbus adapter.
//!
//! Every crate in the workspace reports failures through [`NimbusError`].
//! The variants mirror the adapter's error taxonomy:
//!
//! - `InvalidArgument` — caller passed something malformed (bad kind name,
//!   unsupported identifier shape, unsupported filter operator).
//! - `IllegalState` — programmer error in API usage (transaction misuse).
//! - `Conversion` — a column value could not be mapped by the active type
//!   registry. Never silently coerced.
//! - `Backend` — failures surfaced by the Datastore client, propagated
//!   unchanged. Retry policy belongs to the client, not to this layer.

use thiserror::Error;

/// Result type alias used across the workspace.
pub type Result<T> = std::result::Result<T, NimbusError>;

/// Main error type for nimbus operations.
#[derive(Error, Debug)]
pub enum NimbusError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NimbusError {
    /// Creates an InvalidArgument error with a message.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        NimbusError::InvalidArgument(msg.into())
    }

    /// Creates an IllegalState error with a message.
    pub fn illegal_state<S: Into<String>>(msg: S) -> Self {
        NimbusError::IllegalState(msg.into())
    }

    /// Creates a Conversion error with a message.
    pub fn conversion<S: Into<String>>(msg: S) -> Self {
        NimbusError::Conversion(msg.into())
    }

    /// Creates a Backend error with a message.
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        NimbusError::Backend(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NimbusError::invalid_argument("kind must not be empty");
        assert_eq!(err.to_string(), "Invalid argument: kind must not be empty");

        let err = NimbusError::illegal_state("transaction already active");
        assert_eq!(err.to_string(), "Illegal state: transaction already active");
    }

    #[test]
    fn test_error_helpers_match_variants() {
        assert!(matches!(
            NimbusError::conversion("x"),
            NimbusError::Conversion(_)
        ));
        assert!(matches!(NimbusError::backend("x"), NimbusError::Backend(_)));
    }
}
