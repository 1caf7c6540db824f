//! Shared error types for the resilience primitives.
//!
//! The primitives in this crate can only fail at construction time (bad
//! configuration); runtime admission and backoff never error, they block or
//! clamp. `CommonError` therefore stays small; domain crates compose their
//! own taxonomies on top of it.

use std::time::Duration;

use thiserror::Error;

/// Errors produced by the mailgate primitives.
#[derive(Debug, Error)]
pub enum CommonError {
    /// A construction-time parameter failed validation.
    #[error("Configuration error in '{field}': {message}")]
    Config {
        /// The offending parameter.
        field: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// An operation did not complete within its allotted time.
    #[error("Operation '{operation}' timed out after {duration:?}")]
    Timeout {
        /// The operation that was abandoned.
        operation: &'static str,
        /// How long it was given.
        duration: Duration,
    },
}

impl CommonError {
    /// Create a configuration error for the given field.
    pub fn config(field: &'static str, message: impl Into<String>) -> Self {
        Self::Config { field, message: message.into() }
    }

    /// Create a timeout error for the given operation.
    pub fn timeout(operation: &'static str, duration: Duration) -> Self {
        Self::Timeout { operation, duration }
    }
}

/// Result type for operations that fail with [`CommonError`].
pub type CommonResult<T> = Result<T, CommonError>;
