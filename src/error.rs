//! Error types for shield construction.
//!
//! Request handling has no error path: once a [`crate::engine::ProbeShield`]
//! exists, every decision is infallible. Everything here surfaces at
//! configuration time.

use thiserror::Error;

/// Errors raised while building the effective rule list.
#[derive(Debug, Error)]
pub enum ShieldError {
    /// A caller-supplied addition or exclusion is not a valid regular expression.
    #[error("invalid signature pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
