//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

/// Errors produced by `sr-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A context field is malformed or out of range.  Rejected at the
    /// request boundary, before risk attachment.
    #[error("invalid context field `{field}`: {reason}")]
    InvalidContext {
        field:  &'static str,
        reason: String,
    },
}

/// Shorthand result type for `sr-core`.
pub type CoreResult<T> = Result<T, CoreError>;
