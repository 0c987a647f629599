//! Base error type.
//!
//! Sub-crates define their own error enums and convert `CoreError` into them
//! via `From` impls.

use thiserror::Error;

/// The top-level error type for `diner-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Rejected input detected before any simulated event runs.
    #[error("configuration error: {0}")]
    Config(String),

    /// A core invariant was broken.  Always a defect; the run must abort.
    #[error("invariant violation: {0}")]
    Invariant(String),
}

/// Shorthand result type for `diner-core`.
pub type CoreResult<T> = Result<T, CoreError>;
