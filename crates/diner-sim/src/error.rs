use diner_core::CoreError;
use diner_des::DesError;
use thiserror::Error;

/// Fatal simulation errors.
///
/// Expected outcomes such as a full ticket queue or a full restaurant are not
/// errors; see [`Rejection`][crate::Rejection].
#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("invariant violation: {0}")]
    Invariant(String),

    #[error("kernel invariant violation: {0}")]
    Kernel(#[from] DesError),
}

impl From<CoreError> for SimError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::Config(msg) => SimError::Config(msg),
            CoreError::Invariant(msg) => SimError::Invariant(msg),
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
