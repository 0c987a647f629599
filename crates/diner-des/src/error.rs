use diner_core::FlowId;
use thiserror::Error;

/// Kernel invariant violations.  None of these are recoverable: they mean the
/// caller drove a pool, gate, or scheduler into a state the model forbids.
#[derive(Debug, Error)]
pub enum DesError {
    #[error("pool `{pool}` must have positive capacity")]
    ZeroCapacity { pool: &'static str },

    #[error("pool `{pool}` released with nothing in use")]
    ReleaseWithoutAcquire { pool: &'static str },

    #[error("{flow} is already waiting on pool `{pool}`")]
    AlreadyQueued { pool: &'static str, flow: FlowId },

    #[error("capacity gate generation {generation} fired twice")]
    GateAlreadyFired { generation: u64 },

    #[error("cannot schedule {flow} with delay {delay}")]
    InvalidDelay { flow: FlowId, delay: f64 },

    #[error("{0} is not registered with the scheduler")]
    UnknownFlow(FlowId),
}

pub type DesResult<T> = Result<T, DesError>;
