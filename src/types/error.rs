//! Error types for the reasoning core.

use thiserror::Error;

use super::ids::ThreadId;

/// Top-level error returned by the core's external interface.
///
/// Transport-layer failures (`ModelUnavailable`, `ValidatorUnavailable`,
/// `BudgetExceeded`) never surface here — the orchestrator catches those
/// and terminates the thread with a warning instead. Only programmer
/// errors and caller misuse propagate.
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    #[error("thread not found: {0}")]
    NotFound(ThreadId),

    #[error("illegal state for thread {thread_id}: {reason}")]
    IllegalState { thread_id: ThreadId, reason: String },

    #[error("illegal status transition from {from:?} to {to:?}")]
    IllegalTransition {
        from: crate::types::thread::ThreadStatus,
        to: crate::types::thread::ThreadStatus,
    },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised when creating a thread with an unknown model or policy,
/// or when loading `CoreConfig` from the environment.
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("unknown model_id: {0}")]
    UnknownModel(String),

    #[error("unknown policy_id: {0}")]
    UnknownPolicy(String),

    #[error("max_iterations {value} out of range [{min}, {max}]")]
    MaxIterationsOutOfRange { value: u32, min: u32, max: u32 },

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Errors raised by the Thread Store.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("thread not found: {0}")]
    NotFound(ThreadId),

    #[error("iteration budget exceeded for thread {0}")]
    BudgetExceeded(ThreadId),

    #[error("illegal transition for thread {thread_id} from {from:?} to {to:?}")]
    IllegalTransition {
        thread_id: ThreadId,
        from: crate::types::thread::ThreadStatus,
        to: crate::types::thread::ThreadStatus,
    },
}

/// Errors from the LLM adapter. Only `Timeout` and `Transport` are
/// retried by the orchestrator; both collapse into `ModelUnavailable`
/// after the retry is exhausted.
#[derive(Error, Debug, Clone)]
pub enum AdapterError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("timeout after {0:?}")]
    Timeout(std::time::Duration),
}

pub type CoreResult<T> = Result<T, CoreError>;
