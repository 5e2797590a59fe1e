//! Error taxonomy for handle operations
//!
//! Reading a handle's result classifies the failure by the handle's current
//! status: a result read on a Started handle is [`HandleError::NotReady`], on
//! a Canceled handle it is the distinct cancellation signal, and on an Error
//! handle it replays the producer's captured failure verbatim. State
//! violations (double transition, reassigned notifier) surface immediately at
//! the call site and are never swallowed.

use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

use super::status::AsyncStatus;

/// A captured failure, shared so it can be replayed on every result read.
pub type Failure = Arc<dyn StdError + Send + Sync + 'static>;

/// Errors surfaced by handle mutation and observation entry points.
#[derive(Debug, Clone, Error)]
pub enum HandleError {
    /// The result was read while the handle is still `Started`.
    #[error("the operation has not completed yet")]
    NotReady,

    /// The cancellation signal, distinct from ordinary failures so callers
    /// can special-case it.
    #[error("the operation was canceled")]
    Canceled,

    /// A strict mutation attempted a second terminal transition.
    #[error("the operation already reached the {0} state")]
    AlreadyTerminal(AsyncStatus),

    /// A single-assignment notifier slot was assigned twice.
    #[error("a completion or progress handler was already assigned")]
    HandlerAlreadySet,

    /// The handle was closed and its payload released.
    #[error("the handle was closed")]
    Closed,

    /// The producer's captured failure, replayed on every result read.
    #[error("the operation failed: {0}")]
    Failed(Failure),
}

impl HandleError {
    /// The captured failure, when this error replays one.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            HandleError::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// True for the cancellation signal.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, HandleError::Canceled)
    }
}

/// Synthesized failure for faulted handles whose producer supplied no error,
/// so reading an Error handle never succeeds.
#[derive(Debug, Clone, Copy, Error)]
#[error("the asynchronous operation failed")]
pub struct OperationFailed;

pub(crate) fn generic_failure() -> Failure {
    Arc::new(OperationFailed)
}
