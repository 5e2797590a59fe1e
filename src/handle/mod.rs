//! The asynchronous-result primitive
//!
//! A handle represents work that will eventually complete, fail, or be
//! canceled, and notifies its consumer by push-style callbacks rather than a
//! blocking wait. Four shapes cover the value/progress matrix:
//!
//! - [`AsyncAction`] - no value, no progress
//! - [`AsyncActionWithProgress`] - no value, with progress
//! - [`AsyncOperation`] - a value of type `T`, no progress
//! - [`AsyncOperationWithProgress`] - a value of type `T`, with progress
//!
//! Producers create a shape in the `Started` state (or take a canonical
//! terminal instance from the [`crate::cache`]) and move it to a terminal
//! state exactly once; consumers attach single-assignment completion and
//! progress notifiers, or observe the handle through the adapters in
//! [`crate::adapt`].

pub mod action;
pub(crate) mod core;
pub mod error;
pub mod observe;
pub mod operation;
pub mod status;

pub use action::{AsyncAction, AsyncActionWithProgress};
pub use error::{Failure, HandleError, OperationFailed};
pub use observe::{
    ObservableHandle, PollableHandle, ProgressCallback, ProgressSource, TerminalCallback,
    ValuedHandle,
};
pub use operation::{AsyncOperation, AsyncOperationWithProgress};
pub use status::AsyncStatus;
