//! # Async Outcome
//!
//! Push-style asynchronous result primitives: a handle represents work that
//! will eventually complete, fail, or be canceled, and notifies consumers by
//! callback instead of a blocking wait. The crate is self-contained -- it
//! does not depend on a host platform's native future type, and foreign
//! asynchronous handles can be adapted into this shape and back.
//!
//! ## Features
//!
//! - `handles` - the core primitive: the four handle shapes, the terminal
//!   state machine, the canonical terminal-instance cache and the
//!   multicast/cast/continuation adapters
//! - `tokio-async` - the Tokio-backed surface: the polling bridge and
//!   `.await` support for handles
//!
//! ## Example
//!
//! ```rust
//! use async_outcome::{AsyncOperation, AsyncStatus};
//!
//! // A producer-owned handle, completed exactly once.
//! let handle = AsyncOperation::<u32>::new();
//! handle
//!     .on_completed(|h, status| {
//!         assert_eq!(status, AsyncStatus::Completed);
//!         assert_eq!(h.get_result().unwrap(), 7);
//!     })
//!     .unwrap();
//! handle.complete(7).unwrap();
//!
//! // Common terminal outcomes come from a shared cache, allocation-free.
//! let a = AsyncOperation::completed(3);
//! let b = AsyncOperation::completed(3);
//! assert!(a.ptr_eq(&b));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

// Conditionally compile modules based on features
#[cfg(feature = "handles")]
pub mod adapt;
#[cfg(feature = "handles")]
pub mod cache;
#[cfg(feature = "handles")]
pub mod handle;
#[cfg(feature = "tokio-async")]
pub mod task;

// Re-export the handle surface
#[cfg(feature = "handles")]
pub use handle::{
    AsyncAction, AsyncActionWithProgress, AsyncOperation, AsyncOperationWithProgress, AsyncStatus,
    Failure, HandleError, ObservableHandle, OperationFailed, PollableHandle, ProgressCallback,
    ProgressSource, TerminalCallback, ValuedHandle,
};

// Re-export the adapters
#[cfg(feature = "handles")]
pub use adapt::{
    continue_with, continue_with_action, continue_with_progress, ActionView, CastOperation,
    Multicast,
};
#[cfg(feature = "tokio-async")]
pub use adapt::bridge_polled;
#[cfg(feature = "tokio-async")]
pub use task::OutcomeFuture;
