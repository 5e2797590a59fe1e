//! Adapters over the handle shapes
//!
//! Four ways to reshape how a handle is observed, all preserving the
//! underlying "terminal exactly once" contract:
//!
//! - [`multicast`] - many subscribers over a single-subscriber handle
//! - [`cast`] - a valued handle observed under a different result shape
//! - [`continuation`] - a transformation chained onto the eventual outcome
//! - [`polling`] - a poll-only handle turned push-style (needs `tokio-async`)

pub mod cast;
pub mod continuation;
pub mod multicast;
#[cfg(feature = "tokio-async")]
pub mod polling;

pub use cast::{ActionView, CastOperation};
pub use continuation::{continue_with, continue_with_action, continue_with_progress};
pub use multicast::Multicast;
#[cfg(feature = "tokio-async")]
pub use polling::bridge_polled;
