//! Polling bridge
//!
//! Adapts a handle that exposes only a pollable status into a push-style
//! [`AsyncOperation`] by sampling the status on a cooperative timer. The
//! bridge never busy-spins: each probe is separated by a
//! [`tokio::time::sleep`], and an already-terminal handle is mapped without
//! spawning anything.

use std::sync::Arc;
use std::time::Duration;

use crate::handle::observe::PollableHandle;
use crate::handle::{AsyncOperation, AsyncStatus, HandleError};

/// Turns a poll-only `source` into a push-style handle, probing its status
/// every `interval`.
///
/// A zero interval polls as fast as the scheduler allows. Canceling the
/// returned handle also cancels the wrapped one; a wrapped handle observed
/// Canceled cancels the returned handle; Completed and Error outcomes are
/// propagated verbatim.
pub fn bridge_polled<H, T>(source: H, interval: Duration) -> AsyncOperation<T>
where
    H: PollableHandle<T> + Send + Sync + 'static,
    T: Send + 'static,
{
    if source.status().is_terminal() {
        return settled(&source);
    }

    let source = Arc::new(source);
    let bridge = AsyncOperation::<T>::new();
    {
        let source = Arc::clone(&source);
        bridge.register_cancellation(move || source.cancel());
    }
    let out = bridge.clone();
    tokio::spawn(async move {
        loop {
            // An externally canceled bridge already canceled the source
            // through the cancellation chain; stop probing.
            if out.is_terminal() {
                break;
            }
            match source.status() {
                AsyncStatus::Started => tokio::time::sleep(interval).await,
                AsyncStatus::Canceled => {
                    out.cancel();
                    break;
                }
                AsyncStatus::Completed | AsyncStatus::Error => {
                    settle_into(&out, source.as_ref());
                    break;
                }
            }
        }
    });
    bridge
}

/// Maps an already-terminal pollable handle straight to a terminal
/// operation, with no polling performed.
fn settled<H, T>(source: &H) -> AsyncOperation<T>
where
    H: PollableHandle<T>,
    T: Send + 'static,
{
    match source.get_result() {
        Ok(value) => AsyncOperation::completed(value),
        Err(HandleError::Canceled) => AsyncOperation::canceled(),
        Err(HandleError::Failed(failure)) => AsyncOperation::faulted_from(failure),
        Err(other) => AsyncOperation::faulted_with(other),
    }
}

fn settle_into<H, T>(out: &AsyncOperation<T>, source: &H)
where
    H: PollableHandle<T>,
    T: Send + 'static,
{
    match source.get_result() {
        Ok(value) => {
            out.try_complete(value);
        }
        Err(HandleError::Canceled) => out.cancel(),
        Err(HandleError::Failed(failure)) => {
            out.try_fail_with(failure);
        }
        Err(other) => {
            out.try_fail(other);
        }
    }
}
