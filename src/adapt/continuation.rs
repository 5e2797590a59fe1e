//! Continuation adapter
//!
//! Chains a transformation onto a handle's eventual outcome. The returned
//! handle derives its terminal state from the source's state and the
//! transformation's own outcome, with one fixed rule: a canceled source
//! always produces a canceled continuation, whatever the transformation
//! would have returned.
//!
//! Execution is deliberately dual-path: when the source is already terminal
//! at attachment time the transformation runs synchronously on the caller's
//! stack, otherwise it runs later on whichever context completes the source.
//! Callers must not assume a uniform call stack or thread identity.

use crate::handle::observe::{ProgressSource, ValuedHandle};
use crate::handle::{
    AsyncAction, AsyncOperation, AsyncOperationWithProgress, AsyncStatus, Failure, HandleError,
};

/// Chains `transform` onto `source`, producing a valued handle.
///
/// `transform` receives the terminal source and typically reads its result;
/// returning `Err` plays the role of a thrown transformation error and
/// faults the returned handle. Canceling the returned handle also cancels
/// the source. Fails with [`HandleError::HandlerAlreadySet`] if the source's
/// completion notifier was already consumed.
pub fn continue_with<S, T, U, F>(source: &S, transform: F) -> Result<AsyncOperation<U>, HandleError>
where
    S: ValuedHandle<T> + Clone + 'static,
    U: Send + 'static,
    F: FnOnce(&S) -> Result<U, Failure> + Send + 'static,
{
    if source.status().is_terminal() {
        if source.status() == AsyncStatus::Canceled {
            return Ok(AsyncOperation::canceled());
        }
        return Ok(match transform(source) {
            Ok(value) => AsyncOperation::completed(value),
            Err(failure) => AsyncOperation::faulted_from(failure),
        });
    }

    let result = AsyncOperation::<U>::new();
    {
        let source = source.clone();
        result.register_cancellation(move || source.cancel());
    }
    let out = result.clone();
    let chained = source.clone();
    source.on_terminal(Box::new(move |status| {
        // Try-setters: a racing external cancel of the result must win
        // cleanly, not corrupt state.
        if status == AsyncStatus::Canceled {
            out.cancel();
        } else {
            match transform(&chained) {
                Ok(value) => {
                    out.try_complete(value);
                }
                Err(failure) => {
                    out.try_fail_with(failure);
                }
            }
        }
    }))?;
    Ok(result)
}

/// Chains `transform` onto `source`, producing an action-shaped handle that
/// discards any transformation value.
pub fn continue_with_action<S, T, F>(source: &S, transform: F) -> Result<AsyncAction, HandleError>
where
    S: ValuedHandle<T> + Clone + 'static,
    F: FnOnce(&S) -> Result<(), Failure> + Send + 'static,
{
    if source.status().is_terminal() {
        if source.status() == AsyncStatus::Canceled {
            return Ok(AsyncAction::canceled());
        }
        return Ok(match transform(source) {
            Ok(()) => AsyncAction::completed(),
            Err(failure) => AsyncAction::faulted_from(failure),
        });
    }

    let result = AsyncAction::new();
    {
        let source = source.clone();
        result.register_cancellation(move || source.cancel());
    }
    let out = result.clone();
    let chained = source.clone();
    source.on_terminal(Box::new(move |status| {
        if status == AsyncStatus::Canceled {
            out.cancel();
        } else {
            match transform(&chained) {
                Ok(()) => {
                    out.try_complete();
                }
                Err(failure) => {
                    out.try_fail_with(failure);
                }
            }
        }
    }))?;
    Ok(result)
}

/// Chains `transform` onto a progress-reporting `source`, forwarding every
/// progress report 1:1 to the returned handle while the source runs.
pub fn continue_with_progress<S, T, U, P, F>(
    source: &S,
    transform: F,
) -> Result<AsyncOperationWithProgress<U, P>, HandleError>
where
    S: ValuedHandle<T> + ProgressSource<P> + Clone + 'static,
    U: Send + 'static,
    P: Send + 'static,
    F: FnOnce(&S) -> Result<U, Failure> + Send + 'static,
{
    if source.status().is_terminal() {
        if source.status() == AsyncStatus::Canceled {
            return Ok(AsyncOperationWithProgress::canceled());
        }
        return Ok(match transform(source) {
            Ok(value) => AsyncOperationWithProgress::completed(value),
            Err(failure) => AsyncOperationWithProgress::faulted_from(failure),
        });
    }

    let result = AsyncOperationWithProgress::<U, P>::new();
    {
        let source = source.clone();
        result.register_cancellation(move || source.cancel());
    }
    {
        let forward = result.clone();
        source.observe_progress(std::sync::Arc::new(move |progress| {
            forward.report_progress(progress)
        }))?;
    }
    let out = result.clone();
    let chained = source.clone();
    source.on_terminal(Box::new(move |status| {
        if status == AsyncStatus::Canceled {
            out.cancel();
        } else {
            match transform(&chained) {
                Ok(value) => {
                    out.try_complete(value);
                }
                Err(failure) => {
                    out.try_fail_with(failure);
                }
            }
        }
    }))?;
    Ok(result)
}
