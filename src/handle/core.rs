//! Shared state machine behind every handle shape
//!
//! A [`Core`] owns the atomic status word, the outcome slots (value or
//! failure), the single-assignment notifier slots and the cancellation
//! callback chain. One compare-and-set guards the `Started -> terminal`
//! edge; the outcome slots are written under the same lock readers take, so
//! any observer that sees a terminal status can fetch the outcome without
//! racing the producer. Callbacks are always invoked after the lock is
//! released.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::error::{Failure, HandleError};
use super::status::AsyncStatus;

/// One-shot completion callback, invoked with the final status.
pub(crate) type CompletionFn = Box<dyn FnOnce(AsyncStatus) + Send>;

/// Progress callback, invoked zero or more times while `Started`.
pub(crate) type ProgressFn<P> = Arc<dyn Fn(&P) + Send + Sync>;

/// Cancellation-chain callback.
pub(crate) type CancelFn = Box<dyn FnOnce() + Send>;

/// Single-assignment completion notifier slot.
///
/// `Fired` records that the callback was (or will never be) delivered, so a
/// second assignment can be rejected even after the handle went terminal.
enum CompletionSlot {
    Unset,
    Set(CompletionFn),
    Fired,
}

struct Inner<T, P> {
    value: Option<T>,
    failure: Option<Failure>,
    completion: CompletionSlot,
    progress: Option<ProgressFn<P>>,
    on_cancel: Vec<CancelFn>,
    closed: bool,
}

pub(crate) struct Core<T, P = ()> {
    status: AtomicU8,
    /// Canonical cache entries are shared and immutable: their notifier
    /// setters store nothing and `close` is a no-op.
    cached: bool,
    inner: Mutex<Inner<T, P>>,
}

impl<T, P> Core<T, P> {
    fn with_status(
        status: AsyncStatus,
        value: Option<T>,
        failure: Option<Failure>,
        cached: bool,
    ) -> Self {
        Core {
            status: AtomicU8::new(status.as_u8()),
            cached,
            inner: Mutex::new(Inner {
                value,
                failure,
                completion: CompletionSlot::Unset,
                progress: None,
                on_cancel: Vec::new(),
                closed: false,
            }),
        }
    }

    /// A producer-owned handle in the `Started` state.
    pub(crate) fn started() -> Self {
        Self::with_status(AsyncStatus::Started, None, None, false)
    }

    /// A handle born `Completed` with `value`.
    pub(crate) fn completed(value: T, cached: bool) -> Self {
        Self::with_status(AsyncStatus::Completed, Some(value), None, cached)
    }

    /// A handle born `Canceled`.
    pub(crate) fn canceled(cached: bool) -> Self {
        Self::with_status(AsyncStatus::Canceled, None, None, cached)
    }

    /// A handle born `Error`, carrying `failure`.
    pub(crate) fn faulted(failure: Failure, cached: bool) -> Self {
        Self::with_status(AsyncStatus::Error, None, Some(failure), cached)
    }

    pub(crate) fn status(&self) -> AsyncStatus {
        AsyncStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    /// Performs the one-way `Started -> terminal` transition.
    ///
    /// The winner writes the outcome via `fill`, drains the cancellation
    /// chain (run only for a cancel transition) and takes the completion
    /// notifier; both kinds of callback run after the lock is dropped, the
    /// cancellation chain strictly before the completion notification.
    fn transition(&self, to: AsyncStatus, fill: impl FnOnce(&mut Inner<T, P>)) -> bool {
        debug_assert!(to.is_terminal());
        let (chain, completion) = {
            let mut inner = self.inner.lock();
            if self
                .status
                .compare_exchange(
                    AsyncStatus::Started.as_u8(),
                    to.as_u8(),
                    Ordering::AcqRel,
                    Ordering::Acquire,
                )
                .is_err()
            {
                return false;
            }
            fill(&mut inner);
            // Progress reports racing this transition are dropped.
            inner.progress = None;
            let chain = std::mem::take(&mut inner.on_cancel);
            let completion = match std::mem::replace(&mut inner.completion, CompletionSlot::Fired)
            {
                CompletionSlot::Set(callback) => Some(callback),
                CompletionSlot::Unset => {
                    // Leave the slot assignable; a late assignment fires
                    // inline with the final status.
                    inner.completion = CompletionSlot::Unset;
                    None
                }
                CompletionSlot::Fired => None,
            };
            (chain, completion)
        };
        if to == AsyncStatus::Canceled {
            for callback in chain {
                callback();
            }
        }
        if let Some(callback) = completion {
            callback(to);
        }
        true
    }

    /// Idempotent completion; returns whether this call won the transition.
    pub(crate) fn try_complete(&self, value: T) -> bool {
        self.transition(AsyncStatus::Completed, |inner| inner.value = Some(value))
    }

    /// Idempotent failure; returns whether this call won the transition.
    pub(crate) fn try_fail(&self, failure: Failure) -> bool {
        self.transition(AsyncStatus::Error, |inner| inner.failure = Some(failure))
    }

    /// Strict completion for producers that treat a lost race as a bug.
    pub(crate) fn complete(&self, value: T) -> Result<(), HandleError> {
        if self.try_complete(value) {
            Ok(())
        } else {
            Err(HandleError::AlreadyTerminal(self.status()))
        }
    }

    /// Strict failure for producers that treat a lost race as a bug.
    pub(crate) fn fail(&self, failure: Failure) -> Result<(), HandleError> {
        if self.try_fail(failure) {
            Ok(())
        } else {
            Err(HandleError::AlreadyTerminal(self.status()))
        }
    }

    /// Cancels the handle. Exactly one concurrent caller performs the
    /// transition; every later or losing call is a no-op.
    pub(crate) fn cancel(&self) -> bool {
        self.transition(AsyncStatus::Canceled, |_| {})
    }

    /// Appends `callback` to the cancellation chain. On an already-Canceled
    /// handle the callback runs immediately; on other terminal states it is
    /// dropped.
    pub(crate) fn register_cancellation(&self, callback: CancelFn) {
        {
            let mut inner = self.inner.lock();
            if self.status() == AsyncStatus::Started {
                inner.on_cancel.push(callback);
                return;
            }
        }
        if self.status() == AsyncStatus::Canceled {
            callback();
        }
    }

    /// Assigns the single-assignment completion notifier.
    ///
    /// On a terminal handle the callback fires inline, exactly once. On a
    /// cached instance nothing is stored: the callback is invoked with the
    /// (terminal) status and the shared slot stays untouched.
    pub(crate) fn set_completion(&self, callback: CompletionFn) -> Result<(), HandleError> {
        if self.cached {
            callback(self.status());
            return Ok(());
        }
        let fire_with = {
            let mut inner = self.inner.lock();
            match inner.completion {
                CompletionSlot::Unset => {
                    let status = self.status();
                    if status.is_terminal() {
                        inner.completion = CompletionSlot::Fired;
                        Some(status)
                    } else {
                        inner.completion = CompletionSlot::Set(callback);
                        return Ok(());
                    }
                }
                CompletionSlot::Set(_) | CompletionSlot::Fired => {
                    return Err(HandleError::HandlerAlreadySet)
                }
            }
        };
        if let Some(status) = fire_with {
            callback(status);
        }
        Ok(())
    }

    /// Assigns the single-assignment progress notifier. Assignment on a
    /// terminal (or cached) handle is accepted and dropped: no progress can
    /// ever be reported again.
    pub(crate) fn set_progress(&self, callback: ProgressFn<P>) -> Result<(), HandleError> {
        if self.cached {
            return Ok(());
        }
        let mut inner = self.inner.lock();
        if self.status().is_terminal() {
            return Ok(());
        }
        if inner.progress.is_some() {
            return Err(HandleError::HandlerAlreadySet);
        }
        inner.progress = Some(callback);
        Ok(())
    }

    /// Delivers one progress report to the assigned notifier, outside the
    /// lock. Reports on a terminal handle are dropped; a report racing the
    /// terminal transition may be dropped as well.
    pub(crate) fn report_progress(&self, progress: &P) {
        if self.status().is_terminal() {
            return;
        }
        let callback = self.inner.lock().progress.clone();
        if let Some(callback) = callback {
            if !self.status().is_terminal() {
                callback(progress);
            }
        }
    }

    /// The captured failure, present iff the status is `Error`.
    pub(crate) fn failure(&self) -> Option<Failure> {
        self.inner.lock().failure.clone()
    }

    /// Fetches the outcome, classified by the current status.
    pub(crate) fn get_value(&self) -> Result<T, HandleError>
    where
        T: Clone,
    {
        match self.status() {
            AsyncStatus::Started => Err(HandleError::NotReady),
            AsyncStatus::Canceled => Err(HandleError::Canceled),
            AsyncStatus::Error => {
                let inner = self.inner.lock();
                if inner.closed {
                    return Err(HandleError::Closed);
                }
                Err(HandleError::Failed(
                    inner.failure.clone().unwrap_or_else(super::error::generic_failure),
                ))
            }
            AsyncStatus::Completed => {
                let inner = self.inner.lock();
                if inner.closed {
                    return Err(HandleError::Closed);
                }
                inner.value.clone().ok_or(HandleError::Closed)
            }
        }
    }

    /// Releases the stored outcome and callbacks. Idempotent, never changes
    /// status, and a no-op on cached instances so shared payloads survive.
    pub(crate) fn close(&self) {
        if self.cached {
            return;
        }
        let mut inner = self.inner.lock();
        if inner.closed {
            return;
        }
        inner.closed = true;
        inner.value = None;
        inner.failure = None;
        inner.progress = None;
        inner.on_cancel.clear();
        if matches!(inner.completion, CompletionSlot::Set(_)) {
            inner.completion = CompletionSlot::Fired;
        }
    }
}
