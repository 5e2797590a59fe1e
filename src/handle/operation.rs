//! Valued handle shapes
//!
//! [`AsyncOperation`] carries a result value of type `T`;
//! [`AsyncOperationWithProgress`] additionally carries a progress channel of
//! type `P`. Both are cheap clones of one shared core: producers keep one
//! clone and complete it, consumers keep another and observe it.

use std::fmt;
use std::sync::Arc;

use super::core::Core;
use super::error::{Failure, HandleError};
use super::status::AsyncStatus;
use crate::cache;

/// A handle for work that eventually produces a value of type `T`.
pub struct AsyncOperation<T> {
    core: Arc<Core<T, ()>>,
}

impl<T> Clone for AsyncOperation<T> {
    fn clone(&self) -> Self {
        AsyncOperation {
            core: Arc::clone(&self.core),
        }
    }
}

impl<T> fmt::Debug for AsyncOperation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncOperation")
            .field("status", &self.status())
            .finish()
    }
}

impl<T: Send + 'static> AsyncOperation<T> {
    /// A producer-owned handle in the `Started` state.
    pub fn new() -> Self {
        AsyncOperation {
            core: Arc::new(Core::started()),
        }
    }

    /// An already-Completed handle carrying `value`.
    ///
    /// Common values (booleans, integers in `[-1, 10)`, the empty string)
    /// come from the canonical terminal-instance cache; anything else
    /// allocates a fresh terminal handle.
    pub fn completed(value: T) -> Self {
        cache::completed_operation(value)
    }

    /// The canonical already-Canceled handle for this result type.
    pub fn canceled() -> Self {
        cache::canceled_operation()
    }

    /// The canonical already-faulted handle, carrying the generic failure.
    pub fn faulted() -> Self {
        cache::faulted_operation()
    }

    /// A fresh already-faulted handle carrying `err`. Caller-supplied errors
    /// are never shared through the cache.
    pub fn faulted_with<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::faulted_from(Arc::new(err))
    }

    /// A fresh already-faulted handle carrying an existing shared failure.
    pub fn faulted_from(failure: Failure) -> Self {
        AsyncOperation {
            core: Arc::new(Core::faulted(failure, false)),
        }
    }
}

impl<T: Send + 'static> Default for AsyncOperation<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AsyncOperation<T> {
    pub(crate) fn from_core(core: Arc<Core<T, ()>>) -> Self {
        AsyncOperation { core }
    }

    pub(crate) fn core(&self) -> &Arc<Core<T, ()>> {
        &self.core
    }

    /// Current status of the handle.
    pub fn status(&self) -> AsyncStatus {
        self.core.status()
    }

    /// True once the handle reached `Completed`, `Canceled` or `Error`.
    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    /// True when both handles observe the same underlying core, which is how
    /// canonical cached instances are recognized.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }

    /// Strictly transitions `Started -> Completed` with `value`.
    pub fn complete(&self, value: T) -> Result<(), HandleError> {
        self.core.complete(value)
    }

    /// Idempotent completion; returns whether this call won the transition.
    pub fn try_complete(&self, value: T) -> bool {
        self.core.try_complete(value)
    }

    /// Strictly transitions `Started -> Error` with `err`.
    pub fn fail<E>(&self, err: E) -> Result<(), HandleError>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.core.fail(Arc::new(err))
    }

    /// Idempotent failure; returns whether this call won the transition.
    pub fn try_fail<E>(&self, err: E) -> bool
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.core.try_fail(Arc::new(err))
    }

    /// Strict failure with an existing shared failure.
    pub fn fail_with(&self, failure: Failure) -> Result<(), HandleError> {
        self.core.fail(failure)
    }

    /// Idempotent failure with an existing shared failure.
    pub fn try_fail_with(&self, failure: Failure) -> bool {
        self.core.try_fail(failure)
    }

    /// Cancels the handle: the winner of the `Started -> Canceled` race runs
    /// the registered cancellation callbacks in registration order, then the
    /// completion notifier. A no-op once terminal.
    pub fn cancel(&self) {
        self.core.cancel();
    }

    /// Appends `callback` to the cancellation chain; runs immediately if the
    /// handle is already Canceled.
    pub fn register_cancellation(&self, callback: impl FnOnce() + Send + 'static) {
        self.core.register_cancellation(Box::new(callback));
    }

    /// The captured failure, present iff the status is `Error`.
    pub fn failure(&self) -> Option<Failure> {
        self.core.failure()
    }

    /// Fetches the result: the value when Completed, otherwise an error
    /// classified by the current status.
    pub fn get_result(&self) -> Result<T, HandleError>
    where
        T: Clone,
    {
        self.core.get_value()
    }

    /// Assigns the single-assignment completion notifier, which receives the
    /// handle and its final status. Assigning on a terminal handle fires the
    /// callback inline, exactly once; a second assignment is rejected.
    pub fn on_completed<F>(&self, callback: F) -> Result<(), HandleError>
    where
        F: FnOnce(&AsyncOperation<T>, AsyncStatus) + Send + 'static,
        T: Send + 'static,
    {
        let handle = self.clone();
        self.core
            .set_completion(Box::new(move |status| callback(&handle, status)))
    }

    /// Releases the stored value or failure. Idempotent, never changes
    /// status, and a no-op on canonical cached instances.
    pub fn close(&self) {
        self.core.close();
    }
}

/// A handle for work that produces a value of type `T` and reports
/// incremental progress of type `P` while running.
pub struct AsyncOperationWithProgress<T, P> {
    core: Arc<Core<T, P>>,
}

impl<T, P> Clone for AsyncOperationWithProgress<T, P> {
    fn clone(&self) -> Self {
        AsyncOperationWithProgress {
            core: Arc::clone(&self.core),
        }
    }
}

impl<T, P> fmt::Debug for AsyncOperationWithProgress<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncOperationWithProgress")
            .field("status", &self.status())
            .finish()
    }
}

impl<T, P> AsyncOperationWithProgress<T, P>
where
    T: Send + 'static,
    P: Send + 'static,
{
    /// A producer-owned handle in the `Started` state.
    pub fn new() -> Self {
        AsyncOperationWithProgress {
            core: Arc::new(Core::started()),
        }
    }

    /// A fresh already-Completed handle carrying `value`. The value cache
    /// only serves the progress-free shape, so this always allocates.
    pub fn completed(value: T) -> Self {
        AsyncOperationWithProgress {
            core: Arc::new(Core::completed(value, false)),
        }
    }

    /// The canonical already-Canceled handle for this result/progress pair.
    pub fn canceled() -> Self {
        cache::canceled_operation_with_progress()
    }

    /// The canonical already-faulted handle, carrying the generic failure.
    pub fn faulted() -> Self {
        cache::faulted_operation_with_progress()
    }

    /// A fresh already-faulted handle carrying `err`.
    pub fn faulted_with<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::faulted_from(Arc::new(err))
    }

    /// A fresh already-faulted handle carrying an existing shared failure.
    pub fn faulted_from(failure: Failure) -> Self {
        AsyncOperationWithProgress {
            core: Arc::new(Core::faulted(failure, false)),
        }
    }
}

impl<T, P> Default for AsyncOperationWithProgress<T, P>
where
    T: Send + 'static,
    P: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P> AsyncOperationWithProgress<T, P> {
    pub(crate) fn from_core(core: Arc<Core<T, P>>) -> Self {
        AsyncOperationWithProgress { core }
    }

    pub(crate) fn core(&self) -> &Arc<Core<T, P>> {
        &self.core
    }

    /// Current status of the handle.
    pub fn status(&self) -> AsyncStatus {
        self.core.status()
    }

    /// True once the handle reached `Completed`, `Canceled` or `Error`.
    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    /// True when both handles observe the same underlying core.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }

    /// Strictly transitions `Started -> Completed` with `value`.
    pub fn complete(&self, value: T) -> Result<(), HandleError> {
        self.core.complete(value)
    }

    /// Idempotent completion; returns whether this call won the transition.
    pub fn try_complete(&self, value: T) -> bool {
        self.core.try_complete(value)
    }

    /// Strictly transitions `Started -> Error` with `err`.
    pub fn fail<E>(&self, err: E) -> Result<(), HandleError>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.core.fail(Arc::new(err))
    }

    /// Idempotent failure; returns whether this call won the transition.
    pub fn try_fail<E>(&self, err: E) -> bool
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.core.try_fail(Arc::new(err))
    }

    /// Strict failure with an existing shared failure.
    pub fn fail_with(&self, failure: Failure) -> Result<(), HandleError> {
        self.core.fail(failure)
    }

    /// Idempotent failure with an existing shared failure.
    pub fn try_fail_with(&self, failure: Failure) -> bool {
        self.core.try_fail(failure)
    }

    /// Cancels the handle; a no-op once terminal.
    pub fn cancel(&self) {
        self.core.cancel();
    }

    /// Appends `callback` to the cancellation chain.
    pub fn register_cancellation(&self, callback: impl FnOnce() + Send + 'static) {
        self.core.register_cancellation(Box::new(callback));
    }

    /// The captured failure, present iff the status is `Error`.
    pub fn failure(&self) -> Option<Failure> {
        self.core.failure()
    }

    /// Fetches the result, classified by the current status.
    pub fn get_result(&self) -> Result<T, HandleError>
    where
        T: Clone,
    {
        self.core.get_value()
    }

    /// Assigns the single-assignment completion notifier.
    pub fn on_completed<F>(&self, callback: F) -> Result<(), HandleError>
    where
        F: FnOnce(&AsyncOperationWithProgress<T, P>, AsyncStatus) + Send + 'static,
        T: Send + 'static,
        P: Send + 'static,
    {
        let handle = self.clone();
        self.core
            .set_completion(Box::new(move |status| callback(&handle, status)))
    }

    /// Assigns the single-assignment progress notifier, which receives the
    /// handle and each reported progress value while the handle is Started.
    pub fn on_progress<F>(&self, callback: F) -> Result<(), HandleError>
    where
        F: Fn(&AsyncOperationWithProgress<T, P>, &P) + Send + Sync + 'static,
        T: Send + 'static,
        P: Send + 'static,
    {
        let handle = self.clone();
        self.core
            .set_progress(Arc::new(move |progress| callback(&handle, progress)))
    }

    /// Producer-side progress report; dropped once the handle is terminal.
    pub fn report_progress(&self, progress: &P) {
        self.core.report_progress(progress);
    }

    /// Releases the stored value or failure; no-op on cached instances.
    pub fn close(&self) {
        self.core.close();
    }
}
