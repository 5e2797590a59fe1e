//! Action-shaped handles
//!
//! An action is a handle for work that completes without producing a value:
//! the interesting outcome is only *how* it ended. [`AsyncAction`] is the
//! plain shape; [`AsyncActionWithProgress`] adds a progress channel.

use std::fmt;
use std::sync::Arc;

use super::core::Core;
use super::error::{Failure, HandleError};
use super::status::AsyncStatus;
use crate::cache;

/// A handle for work that eventually completes with no value.
pub struct AsyncAction {
    core: Arc<Core<(), ()>>,
}

impl Clone for AsyncAction {
    fn clone(&self) -> Self {
        AsyncAction {
            core: Arc::clone(&self.core),
        }
    }
}

impl fmt::Debug for AsyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncAction")
            .field("status", &self.status())
            .finish()
    }
}

impl Default for AsyncAction {
    fn default() -> Self {
        Self::new()
    }
}

impl AsyncAction {
    /// A producer-owned handle in the `Started` state.
    pub fn new() -> Self {
        AsyncAction {
            core: Arc::new(Core::started()),
        }
    }

    /// The canonical already-Completed action. Repeated calls return the
    /// same shared instance.
    pub fn completed() -> Self {
        cache::completed_action()
    }

    /// The canonical already-Canceled action.
    pub fn canceled() -> Self {
        cache::canceled_action()
    }

    /// The canonical already-faulted action, carrying the generic failure.
    pub fn faulted() -> Self {
        cache::faulted_action()
    }

    /// A fresh already-faulted action carrying `err`. Caller-supplied errors
    /// are never shared through the cache.
    pub fn faulted_with<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::faulted_from(Arc::new(err))
    }

    /// A fresh already-faulted action carrying an existing shared failure.
    pub fn faulted_from(failure: Failure) -> Self {
        AsyncAction {
            core: Arc::new(Core::faulted(failure, false)),
        }
    }

    pub(crate) fn from_core(core: Arc<Core<(), ()>>) -> Self {
        AsyncAction { core }
    }

    pub(crate) fn core(&self) -> &Arc<Core<(), ()>> {
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

    /// Strictly transitions `Started -> Completed`.
    pub fn complete(&self) -> Result<(), HandleError> {
        self.core.complete(())
    }

    /// Idempotent completion; returns whether this call won the transition.
    pub fn try_complete(&self) -> bool {
        self.core.try_complete(())
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

    /// Cancels the action; a no-op once terminal.
    pub fn cancel(&self) {
        self.core.cancel();
    }

    /// Appends `callback` to the cancellation chain; runs immediately if the
    /// action is already Canceled.
    pub fn register_cancellation(&self, callback: impl FnOnce() + Send + 'static) {
        self.core.register_cancellation(Box::new(callback));
    }

    /// The captured failure, present iff the status is `Error`.
    pub fn failure(&self) -> Option<Failure> {
        self.core.failure()
    }

    /// Succeeds with no value when Completed, otherwise fails with an error
    /// classified by the current status.
    pub fn get_result(&self) -> Result<(), HandleError> {
        self.core.get_value()
    }

    /// Assigns the single-assignment completion notifier.
    pub fn on_completed<F>(&self, callback: F) -> Result<(), HandleError>
    where
        F: FnOnce(&AsyncAction, AsyncStatus) + Send + 'static,
    {
        let handle = self.clone();
        self.core
            .set_completion(Box::new(move |status| callback(&handle, status)))
    }

    /// Releases the stored failure; no-op on canonical cached instances.
    pub fn close(&self) {
        self.core.close();
    }
}

/// A handle for valueless work that reports incremental progress of type `P`
/// while running.
pub struct AsyncActionWithProgress<P> {
    core: Arc<Core<(), P>>,
}

impl<P> Clone for AsyncActionWithProgress<P> {
    fn clone(&self) -> Self {
        AsyncActionWithProgress {
            core: Arc::clone(&self.core),
        }
    }
}

impl<P> fmt::Debug for AsyncActionWithProgress<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncActionWithProgress")
            .field("status", &self.status())
            .finish()
    }
}

impl<P: Send + 'static> Default for AsyncActionWithProgress<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Send + 'static> AsyncActionWithProgress<P> {
    /// A producer-owned handle in the `Started` state.
    pub fn new() -> Self {
        AsyncActionWithProgress {
            core: Arc::new(Core::started()),
        }
    }

    /// The canonical already-Completed action for this progress type.
    pub fn completed() -> Self {
        cache::completed_action_with_progress()
    }

    /// The canonical already-Canceled action for this progress type.
    pub fn canceled() -> Self {
        cache::canceled_action_with_progress()
    }

    /// The canonical already-faulted action for this progress type.
    pub fn faulted() -> Self {
        cache::faulted_action_with_progress()
    }

    /// A fresh already-faulted action carrying `err`.
    pub fn faulted_with<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::faulted_from(Arc::new(err))
    }

    /// A fresh already-faulted action carrying an existing shared failure.
    pub fn faulted_from(failure: Failure) -> Self {
        AsyncActionWithProgress {
            core: Arc::new(Core::faulted(failure, false)),
        }
    }
}

impl<P> AsyncActionWithProgress<P> {
    pub(crate) fn from_core(core: Arc<Core<(), P>>) -> Self {
        AsyncActionWithProgress { core }
    }

    pub(crate) fn core(&self) -> &Arc<Core<(), P>> {
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

    /// Strictly transitions `Started -> Completed`.
    pub fn complete(&self) -> Result<(), HandleError> {
        self.core.complete(())
    }

    /// Idempotent completion; returns whether this call won the transition.
    pub fn try_complete(&self) -> bool {
        self.core.try_complete(())
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

    /// Cancels the action; a no-op once terminal.
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

    /// Succeeds with no value when Completed, otherwise fails with an error
    /// classified by the current status.
    pub fn get_result(&self) -> Result<(), HandleError> {
        self.core.get_value()
    }

    /// Assigns the single-assignment completion notifier.
    pub fn on_completed<F>(&self, callback: F) -> Result<(), HandleError>
    where
        F: FnOnce(&AsyncActionWithProgress<P>, AsyncStatus) + Send + 'static,
        P: Send + 'static,
    {
        let handle = self.clone();
        self.core
            .set_completion(Box::new(move |status| callback(&handle, status)))
    }

    /// Assigns the single-assignment progress notifier.
    pub fn on_progress<F>(&self, callback: F) -> Result<(), HandleError>
    where
        F: Fn(&AsyncActionWithProgress<P>, &P) + Send + Sync + 'static,
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

    /// Releases the stored failure; no-op on cached instances.
    pub fn close(&self) {
        self.core.close();
    }
}
