//! Capability traits over handle shapes
//!
//! Adapters never depend on a concrete handle type. A push-capable handle --
//! including a foreign one bridged into this crate -- implements
//! [`ObservableHandle`] (plus [`ValuedHandle`] when it carries a value and
//! [`ProgressSource`] when it reports progress). A handle that can only be
//! sampled implements [`PollableHandle`] and enters through the polling
//! bridge.

use std::sync::Arc;

use super::action::{AsyncAction, AsyncActionWithProgress};
use super::error::{Failure, HandleError};
use super::operation::{AsyncOperation, AsyncOperationWithProgress};
use super::status::AsyncStatus;

/// One-shot terminal callback accepted by [`ObservableHandle::on_terminal`].
pub type TerminalCallback = Box<dyn FnOnce(AsyncStatus) + Send>;

/// Shared progress callback accepted by [`ProgressSource::observe_progress`].
pub type ProgressCallback<P> = Arc<dyn Fn(&P) + Send + Sync>;

/// The minimal push-capable handle surface: status, cancellation, failure
/// retrieval and a single-assignment terminal notification.
pub trait ObservableHandle: Send + Sync {
    /// Current status of the handle.
    fn status(&self) -> AsyncStatus;

    /// Requests cancellation; a no-op once terminal.
    fn cancel(&self);

    /// The captured failure, present iff the status is `Error`.
    fn failure(&self) -> Option<Failure>;

    /// Assigns the single-assignment terminal callback. Fires inline when
    /// the handle is already terminal; a second assignment is rejected.
    fn on_terminal(&self, callback: TerminalCallback) -> Result<(), HandleError>;

    /// Releases the handle's stored outcome.
    fn close(&self);
}

/// A push-capable handle whose completion carries a value of type `T`.
pub trait ValuedHandle<T>: ObservableHandle {
    /// Fetches the result, classified by the current status.
    fn get_result(&self) -> Result<T, HandleError>;
}

/// A handle that reports incremental progress of type `P`.
pub trait ProgressSource<P> {
    /// Assigns the single-assignment progress callback.
    fn observe_progress(&self, callback: ProgressCallback<P>) -> Result<(), HandleError>;
}

/// A handle that exposes no push notification: it can only be sampled. The
/// polling bridge turns such a handle into a push-style one.
pub trait PollableHandle<T> {
    /// Current status of the handle.
    fn status(&self) -> AsyncStatus;

    /// Requests cancellation; a no-op once terminal.
    fn cancel(&self);

    /// Fetches the result, classified by the current status.
    fn get_result(&self) -> Result<T, HandleError>;
}

impl ObservableHandle for AsyncAction {
    fn status(&self) -> AsyncStatus {
        AsyncAction::status(self)
    }

    fn cancel(&self) {
        AsyncAction::cancel(self)
    }

    fn failure(&self) -> Option<Failure> {
        AsyncAction::failure(self)
    }

    fn on_terminal(&self, callback: TerminalCallback) -> Result<(), HandleError> {
        self.core().set_completion(callback)
    }

    fn close(&self) {
        AsyncAction::close(self)
    }
}

impl ValuedHandle<()> for AsyncAction {
    fn get_result(&self) -> Result<(), HandleError> {
        AsyncAction::get_result(self)
    }
}

impl PollableHandle<()> for AsyncAction {
    fn status(&self) -> AsyncStatus {
        AsyncAction::status(self)
    }

    fn cancel(&self) {
        AsyncAction::cancel(self)
    }

    fn get_result(&self) -> Result<(), HandleError> {
        AsyncAction::get_result(self)
    }
}

impl<P: Send + 'static> ObservableHandle for AsyncActionWithProgress<P> {
    fn status(&self) -> AsyncStatus {
        AsyncActionWithProgress::status(self)
    }

    fn cancel(&self) {
        AsyncActionWithProgress::cancel(self)
    }

    fn failure(&self) -> Option<Failure> {
        AsyncActionWithProgress::failure(self)
    }

    fn on_terminal(&self, callback: TerminalCallback) -> Result<(), HandleError> {
        self.core().set_completion(callback)
    }

    fn close(&self) {
        AsyncActionWithProgress::close(self)
    }
}

impl<P: Send + 'static> ValuedHandle<()> for AsyncActionWithProgress<P> {
    fn get_result(&self) -> Result<(), HandleError> {
        AsyncActionWithProgress::get_result(self)
    }
}

impl<P: Send + 'static> ProgressSource<P> for AsyncActionWithProgress<P> {
    fn observe_progress(&self, callback: ProgressCallback<P>) -> Result<(), HandleError> {
        self.core().set_progress(callback)
    }
}

impl<P: Send + 'static> PollableHandle<()> for AsyncActionWithProgress<P> {
    fn status(&self) -> AsyncStatus {
        AsyncActionWithProgress::status(self)
    }

    fn cancel(&self) {
        AsyncActionWithProgress::cancel(self)
    }

    fn get_result(&self) -> Result<(), HandleError> {
        AsyncActionWithProgress::get_result(self)
    }
}

impl<T: Send + 'static> ObservableHandle for AsyncOperation<T> {
    fn status(&self) -> AsyncStatus {
        AsyncOperation::status(self)
    }

    fn cancel(&self) {
        AsyncOperation::cancel(self)
    }

    fn failure(&self) -> Option<Failure> {
        AsyncOperation::failure(self)
    }

    fn on_terminal(&self, callback: TerminalCallback) -> Result<(), HandleError> {
        self.core().set_completion(callback)
    }

    fn close(&self) {
        AsyncOperation::close(self)
    }
}

impl<T: Clone + Send + 'static> ValuedHandle<T> for AsyncOperation<T> {
    fn get_result(&self) -> Result<T, HandleError> {
        AsyncOperation::get_result(self)
    }
}

impl<T: Clone + Send + 'static> PollableHandle<T> for AsyncOperation<T> {
    fn status(&self) -> AsyncStatus {
        AsyncOperation::status(self)
    }

    fn cancel(&self) {
        AsyncOperation::cancel(self)
    }

    fn get_result(&self) -> Result<T, HandleError> {
        AsyncOperation::get_result(self)
    }
}

impl<T, P> ObservableHandle for AsyncOperationWithProgress<T, P>
where
    T: Send + 'static,
    P: Send + 'static,
{
    fn status(&self) -> AsyncStatus {
        AsyncOperationWithProgress::status(self)
    }

    fn cancel(&self) {
        AsyncOperationWithProgress::cancel(self)
    }

    fn failure(&self) -> Option<Failure> {
        AsyncOperationWithProgress::failure(self)
    }

    fn on_terminal(&self, callback: TerminalCallback) -> Result<(), HandleError> {
        self.core().set_completion(callback)
    }

    fn close(&self) {
        AsyncOperationWithProgress::close(self)
    }
}

impl<T, P> ValuedHandle<T> for AsyncOperationWithProgress<T, P>
where
    T: Clone + Send + 'static,
    P: Send + 'static,
{
    fn get_result(&self) -> Result<T, HandleError> {
        AsyncOperationWithProgress::get_result(self)
    }
}

impl<T, P> ProgressSource<P> for AsyncOperationWithProgress<T, P>
where
    T: Send + 'static,
    P: Send + 'static,
{
    fn observe_progress(&self, callback: ProgressCallback<P>) -> Result<(), HandleError> {
        self.core().set_progress(callback)
    }
}

impl<T, P> PollableHandle<T> for AsyncOperationWithProgress<T, P>
where
    T: Clone + Send + 'static,
    P: Send + 'static,
{
    fn status(&self) -> AsyncStatus {
        AsyncOperationWithProgress::status(self)
    }

    fn cancel(&self) {
        AsyncOperationWithProgress::cancel(self)
    }

    fn get_result(&self) -> Result<T, HandleError> {
        AsyncOperationWithProgress::get_result(self)
    }
}
