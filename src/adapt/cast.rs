//! Cast adapter
//!
//! Re-exposes a valued handle under a different declared result shape
//! without re-running the underlying work. [`CastOperation`] converts the
//! stored value through `Into` inside `get_result`; [`ActionView`] discards
//! the value and presents the handle as action-shaped. Status, failures and
//! notifications are forwarded unchanged in both directions.

use std::marker::PhantomData;

use crate::handle::observe::{
    ObservableHandle, ProgressCallback, ProgressSource, TerminalCallback, ValuedHandle,
};
use crate::handle::{AsyncStatus, Failure, HandleError};

/// A valued handle of `T` observed as a handle of `U`, where `U: From<T>`.
///
/// The conversion is a representation-preserving reinterpretation of the
/// stored value performed at read time; no new work is created and the
/// source runs exactly once regardless of how often the cast is read.
pub struct CastOperation<S, T, U> {
    source: S,
    _shape: PhantomData<fn(T) -> U>,
}

impl<S, T, U> CastOperation<S, T, U>
where
    S: ValuedHandle<T>,
    U: From<T>,
{
    /// Wraps `source` without touching its state.
    pub fn new(source: S) -> Self {
        CastOperation {
            source,
            _shape: PhantomData,
        }
    }

    /// The wrapped handle.
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S, T, U> ObservableHandle for CastOperation<S, T, U>
where
    S: ValuedHandle<T>,
    T: Send,
    U: From<T> + Send,
{
    fn status(&self) -> AsyncStatus {
        self.source.status()
    }

    fn cancel(&self) {
        self.source.cancel();
    }

    fn failure(&self) -> Option<Failure> {
        self.source.failure()
    }

    fn on_terminal(&self, callback: TerminalCallback) -> Result<(), HandleError> {
        self.source.on_terminal(callback)
    }

    fn close(&self) {
        self.source.close();
    }
}

impl<S, T, U> ValuedHandle<U> for CastOperation<S, T, U>
where
    S: ValuedHandle<T>,
    T: Send,
    U: From<T> + Send,
{
    fn get_result(&self) -> Result<U, HandleError> {
        self.source.get_result().map(U::from)
    }
}

impl<S, T, U, P> ProgressSource<P> for CastOperation<S, T, U>
where
    S: ValuedHandle<T> + ProgressSource<P>,
{
    fn observe_progress(&self, callback: ProgressCallback<P>) -> Result<(), HandleError> {
        self.source.observe_progress(callback)
    }
}

/// A valued handle observed as an action shape: success discards the value,
/// cancellation and failure propagate unchanged.
pub struct ActionView<S, T> {
    source: S,
    _result: PhantomData<fn() -> T>,
}

impl<S, T> ActionView<S, T>
where
    S: ValuedHandle<T>,
{
    /// Wraps `source` without touching its state.
    pub fn new(source: S) -> Self {
        ActionView {
            source,
            _result: PhantomData,
        }
    }

    /// The wrapped handle.
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S, T> ObservableHandle for ActionView<S, T>
where
    S: ValuedHandle<T>,
    T: Send,
{
    fn status(&self) -> AsyncStatus {
        self.source.status()
    }

    fn cancel(&self) {
        self.source.cancel();
    }

    fn failure(&self) -> Option<Failure> {
        self.source.failure()
    }

    fn on_terminal(&self, callback: TerminalCallback) -> Result<(), HandleError> {
        self.source.on_terminal(callback)
    }

    fn close(&self) {
        self.source.close();
    }
}

impl<S, T> ValuedHandle<()> for ActionView<S, T>
where
    S: ValuedHandle<T>,
    T: Send,
{
    fn get_result(&self) -> Result<(), HandleError> {
        self.source.get_result().map(|_| ())
    }
}

impl<S, T, P> ProgressSource<P> for ActionView<S, T>
where
    S: ValuedHandle<T> + ProgressSource<P>,
{
    fn observe_progress(&self, callback: ProgressCallback<P>) -> Result<(), HandleError> {
        self.source.observe_progress(callback)
    }
}
