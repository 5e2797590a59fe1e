//! Awaitable bridging for handles
//!
//! Wires a handle's completion notifier into a `tokio::sync::oneshot` so the
//! handle can be `.await`ed as an ordinary future. The future resolves to
//! the outcome of `get_result()`: the value when Completed, the cancellation
//! signal, or the replayed failure.

use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::handle::observe::ValuedHandle;
use crate::handle::{
    AsyncAction, AsyncActionWithProgress, AsyncOperation, AsyncOperationWithProgress, AsyncStatus,
    HandleError,
};

/// Future over a handle's eventual outcome.
///
/// Wraps the oneshot receiver fed by the handle's completion notifier. If
/// the notifier slot was already consumed when the future was built, the
/// future resolves immediately with that assignment error.
pub struct OutcomeFuture<H, T> {
    handle: H,
    receiver: oneshot::Receiver<AsyncStatus>,
    attach_error: Option<HandleError>,
    _result: std::marker::PhantomData<fn() -> T>,
}

impl<H, T> OutcomeFuture<H, T>
where
    H: ValuedHandle<T>,
{
    fn attach(handle: H) -> Self {
        let (sender, receiver) = oneshot::channel();
        let attach_error = handle
            .on_terminal(Box::new(move |status| {
                let _ = sender.send(status);
            }))
            .err();
        OutcomeFuture {
            handle,
            receiver,
            attach_error,
            _result: std::marker::PhantomData,
        }
    }
}

impl<H, T> Future for OutcomeFuture<H, T>
where
    H: ValuedHandle<T> + Unpin,
{
    type Output = Result<T, HandleError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if let Some(err) = this.attach_error.take() {
            return Poll::Ready(Err(err));
        }
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Ready(Ok(_status)) => Poll::Ready(this.handle.get_result()),
            // The sender is dropped without firing only when the handle was
            // closed before reaching a terminal state.
            Poll::Ready(Err(_)) => Poll::Ready(Err(HandleError::Closed)),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl IntoFuture for AsyncAction {
    type Output = Result<(), HandleError>;
    type IntoFuture = OutcomeFuture<AsyncAction, ()>;

    fn into_future(self) -> Self::IntoFuture {
        OutcomeFuture::attach(self)
    }
}

impl<P: Send + Sync + 'static> IntoFuture for AsyncActionWithProgress<P> {
    type Output = Result<(), HandleError>;
    type IntoFuture = OutcomeFuture<AsyncActionWithProgress<P>, ()>;

    fn into_future(self) -> Self::IntoFuture {
        OutcomeFuture::attach(self)
    }
}

impl<T: Clone + Send + Sync + 'static> IntoFuture for AsyncOperation<T> {
    type Output = Result<T, HandleError>;
    type IntoFuture = OutcomeFuture<AsyncOperation<T>, T>;

    fn into_future(self) -> Self::IntoFuture {
        OutcomeFuture::attach(self)
    }
}

impl<T, P> IntoFuture for AsyncOperationWithProgress<T, P>
where
    T: Clone + Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    type Output = Result<T, HandleError>;
    type IntoFuture = OutcomeFuture<AsyncOperationWithProgress<T, P>, T>;

    fn into_future(self) -> Self::IntoFuture {
        OutcomeFuture::attach(self)
    }
}
