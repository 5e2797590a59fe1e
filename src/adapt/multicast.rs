//! Multicast adapter
//!
//! A handle's notifier slots are single-assignment. [`Multicast`] wraps one
//! handle and exposes subscriber lists instead: adding a subscriber appends
//! rather than replacing or rejecting. Construction installs exactly one
//! fan-out subscriber on the wrapped handle; that is the only assignment the
//! wrapped handle ever sees.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::handle::observe::{ObservableHandle, ProgressSource};
use crate::handle::{AsyncStatus, Failure, HandleError};

type CompletionSubscriber = Box<dyn FnOnce(AsyncStatus) + Send>;
type ProgressSubscriber<P> = Arc<dyn Fn(&P) + Send + Sync>;

struct Shared<P> {
    /// Recorded final status once the fan-out hook fired. Guards the
    /// subscriber lists: a subscriber added after this is set fires inline.
    final_status: Mutex<Option<AsyncStatus>>,
    completion: Mutex<Vec<CompletionSubscriber>>,
    progress: Mutex<Vec<ProgressSubscriber<P>>>,
    closed: AtomicBool,
}

impl<P> Shared<P> {
    fn new() -> Self {
        Shared {
            final_status: Mutex::new(None),
            completion: Mutex::new(Vec::new()),
            progress: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Fan-out hook installed on the wrapped handle. Records the final
    /// status and drains the subscriber list; subscribers run outside the
    /// locks.
    fn fire(&self, status: AsyncStatus) {
        let drained = {
            let mut recorded = self.final_status.lock();
            *recorded = Some(status);
            let mut subscribers = self.completion.lock();
            self.progress.lock().clear();
            std::mem::take(&mut *subscribers)
        };
        for subscriber in drained {
            subscriber(status);
        }
    }

    fn fan_progress(&self, progress: &P) {
        let subscribers = self.progress.lock().clone();
        for subscriber in subscribers {
            subscriber(progress);
        }
    }
}

/// Multi-subscriber view over a single-subscriber handle.
pub struct Multicast<H, P = ()> {
    source: H,
    shared: Arc<Shared<P>>,
}

impl<H: ObservableHandle> Multicast<H> {
    /// Wraps `source`, consuming its completion notifier slot with the
    /// fan-out hook. Fails if that slot was already assigned.
    pub fn new(source: H) -> Result<Self, HandleError> {
        let shared = Arc::new(Shared::new());
        let hook = Arc::clone(&shared);
        source.on_terminal(Box::new(move |status| hook.fire(status)))?;
        Ok(Multicast { source, shared })
    }
}

impl<H, P> Multicast<H, P>
where
    H: ObservableHandle + ProgressSource<P>,
    P: Send + Sync + 'static,
{
    /// Wraps a progress-reporting `source`, consuming both of its notifier
    /// slots with fan-out hooks.
    pub fn with_progress(source: H) -> Result<Self, HandleError> {
        let shared = Arc::new(Shared::new());
        let completion_hook = Arc::clone(&shared);
        source.on_terminal(Box::new(move |status| completion_hook.fire(status)))?;
        let progress_hook = Arc::clone(&shared);
        source.observe_progress(Arc::new(move |progress| progress_hook.fan_progress(progress)))?;
        Ok(Multicast { source, shared })
    }

    /// Adds a progress subscriber. Subscribers added after the source went
    /// terminal are dropped; no further progress can arrive.
    pub fn add_progress(&self, subscriber: impl Fn(&P) + Send + Sync + 'static) {
        let recorded = self.shared.final_status.lock();
        if recorded.is_none() {
            self.shared.progress.lock().push(Arc::new(subscriber));
        }
    }
}

impl<H: ObservableHandle, P> Multicast<H, P> {
    /// Adds a completion subscriber. Unlike the wrapped handle's notifier,
    /// this appends; a subscriber added after the source fired is invoked
    /// immediately with the recorded final status.
    pub fn add_completed(&self, subscriber: impl FnOnce(AsyncStatus) + Send + 'static) {
        let fire_with = {
            let recorded = self.shared.final_status.lock();
            match *recorded {
                Some(status) => Some(status),
                None => {
                    self.shared.completion.lock().push(Box::new(subscriber));
                    return;
                }
            }
        };
        if let Some(status) = fire_with {
            subscriber(status);
        }
    }

    /// Current status of the wrapped handle.
    pub fn status(&self) -> AsyncStatus {
        self.source.status()
    }

    /// Requests cancellation of the wrapped handle.
    pub fn cancel(&self) {
        self.source.cancel();
    }

    /// The wrapped handle's captured failure, if any.
    pub fn failure(&self) -> Option<Failure> {
        self.source.failure()
    }

    /// The wrapped handle.
    pub fn source(&self) -> &H {
        &self.source
    }

    /// Detaches and clears the subscriber lists exactly once and propagates
    /// `close` to the wrapped handle. A racing double-close is harmless.
    pub fn close(&self) {
        if self.shared.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.shared.completion.lock().clear();
        self.shared.progress.lock().clear();
        self.source.close();
    }
}
