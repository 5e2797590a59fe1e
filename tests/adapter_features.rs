//! Tests for the multicast, cast and continuation adapters

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_outcome::{
    continue_with, continue_with_action, continue_with_progress, ActionView, AsyncOperation,
    AsyncOperationWithProgress, AsyncStatus, CastOperation, Failure, HandleError, Multicast,
    ValuedHandle,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("boom")]
struct Boom;

#[test]
fn multicast_notifies_every_subscriber() {
    let source = AsyncOperation::<u32>::new();
    let fanout = Multicast::new(source.clone()).unwrap();

    let hits = Arc::new(AtomicUsize::new(0));
    for _ in 0..3 {
        let hits = Arc::clone(&hits);
        fanout.add_completed(move |status| {
            assert_eq!(status, AsyncStatus::Completed);
            hits.fetch_add(1, Ordering::SeqCst);
        });
    }

    source.complete(5).unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 3);
    assert_eq!(fanout.status(), AsyncStatus::Completed);
}

#[test]
fn multicast_relaxes_the_single_assignment_contract() {
    // The raw handle rejects a second notifier...
    let raw = AsyncOperation::<u32>::new();
    raw.on_completed(|_, _| {}).unwrap();
    assert!(matches!(
        raw.on_completed(|_, _| {}),
        Err(HandleError::HandlerAlreadySet)
    ));

    // ...while the multicast view accepts any number of subscribers.
    let source = AsyncOperation::<u32>::new();
    let fanout = Multicast::new(source.clone()).unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let first = Arc::clone(&hits);
    fanout.add_completed(move |_| {
        first.fetch_add(1, Ordering::SeqCst);
    });
    let second = Arc::clone(&hits);
    fanout.add_completed(move |_| {
        second.fetch_add(1, Ordering::SeqCst);
    });
    source.complete(1).unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    // Wrapping consumes the underlying slot, so a second wrap fails.
    assert!(Multicast::new(source).is_err());
}

#[test]
fn multicast_fires_late_subscribers_inline() {
    let source = AsyncOperation::<u32>::new();
    let fanout = Multicast::new(source.clone()).unwrap();
    source.cancel();

    let hits = Arc::new(AtomicUsize::new(0));
    let late = Arc::clone(&hits);
    fanout.add_completed(move |status| {
        assert_eq!(status, AsyncStatus::Canceled);
        late.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn multicast_fans_out_progress() {
    let source = AsyncOperationWithProgress::<u32, u32>::new();
    let fanout = Multicast::with_progress(source.clone()).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    for _ in 0..2 {
        let sink = Arc::clone(&seen);
        fanout.add_progress(move |progress: &u32| sink.lock().push(*progress));
    }

    source.report_progress(&10);
    source.complete(0).unwrap();
    source.report_progress(&11);

    assert_eq!(*seen.lock(), vec![10, 10]);
}

#[test]
fn multicast_double_close_is_harmless() {
    let source = AsyncOperation::<u32>::new();
    let fanout = Multicast::new(source.clone()).unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let dropped = Arc::clone(&hits);
    fanout.add_completed(move |_| {
        dropped.fetch_add(1, Ordering::SeqCst);
    });

    fanout.close();
    fanout.close();

    // Subscribers were detached before the source fired.
    source.complete(1).unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn cast_reinterprets_the_stored_value() {
    let source = AsyncOperation::completed(5i32);
    let cast: CastOperation<_, i32, i64> = CastOperation::new(source);
    assert_eq!(cast.get_result().unwrap(), 5i64);
    assert_eq!(
        async_outcome::ObservableHandle::status(&cast),
        AsyncStatus::Completed
    );
}

#[test]
fn action_view_discards_the_value_and_forwards_status() {
    let source = AsyncOperation::completed(5i32);
    let view = ActionView::new(source);
    assert_eq!(view.get_result().unwrap(), ());

    let canceled = ActionView::new(AsyncOperation::<i32>::canceled());
    assert!(matches!(canceled.get_result(), Err(HandleError::Canceled)));

    let faulted = ActionView::new(AsyncOperation::<i32>::faulted_with(Boom));
    match faulted.get_result() {
        Err(HandleError::Failed(failure)) => assert!(failure.downcast_ref::<Boom>().is_some()),
        other => panic!("expected the forwarded failure, got {other:?}"),
    }
}

#[test]
fn continuation_on_a_completed_source_runs_inline() {
    let source = AsyncOperation::completed(123u32);
    let chained = continue_with(&source, |s| Ok(s.get_result().unwrap())).unwrap();
    assert_eq!(chained.status(), AsyncStatus::Completed);
    assert_eq!(chained.get_result().unwrap(), 123);
}

#[test]
fn continuation_on_a_canceled_source_is_canceled_regardless() {
    let source = AsyncOperation::<u32>::canceled();
    let chained = continue_with(&source, |_| Ok(999u32)).unwrap();
    assert_eq!(chained.status(), AsyncStatus::Canceled);
    assert!(matches!(chained.get_result(), Err(HandleError::Canceled)));
}

#[test]
fn continuation_captures_the_transformations_failure() {
    let source = AsyncOperation::completed(1u32);
    let failure: Failure = Arc::new(Boom);
    let expected = Arc::clone(&failure);
    let chained = continue_with(&source, move |_| Err::<u32, _>(failure)).unwrap();
    assert_eq!(chained.status(), AsyncStatus::Error);
    match chained.get_result() {
        Err(HandleError::Failed(replayed)) => assert!(Arc::ptr_eq(&replayed, &expected)),
        other => panic!("expected the transformation failure, got {other:?}"),
    }
}

#[test]
fn continuation_on_a_running_source_is_deferred() {
    let source = AsyncOperation::<u32>::new();
    let chained = continue_with(&source, |s| Ok(s.get_result().unwrap() * 2)).unwrap();
    assert_eq!(chained.status(), AsyncStatus::Started);

    source.complete(21).unwrap();
    assert_eq!(chained.status(), AsyncStatus::Completed);
    assert_eq!(chained.get_result().unwrap(), 42);
}

#[test]
fn canceling_a_continuation_cancels_its_source() {
    let source = AsyncOperation::<u32>::new();
    let chained = continue_with(&source, |s| Ok(s.get_result().unwrap())).unwrap();

    chained.cancel();
    assert_eq!(source.status(), AsyncStatus::Canceled);
    assert_eq!(chained.status(), AsyncStatus::Canceled);
}

#[test]
fn deferred_cancellation_of_the_source_cancels_the_continuation() {
    let source = AsyncOperation::<u32>::new();
    let chained = continue_with(&source, |_| Ok(0u32)).unwrap();

    source.cancel();
    assert_eq!(chained.status(), AsyncStatus::Canceled);
}

#[test]
fn action_continuation_discards_the_outcome() {
    let source = AsyncOperation::completed(7u32);
    let chained = continue_with_action(&source, |s| {
        s.get_result().map(|_| ()).map_err(|e| Arc::new(e) as Failure)
    })
    .unwrap();
    assert_eq!(chained.status(), AsyncStatus::Completed);
    chained.get_result().unwrap();
}

#[test]
fn progress_continuation_forwards_reports_one_to_one() {
    let source = AsyncOperationWithProgress::<u32, u32>::new();
    let chained = continue_with_progress(&source, |s| Ok(s.get_result().unwrap())).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    chained
        .on_progress(move |_, progress| sink.lock().push(*progress))
        .unwrap();

    source.report_progress(&1);
    source.report_progress(&2);
    source.complete(9).unwrap();

    assert_eq!(*seen.lock(), vec![1, 2]);
    assert_eq!(chained.get_result().unwrap(), 9);
}

#[test]
fn continuation_rejects_a_consumed_notifier_slot() {
    let source = AsyncOperation::<u32>::new();
    source.on_completed(|_, _| {}).unwrap();
    assert!(matches!(
        continue_with(&source, |_| Ok(0u32)),
        Err(HandleError::HandlerAlreadySet)
    ));
}
