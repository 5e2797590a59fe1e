//! Tests for the handle shapes and the terminal state machine

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_outcome::{AsyncAction, AsyncActionWithProgress, AsyncOperation, AsyncStatus, HandleError};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("boom")]
struct Boom;

#[test]
fn fresh_handle_is_started_and_not_ready() {
    let action = AsyncAction::new();
    assert_eq!(action.status(), AsyncStatus::Started);
    assert!(matches!(action.get_result(), Err(HandleError::NotReady)));

    let operation = AsyncOperation::<u32>::new();
    assert_eq!(operation.status(), AsyncStatus::Started);
    assert!(matches!(operation.get_result(), Err(HandleError::NotReady)));
}

#[test]
fn complete_stores_the_value_exactly_once() {
    let operation = AsyncOperation::<u32>::new();
    operation.complete(7).unwrap();
    assert_eq!(operation.status(), AsyncStatus::Completed);
    assert_eq!(operation.get_result().unwrap(), 7);
    // The result replays on every read.
    assert_eq!(operation.get_result().unwrap(), 7);

    assert!(matches!(
        operation.complete(8),
        Err(HandleError::AlreadyTerminal(AsyncStatus::Completed))
    ));
    assert!(!operation.try_complete(9));
    assert_eq!(operation.get_result().unwrap(), 7);
}

#[test]
fn fail_replays_the_same_captured_failure() {
    let operation = AsyncOperation::<u32>::new();
    operation.fail(Boom).unwrap();
    assert_eq!(operation.status(), AsyncStatus::Error);

    let first = match operation.get_result() {
        Err(HandleError::Failed(failure)) => failure,
        other => panic!("expected a replayed failure, got {other:?}"),
    };
    let second = match operation.get_result() {
        Err(HandleError::Failed(failure)) => failure,
        other => panic!("expected a replayed failure, got {other:?}"),
    };
    assert!(Arc::ptr_eq(&first, &second));
    assert!(first.downcast_ref::<Boom>().is_some());
}

#[test]
fn cancel_runs_callbacks_in_registration_order_then_notifies() {
    let operation = AsyncOperation::<u32>::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    let record = Arc::clone(&order);
    operation.register_cancellation(move || record.lock().push("first"));
    let record = Arc::clone(&order);
    operation.register_cancellation(move || record.lock().push("second"));
    let record = Arc::clone(&order);
    operation
        .on_completed(move |_, status| {
            assert_eq!(status, AsyncStatus::Canceled);
            record.lock().push("notified");
        })
        .unwrap();

    operation.cancel();
    assert_eq!(*order.lock(), vec!["first", "second", "notified"]);

    // Idempotent: callbacks do not run again.
    operation.cancel();
    assert_eq!(order.lock().len(), 3);
    assert!(matches!(operation.get_result(), Err(HandleError::Canceled)));
}

#[test]
fn cancellation_registered_after_cancel_runs_immediately() {
    let action = AsyncAction::new();
    action.cancel();
    let ran = Arc::new(AtomicUsize::new(0));
    let hits = Arc::clone(&ran);
    action.register_cancellation(move || {
        hits.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(ran.load(Ordering::SeqCst), 1);
}

#[test]
fn cancellation_registered_on_completed_handle_is_dropped() {
    let action = AsyncAction::new();
    action.complete().unwrap();
    let ran = Arc::new(AtomicUsize::new(0));
    let hits = Arc::clone(&ran);
    action.register_cancellation(move || {
        hits.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(ran.load(Ordering::SeqCst), 0);
}

#[test]
fn late_completion_notifier_fires_inline_exactly_once() {
    let operation = AsyncOperation::<u32>::new();
    operation.complete(3).unwrap();

    let fired = Arc::new(AtomicUsize::new(0));
    let hits = Arc::clone(&fired);
    operation
        .on_completed(move |handle, status| {
            assert_eq!(status, AsyncStatus::Completed);
            assert_eq!(handle.get_result().unwrap(), 3);
            hits.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn second_completion_notifier_is_rejected() {
    let operation = AsyncOperation::<u32>::new();
    operation.on_completed(|_, _| {}).unwrap();
    assert!(matches!(
        operation.on_completed(|_, _| {}),
        Err(HandleError::HandlerAlreadySet)
    ));

    // Still rejected after the handle fires.
    operation.complete(1).unwrap();
    assert!(matches!(
        operation.on_completed(|_, _| {}),
        Err(HandleError::HandlerAlreadySet)
    ));
}

#[test]
fn progress_reports_reach_the_single_assigned_notifier() {
    let action = AsyncActionWithProgress::<u32>::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    // Reports before any notifier is assigned are dropped.
    action.report_progress(&1);

    let sink = Arc::clone(&seen);
    action
        .on_progress(move |_, progress| sink.lock().push(*progress))
        .unwrap();
    assert!(matches!(
        action.on_progress(|_, _| {}),
        Err(HandleError::HandlerAlreadySet)
    ));

    action.report_progress(&2);
    action.report_progress(&3);
    action.complete().unwrap();
    // Reports after the terminal transition are dropped.
    action.report_progress(&4);

    assert_eq!(*seen.lock(), vec![2, 3]);
}

#[test]
fn close_releases_the_payload_and_is_idempotent() {
    let operation = AsyncOperation::<u32>::new();
    operation.complete(42).unwrap();
    assert_eq!(operation.get_result().unwrap(), 42);

    operation.close();
    assert!(matches!(operation.get_result(), Err(HandleError::Closed)));
    // Close never changes status.
    assert_eq!(operation.status(), AsyncStatus::Completed);
    operation.close();
    assert_eq!(operation.status(), AsyncStatus::Completed);
}

#[test]
fn exactly_one_racing_producer_wins() {
    for _ in 0..64 {
        let operation = AsyncOperation::<usize>::new();
        let wins = Arc::new(AtomicUsize::new(0));
        std::thread::scope(|scope| {
            for worker in 0..4 {
                let operation = operation.clone();
                let wins = Arc::clone(&wins);
                scope.spawn(move || {
                    let won = match worker {
                        0 => operation.try_complete(worker),
                        1 => operation.try_fail(Boom),
                        _ => {
                            operation.cancel();
                            // Cancel reports idempotently; count it through
                            // the observed status instead.
                            false
                        }
                    };
                    if won {
                        wins.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        });
        assert!(operation.is_terminal());
        // At most one of complete/fail won; a cancel win leaves both at zero.
        assert!(wins.load(Ordering::SeqCst) <= 1);
        match operation.status() {
            AsyncStatus::Completed | AsyncStatus::Error => {
                assert_eq!(wins.load(Ordering::SeqCst), 1)
            }
            AsyncStatus::Canceled => assert_eq!(wins.load(Ordering::SeqCst), 0),
            AsyncStatus::Started => unreachable!("handle must be terminal"),
        }
    }
}

#[test]
fn status_display_matches_the_wire_names() {
    assert_eq!(AsyncStatus::Started.to_string(), "started");
    assert_eq!(AsyncStatus::Completed.to_string(), "completed");
    assert_eq!(AsyncStatus::Canceled.to_string(), "canceled");
    assert_eq!(AsyncStatus::Error.to_string(), "error");
}
