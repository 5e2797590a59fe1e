//! Tests for the canonical terminal-instance cache

use std::sync::Arc;

use async_outcome::{
    AsyncAction, AsyncActionWithProgress, AsyncOperation, AsyncOperationWithProgress, AsyncStatus,
    HandleError,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("boom")]
struct Boom;

#[test]
fn no_payload_action_outcomes_are_singletons() {
    assert!(AsyncAction::completed().ptr_eq(&AsyncAction::completed()));
    assert!(AsyncAction::canceled().ptr_eq(&AsyncAction::canceled()));
    assert!(AsyncAction::faulted().ptr_eq(&AsyncAction::faulted()));

    assert_eq!(AsyncAction::completed().status(), AsyncStatus::Completed);
    assert_eq!(AsyncAction::canceled().status(), AsyncStatus::Canceled);
    assert_eq!(AsyncAction::faulted().status(), AsyncStatus::Error);
}

#[test]
fn no_payload_operation_outcomes_are_singletons_per_type() {
    assert!(AsyncOperation::<u32>::canceled().ptr_eq(&AsyncOperation::<u32>::canceled()));
    assert!(AsyncOperation::<String>::faulted().ptr_eq(&AsyncOperation::<String>::faulted()));
}

#[test]
fn with_progress_outcomes_are_singletons_per_progress_type() {
    assert!(AsyncActionWithProgress::<u32>::completed()
        .ptr_eq(&AsyncActionWithProgress::<u32>::completed()));
    assert!(AsyncActionWithProgress::<u32>::canceled()
        .ptr_eq(&AsyncActionWithProgress::<u32>::canceled()));
    assert!(AsyncActionWithProgress::<u32>::faulted()
        .ptr_eq(&AsyncActionWithProgress::<u32>::faulted()));
    assert!(AsyncOperationWithProgress::<u32, u64>::canceled()
        .ptr_eq(&AsyncOperationWithProgress::<u32, u64>::canceled()));
    assert!(AsyncOperationWithProgress::<u32, u64>::faulted()
        .ptr_eq(&AsyncOperationWithProgress::<u32, u64>::faulted()));
}

#[test]
fn boolean_completions_are_canonical() {
    assert!(AsyncOperation::completed(true).ptr_eq(&AsyncOperation::completed(true)));
    assert!(AsyncOperation::completed(false).ptr_eq(&AsyncOperation::completed(false)));
    assert!(!AsyncOperation::completed(true).ptr_eq(&AsyncOperation::completed(false)));
    assert_eq!(AsyncOperation::completed(true).get_result().unwrap(), true);
}

#[test]
fn small_integer_completions_are_canonical_for_both_widths() {
    for value in -1i32..10 {
        let a = AsyncOperation::completed(value);
        let b = AsyncOperation::completed(value);
        assert!(a.ptr_eq(&b), "i32 {value} should be cached");
        assert_eq!(a.get_result().unwrap(), value);
    }
    for value in -1i64..10 {
        let a = AsyncOperation::completed(value);
        let b = AsyncOperation::completed(value);
        assert!(a.ptr_eq(&b), "i64 {value} should be cached");
        assert_eq!(a.get_result().unwrap(), value);
    }
}

#[test]
fn out_of_range_values_allocate_fresh_handles() {
    let a = AsyncOperation::completed(42);
    let b = AsyncOperation::completed(42);
    assert!(!a.ptr_eq(&b));
    assert_eq!(a.get_result().unwrap(), 42);
    assert_eq!(b.get_result().unwrap(), 42);

    let a = AsyncOperation::completed(10i64);
    let b = AsyncOperation::completed(10i64);
    assert!(!a.ptr_eq(&b));
}

#[test]
fn empty_string_is_canonical_other_strings_are_not() {
    let a = AsyncOperation::completed(String::new());
    let b = AsyncOperation::completed(String::new());
    assert!(a.ptr_eq(&b));
    assert_eq!(a.get_result().unwrap(), "");

    let a = AsyncOperation::completed(String::from("x"));
    let b = AsyncOperation::completed(String::from("x"));
    assert!(!a.ptr_eq(&b));
}

#[test]
fn caller_supplied_errors_are_never_shared() {
    let a = AsyncOperation::<u32>::faulted_with(Boom);
    let b = AsyncOperation::<u32>::faulted_with(Boom);
    assert!(!a.ptr_eq(&b));

    let failure = match a.get_result() {
        Err(HandleError::Failed(failure)) => failure,
        other => panic!("expected a replayed failure, got {other:?}"),
    };
    assert!(failure.downcast_ref::<Boom>().is_some());
    // Replays share the one captured failure.
    let replay = a.failure().unwrap();
    assert!(Arc::ptr_eq(&failure, &replay));
}

#[test]
fn cached_instances_survive_close() {
    let shared = AsyncOperation::completed(3);
    shared.close();
    assert_eq!(shared.get_result().unwrap(), 3);

    let other_holder = AsyncOperation::completed(3);
    assert!(shared.ptr_eq(&other_holder));
    assert_eq!(other_holder.get_result().unwrap(), 3);
}

#[test]
fn cached_instances_accept_repeated_notifier_assignment() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let shared = AsyncAction::completed();
    let fired = Arc::new(AtomicUsize::new(0));
    // Assignment on a cached instance stores nothing and fires inline, so
    // repeating it is permitted.
    for _ in 0..3 {
        let hits = Arc::clone(&fired);
        shared
            .on_completed(move |_, status| {
                assert_eq!(status, AsyncStatus::Completed);
                hits.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
    }
    assert_eq!(fired.load(Ordering::SeqCst), 3);
}

proptest! {
    #[test]
    fn small_i32_range_is_pointer_canonical(value in -1i32..10) {
        let a = AsyncOperation::completed(value);
        let b = AsyncOperation::completed(value);
        prop_assert!(a.ptr_eq(&b));
        prop_assert_eq!(a.get_result().unwrap(), value);
    }

    #[test]
    fn values_outside_the_range_are_fresh(value in prop::num::i32::ANY) {
        prop_assume!(!(-1..10).contains(&value));
        let a = AsyncOperation::completed(value);
        let b = AsyncOperation::completed(value);
        prop_assert!(!a.ptr_eq(&b));
        prop_assert_eq!(a.get_result().unwrap(), value);
    }
}
