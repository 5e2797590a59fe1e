//! Terminal-instance cache
//!
//! Canonical, immutable, shared handles for the terminal outcomes that
//! producers request constantly, so the common paths allocate nothing:
//!
//! - one shared no-payload instance per shape (and per progress type) for
//!   "already completed", "already canceled" and the generic "already
//!   faulted" outcome; a faulted outcome carrying a caller-supplied error is
//!   always fresh, errors are never shared;
//! - value tables for `AsyncOperation<T>` completions: `true`/`false`,
//!   `i32`/`i64` in `[-1, 10)` and the empty `String`. Any other value
//!   bypasses the cache.
//!
//! Dispatch is a closed set of typed tables probed by `dyn Any` downcast on
//! the requested value, because the same generic shape is requested with
//! many concrete values. Cached cores are flagged so their notifier setters
//! store nothing and `close` is a no-op; sharing them is safe because no
//! consumer can mutate shared state through them.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;

use crate::handle::core::Core;
use crate::handle::error::generic_failure;
use crate::handle::{
    AsyncAction, AsyncActionWithProgress, AsyncOperation, AsyncOperationWithProgress,
};

static COMPLETED_ACTION: LazyLock<AsyncAction> =
    LazyLock::new(|| AsyncAction::from_core(Arc::new(Core::completed((), true))));

static CANCELED_ACTION: LazyLock<AsyncAction> =
    LazyLock::new(|| AsyncAction::from_core(Arc::new(Core::canceled(true))));

static FAULTED_ACTION: LazyLock<AsyncAction> =
    LazyLock::new(|| AsyncAction::from_core(Arc::new(Core::faulted(generic_failure(), true))));

pub(crate) fn completed_action() -> AsyncAction {
    COMPLETED_ACTION.clone()
}

pub(crate) fn canceled_action() -> AsyncAction {
    CANCELED_ACTION.clone()
}

pub(crate) fn faulted_action() -> AsyncAction {
    FAULTED_ACTION.clone()
}

/// Which terminal outcome a canonical registry entry represents. Part of the
/// registry key: one core type has three distinct canonical instances.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum Outcome {
    Completed,
    Canceled,
    Faulted,
}

/// Canonical instances for generic shapes, keyed by the monomorphized core
/// type and the outcome. Statics cannot depend on type parameters, so the
/// per-(result, progress) singletons live here.
static CANONICAL: LazyLock<Mutex<HashMap<(TypeId, Outcome), Arc<dyn Any + Send + Sync>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn canonical<C>(outcome: Outcome, make: impl FnOnce() -> C) -> Arc<C>
where
    C: Any + Send + Sync,
{
    let erased = {
        let mut table = CANONICAL.lock();
        table
            .entry((TypeId::of::<C>(), outcome))
            .or_insert_with(|| Arc::new(make()) as Arc<dyn Any + Send + Sync>)
            .clone()
    };
    erased
        .downcast::<C>()
        .expect("canonical registry entry matches its key type")
}

pub(crate) fn canceled_operation<T: Send + 'static>() -> AsyncOperation<T> {
    AsyncOperation::from_core(canonical(Outcome::Canceled, || Core::<T, ()>::canceled(true)))
}

pub(crate) fn faulted_operation<T: Send + 'static>() -> AsyncOperation<T> {
    AsyncOperation::from_core(canonical(Outcome::Faulted, || {
        Core::<T, ()>::faulted(generic_failure(), true)
    }))
}

pub(crate) fn completed_action_with_progress<P: Send + 'static>() -> AsyncActionWithProgress<P> {
    AsyncActionWithProgress::from_core(canonical(Outcome::Completed, || {
        Core::<(), P>::completed((), true)
    }))
}

pub(crate) fn canceled_action_with_progress<P: Send + 'static>() -> AsyncActionWithProgress<P> {
    AsyncActionWithProgress::from_core(canonical(Outcome::Canceled, || {
        Core::<(), P>::canceled(true)
    }))
}

pub(crate) fn faulted_action_with_progress<P: Send + 'static>() -> AsyncActionWithProgress<P> {
    AsyncActionWithProgress::from_core(canonical(Outcome::Faulted, || {
        Core::<(), P>::faulted(generic_failure(), true)
    }))
}

pub(crate) fn canceled_operation_with_progress<T, P>() -> AsyncOperationWithProgress<T, P>
where
    T: Send + 'static,
    P: Send + 'static,
{
    AsyncOperationWithProgress::from_core(canonical(Outcome::Canceled, || {
        Core::<T, P>::canceled(true)
    }))
}

pub(crate) fn faulted_operation_with_progress<T, P>() -> AsyncOperationWithProgress<T, P>
where
    T: Send + 'static,
    P: Send + 'static,
{
    AsyncOperationWithProgress::from_core(canonical(Outcome::Faulted, || {
        Core::<T, P>::faulted(generic_failure(), true)
    }))
}

/// Cached value range for the integer tables: `[-1, 10)`.
const SMALL_INT_BASE: i64 = -1;
const SMALL_INT_COUNT: usize = 11;

static TRUE_OPERATION: LazyLock<Arc<Core<bool, ()>>> =
    LazyLock::new(|| Arc::new(Core::completed(true, true)));

static FALSE_OPERATION: LazyLock<Arc<Core<bool, ()>>> =
    LazyLock::new(|| Arc::new(Core::completed(false, true)));

static SMALL_I32: LazyLock<[Arc<Core<i32, ()>>; SMALL_INT_COUNT]> = LazyLock::new(|| {
    std::array::from_fn(|i| Arc::new(Core::completed(SMALL_INT_BASE as i32 + i as i32, true)))
});

static SMALL_I64: LazyLock<[Arc<Core<i64, ()>>; SMALL_INT_COUNT]> = LazyLock::new(|| {
    std::array::from_fn(|i| Arc::new(Core::completed(SMALL_INT_BASE + i as i64, true)))
});

static EMPTY_STRING_OPERATION: LazyLock<Arc<Core<String, ()>>> =
    LazyLock::new(|| Arc::new(Core::completed(String::new(), true)));

/// A completed operation for `value`, canonical when the value is in one of
/// the typed tables, freshly allocated otherwise.
pub(crate) fn completed_operation<T: Send + 'static>(value: T) -> AsyncOperation<T> {
    if let Some(core) = cached_value_core(&value) {
        return AsyncOperation::from_core(core);
    }
    AsyncOperation::from_core(Arc::new(Core::completed(value, false)))
}

/// Probes the typed value tables. The reshape step is a same-type downcast
/// and cannot miss once a table matched; a miss just falls through to a
/// fresh allocation.
fn cached_value_core<T: Send + 'static>(value: &T) -> Option<Arc<Core<T, ()>>> {
    let probe: &dyn Any = value;
    if let Some(flag) = probe.downcast_ref::<bool>() {
        let core = if *flag {
            TRUE_OPERATION.clone()
        } else {
            FALSE_OPERATION.clone()
        };
        return reshape(core);
    }
    if let Some(number) = probe.downcast_ref::<i32>() {
        if let Some(index) = small_int_index(i64::from(*number)) {
            return reshape(SMALL_I32[index].clone());
        }
        return None;
    }
    if let Some(number) = probe.downcast_ref::<i64>() {
        if let Some(index) = small_int_index(*number) {
            return reshape(SMALL_I64[index].clone());
        }
        return None;
    }
    if let Some(text) = probe.downcast_ref::<String>() {
        if text.is_empty() {
            return reshape(EMPTY_STRING_OPERATION.clone());
        }
    }
    None
}

fn small_int_index(value: i64) -> Option<usize> {
    if (SMALL_INT_BASE..SMALL_INT_BASE + SMALL_INT_COUNT as i64).contains(&value) {
        Some((value - SMALL_INT_BASE) as usize)
    } else {
        None
    }
}

fn reshape<S, T>(core: Arc<Core<S, ()>>) -> Option<Arc<Core<T, ()>>>
where
    S: Send + 'static,
    T: Send + 'static,
{
    let erased: Arc<dyn Any + Send + Sync> = core;
    erased.downcast::<Core<T, ()>>().ok()
}
