//! The ambient "currently rendering" hook stack.
//!
//! Hook primitives (`use_state`, `use_effect`, ...) need to find the
//! [`LifeCycleHook`](crate::hook::LifeCycleHook) belonging to the element
//! whose render function is presently executing, without the host having to
//! thread a context parameter through every call. The design note in §9
//! explicitly warns against a "naked process-wide global" — the scoping
//! device used here is a `thread_local!`, which is sound specifically
//! because the single-threaded cooperative scheduling model (§5) pins a
//! given [`Layout`](crate::layout::Layout) and every future it drives to one
//! OS thread via a `tokio::task::LocalSet`. Two independent Layouts running
//! on two different threads each get their own stack; a single Layout never
//! observes another's.
//!
//! The stack exists, rather than a single `Option<Rc<LifeCycleHook>>`,
//! because an element's render may suspend mid-hook-call while another
//! element begins rendering on the same turn of the executor (§4.2
//! rationale) — the top of the stack always names whichever element
//! currently holds the CPU.

use std::cell::RefCell;
use std::rc::Rc;

use crate::hook::LifeCycleHook;

thread_local! {
    static HOOK_STACK: RefCell<Vec<Rc<LifeCycleHook>>> = const { RefCell::new(Vec::new()) };
}

/// Push a hook onto the current thread's ambient stack.
///
/// Called by [`WithHook`](crate::hook::WithHook) immediately before polling
/// the wrapped render future; paired 1:1 with [`pop`].
pub(crate) fn push(hook: Rc<LifeCycleHook>) {
    HOOK_STACK.with(|stack| stack.borrow_mut().push(hook));
}

/// Pop the most recently pushed hook.
///
/// Called after every `poll` of the wrapped render future, whether it
/// returned `Pending` or `Ready` — the stack must not retain stale entries
/// across suspension points.
pub(crate) fn pop() {
    HOOK_STACK.with(|stack| {
        stack.borrow_mut().pop();
    });
}

/// Returns the [`LifeCycleHook`] for the element currently rendering on this
/// thread.
///
/// # Panics
///
/// Panics if called outside of an element's render — i.e. not from within
/// code driven by [`WithHook`]. This mirrors the grounding codebase's
/// "Hook called outside component render" diagnostic
/// (`flui_core::hooks::hook_context`): calling a hook primitive from a
/// detached callback or after render has completed is a host bug, not a
/// recoverable runtime condition.
pub fn current() -> Rc<LifeCycleHook> {
    HOOK_STACK.with(|stack| stack.borrow().last().cloned()).unwrap_or_else(|| {
        panic!(
            "hook primitive called with no element currently rendering. \
             Hooks (use_state, use_effect, ...) may only be called from \
             inside an Element::render body, synchronously or across an \
             `.await` within it — never from a detached task or callback."
        )
    })
}

/// Returns `true` if a hook is currently active on this thread, without
/// panicking. Used by hook primitives that want to assert context more
/// gracefully than [`current`], and by tests.
pub fn is_active() -> bool {
    HOOK_STACK.with(|stack| !stack.borrow().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::LifeCycleHook;

    #[test]
    fn stack_is_lifo() {
        assert!(!is_active());
        let a = Rc::new(LifeCycleHook::new_for_test("a"));
        let b = Rc::new(LifeCycleHook::new_for_test("b"));

        push(a.clone());
        push(b.clone());
        assert_eq!(current().owner_id(), "b");

        pop();
        assert_eq!(current().owner_id(), "a");

        pop();
        assert!(!is_active());
    }

    #[test]
    #[should_panic(expected = "no element currently rendering")]
    fn current_panics_without_active_hook() {
        let _ = current();
    }
}
