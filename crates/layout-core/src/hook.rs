//! Per-element hook state: the `Hook` trait, the ordered cell sequence, and
//! the `LifeCycleHook` context that owns it.
//!
//! Grounded in `flui-reactivity::traits::Hook` and
//! `flui_core::hooks::hook_context::HookContext`: a hook is a reusable piece
//! of stateful logic keyed by *position* within one component's render, not
//! by name. `LifeCycleHook` plays the role that crate's `HookContext` plays
//! per-component, except scoped to a single element for this element's
//! entire mounted lifetime (the design's `ElementState.lifeCycleHook`)
//! rather than to one render pass.

use std::any::Any;
use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use crate::layout::UpdateSender;

/// A reusable piece of stateful logic keyed by call position.
///
/// # Type Parameters
///
/// - `State` — persisted between calls for the lifetime of the mount.
/// - `Input` — parameters supplied on every call (first call uses them to
///   build `create`'s argument as well as to immediately `update`).
/// - `Output` — the value handed back to the calling hook primitive.
pub trait Hook: 'static {
    /// Persistent state for this hook cell.
    type State: 'static;
    /// Per-call input.
    type Input: 'static;
    /// Per-call output.
    type Output;

    /// Build the initial state. Called exactly once, on the render during
    /// which this cell is first allocated.
    fn create(input: &Self::Input) -> Self::State;

    /// Called on every render (including the one that just created the
    /// state) to produce this call's output.
    fn update(state: &mut Self::State, input: Self::Input) -> Self::Output;

    /// Called once, when the owning element unmounts. Default: drop state.
    fn cleanup(state: Self::State) {
        drop(state);
    }
}

/// A type-erased, positional hook cell.
struct HookCell {
    state: Box<dyn Any>,
    cleanup: Box<dyn FnOnce(Box<dyn Any>)>,
}

impl HookCell {
    fn new<H: Hook>(state: H::State) -> Self {
        Self {
            state: Box::new(state),
            cleanup: Box::new(|state| {
                if let Ok(state) = state.downcast::<H::State>() {
                    H::cleanup(*state);
                }
            }),
        }
    }
}

/// Per-element state container and hook context (§4.2).
///
/// One `LifeCycleHook` is created the first time its owning element is
/// encountered and lives until that element unmounts; hook cells persist
/// across every intervening render (re-rendering does *not* reset them —
/// only unmount does, per §4.6's edge-case policy).
pub struct LifeCycleHook {
    /// Id of the element this hook belongs to — used for diagnostics and by
    /// tests, not part of the public hook-primitive surface.
    owner_id: String,
    cells: RefCell<Vec<HookCell>>,
    cursor: RefCell<usize>,
    /// Bound re-render trigger: hook primitives that mutate state (e.g. the
    /// `use_state` setter) call this to schedule a re-render of the owning
    /// element, closing the loop described in §2.
    update: UpdateSender,
}

impl LifeCycleHook {
    pub(crate) fn new(owner_id: String, update: UpdateSender) -> Self {
        Self {
            owner_id,
            cells: RefCell::new(Vec::new()),
            cursor: RefCell::new(0),
            update,
        }
    }

    #[cfg(test)]
    pub(crate) fn new_for_test(owner_id: &str) -> Self {
        Self::new(owner_id.to_string(), UpdateSender::noop())
    }

    /// Id of the element owning this hook context.
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Schedule a re-render of the owning element. Hook primitives call
    /// this when their state changes; it is otherwise not part of the
    /// public API a host element body reaches for directly.
    pub(crate) fn request_update(&self) {
        self.update.send(&self.owner_id);
    }

    /// `elementWillRender` (§4.2): reset the cursor so the next sequence of
    /// `use_hook` calls walks cells in declaration order from position 0.
    pub(crate) fn will_render(&self) {
        *self.cursor.borrow_mut() = 0;
    }

    /// `elementDidRender` (§4.2): currently a no-op hook point, kept as an
    /// explicit lifecycle callback so effect flushing (§2a `use_effect`) has
    /// a defined place to run without overloading `will_render`.
    pub(crate) fn did_render(&self) {}

    /// `elementWillUnmount` (§4.2): run every cell's `Hook::cleanup` exactly
    /// once, then drop the cells. Idempotent in the sense that it is only
    /// ever invoked once per element by the reconciler (§3 lifecycle).
    pub(crate) fn will_unmount(&self) {
        let cells = std::mem::take(&mut *self.cells.borrow_mut());
        for cell in cells {
            (cell.cleanup)(cell.state);
        }
    }

    /// The generic entry point every hook primitive funnels through.
    ///
    /// Consumes the next cell position: on an element's first render this
    /// allocates a fresh `H::State` via `H::create`; on every render
    /// (including the first) it then calls `H::update` and returns its
    /// output.
    ///
    /// # Panics
    ///
    /// Panics if a different hook type is found at this position than was
    /// recorded on a previous render (S8) — calling hooks conditionally or
    /// in a different order across renders is a host bug, matching the
    /// "Rules of Hooks" diagnostic in `flui_core::hooks::hook_context`.
    pub fn use_hook<H: Hook>(&self, input: H::Input) -> H::Output {
        let index = {
            let mut cursor = self.cursor.borrow_mut();
            let index = *cursor;
            *cursor += 1;
            index
        };

        let mut cells = self.cells.borrow_mut();
        if index == cells.len() {
            cells.push(HookCell::new::<H>(H::create(&input)));
        }

        let cell = cells.get_mut(index).unwrap_or_else(|| {
            panic!(
                "hook cell index {index} out of range for element {} \
                 (hooks were removed between renders — hooks must never be \
                 called conditionally)",
                self.owner_id
            )
        });

        let state = cell.state.downcast_mut::<H::State>().unwrap_or_else(|| {
            panic!(
                "\n\
                 hook ordering violation in element {}\n\
                 \n\
                 a different hook type was used at cell position {index} than on the\n\
                 previous render. hooks must be called in the same order on every\n\
                 render — never conditionally, never inside a variable-length loop.\n",
                self.owner_id
            )
        });

        H::update(state, input)
    }
}

impl std::fmt::Debug for LifeCycleHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifeCycleHook")
            .field("owner_id", &self.owner_id)
            .field("cell_count", &self.cells.borrow().len())
            .finish()
    }
}

/// Wraps an element's render future so that `hook`'s context is on top of
/// the ambient hook stack for every poll of the inner future, and popped
/// off immediately after — across suspension points, not just around the
/// call (§4.2 rationale, §9 "generator-based" design note).
///
/// Because the inner future is already boxed (`Element::render` returns a
/// `Pin<Box<dyn Future<...>>>` for object-safety — see `element.rs`), no
/// unsafe pin projection is needed here: `WithHook` itself is `Unpin`.
pub(crate) struct WithHook<'a, T> {
    hook: Rc<LifeCycleHook>,
    inner: Pin<Box<dyn Future<Output = T> + 'a>>,
}

impl<'a, T> WithHook<'a, T> {
    pub(crate) fn new(hook: Rc<LifeCycleHook>, inner: Pin<Box<dyn Future<Output = T> + 'a>>) -> Self {
        Self { hook, inner }
    }
}

impl<'a, T> Future for WithHook<'a, T> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        crate::hook_runtime::push(self.hook.clone());
        let result = self.inner.as_mut().poll(cx);
        crate::hook_runtime::pop();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter;
    impl Hook for Counter {
        type State = i32;
        type Input = i32;
        type Output = i32;

        fn create(input: &Self::Input) -> Self::State {
            *input
        }

        fn update(state: &mut Self::State, input: Self::Input) -> Self::Output {
            *state += input;
            *state
        }
    }

    #[test]
    fn cells_persist_across_renders() {
        let hook = LifeCycleHook::new_for_test("e1");

        hook.will_render();
        assert_eq!(hook.use_hook::<Counter>(1), 2); // create(1) then update(1): 1+1

        hook.will_render();
        assert_eq!(hook.use_hook::<Counter>(5), 7); // state persisted at 2, +5
    }

    #[test]
    #[should_panic(expected = "hook ordering violation")]
    fn mismatched_hook_type_panics() {
        struct Other;
        impl Hook for Other {
            type State = String;
            type Input = ();
            type Output = ();
            fn create(_input: &Self::Input) -> Self::State {
                String::new()
            }
            fn update(_state: &mut Self::State, _input: Self::Input) -> Self::Output {}
        }

        let hook = LifeCycleHook::new_for_test("e1");
        hook.will_render();
        let _ = hook.use_hook::<Counter>(1);

        hook.will_render();
        let _ = hook.use_hook::<Other>(());
    }

    #[test]
    fn unmount_runs_cleanup_exactly_once() {
        use std::cell::Cell;
        use std::rc::Rc;

        struct WithCleanup;
        thread_local! {
            static CLEANUPS: Cell<u32> = const { Cell::new(0) };
        }
        impl Hook for WithCleanup {
            type State = ();
            type Input = ();
            type Output = ();
            fn create(_input: &Self::Input) -> Self::State {}
            fn update(_state: &mut Self::State, _input: Self::Input) -> Self::Output {}
            fn cleanup(_state: Self::State) {
                CLEANUPS.with(|c| c.set(c.get() + 1));
            }
        }

        let hook = Rc::new(LifeCycleHook::new_for_test("e1"));
        hook.will_render();
        hook.use_hook::<WithCleanup>(());

        hook.will_unmount();
        assert_eq!(CLEANUPS.with(|c| c.get()), 1);
    }
}
