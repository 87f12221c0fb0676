//! `use_reducer`: generalization of [`use_state`](super::use_state) for
//! state transitions expressed as `(state, action) -> state` rather than a
//! bare setter (§4.2a).
//!
//! Grounded in `flui-reactivity::hooks::reducer`, built directly on the same
//! `Rc<RefCell<T>>` cell and [`LifeCycleHook::request_update`] wiring
//! [`state`](super::state)'s `Setter` already uses, rather than that
//! crate's `Signal`-based dispatch — this reconciler has no reactive-signal
//! layer of its own, only the hook-cell-plus-update-channel mechanism §4.2
//! describes.
//!
//! [`LifeCycleHook::request_update`]: crate::hook::LifeCycleHook

use std::cell::RefCell;
use std::rc::Rc;

use crate::hook::{Hook, LifeCycleHook};
use crate::hook_runtime;

/// A reducer function: current state plus an action, produces next state.
pub type Reducer<S, A> = Rc<dyn Fn(&S, &A) -> S>;

struct ReducerHook<S, A>(std::marker::PhantomData<(S, A)>);

impl<S, A> Hook for ReducerHook<S, A>
where
    S: Clone + 'static,
    A: 'static,
{
    type State = Rc<RefCell<S>>;
    type Input = (S, Reducer<S, A>);
    type Output = (S, Dispatch<S, A>);

    fn create(input: &Self::Input) -> Self::State {
        Rc::new(RefCell::new(input.0.clone()))
    }

    fn update(state: &mut Self::State, input: Self::Input) -> Self::Output {
        let (_, reducer) = input;
        let value = state.borrow().clone();
        let dispatch = Dispatch {
            cell: state.clone(),
            reducer,
            hook: hook_runtime::current(),
        };
        (value, dispatch)
    }
}

/// Sends actions to the reducer that produced it, scheduling a re-render of
/// the owning element on every dispatch (mirrors
/// [`Setter::set`](super::state::Setter::set)).
pub struct Dispatch<S, A> {
    cell: Rc<RefCell<S>>,
    reducer: Reducer<S, A>,
    hook: Rc<LifeCycleHook>,
}

impl<S, A> Clone for Dispatch<S, A> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            reducer: self.reducer.clone(),
            hook: self.hook.clone(),
        }
    }
}

impl<S, A> Dispatch<S, A> {
    /// Apply `action` to the current state via the reducer and schedule a
    /// re-render of the owning element.
    pub fn send(&self, action: A) {
        let next = (self.reducer)(&self.cell.borrow(), &action);
        *self.cell.borrow_mut() = next;
        self.hook.request_update();
    }
}

/// Persist state across renders of the current element, updated by
/// dispatching actions through `reducer` rather than setting values
/// directly (§4.2a).
///
/// `initial` and `reducer` are only consulted on the render that first
/// allocates this cell; on every later render only the dispatch's own
/// reducer call matters.
pub fn use_reducer<S, A>(initial: S, reducer: Reducer<S, A>) -> (S, Dispatch<S, A>)
where
    S: Clone + 'static,
    A: 'static,
{
    hook_runtime::current().use_hook::<ReducerHook<S, A>>((initial, reducer))
}
