//! `use_state`: a persistent value plus a setter that schedules a
//! re-render of the owning element (§4.2a).

use std::cell::RefCell;
use std::rc::Rc;

use crate::hook::{Hook, LifeCycleHook};
use crate::hook_runtime;

struct StateHook<T>(std::marker::PhantomData<T>);

impl<T: Clone + 'static> Hook for StateHook<T> {
    type State = Rc<RefCell<T>>;
    type Input = T;
    type Output = (T, Setter<T>);

    fn create(input: &T) -> Self::State {
        Rc::new(RefCell::new(input.clone()))
    }

    fn update(state: &mut Self::State, _input: T) -> Self::Output {
        let value = state.borrow().clone();
        let setter = Setter {
            cell: state.clone(),
            hook: hook_runtime::current(),
        };
        (value, setter)
    }
}

/// Schedules a re-render of the owning element when called. Cheap to
/// clone; every render produces a fresh `Setter` pointing at the same
/// underlying cell.
pub struct Setter<T> {
    pub(crate) cell: Rc<RefCell<T>>,
    pub(crate) hook: Rc<LifeCycleHook>,
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            hook: self.hook.clone(),
        }
    }
}

impl<T> Setter<T> {
    /// Replace the stored value and request a re-render. Does not render
    /// synchronously — the owning `Layout`'s next `update` call picks it
    /// up, same as every other re-render request (§4.2, §4.5).
    pub fn set(&self, value: T) {
        *self.cell.borrow_mut() = value;
        self.hook.request_update();
    }

    /// Update the stored value from its current value without requiring
    /// `T: Clone` at the call site beyond what's already needed to read it.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.cell.borrow());
        self.set(next);
    }
}

/// Persist a value across renders of the current element, with a setter
/// that triggers re-rendering on change (§4.2a).
///
/// `initial` is only used the first time this call position is reached for
/// a given mounted element; on every later render it is evaluated by the
/// caller but ignored, matching the host-visible contract of `use_state` in
/// the grounding reactivity library.
pub fn use_state<T: Clone + 'static>(initial: T) -> (T, Setter<T>) {
    hook_runtime::current().use_hook::<StateHook<T>>(initial)
}
