//! `use_ref`: a mutable cell that persists across renders without
//! triggering one on write — the imperative escape hatch named in §4.2a,
//! for values the reconciler shouldn't treat as render-affecting.
//!
//! Grounded in `flui-reactivity::hooks::ref`, with `Arc<Mutex<T>>` narrowed
//! to `Rc<RefCell<T>>` since a `Layout` and everything it drives lives on
//! one thread (§5) — there is no concurrent access to guard against here,
//! only the usual aliasing rules `RefCell` already enforces at runtime.

use std::cell::{Ref as CellRef, RefCell, RefMut};
use std::rc::Rc;

use crate::hook::Hook;
use crate::hook_runtime;

/// A mutable handle that persists across renders of the owning element
/// without scheduling a re-render on write.
#[derive(Clone)]
pub struct RefHandle<T>(Rc<RefCell<T>>);

impl<T> RefHandle<T> {
    /// Borrow the current value.
    pub fn get(&self) -> CellRef<'_, T> {
        self.0.borrow()
    }

    /// Mutably borrow the current value.
    pub fn get_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Replace the stored value.
    pub fn set(&self, value: T) {
        *self.0.borrow_mut() = value;
    }

    /// Update the stored value in place.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.0.borrow_mut());
    }

    /// Read the current value (requires `T: Clone`).
    pub fn current(&self) -> T
    where
        T: Clone,
    {
        self.0.borrow().clone()
    }
}

struct RefHook<T>(std::marker::PhantomData<T>);

impl<T: Clone + 'static> Hook for RefHook<T> {
    type State = RefHandle<T>;
    type Input = T;
    type Output = RefHandle<T>;

    fn create(input: &Self::Input) -> Self::State {
        RefHandle(Rc::new(RefCell::new(input.clone())))
    }

    fn update(state: &mut Self::State, _input: Self::Input) -> Self::Output {
        // `initial` is only consulted on the render that allocates the
        // cell; every later render's argument is evaluated by the caller
        // but ignored here, same as React's `useRef`.
        state.clone()
    }
}

/// Persist a mutable value across renders of the current element without
/// scheduling a re-render when it changes (§4.2a).
///
/// `initial` is only used the first time this call position is reached for
/// a given mounted element.
pub fn use_ref<T: Clone + 'static>(initial: T) -> RefHandle<T> {
    hook_runtime::current().use_hook::<RefHook<T>>(initial)
}
