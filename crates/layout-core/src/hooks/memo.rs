//! `use_memo`: cache a computed value across renders until its dependencies
//! change (§4.2a).
//!
//! Grounded in `flui-reactivity::hooks::memo`, with the same `Rc`
//! simplification as [`effect`](super::effect) — single-threaded, so no
//! `Send + Sync` bound is needed on the compute closure.

use std::rc::Rc;

use crate::hook::Hook;
use crate::hook_runtime;

struct MemoHook<T, D>(std::marker::PhantomData<(T, D)>);

struct MemoState<T, D> {
    value: T,
    dependencies: Vec<D>,
}

impl<T, D> Hook for MemoHook<T, D>
where
    T: Clone + 'static,
    D: PartialEq + Clone + 'static,
{
    type State = MemoState<T, D>;
    type Input = (Rc<dyn Fn() -> T>, Vec<D>);
    type Output = T;

    fn create(input: &Self::Input) -> Self::State {
        let (compute, dependencies) = input;
        MemoState {
            value: compute(),
            dependencies: dependencies.clone(),
        }
    }

    fn update(state: &mut Self::State, input: Self::Input) -> Self::Output {
        let (compute, new_deps) = input;
        if state.dependencies != new_deps {
            state.value = compute();
            state.dependencies = new_deps;
        }
        state.value.clone()
    }
}

/// Recompute `compute()` only when `dependencies` differ from the previous
/// render's; otherwise return the cached value.
///
/// An empty `dependencies` computes once, on mount, and never again.
pub fn use_memo<T, D, F>(dependencies: Vec<D>, compute: F) -> T
where
    T: Clone + 'static,
    D: PartialEq + Clone + 'static,
    F: Fn() -> T + 'static,
{
    hook_runtime::current().use_hook::<MemoHook<T, D>>((Rc::new(compute), dependencies))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::LifeCycleHook;
    use std::cell::Cell;

    #[test]
    fn caches_until_deps_change() {
        let hook = Rc::new(LifeCycleHook::new_for_test("e1"));
        hook_runtime::push(hook.clone());

        let computations = Rc::new(Cell::new(0));

        hook.will_render();
        let value = {
            let computations = computations.clone();
            use_memo(vec![1u32], move || {
                computations.set(computations.get() + 1);
                42
            })
        };
        assert_eq!(value, 42);
        assert_eq!(computations.get(), 1);

        hook.will_render();
        let value = {
            let computations = computations.clone();
            use_memo(vec![1u32], move || {
                computations.set(computations.get() + 1);
                100
            })
        };
        assert_eq!(value, 42, "same deps returns the cached value");
        assert_eq!(computations.get(), 1);

        hook.will_render();
        let value = {
            let computations = computations.clone();
            use_memo(vec![2u32], move || {
                computations.set(computations.get() + 1);
                100
            })
        };
        assert_eq!(value, 100, "changed deps recomputes");
        assert_eq!(computations.get(), 2);

        hook_runtime::pop();
    }
}
