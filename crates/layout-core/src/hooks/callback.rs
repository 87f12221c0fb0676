//! `use_callback`: stabilize a callback's identity across renders while its
//! dependencies are unchanged (§4.2a) — useful for attribute callables
//! (§3), which are re-lifted into a fresh `EventHandler` on every
//! reconciliation unless the host holds the same callback value still.
//!
//! Grounded in `flui-reactivity::hooks::callback`, simplified to this
//! crate's `Rc`/`!Send` hook shape.

use std::rc::Rc;

use crate::hook::Hook;
use crate::hook_runtime;

struct CallbackHook<F, D>(std::marker::PhantomData<(F, D)>);

struct CallbackState<F, D> {
    // `None` only between `create` and the `update` call that immediately
    // follows it on the same render (see `LifeCycleHook::use_hook`) — `F`
    // isn't `Clone`, so `create`, which only borrows the input, cannot yet
    // produce the first `Rc<F>` itself.
    callback: Option<Rc<F>>,
    dependencies: Vec<D>,
}

impl<F, D> Hook for CallbackHook<F, D>
where
    F: 'static,
    D: PartialEq + Clone + 'static,
{
    type State = CallbackState<F, D>;
    type Input = (F, Vec<D>);
    type Output = Rc<F>;

    fn create(input: &Self::Input) -> Self::State {
        CallbackState {
            callback: None,
            dependencies: input.1.clone(),
        }
    }

    fn update(state: &mut Self::State, input: Self::Input) -> Self::Output {
        let (callback, new_deps) = input;
        if state.callback.is_none() || state.dependencies != new_deps {
            state.callback = Some(Rc::new(callback));
            state.dependencies = new_deps;
        }
        state.callback.clone().expect("set above when None")
    }
}

/// Return a memoized `Rc<F>` that is only rebuilt when `dependencies`
/// change, so the same callback identity can be reused across renders.
///
/// `callback` must be the same closure expression on every render of a
/// given element (an element's `render()` body calling this once on its
/// own closure literal, as usual) — two syntactically distinct closures
/// are distinct types even if their bodies read the same, and the hook
/// cell would reject the mismatch.
pub fn use_callback<F, D>(dependencies: Vec<D>, callback: F) -> Rc<F>
where
    F: 'static,
    D: PartialEq + Clone + 'static,
{
    hook_runtime::current().use_hook::<CallbackHook<F, D>>((callback, dependencies))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::LifeCycleHook;

    // Each closure literal is its own anonymous type, so two textually
    // separate `|x| ...` expressions never unify even if identical —
    // re-rendering has to mean calling the *same* closure expression
    // again, as a real `render()` body would. Routing every render
    // through one `render_once` closes over a single literal.
    fn render_once(multiplier: i32, deps: Vec<u32>) -> Rc<impl Fn(i32) -> i32> {
        use_callback(deps, move |x: i32| x * multiplier)
    }

    #[test]
    fn identity_is_stable_while_deps_are_unchanged() {
        let hook = Rc::new(LifeCycleHook::new_for_test("e1"));
        hook_runtime::push(hook.clone());

        hook.will_render();
        let first = render_once(2, vec![1u32]);
        assert_eq!(first(5), 10);

        hook.will_render();
        let second = render_once(2, vec![1u32]);
        assert!(Rc::ptr_eq(&first, &second), "same deps keeps the same Rc");

        hook.will_render();
        let third = render_once(3, vec![2u32]);
        assert!(!Rc::ptr_eq(&second, &third), "changed deps rebuilds it");
        assert_eq!(third(5), 15);

        hook_runtime::pop();
    }

    #[test]
    fn with_args() {
        let hook = Rc::new(LifeCycleHook::new_for_test("e1"));
        hook_runtime::push(hook.clone());

        hook.will_render();
        let callback = use_callback(Vec::<u32>::new(), |x: i32| x * 2);
        assert_eq!(callback(5), 10);
        assert_eq!(callback(21), 42);

        hook_runtime::pop();
    }
}
