//! `use_effect`: run a side effect after a render whose dependencies
//! changed, with a cleanup that runs before the next effect or on unmount
//! (§4.2a).
//!
//! Grounded in `flui-reactivity::hooks::effect`, generalized from that
//! crate's `Send + Sync` `Arc`-based effect/cleanup closures (required there
//! because signals may be touched from any thread) down to `Rc`-based,
//! `!Send` closures — this reconciler only ever runs effects on its own
//! `LocalSet` thread (§5), so the weaker bound is all the contract needs.

use std::rc::Rc;

use crate::hook::Hook;
use crate::hook_runtime;

/// Cleanup function returned by an effect, run before the next invocation
/// (if dependencies changed) or once on unmount.
pub type CleanupFn = Box<dyn FnOnce()>;

type EffectFn = Rc<dyn Fn() -> Option<CleanupFn>>;

struct EffectHook<D>(std::marker::PhantomData<D>);

struct EffectState<D> {
    dependencies: Vec<D>,
    cleanup: Option<CleanupFn>,
}

impl<D: PartialEq + Clone + 'static> Hook for EffectHook<D> {
    type State = EffectState<D>;
    type Input = (EffectFn, Vec<D>);
    type Output = ();

    fn create(input: &Self::Input) -> Self::State {
        let (effect, dependencies) = input;
        EffectState {
            dependencies: dependencies.clone(),
            cleanup: effect(),
        }
    }

    fn update(state: &mut Self::State, input: Self::Input) -> Self::Output {
        let (effect, new_deps) = input;
        if state.dependencies != new_deps {
            if let Some(cleanup) = state.cleanup.take() {
                cleanup();
            }
            state.cleanup = effect();
            state.dependencies = new_deps;
        }
    }

    fn cleanup(mut state: Self::State) {
        if let Some(cleanup) = state.cleanup.take() {
            cleanup();
        }
    }
}

/// Run `effect` after this render if `dependencies` differ from the last
/// render's (or this is the first render), running any previously returned
/// cleanup first. The final cleanup also runs once when the owning element
/// unmounts.
///
/// An empty `dependencies` runs the effect once, on mount, and cleans up
/// only on unmount.
pub fn use_effect<D, F>(dependencies: Vec<D>, effect: F)
where
    D: PartialEq + Clone + 'static,
    F: Fn() -> Option<CleanupFn> + 'static,
{
    hook_runtime::current().use_hook::<EffectHook<D>>((Rc::new(effect), dependencies))
}
