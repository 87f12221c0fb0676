//! The hook primitive library (§4.2a): small, composable building blocks
//! written on top of [`Hook`](crate::hook::Hook) and
//! [`hook_runtime::current`](crate::hook_runtime::current), the same way
//! `flui-reactivity`'s `hooks/` module builds `use_effect` and friends on
//! top of its own `Hook`/`ReactiveHook` traits.
//!
//! None of these are part of the core reconciliation algorithm (§2-§4) —
//! an element is free to manage its own state some other way — but every
//! non-trivial element in practice needs at least `use_state`, so they
//! ship alongside the core rather than in a separate crate.

mod callback;
mod effect;
mod memo;
mod reducer;
mod refs;
mod state;

pub use callback::use_callback;
pub use effect::{use_effect, CleanupFn};
pub use memo::use_memo;
pub use reducer::{use_reducer, Dispatch, Reducer};
pub use refs::{use_ref, RefHandle};
pub use state::{use_state, Setter};
