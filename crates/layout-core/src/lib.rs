//! Layout core — the reconciler for a server-side reactive UI runtime.
//!
//! Host element functions declare a tree of view models; this crate drives
//! their asynchronous rendering, preserves per-element state across renders
//! via a hook mechanism, tracks event handlers, and serializes incremental
//! view updates for a transport layer to ship to a client. See each
//! module's docs for the corresponding piece of the design:
//!
//! - [`future_queue`] — a completion-order queue with bulk cancellation.
//! - [`hook`] / [`hook_runtime`] / [`hooks`] — per-element state across
//!   renders, and the primitive library built on top of it.
//! - [`element`] — the `Element` contract host code implements.
//! - [`event`] — addressable, serializable event handlers.
//! - [`model`] — the view-model dictionary, pre- and post-reconciliation.
//! - [`layout`] — the reconciler itself: `render`/`update`/`trigger`.
//! - [`wire`] — the outer envelope published to a transport adapter.
//! - [`config`] / [`error`] — tunables and the typed error hierarchy.
//!
//! # Example
//!
//! ```no_run
//! use layout_core::{BoxRenderFuture, BoxedElement, Element, Layout, LayoutConfig, Model};
//!
//! struct Hello;
//!
//! impl Element for Hello {
//!     fn id(&self) -> &str {
//!         "hello"
//!     }
//!
//!     fn render(&self) -> BoxRenderFuture<'_> {
//!         Box::pin(async { Ok(Model::new("div").child("hello world").into()) })
//!     }
//! }
//!
//! # async fn run() -> anyhow::Result<()> {
//! let layout = Layout::new(Box::new(Hello) as BoxedElement, LayoutConfig::default())?;
//! let local = layout.local_set().clone();
//! let update = local.run_until(layout.render()).await?;
//! assert_eq!(update.new.tag_name, "div");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod element;
pub mod error;
pub mod event;
pub mod future_queue;
pub mod hook;
pub mod hook_runtime;
pub mod hooks;
pub mod layout;
pub mod model;
pub mod state;
pub mod wire;

pub use config::{LayoutConfig, PanicPolicy};
pub use element::{BoxRenderFuture, BoxedElement, Element, RenderOutcome};
pub use error::{HandlerError, HostRenderFailure, LayoutError, Result};
pub use event::{Event, EventHandler, HandlerDescriptor, HandlerId, ParamCapture};
pub use future_queue::FutureQueue;
pub use hook::{Hook, LifeCycleHook};
pub use layout::Layout;
pub use model::{AttributeValue, Model, ModelChild, SerializedChild, SerializedModel};
pub use state::ElementState;
pub use wire::LayoutUpdate;

pub use hooks::{
    use_callback, use_effect, use_memo, use_reducer, use_ref, use_state, CleanupFn, Dispatch,
    Reducer, RefHandle, Setter,
};

/// Commonly used types for implementing and driving elements.
pub mod prelude {
    pub use crate::{
        use_callback, use_effect, use_memo, use_reducer, use_ref, use_state, BoxRenderFuture,
        BoxedElement, Element, Event, EventHandler, Layout, LayoutConfig, Model, ModelChild,
        RenderOutcome,
    };
}
