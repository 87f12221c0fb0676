//! The `Element` contract (§3): a stable id and an asynchronous `render`.

use std::future::Future;
use std::pin::Pin;

use crate::model::Model;

/// A boxed, element-owned render future.
///
/// `Element::render` cannot be an `async fn` directly — `Element` is used
/// as a trait object (`BoxedElement = Box<dyn Element>`) everywhere a child
/// may be mounted, and async fns in traits are not object-safe. Boxing the
/// future here, once, is also what lets [`WithHook`](crate::hook::WithHook)
/// wrap it without unsafe pin projection.
pub type BoxRenderFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<RenderOutcome>> + 'a>>;

/// A host-implemented node in the element tree (§3).
///
/// Every element has a stable identity (`id`) that survives across renders
/// of the *same* mounted instance, and a `render` method that is re-invoked
/// whenever the reconciler decides this element needs to produce (or
/// reproduce) its output.
pub trait Element {
    /// Stable identity for this mounted instance. Must never change over
    /// the element's lifetime; reconciliation uses it as the key into the
    /// `elementStates` table (§3).
    fn id(&self) -> &str;

    /// Produce this element's output: either a `Model` (§3, leaf-ish case)
    /// or another `Element` to mount and render in its place (§4.6 step 6,
    /// "element returns element").
    ///
    /// May suspend any number of times before resolving. Every poll of the
    /// returned future happens with this element's [`LifeCycleHook`]
    /// pushed onto the ambient hook stack (§4.2), so hook primitives called
    /// from within `render` — including after an `.await` — always resolve
    /// against the right state.
    ///
    /// [`LifeCycleHook`]: crate::hook::LifeCycleHook
    fn render(&self) -> BoxRenderFuture<'_>;
}

/// An owned, type-erased element, as stored in a [`Model`]'s children and
/// in the reconciler's `elementStates` table.
pub type BoxedElement = Box<dyn Element>;

/// What an element's render produced (§4.6 step 6).
pub enum RenderOutcome {
    /// A view model ready for reconciliation against its previous version.
    Model(Model),
    /// Another element to mount in this element's place. The reconciler
    /// recurses: the returned element is rendered in turn, and so on until
    /// a `Model` is produced.
    Element(BoxedElement),
}

impl From<Model> for RenderOutcome {
    fn from(model: Model) -> Self {
        RenderOutcome::Model(model)
    }
}

impl From<BoxedElement> for RenderOutcome {
    fn from(element: BoxedElement) -> Self {
        RenderOutcome::Element(element)
    }
}
