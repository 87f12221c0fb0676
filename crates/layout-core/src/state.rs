//! Per-mounted-element bookkeeping (§3): the reconciler's private record of
//! everything it needs to remember about one element between renders.

use std::collections::HashSet;
use std::rc::Rc;

use crate::element::{BoxedElement, Element};
use crate::event::HandlerId;
use crate::hook::LifeCycleHook;
use crate::model::SerializedModel;

/// Everything the reconciler keeps about one mounted element, keyed by
/// `Element::id()` in the Layout's `elementStates` table.
pub struct ElementState {
    /// The element instance itself, so it can be re-rendered in place.
    ///
    /// Stored as `Rc<dyn Element>` rather than the `Box<dyn Element>` a
    /// host constructs it as (`BoxedElement`) so that rendering can clone
    /// a handle to it and release the `elementStates` borrow before
    /// awaiting `render()` — a render may suspend, and holding a `RefCell`
    /// borrow of the whole table across a suspension would block any
    /// concurrently-rendering sibling from even reading it.
    pub element: Rc<dyn Element>,
    /// The last model this element reconciled to. `None` until its first
    /// successful render.
    pub model: Option<SerializedModel>,
    /// Ids of every handler currently registered on behalf of this
    /// element's own model (not its descendants') — used to remove exactly
    /// the right entries from the global handler table on unmount or
    /// re-render (§4.6 "stale handler" edge case).
    pub event_handler_ids: HashSet<HandlerId>,
    /// Ids of the elements directly mounted as this element's children in
    /// the last successful reconciliation, in order. Used to find and
    /// unmount subtrees that disappear between renders.
    pub child_element_ids: Vec<String>,
    /// This element's hook context. Created once, on first mount, and kept
    /// for the element's entire mounted lifetime (§4.2).
    pub life_cycle_hook: Rc<LifeCycleHook>,
}

impl ElementState {
    pub fn new(element: BoxedElement, life_cycle_hook: Rc<LifeCycleHook>) -> Self {
        Self {
            element: Rc::from(element),
            model: None,
            event_handler_ids: HashSet::new(),
            child_element_ids: Vec::new(),
            life_cycle_hook,
        }
    }
}
