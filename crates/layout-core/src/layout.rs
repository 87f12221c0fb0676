//! The reconciler itself (§4): ties `Element`, `Hook`, `EventHandler` and
//! `FutureQueue` together into `render`/`update`/`trigger`.
//!
//! Mirrors the shape of `flui_core::build_owner::BuildOwner` — a single
//! owner object holding the element tree's bookkeeping tables and exposing
//! a small number of entry points that drive reconciliation — generalized
//! from Flutter-style widget rebuilding to this design's render/update/
//! trigger contract (§4.5, §4.6).

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use futures::future::join_all;
use serde_json::Map as JsonMap;
use tokio::sync::mpsc;
use tokio::task::LocalSet;
use tracing::{trace, warn};

use crate::config::{LayoutConfig, PanicPolicy};
use crate::element::{BoxedElement, Element, RenderOutcome};
use crate::error::{HostRenderFailure, LayoutError, Result};
use crate::event::{Event, EventHandler, HandlerDescriptor, HandlerId};
use crate::future_queue::FutureQueue;
use crate::hook::{LifeCycleHook, WithHook};
use crate::model::{AttributeValue, Model, ModelChild, SerializedChild, SerializedModel};
use crate::state::ElementState;
use crate::wire::LayoutUpdate;

type RenderFut = Pin<Box<dyn Future<Output = (SerializedModel, Vec<HostRenderFailure>)>>>;
type ChildFut = Pin<Box<dyn Future<Output = (SerializedChild, Vec<HostRenderFailure>)>>>;

/// Bound re-render trigger handed to every [`LifeCycleHook`] (§4.2). Wraps
/// the sending half of the Layout's update channel; `noop` stands in for
/// tests that exercise a `LifeCycleHook` without a live `Layout`.
#[derive(Clone)]
pub(crate) struct UpdateSender(Option<mpsc::UnboundedSender<String>>);

impl UpdateSender {
    pub(crate) fn noop() -> Self {
        Self(None)
    }

    /// Schedule element `id` for re-rendering on the next `update` call.
    /// Silently dropped if the receiving `Layout` has already been torn
    /// down — a hook firing its setter after teardown is not an error.
    pub(crate) fn send(&self, id: &str) {
        if let Some(tx) = &self.0 {
            let _ = tx.send(id.to_string());
        }
    }
}

/// The reconciler for one element tree (§4).
///
/// Single-threaded by construction: every render this Layout drives runs on
/// `local`, a `tokio::task::LocalSet` pinned to whichever OS thread first
/// calls `render`/`update`/`trigger` and `.await`s it to completion — which
/// is also the thread whose `thread_local!` hook stack (`hook_runtime`)
/// those renders observe (§5, §9).
pub struct Layout {
    local: Rc<LocalSet>,
    element_states: RefCell<HashMap<String, ElementState>>,
    event_handlers: RefCell<HashMap<HandlerId, Rc<EventHandler>>>,
    root_id: String,
    update_tx: mpsc::UnboundedSender<String>,
    update_rx: RefCell<mpsc::UnboundedReceiver<String>>,
    future_queue: FutureQueue<LayoutUpdate>,
    config: LayoutConfig,
    torn_down: Cell<bool>,
}

impl Layout {
    /// Construct a Layout rooted at `root`, with a fresh `LocalSet` to
    /// drive its renders.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidRoot`] if `root.id()` is empty.
    pub fn new(root: BoxedElement, config: LayoutConfig) -> Result<Rc<Self>> {
        let root_id = root.id().to_string();
        if root_id.is_empty() {
            return Err(LayoutError::InvalidRoot("element id must not be empty".into()));
        }

        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let local = Rc::new(LocalSet::new());
        let future_queue = FutureQueue::new(local.clone());

        let hook = Rc::new(LifeCycleHook::new(root_id.clone(), UpdateSender(Some(update_tx.clone()))));
        let mut element_states = HashMap::new();
        element_states.insert(root_id.clone(), ElementState::new(root, hook));

        Ok(Rc::new(Self {
            local,
            element_states: RefCell::new(element_states),
            event_handlers: RefCell::new(HashMap::new()),
            root_id,
            update_tx,
            update_rx: RefCell::new(update_rx),
            future_queue,
            config,
            torn_down: Cell::new(false),
        }))
    }

    /// Id of the root element this Layout was constructed with.
    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    /// The `LocalSet` driving this Layout's renders — a host embeds this
    /// into its own executor loop, typically via `local.run_until(...)`
    /// wrapping calls to `render`/`update`/`trigger`.
    pub fn local_set(&self) -> &Rc<LocalSet> {
        &self.local
    }

    fn check_alive(&self) -> Result<()> {
        if self.torn_down.get() {
            Err(LayoutError::TornDown)
        } else {
            Ok(())
        }
    }

    /// Schedule a (re-)render of the mounted element `element_id` on the
    /// next [`update`](Self::update) call (§4.5: "`update(element)` ...
    /// Safe to call from any context").
    ///
    /// This is the same entry point [`LifeCycleHook::request_update`]
    /// funnels a hook's re-render request through — a setter and an
    /// external caller (a timer, an inbound webhook) are indistinguishable
    /// to the Layout. A request for an id that is not currently mounted is
    /// not an error; it is simply dropped the next time `update` drains the
    /// queue (§4.5's "must not fail if the element is not currently
    /// mounted").
    pub fn request_update(&self, element_id: impl Into<String>) {
        let _ = self.update_tx.send(element_id.into());
    }

    /// Render the whole tree from the root, as on first mount (§4.5).
    pub async fn render(self: &Rc<Self>) -> Result<LayoutUpdate> {
        self.check_alive()?;
        let (model, errors) = Self::render_element(self.clone(), self.root_id.clone()).await;
        self.enforce_panic_policy(&errors)?;
        Ok(LayoutUpdate {
            src: self.root_id.clone(),
            new: model,
            old: None,
            errors,
        })
    }

    /// Drain every element a hook has requested a re-render for since the
    /// last call, re-render each independently, and return one
    /// [`LayoutUpdate`] per element — in completion order, not request
    /// order (§4.5 partial update, §9 `FutureQueue` design note).
    pub async fn update(self: &Rc<Self>) -> Result<Vec<LayoutUpdate>> {
        self.check_alive()?;

        let mut pending = Vec::new();
        {
            let mut rx = self.update_rx.borrow_mut();
            while let Ok(id) = rx.try_recv() {
                if !pending.contains(&id) {
                    pending.push(id);
                }
            }
        }
        pending.retain(|id| self.element_states.borrow().contains_key(id));
        if pending.is_empty() {
            return Ok(Vec::new());
        }
        trace!(count = pending.len(), "draining pending re-render requests");

        // §6 reserves `max_concurrent_renders` as a throttle on how many
        // element renders this pass drives at once via the FutureQueue;
        // `None` puts the whole batch in flight together, same as before
        // this knob existed.
        let batch_size = self.config.max_concurrent_renders.unwrap_or(pending.len()).max(1);
        let mut updates = Vec::with_capacity(pending.len());
        for batch in pending.chunks(batch_size) {
            for id in batch {
                let id = id.clone();
                let previous = self.element_states.borrow().get(&id).and_then(|s| s.model.clone());
                let this = self.clone();
                self.future_queue.put(async move {
                    let (model, errors) = Layout::render_element(this, id.clone()).await;
                    LayoutUpdate {
                        src: id,
                        new: model,
                        old: previous,
                        errors,
                    }
                })?;
            }

            for _ in 0..batch.len() {
                updates.push(self.future_queue.get().await);
            }
        }

        for update in &updates {
            self.enforce_panic_policy(&update.errors)?;
        }
        Ok(updates)
    }

    /// Dispatch an inbound event to its target handler (§4.3, §6).
    ///
    /// If the handler no longer exists — the element that registered it
    /// was unmounted in a race with the event arriving — the event is
    /// logged and dropped rather than treated as an error (S4's
    /// event-after-unmount scenario).
    pub async fn trigger(self: &Rc<Self>, event: Event) -> Result<()> {
        self.check_alive()?;

        let handler = self.event_handlers.borrow().get(&event.target).cloned();
        let handler = match handler {
            Some(handler) => handler,
            None => {
                warn!(target = %event.target, "event targets a handler that no longer exists; ignoring");
                return Ok(());
            }
        };

        handler.invoke(event.data).await?;
        Ok(())
    }

    /// Tear down the whole tree: cancel any in-flight renders, run every
    /// mounted element's unmount lifecycle, and reject all further calls.
    pub async fn teardown(self: &Rc<Self>) -> Result<()> {
        if self.torn_down.replace(true) {
            return Ok(());
        }
        self.future_queue.cancel().await;
        let root_id = self.root_id.clone();
        self.unmount_subtree(&root_id);
        Ok(())
    }

    fn enforce_panic_policy(&self, errors: &[HostRenderFailure]) -> Result<()> {
        if self.config.panic_policy == PanicPolicy::Abort {
            if let Some(first) = errors.first() {
                return Err(LayoutError::Inconsistency(first.to_string()));
            }
        }
        Ok(())
    }

    fn mount_or_reuse(&self, id: &str, element: BoxedElement) {
        let mut states = self.element_states.borrow_mut();
        if let Some(state) = states.get_mut(id) {
            state.element = Rc::from(element);
        } else {
            let hook = Rc::new(LifeCycleHook::new(id.to_string(), UpdateSender(Some(self.update_tx.clone()))));
            states.insert(id.to_string(), ElementState::new(element, hook));
        }
    }

    fn unmount_subtree(&self, id: &str) {
        let state = self.element_states.borrow_mut().remove(id);
        if let Some(state) = state {
            state.life_cycle_hook.will_unmount();
            {
                let mut handlers = self.event_handlers.borrow_mut();
                for handler_id in &state.event_handler_ids {
                    handlers.remove(handler_id);
                }
            }
            for child_id in &state.child_element_ids {
                self.unmount_subtree(child_id);
            }
        }
    }

    /// Render a single mounted element (§4.6): runs its `render` under its
    /// hook context, then either reconciles the produced model or recurses
    /// into the element it delegated to ("element returns element").
    ///
    /// Never fails outward — per the isolate panic policy (§7), a render
    /// failure becomes a [`HostRenderFailure`] in the returned vector and
    /// this element's previous model (or an empty default, on first
    /// render) stands in for its output.
    fn render_element(this: Rc<Self>, id: String) -> RenderFut {
        Box::pin(async move {
            let found = {
                let states = this.element_states.borrow();
                states
                    .get(&id)
                    .map(|state| (state.element.clone(), state.life_cycle_hook.clone(), state.model.clone()))
            };
            let (element, hook, previous_model) = match found {
                Some(found) => found,
                None => return (SerializedModel::default(), Vec::new()),
            };

            hook.will_render();
            let outcome = WithHook::new(hook.clone(), element.render()).await;
            hook.did_render();

            match outcome {
                Err(err) => {
                    let failure = HostRenderFailure {
                        element_id: id.clone(),
                        message: err.to_string(),
                    };
                    (previous_model.unwrap_or_default(), vec![failure])
                }
                Ok(RenderOutcome::Element(inner)) => {
                    let inner_id = format!("{id}/{}", inner.id());
                    this.mount_or_reuse(&inner_id, inner);

                    let stale = {
                        let mut states = this.element_states.borrow_mut();
                        states
                            .get_mut(&id)
                            .map(|state| std::mem::replace(&mut state.child_element_ids, vec![inner_id.clone()]))
                            .unwrap_or_default()
                    };
                    for stale_id in stale {
                        if stale_id != inner_id {
                            this.unmount_subtree(&stale_id);
                        }
                    }

                    // §4.6 step 6: an element that delegates to another
                    // element is not itself a model, so its output is
                    // rewritten as a synthetic wrapper around the
                    // delegate's own fully-reconciled model rather than
                    // being replaced by it outright.
                    let (inner_model, errors) = Layout::render_element(this, inner_id).await;
                    let wrapper = SerializedModel {
                        tag_name: "div".to_string(),
                        children: vec![SerializedChild::Model(inner_model)],
                        ..Default::default()
                    };
                    (wrapper, errors)
                }
                Ok(RenderOutcome::Model(model)) => Layout::normalize_model(this, id, model).await,
            }
        })
    }

    /// Reconcile a freshly-produced [`Model`] into a [`SerializedModel`]
    /// (§3, §4.6).
    ///
    /// This is the *once-per-element* entry point: it clears exactly this
    /// element's previous handler ids from the global table and takes its
    /// previous child ids for diffing, then hands off to
    /// [`resolve_model`](Self::resolve_model) to walk `model` and every
    /// nested literal `ModelChild::Model` it contains — nested models share
    /// this element's identity (they are still markup belonging to the same
    /// render, not a separate mounted element), so their handler and child
    /// ids must accumulate into *one* set for this element, not be
    /// clobbered level-by-level. Only after the whole walk finishes are
    /// `state.event_handler_ids`/`state.child_element_ids` written and the
    /// stale-child diff unmounted (§8 invariant: `eventHandlers` keys are a
    /// disjoint union over elements, never over nested model levels within
    /// one element).
    fn normalize_model(this: Rc<Self>, owner_id: String, model: Model) -> RenderFut {
        Box::pin(async move {
            let stale_handler_ids = {
                let mut states = this.element_states.borrow_mut();
                states
                    .get_mut(&owner_id)
                    .map(|state| std::mem::take(&mut state.event_handler_ids))
                    .unwrap_or_default()
            };
            {
                let mut handlers = this.event_handlers.borrow_mut();
                for handler_id in &stale_handler_ids {
                    handlers.remove(handler_id);
                }
            }
            let previous_children = {
                let mut states = this.element_states.borrow_mut();
                states
                    .get_mut(&owner_id)
                    .map(|state| std::mem::take(&mut state.child_element_ids))
                    .unwrap_or_default()
            };

            let owned_handler_ids = Rc::new(RefCell::new(HashSet::new()));
            let mounted_child_ids = Rc::new(RefCell::new(Vec::new()));

            let (serialized, errors) = Layout::resolve_model(
                this.clone(),
                owner_id.clone(),
                model,
                owned_handler_ids.clone(),
                mounted_child_ids.clone(),
            )
            .await;

            let owned_handler_ids = owned_handler_ids.borrow().clone();
            let mounted_child_ids = mounted_child_ids.borrow().clone();

            for stale_id in previous_children {
                if !mounted_child_ids.contains(&stale_id) {
                    this.unmount_subtree(&stale_id);
                }
            }

            if let Some(state) = this.element_states.borrow_mut().get_mut(&owner_id) {
                state.event_handler_ids = owned_handler_ids;
                state.child_element_ids = mounted_child_ids;
                state.model = Some(serialized.clone());
            }

            (serialized, errors)
        })
    }

    /// Walk one `Model` level, lifting callable attributes into addressable
    /// [`EventHandler`]s, mounting and rendering any `Element` children, and
    /// recursing into nested literal models (§3, §4.6).
    ///
    /// `owned_handler_ids`/`mounted_child_ids` accumulate across the *whole*
    /// recursive walk for one owning element — every nested
    /// `ModelChild::Model` call shares the same accumulators rather than
    /// each level getting (and clobbering) its own, which is what makes it
    /// safe for [`normalize_model`](Self::normalize_model) to commit them to
    /// `ElementState` exactly once, after this returns.
    fn resolve_model(
        this: Rc<Self>,
        owner_id: String,
        model: Model,
        owned_handler_ids: Rc<RefCell<HashSet<HandlerId>>>,
        mounted_child_ids: Rc<RefCell<Vec<String>>>,
    ) -> RenderFut {
        Box::pin(async move {
            let mut event_handlers_out: HashMap<String, HandlerDescriptor> = HashMap::new();

            // Explicitly-typed handlers first; attribute-lifted callables
            // overwrite same-named entries below (§3, §4.6 duplicate-key
            // edge case).
            for (name, handler) in model.event_handlers {
                let mut owned = owned_handler_ids.borrow_mut();
                this.register_handler(handler, &mut owned, &mut event_handlers_out, name);
            }

            let mut attributes_out = JsonMap::new();
            for (name, value) in model.attributes {
                match value {
                    AttributeValue::Json(json) => {
                        attributes_out.insert(name, json);
                    }
                    AttributeValue::Callback(callback) => {
                        let handler = EventHandler::from_callback(callback);
                        let mut owned = owned_handler_ids.borrow_mut();
                        this.register_handler(handler, &mut owned, &mut event_handlers_out, name);
                    }
                }
            }

            let mut child_futures: Vec<ChildFut> = Vec::with_capacity(model.children.len());
            for child in model.children {
                match child {
                    ModelChild::Text(text) => {
                        child_futures.push(Box::pin(async move { (SerializedChild::Text(text), Vec::new()) }));
                    }
                    ModelChild::Model(nested) => {
                        let this = this.clone();
                        let owner_id = owner_id.clone();
                        let owned_handler_ids = owned_handler_ids.clone();
                        let mounted_child_ids = mounted_child_ids.clone();
                        child_futures.push(Box::pin(async move {
                            let (model, errors) =
                                Layout::resolve_model(this, owner_id, *nested, owned_handler_ids, mounted_child_ids).await;
                            (SerializedChild::Model(model), errors)
                        }));
                    }
                    ModelChild::Element(element) => {
                        let child_id = element.id().to_string();
                        this.mount_or_reuse(&child_id, element);
                        mounted_child_ids.borrow_mut().push(child_id.clone());
                        let this = this.clone();
                        child_futures.push(Box::pin(async move {
                            let (model, errors) = Layout::render_element(this, child_id).await;
                            (SerializedChild::Model(model), errors)
                        }));
                    }
                }
            }

            let mut errors = Vec::new();
            let mut children_out = Vec::with_capacity(child_futures.len());
            for (child, child_errors) in join_all(child_futures).await {
                children_out.push(child);
                errors.extend(child_errors);
            }

            let serialized = SerializedModel {
                tag_name: model.tag_name,
                children: children_out,
                attributes: attributes_out,
                event_handlers: event_handlers_out,
                extra: model.extra,
            };

            (serialized, errors)
        })
    }

    fn register_handler(
        &self,
        handler: EventHandler,
        owned_handler_ids: &mut HashSet<HandlerId>,
        event_handlers_out: &mut HashMap<String, HandlerDescriptor>,
        attribute_name: String,
    ) {
        let descriptor = handler.serialize();
        let handler_id = handler.id().clone();
        owned_handler_ids.insert(handler_id.clone());
        self.event_handlers.borrow_mut().insert(handler_id, Rc::new(handler));
        event_handlers_out.insert(attribute_name, descriptor);
    }
}
