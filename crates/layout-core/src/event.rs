//! Addressable event handlers (§4.3) and the wire-level event envelope (§6).

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::HandlerError;

/// A single event-handler callback.
///
/// `!Send` by design: callbacks close over `Rc`-based element/hook state and
/// only ever run on the Layout's single scheduling thread (§5).
pub type Callback = Rc<dyn Fn(Vec<JsonValue>) -> Pin<Box<dyn Future<Output = anyhow::Result<()>>>>>;

/// Stable identifier for an `EventHandler`, unique for the lifetime of the
/// process (handler ids never need to be reused — a fresh one is minted
/// every time a callable attribute is lifted, per §4.6).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandlerId(pub String);

impl HandlerId {
    fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        let n = NEXT.fetch_add(1, Ordering::Relaxed);
        Self(format!("h{n}"))
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Client-side parameter-capture directives embedded in a handler's
/// serialized descriptor: which fields of the browser event to forward, and
/// whether to stop propagation. The Layout core does not interpret these —
/// it only carries them through to the wire — but they're part of
/// `EventHandler` rather than the transport layer because they're
/// authored alongside the handler itself (§4.3).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamCapture {
    /// Names of event fields the client should forward as `data`, in order.
    pub fields: Vec<String>,
    /// Whether the client should call `stopPropagation()` before dispatch.
    pub stop_propagation: bool,
    /// Whether the client should call `preventDefault()` before dispatch.
    pub prevent_default: bool,
}

impl ParamCapture {
    pub fn new(fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn stop_propagation(mut self) -> Self {
        self.stop_propagation = true;
        self
    }

    pub fn prevent_default(mut self) -> Self {
        self.prevent_default = true;
        self
    }
}

/// The serialized form of an `EventHandler`, embedded in a model's
/// `eventHandlers` map (§3, §6): `{target, fields, stopPropagation,
/// preventDefault}`.
#[derive(Debug, Clone, Serialize)]
pub struct HandlerDescriptor {
    pub target: HandlerId,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(rename = "stopPropagation", skip_serializing_if = "std::ops::Not::not")]
    pub stop_propagation: bool,
    #[serde(rename = "preventDefault", skip_serializing_if = "std::ops::Not::not")]
    pub prevent_default: bool,
}

/// An addressable, callable bundle of callbacks (§4.3).
pub struct EventHandler {
    id: HandlerId,
    callbacks: Vec<Callback>,
    capture: ParamCapture,
}

impl EventHandler {
    /// Create a fresh handler with a newly minted id.
    pub fn new(capture: ParamCapture) -> Self {
        Self {
            id: HandlerId::fresh(),
            callbacks: Vec::new(),
            capture,
        }
    }

    /// Wrap a single bare callable as a handler with default capture
    /// semantics — used when reconciliation lifts a callable attribute
    /// that is not already an `EventHandler` (§3, §4.6).
    pub fn from_callback(callback: Callback) -> Self {
        let mut handler = Self::new(ParamCapture::default());
        handler.add(callback);
        handler
    }

    pub fn id(&self) -> &HandlerId {
        &self.id
    }

    /// Append a callback to the ordered list.
    pub fn add(&mut self, callback: Callback) {
        self.callbacks.push(callback);
    }

    /// Invoke every callback in order with `data`. Per §4.3 this awaits
    /// each in turn (not concurrently) so that handler ordering is
    /// observable and deterministic.
    pub async fn invoke(&self, data: Vec<JsonValue>) -> Result<(), HandlerError> {
        for callback in &self.callbacks {
            callback(data.clone())
                .await
                .map_err(|source| HandlerError::CallbackFailed {
                    handler: self.id.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Produce the descriptor embedded in model output.
    pub fn serialize(&self) -> HandlerDescriptor {
        HandlerDescriptor {
            target: self.id.clone(),
            fields: self.capture.fields.clone(),
            stop_propagation: self.capture.stop_propagation,
            prevent_default: self.capture.prevent_default,
        }
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler")
            .field("id", &self.id)
            .field("callback_count", &self.callbacks.len())
            .field("capture", &self.capture)
            .finish()
    }
}

/// The wire shape of an inbound event (§6): `{target, data}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Event {
    pub target: HandlerId,
    pub data: Vec<JsonValue>,
}
