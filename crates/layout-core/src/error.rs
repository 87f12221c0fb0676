//! Error types for the Layout reconciler.
//!
//! Mirrors the error kinds named by the design: a render that fails, a
//! malformed root, an event referencing a handler that no longer exists,
//! and use of a Layout after it has been torn down.

use serde::Serialize;
use thiserror::Error;

use crate::event::HandlerId;

/// Result type alias used throughout the reconciler.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Top-level error type for Layout operations.
#[derive(Error, Debug)]
pub enum LayoutError {
    /// Construction-time failure: the supplied root does not satisfy the
    /// Element contract (empty id, or otherwise unusable).
    #[error("invalid root element: {0}")]
    InvalidRoot(String),

    /// An operation was attempted after the Layout was torn down.
    #[error("layout used after teardown")]
    TornDown,

    /// A handler's callback raised while `trigger` awaited it.
    ///
    /// Unlike `HostRenderFailure`, this is *not* swallowed into the next
    /// `LayoutUpdate` — it propagates verbatim to the caller of `trigger`
    /// (see §7 of the design).
    #[error("event handler failed: {0}")]
    HandlerFailure(#[from] HandlerError),

    /// Internal consistency error — should never happen if the invariants
    /// in §3 hold; surfaced rather than silently ignored so a violation is
    /// visible in tests and logs rather than corrupting state quietly.
    #[error("layout invariant violated: {0}")]
    Inconsistency(String),
}

/// Errors raised while invoking an [`EventHandler`](crate::event::EventHandler).
#[derive(Error, Debug)]
pub enum HandlerError {
    /// One of the handler's callbacks returned an error.
    #[error("callback for handler {handler} failed: {source}")]
    CallbackFailed {
        handler: HandlerId,
        #[source]
        source: anyhow::Error,
    },
}

/// A render failure captured for a single element during reconciliation.
///
/// Per the resolved isolation policy (§7), this never unwinds past
/// [`Layout::render`](crate::layout::Layout::render) — it is recorded here
/// and surfaced through [`LayoutUpdate::errors`](crate::wire::LayoutUpdate).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostRenderFailure {
    /// Id of the element whose render raised.
    pub element_id: String,
    /// Human-readable failure description (render functions return
    /// `anyhow::Error`-compatible failures; we keep only the message here
    /// since the failure crosses into a JSON-serializable wire type).
    pub message: String,
}

impl std::fmt::Display for HostRenderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "element {} failed to render: {}", self.element_id, self.message)
    }
}
