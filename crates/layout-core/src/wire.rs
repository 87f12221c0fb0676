//! The outer wire envelope a host sends to its client after a render or
//! update pass (§6). `Event` (the inbound counterpart) lives in
//! [`event`](crate::event) since it's addressed to an `EventHandler`.

use serde::Serialize;

use crate::error::HostRenderFailure;
use crate::model::SerializedModel;

/// A single patch the client should apply: a new model for `src`, the model
/// it replaces (if any — absent on first render), and any render failures
/// recorded during this pass (§7 isolation policy).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutUpdate {
    /// Id of the element this update roots at — the one that was actually
    /// re-rendered, not necessarily the Layout's root (§4.5 partial update).
    pub src: String,
    pub new: SerializedModel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old: Option<SerializedModel>,
    /// Render failures recorded against elements in this update's subtree.
    /// Per the resolved isolation policy (§7), these are a real part of the
    /// protocol contract — a client is expected to render `new` as given
    /// and separately surface `errors`, not treat their presence as a
    /// reason to ignore `new`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<HostRenderFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn old_and_errors_are_omitted_when_absent() {
        let update = LayoutUpdate {
            src: "e1".into(),
            new: SerializedModel::default(),
            old: None,
            errors: Vec::new(),
        };
        let json = serde_json::to_value(&update).unwrap();
        assert!(json.get("old").is_none());
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn errors_serialize_with_camel_case_fields() {
        let update = LayoutUpdate {
            src: "e1".into(),
            new: SerializedModel::default(),
            old: None,
            errors: vec![HostRenderFailure {
                element_id: "e2".into(),
                message: "boom".into(),
            }],
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["errors"][0]["elementId"], "e2");
        assert_eq!(json["errors"][0]["message"], "boom");
    }
}
