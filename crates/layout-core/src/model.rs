//! The `Model` dictionary (§3) and its post-reconciliation wire form.
//!
//! A host-authored `Model` is the un-reconciled shape a render function
//! hands back: `attributes` may still contain bare callables, `children`
//! may still contain live `Element`s, and `event_handlers` holds typed
//! `EventHandler`s the host built directly. Reconciliation (§4.6) walks
//! this into a `SerializedModel`, which is what actually goes over the
//! wire (§6) — callables have been lifted into the global handler table and
//! replaced by descriptors, and every `Element` child has been rendered
//! into its own `SerializedModel`.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::element::BoxedElement;
use crate::event::{Callback, EventHandler, HandlerDescriptor};

/// A host-authored view model, before reconciliation.
#[derive(Default)]
pub struct Model {
    /// Required after normalization (§3); host code always supplies it.
    pub tag_name: String,
    pub children: Vec<ModelChild>,
    pub attributes: HashMap<String, AttributeValue>,
    /// Explicitly-typed handlers the host built directly, as opposed to
    /// bare callables left in `attributes` (§3, §4.6 "duplicate keys"
    /// edge case — `attributes`-derived handlers win on collision).
    pub event_handlers: HashMap<String, EventHandler>,
    /// Arbitrary pass-through keys, untouched by reconciliation.
    pub extra: JsonMap<String, JsonValue>,
}

impl Model {
    /// Start building a model for the given tag.
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            ..Default::default()
        }
    }

    /// Builder-style child append.
    pub fn child(mut self, child: impl Into<ModelChild>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Builder-style plain (non-callable) attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.attributes.insert(name.into(), AttributeValue::Json(value.into()));
        self
    }

    /// Builder-style callable attribute — lifted into an `EventHandler` at
    /// reconciliation time (§3, §4.6).
    pub fn on(mut self, name: impl Into<String>, callback: Callback) -> Self {
        self.attributes.insert(name.into(), AttributeValue::Callback(callback));
        self
    }

    /// Builder-style pass-through key, untouched by reconciliation.
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// A child in a host-authored `Model`: another model, a live element to be
/// mounted and rendered, or a primitive coerced to string (§3).
pub enum ModelChild {
    Model(Box<Model>),
    Element(BoxedElement),
    Text(String),
}

impl From<Model> for ModelChild {
    fn from(model: Model) -> Self {
        ModelChild::Model(Box::new(model))
    }
}

impl From<BoxedElement> for ModelChild {
    fn from(element: BoxedElement) -> Self {
        ModelChild::Element(element)
    }
}

impl From<&str> for ModelChild {
    fn from(text: &str) -> Self {
        ModelChild::Text(text.to_string())
    }
}

impl From<String> for ModelChild {
    fn from(text: String) -> Self {
        ModelChild::Text(text)
    }
}

macro_rules! impl_model_child_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ModelChild {
                fn from(value: $ty) -> Self {
                    ModelChild::Text(value.to_string())
                }
            }
        )*
    };
}
impl_model_child_display!(i32, i64, u32, u64, f32, f64, bool);

/// An attribute value before reconciliation: either plain JSON or a bare
/// callable waiting to be lifted into an `EventHandler` (§3).
pub enum AttributeValue {
    Json(JsonValue),
    Callback(Callback),
}

/// The reconciled, JSON-serializable form of a `Model` (§6 wire shape).
#[derive(Debug, Clone, Default)]
pub struct SerializedModel {
    pub tag_name: String,
    pub children: Vec<SerializedChild>,
    pub attributes: JsonMap<String, JsonValue>,
    pub event_handlers: HashMap<String, HandlerDescriptor>,
    pub extra: JsonMap<String, JsonValue>,
}

/// A child in a reconciled model: either another reconciled model or a
/// coerced string (§3 — after reconciliation there are no more `Element`
/// children, only their rendered models).
#[derive(Debug, Clone)]
pub enum SerializedChild {
    Model(SerializedModel),
    Text(String),
}

impl Serialize for SerializedModel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(4 + self.extra.len()))?;
        map.serialize_entry("tagName", &self.tag_name)?;
        map.serialize_entry("children", &self.children)?;
        map.serialize_entry("attributes", &self.attributes)?;
        map.serialize_entry("eventHandlers", &self.event_handlers)?;
        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for SerializedChild {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            SerializedChild::Model(model) => model.serialize(serializer),
            SerializedChild::Text(text) => serializer.serialize_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_wire_shape() {
        let model = SerializedModel {
            tag_name: "div".into(),
            children: vec![SerializedChild::Text("hello".into())],
            attributes: JsonMap::new(),
            event_handlers: HashMap::new(),
            extra: JsonMap::new(),
        };
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["tagName"], "div");
        assert_eq!(json["children"][0], "hello");
        assert_eq!(json["attributes"], serde_json::json!({}));
        assert_eq!(json["eventHandlers"], serde_json::json!({}));
    }

    #[test]
    fn extra_keys_pass_through_at_top_level() {
        let mut extra = JsonMap::new();
        extra.insert("key".into(), JsonValue::from(1));
        let model = SerializedModel {
            tag_name: "div".into(),
            extra,
            ..Default::default()
        };
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["key"], 1);
    }
}
