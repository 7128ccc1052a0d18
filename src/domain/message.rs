//! Message unit exchanged with the flow host
//!
//! Mirrors the host's message object: a correlation id, a `payload`, and any
//! other properties upstream nodes attached. Unknown properties survive a
//! round trip through the node untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "_msgid", default = "generate_message_id")]
    pub id: String,

    #[serde(default)]
    pub payload: Value,

    /// Everything else on the message (`topic`, headers, ...)
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

fn generate_message_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

impl Message {
    /// Create a message with a fresh id
    pub fn new(payload: impl Into<Value>) -> Self {
        Self {
            id: generate_message_id(),
            payload: payload.into(),
            properties: Map::new(),
        }
    }

    /// Attach an extra property
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Read the payload as a search keyword.
    ///
    /// Strings are taken verbatim; numbers and booleans use their display
    /// form, with integral floats rendered without a fraction (`1.0` reads as
    /// `1`). Anything else has no keyword reading.
    pub fn keyword(&self) -> Option<String> {
        match &self.payload {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) if n.is_f64() => n.as_f64().map(|f| f.to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Replace the payload, keeping id and properties
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }
}
