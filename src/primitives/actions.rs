//! Callback action descriptors.
//!
//! A component's `callbacks` prop maps an event name to an ordered list of
//! actions. The store never interprets them; this module only gives them a
//! typed shape so collaborators don't have to sniff JSON.
//!
//! Wire shapes:
//!
//! ```text
//! { "sendFile": { "self": true, "props": ... } }
//! { "sendFile": { "alias": "upload1", "props": ... } }
//! { "navigate": { "type": "internal", "url": "/about" } }
//! { "navigate": { "type": "external", "url": "https://..." } }
//! { "sendEventData": true }
//! ```
//!
//! Any other shape round-trips unchanged through [`ActionDescriptor::Unknown`].
//! Parsing a recognised shape keeps only the fields above, so code that must
//! hand entries back untouched works on [`Callbacks::raw_actions`].

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value, json};

// =============================================================================
// Action Descriptor
// =============================================================================

/// Where a `sendFile` action takes its file from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// The component's own file input.
    Own,
    /// Another component, addressed by its file-upload alias.
    Alias(String),
}

/// One action run when a callback event fires.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionDescriptor {
    /// Upload a file.
    SendFile {
        source: FileSource,
        /// Extra props forwarded with the upload, preserved as given.
        props: Option<Value>,
    },
    /// Navigate to a route of the same app.
    NavigateInternal { url: String },
    /// Navigate to an external URL.
    NavigateExternal { url: String },
    /// Send the event payload to the backend.
    SendEventData,
    /// Shape not recognised; kept verbatim.
    Unknown(Value),
}

impl ActionDescriptor {
    /// The action inserted when a new entry is added to a callback list.
    pub fn default_action() -> Self {
        Self::SendEventData
    }

    /// Parse from the wire shape. Never fails; see [`ActionDescriptor::Unknown`].
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::Unknown(value.clone());
        };

        if let Some(send_file) = obj.get("sendFile").and_then(Value::as_object) {
            let props = send_file.get("props").cloned();
            if send_file.contains_key("self") {
                return Self::SendFile {
                    source: FileSource::Own,
                    props,
                };
            }
            if let Some(alias) = send_file.get("alias").and_then(Value::as_str) {
                return Self::SendFile {
                    source: FileSource::Alias(alias.to_string()),
                    props,
                };
            }
        }

        if let Some(navigate) = obj.get("navigate").and_then(Value::as_object) {
            let url = navigate
                .get("url")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            match navigate.get("type").and_then(Value::as_str) {
                Some("internal") => return Self::NavigateInternal { url },
                Some("external") => return Self::NavigateExternal { url },
                _ => {}
            }
        }

        if obj.contains_key("sendEventData") {
            return Self::SendEventData;
        }

        Self::Unknown(value.clone())
    }

    /// Convert to the wire shape.
    pub fn to_value(&self) -> Value {
        match self {
            Self::SendFile { source, props } => {
                let mut send_file = Map::new();
                match source {
                    FileSource::Own => {
                        send_file.insert("self".into(), Value::Bool(true));
                    }
                    FileSource::Alias(alias) => {
                        send_file.insert("alias".into(), Value::String(alias.clone()));
                    }
                }
                if let Some(props) = props {
                    send_file.insert("props".into(), props.clone());
                }
                json!({ "sendFile": send_file })
            }
            Self::NavigateInternal { url } => {
                json!({ "navigate": { "type": "internal", "url": url } })
            }
            Self::NavigateExternal { url } => {
                json!({ "navigate": { "type": "external", "url": url } })
            }
            Self::SendEventData => json!({ "sendEventData": true }),
            Self::Unknown(value) => value.clone(),
        }
    }

    /// Short human-readable description, as shown in the action editor.
    pub fn label(&self) -> String {
        match self {
            Self::SendFile {
                source: FileSource::Own,
                ..
            } => "Send own file".to_string(),
            Self::SendFile {
                source: FileSource::Alias(alias),
                ..
            } => format!("Send file from {alias}"),
            Self::NavigateInternal { url } => format!("Navigate to {url}"),
            Self::NavigateExternal { .. } => "Navigate to external url".to_string(),
            Self::SendEventData => "Send event data".to_string(),
            Self::Unknown(_) => "Unknown action".to_string(),
        }
    }
}

impl fmt::Display for ActionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl Serialize for ActionDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ActionDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

// =============================================================================
// Callbacks
// =============================================================================

/// The `callbacks` prop: event name to ordered action list.
///
/// A missing or malformed list reads as empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Callbacks(Map<String, Value>);

impl Callbacks {
    /// Actions registered for `event`, in order.
    pub fn actions(&self, event: &str) -> Vec<ActionDescriptor> {
        match self.0.get(event) {
            Some(Value::Array(items)) => items.iter().map(ActionDescriptor::from_value).collect(),
            _ => Vec::new(),
        }
    }

    /// Stored entries for `event`, exactly as written.
    pub fn raw_actions(&self, event: &str) -> Vec<Value> {
        match self.0.get(event) {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        }
    }

    /// Replace the entries for `event` without reinterpreting them.
    pub fn set_raw_actions(&mut self, event: impl Into<String>, entries: Vec<Value>) {
        self.0.insert(event.into(), Value::Array(entries));
    }

    /// Replace the action list for `event`.
    pub fn set_actions(&mut self, event: impl Into<String>, actions: &[ActionDescriptor]) {
        let list = actions.iter().map(ActionDescriptor::to_value).collect();
        self.0.insert(event.into(), Value::Array(list));
    }

    /// Event names in insertion order.
    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Callbacks {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
