//! Component props - the open-ended property bag.
//!
//! Props are an insertion-ordered JSON object. Two keys are reserved:
//! - `children` - ordered child identities, owned by the component tree
//! - `callbacks` - event name to ordered list of action descriptors
//!
//! Everything else is opaque and preserved exactly as given.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::actions::Callbacks;

/// Reserved key holding the ordered child identities.
pub const CHILDREN_KEY: &str = "children";

/// Reserved key holding callback action lists.
pub const CALLBACKS_KEY: &str = "callbacks";

// =============================================================================
// Props
// =============================================================================

/// Property bag for one component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Props(Map<String, Value>);

impl Props {
    /// Create an empty property bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert or replace one property.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Read one property.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate properties in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Borrow the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into the underlying JSON object.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Shallow merge: each top-level key of `delta` replaces the value here.
    ///
    /// Nested objects are not merged recursively.
    pub fn merge(&mut self, delta: Props) {
        for (key, value) in delta.0 {
            self.0.insert(key, value);
        }
    }

    // =========================================================================
    // Reserved keys
    // =========================================================================

    /// Ordered child identities. Non-string entries are skipped.
    pub fn children(&self) -> Vec<String> {
        match self.0.get(CHILDREN_KEY) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Whether `children` is absent or an empty list.
    pub(crate) fn has_no_children(&self) -> bool {
        match self.0.get(CHILDREN_KEY) {
            None => true,
            Some(Value::Array(items)) => items.is_empty(),
            Some(_) => false,
        }
    }

    pub(crate) fn set_children(&mut self, children: &[String]) {
        let list = children.iter().cloned().map(Value::String).collect();
        self.0.insert(CHILDREN_KEY.to_string(), Value::Array(list));
    }

    /// Callback action lists, read from the `callbacks` key.
    pub fn callbacks(&self) -> Callbacks {
        match self.0.get(CALLBACKS_KEY) {
            Some(Value::Object(map)) => Callbacks::from(map.clone()),
            _ => Callbacks::default(),
        }
    }
}

impl From<Map<String, Value>> for Props {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Props {
    type Error = Value;

    /// Only JSON objects convert; anything else is handed back.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

impl From<Props> for Value {
    fn from(props: Props) -> Self {
        Value::Object(props.0)
    }
}
