//! Core types for canvas-runtime.
//!
//! These are the records the store owns and hands back to observers.
//! Definition references, decorators and catchers come from an external
//! manifest system and are carried through untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::primitives::Props;

// =============================================================================
// Identity
// =============================================================================

/// Identity of the reserved top-level node (the canvas body).
pub const ROOT_ID: &str = "root";

/// Check whether an identity names the reserved root.
pub fn is_root(id: &str) -> bool {
    id == ROOT_ID
}

// =============================================================================
// Opaque handles
// =============================================================================

/// Reference to a component's rendering/behavior definition.
///
/// Opaque to this crate: only stored and returned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefinitionRef(String);

impl DefinitionRef {
    /// Create a definition reference.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The reference as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DefinitionRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DefinitionRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Visual or behavioral decoration attached to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Decorator(Value);

impl Decorator {
    /// Wrap an opaque decorator payload.
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }

    /// The raw payload.
    pub fn value(&self) -> &Value {
        &self.0
    }
}

/// Capability hook a node exposes to its rendering layer (e.g. drop handling).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catcher(Value);

impl Catcher {
    /// Wrap an opaque catcher payload.
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }

    /// The raw payload.
    pub fn value(&self) -> &Value {
        &self.0
    }
}

// =============================================================================
// Node record
// =============================================================================

/// Back-reference from a node to its owning parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParentLink {
    /// Identity of the parent.
    pub id: String,
    /// Position among the parent's children.
    pub index: usize,
}

impl ParentLink {
    /// Create a parent link.
    pub fn new(id: impl Into<String>, index: usize) -> Self {
        Self {
            id: id.into(),
            index,
        }
    }
}

/// Full record for one component instance on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasNode {
    /// Unique identity.
    pub id: String,
    /// Rendering/behavior definition.
    pub definition: DefinitionRef,
    /// Property bag, including the reserved `children` and `callbacks` keys.
    pub props: Props,
    /// Parent linkage. `None` only for the root.
    pub parent: Option<ParentLink>,
    /// Decorations owned by this node.
    pub decorators: Vec<Decorator>,
    /// Capability hooks defined by the node's manifest.
    pub catchers: Vec<Catcher>,
}

impl CanvasNode {
    /// Whether this node is the reserved root.
    pub fn is_root(&self) -> bool {
        is_root(&self.id)
    }

    /// Ordered child identities, read from `props.children`.
    pub fn children(&self) -> Vec<String> {
        self.props.children()
    }
}

// =============================================================================
// Change kinds (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// What changed about a node during one operation.
    ///
    /// Observers only receive "something changed"; these flags exist for
    /// batching and diagnostics.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Changes: u8 {
        const NONE = 0;
        const PROPS = 1 << 0;
        const CHILDREN = 1 << 1;
        const PARENT = 1 << 2;
        const DECORATORS = 1 << 3;
        const CATCHERS = 1 << 4;
        const CREATED = 1 << 5;
    }
}
