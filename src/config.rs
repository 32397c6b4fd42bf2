//! Canvas configuration.
//!
//! The only configurable part of the canvas is the root bootstrap: which
//! definition, decorators and catchers the body node is seeded with. The
//! hosting rendering layer decides these; the defaults describe a plain
//! body that accepts drops.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::primitives::Props;
use crate::types::{CanvasNode, Catcher, Decorator, DefinitionRef, ROOT_ID};

/// Root bootstrap configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Definition the root renders with.
    pub root_definition: DefinitionRef,
    /// Decorators attached to the root.
    pub root_decorators: Vec<Decorator>,
    /// Catchers the root exposes.
    pub root_catchers: Vec<Catcher>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            root_definition: DefinitionRef::new("body"),
            root_decorators: Vec::new(),
            root_catchers: vec![Catcher::new(json!("drop"))],
        }
    }
}

impl CanvasConfig {
    pub fn with_root_definition(mut self, definition: impl Into<DefinitionRef>) -> Self {
        self.root_definition = definition.into();
        self
    }

    pub fn with_root_decorators(mut self, decorators: Vec<Decorator>) -> Self {
        self.root_decorators = decorators;
        self
    }

    pub fn with_root_catchers(mut self, catchers: Vec<Catcher>) -> Self {
        self.root_catchers = catchers;
        self
    }

    /// The seeded root node: no parent, no children.
    pub(crate) fn root_node(&self) -> CanvasNode {
        let mut props = Props::new();
        props.set_children(&[]);
        CanvasNode {
            id: ROOT_ID.to_string(),
            definition: self.root_definition.clone(),
            props,
            parent: None,
            decorators: self.root_decorators.clone(),
            catchers: self.root_catchers.clone(),
        }
    }
}
