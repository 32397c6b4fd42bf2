//! Component Store - identity to node record.
//!
//! The store exclusively owns every [`CanvasNode`]. It knows nothing about
//! child ordering or observers; [`Canvas`](super::Canvas) keeps it in step
//! with the tree index and runs notifications.

use std::collections::HashMap;

use crate::error::{CanvasError, Result};
use crate::primitives::Props;
use crate::types::{CanvasNode, ROOT_ID, is_root};

#[derive(Debug, Default)]
pub(crate) struct ComponentStore {
    nodes: HashMap<String, CanvasNode>,
}

impl ComponentStore {
    /// A store holding only `root`.
    pub(crate) fn seeded(root: CanvasNode) -> Self {
        debug_assert_eq!(root.id, ROOT_ID);
        let mut nodes = HashMap::new();
        nodes.insert(root.id.clone(), root);
        Self { nodes }
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn get(&self, id: &str) -> Result<&CanvasNode> {
        self.nodes.get(id).ok_or_else(|| CanvasError::not_found(id))
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Result<&mut CanvasNode> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| CanvasError::not_found(id))
    }

    /// Insert a new node. Never overwrites.
    pub(crate) fn insert(&mut self, node: CanvasNode) -> Result<()> {
        if self.nodes.contains_key(&node.id) {
            return Err(CanvasError::AlreadyExists { id: node.id });
        }
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Shallow-merge `delta` into the node's props.
    pub(crate) fn merge_props(&mut self, id: &str, delta: Props) -> Result<()> {
        self.get_mut(id)?.props.merge(delta);
        Ok(())
    }

    /// Delete a node's record.
    pub(crate) fn remove(&mut self, id: &str) -> Result<CanvasNode> {
        if is_root(id) {
            return Err(CanvasError::ForbiddenForRoot { operation: "remove" });
        }
        self.nodes
            .remove(id)
            .ok_or_else(|| CanvasError::not_found(id))
    }

    /// Walk parent links upward from `id`, yielding each ancestor identity.
    pub(crate) fn ancestors(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut current = self.nodes.get(id).and_then(|node| node.parent.as_ref());
        while let Some(link) = current {
            // Corrupt links would loop forever
            if out.len() > self.nodes.len() {
                break;
            }
            out.push(link.id.clone());
            current = self.nodes.get(&link.id).and_then(|node| node.parent.as_ref());
        }
        out
    }
}
