//! Error types for canvas operations.
//!
//! Every mutating operation reports failure synchronously through
//! [`CanvasError`]. Nothing in the store, tree or subscription registry
//! swallows these; the caller decides what to surface.

use thiserror::Error;

/// Errors returned by the canvas store and tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanvasError {
    /// The identity is not present in the store.
    #[error("component '{id}' not found")]
    NotFound {
        /// The missing identity.
        id: String,
    },

    /// A component with this identity already exists.
    #[error("component '{id}' already exists")]
    AlreadyExists {
        /// The colliding identity.
        id: String,
    },

    /// The operation is not allowed on the reserved root node.
    #[error("cannot {operation} the root component")]
    ForbiddenForRoot {
        /// Name of the rejected operation (e.g. "remove", "reparent").
        operation: &'static str,
    },

    /// The child is not listed under the given parent.
    #[error("component '{child}' is not a child of '{parent}'")]
    NotAChild {
        /// Parent identity the caller named.
        parent: String,
        /// Child identity the caller named.
        child: String,
    },

    /// A write targeted a property the tree owns.
    #[error("property '{key}' of '{id}' is managed by the component tree")]
    ReservedProperty {
        /// Identity being written.
        id: String,
        /// The reserved key.
        key: &'static str,
    },

    /// Inserting would make a node its own ancestor.
    #[error("cannot insert '{child}' under its own descendant '{parent}'")]
    CyclicParent {
        /// Requested parent.
        parent: String,
        /// Node being inserted.
        child: String,
    },

    /// A callback action index is past the end of the list.
    #[error("no action at index {index} for '{event}' on '{id}' (len {len})")]
    ActionIndexOutOfRange {
        /// Component identity.
        id: String,
        /// Callback event name.
        event: String,
        /// Requested index.
        index: usize,
        /// Current list length.
        len: usize,
    },
}

impl CanvasError {
    pub(crate) fn not_found(id: &str) -> Self {
        Self::NotFound { id: id.to_string() }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = CanvasError> = std::result::Result<T, E>;
