//! Canvas Engine - Component store, tree index, and the canvas handle.
//!
//! The engine manages the core data structures:
//! - Store: identity → node record (the only owner of node data)
//! - Tree: parent identity → ordered child identities (back-references only)
//! - Canvas: runs every mutation against both, then dispatches notifications
//! - Global: the process-wide canvas, seeded once, resettable for tests
//!
//! # Architecture
//!
//! Nodes never hold each other. Linkage is by identity:
//!
//! ```text
//! store["root"] = { parent: None,           props.children: ["n1", "n2"] }
//! store["n1"]   = { parent: ("root", 0),    props.children: [] }
//! store["n2"]   = { parent: ("root", 1),    props.children: ["n3"] }
//! store["n3"]   = { parent: ("n2", 0),      props.children: [] }
//!
//! tree["root"]  = ["n1", "n2"]
//! tree["n2"]    = ["n3"]
//! ```
//!
//! `tree[p]` always equals `store[p].props.children`, and every child's
//! recorded index equals its position.

mod canvas;
mod global;
mod store;
mod tree;

pub use canvas::*;
pub use global::*;
