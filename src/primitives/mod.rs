//! Canvas Primitives - Props and callback actions.
//!
//! This module provides the value types stored on every node:
//! - [`Props`] - Ordered property bag with the reserved `children` and `callbacks` keys
//! - [`ActionDescriptor`] - Tagged callback action (send file, navigate, send event data)
//!
//! # Patching
//!
//! Props are patched one top-level key at a time. A patch value fully
//! replaces the previous value at that key:
//!
//! ```ignore
//! // before: { "style": { "color": "red", "margin": 4 } }
//! canvas.patch("n1", Props::new().with("style", json!({ "color": "blue" })))?;
//! // after:  { "style": { "color": "blue" } }
//! ```

mod actions;
mod props;

pub use actions::*;
pub use props::*;
