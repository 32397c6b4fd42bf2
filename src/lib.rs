//! # canvas-runtime
//!
//! State core of a visual page builder.
//!
//! Holds the authoritative component hierarchy of a canvas and tells
//! interested observers (property panels, parent re-renderers, overlay
//! tooling) exactly which component changed, without re-scanning the tree.
//!
//! ## Architecture
//!
//! Three structures, kept consistent by one handle:
//!
//! ```text
//! Component Store  (identity → node record)
//! Component Tree   (parent identity → ordered child identities)
//! Subscriptions    (identity → ordered observer callbacks)
//!          ↑
//!        Canvas: validate → store → tree → purge → dispatch
//! ```
//!
//! Everything is single-threaded and synchronous. Observers get no payload;
//! they read back what they need, and may mutate the canvas from inside a
//! notification.
//!
//! ## Example
//!
//! ```
//! use canvas_runtime::{Canvas, ParentLink, Props, ROOT_ID};
//!
//! let canvas = Canvas::new();
//! canvas
//!     .create("n1", "Button", Props::new(), ParentLink::new(ROOT_ID, 0), vec![], vec![])
//!     .unwrap();
//!
//! let sub = canvas.subscribe("n1", || println!("n1 changed"));
//! canvas.patch("n1", Props::new().with("label", "Go")).unwrap();
//! sub.dispose();
//!
//! assert_eq!(canvas.children_of(ROOT_ID).unwrap(), vec!["n1"]);
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Node record, parent link, opaque handles
//! - [`engine`] - Component store, tree index, [`Canvas`] handle
//! - [`state`] - Subscription registry and disposers
//! - [`primitives`] - Props bag and callback action descriptors
//! - [`config`] - Root bootstrap configuration

pub mod config;
pub mod engine;
pub mod error;
mod pipeline;
pub mod primitives;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::CanvasConfig;

pub use engine::{Canvas, current_canvas, reset_canvas, with_canvas};

pub use error::{CanvasError, Result};

pub use primitives::{ActionDescriptor, CALLBACKS_KEY, CHILDREN_KEY, Callbacks, FileSource, Props};

pub use state::{ChangeCallback, Subscription, Subscriptions};
