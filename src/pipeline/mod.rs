//! Update Pipeline
//!
//! Every mutation runs through the same fixed sequence:
//!
//! ```text
//! validate → Store update → Tree Index update → purge removed observers → Dispatch
//! ```
//!
//! ## Key Design Principles
//!
//! - **Validate first**: a failing operation leaves the canvas untouched
//! - **Notify last**: observers only ever see a consistent store and tree
//! - **Own state only**: an identity is notified when its own record changed,
//!   never just because an ancestor or descendant did

mod dispatch;

pub(crate) use dispatch::Dispatch;
