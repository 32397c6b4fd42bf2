//! State Module - Observer bookkeeping
//!
//! - **Subscriptions** - Per-identity observer lists, snapshot notify, disposers

mod subscriptions;

pub use subscriptions::*;
