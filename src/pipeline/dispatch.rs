//! Update Dispatcher - the notification step of every mutation.
//!
//! A mutating operation records each identity whose own state it changed,
//! then delivers once the store and tree are consistent again. Each identity
//! is notified at most once per operation, in the order it was first touched.

use indexmap::IndexMap;
use tracing::trace;

use crate::state::Subscriptions;
use crate::types::Changes;

/// Identities changed by one logical operation.
#[derive(Debug, Default)]
pub(crate) struct Dispatch {
    pending: IndexMap<String, Changes>,
}

impl Dispatch {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record that `id` changed.
    pub(crate) fn touch(&mut self, id: &str, changes: Changes) {
        match self.pending.get_mut(id) {
            Some(existing) => *existing |= changes,
            None => {
                self.pending.insert(id.to_string(), changes);
            }
        }
    }

    /// Stop tracking `id` (it no longer exists).
    pub(crate) fn forget(&mut self, id: &str) {
        self.pending.shift_remove(id);
    }

    #[cfg(test)]
    pub(crate) fn pending(&self) -> Vec<(&str, Changes)> {
        self.pending
            .iter()
            .map(|(id, changes)| (id.as_str(), *changes))
            .collect()
    }

    /// Notify subscribers of every touched identity.
    ///
    /// Must be called with no canvas borrow held: observers may re-enter.
    pub(crate) fn deliver(self, subscriptions: &Subscriptions) {
        for (id, changes) in self.pending {
            let notified = subscriptions.notify(&id);
            trace!(id = %id, ?changes, subscribers = notified, "dispatched");
        }
    }
}
