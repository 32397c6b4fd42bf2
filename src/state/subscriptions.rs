//! Subscription Registry - per-component change observers
//!
//! Observers subscribe to one component identity and are called with no
//! payload whenever that component's own state changes. They re-read
//! whatever they need from the canvas.
//!
//! # API
//!
//! - `subscribe(id, cb)` - Append an observer, returns a [`Subscription`]
//! - `unsubscribe(id, &cb)` - Remove the first registration of that exact `Rc`
//! - `notify(id)` - Call every observer registered for `id`, in order
//! - `purge(id)` - Drop every observer for `id`
//!
//! # Reentrancy
//!
//! `notify` iterates a snapshot of the list. Observers may subscribe,
//! unsubscribe or mutate the canvas; those changes apply to the next
//! notification, never the one in progress.
//!
//! # Example
//!
//! ```ignore
//! let sub = canvas.subscribe("n1", || println!("n1 changed"));
//! canvas.patch("n1", Props::new().with("label", "Go"))?;
//! sub.dispose();
//! sub.dispose(); // no-op
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

// =============================================================================
// TYPES
// =============================================================================

/// Observer callback. No payload: "something changed for this identity".
pub type ChangeCallback = Rc<dyn Fn()>;

// =============================================================================
// REGISTRY
// =============================================================================

// Each registration gets a token so a disposer removes exactly its own entry,
// even when the same callback is registered more than once.

#[derive(Default)]
struct Registry {
    lists: HashMap<String, Vec<(u64, ChangeCallback)>>,
    next_token: u64,
}

impl Registry {
    fn next_token(&mut self) -> u64 {
        let token = self.next_token;
        self.next_token += 1;
        token
    }

    fn remove_token(&mut self, id: &str, token: u64) -> bool {
        let Some(list) = self.lists.get_mut(id) else {
            return false;
        };
        let before = list.len();
        list.retain(|(entry, _)| *entry != token);
        let removed = list.len() != before;
        if list.is_empty() {
            self.lists.remove(id);
        }
        removed
    }
}

/// Shared handle to the subscription table.
///
/// Cloning yields another handle to the same table.
#[derive(Clone, Default)]
pub struct Subscriptions {
    registry: Rc<RefCell<Registry>>,
}

impl Subscriptions {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `callback` to the observers of `id`.
    pub fn subscribe<F>(&self, id: &str, callback: F) -> Subscription
    where
        F: Fn() + 'static,
    {
        self.subscribe_rc(id, Rc::new(callback))
    }

    /// Append an already shared callback. Keep a clone to use with [`Self::unsubscribe`].
    pub fn subscribe_rc(&self, id: &str, callback: ChangeCallback) -> Subscription {
        let token = {
            let mut reg = self.registry.borrow_mut();
            let token = reg.next_token();
            reg.lists
                .entry(id.to_string())
                .or_default()
                .push((token, callback));
            token
        };

        Subscription {
            registry: Rc::downgrade(&self.registry),
            id: id.to_string(),
            token,
            disposed: Cell::new(false),
        }
    }

    /// Remove the first registration of `callback` for `id`, by pointer identity.
    ///
    /// Returns whether anything was removed. Absent entries are a no-op.
    pub fn unsubscribe(&self, id: &str, callback: &ChangeCallback) -> bool {
        let mut reg = self.registry.borrow_mut();
        let Some(list) = reg.lists.get_mut(id) else {
            return false;
        };
        let Some(pos) = list.iter().position(|(_, cb)| Rc::ptr_eq(cb, callback)) else {
            return false;
        };
        list.remove(pos);
        if list.is_empty() {
            reg.lists.remove(id);
        }
        true
    }

    /// Call every observer of `id` in registration order.
    ///
    /// Returns how many observers were called.
    pub fn notify(&self, id: &str) -> usize {
        let snapshot: Vec<ChangeCallback> = {
            let reg = self.registry.borrow();
            match reg.lists.get(id) {
                Some(list) => list.iter().map(|(_, cb)| Rc::clone(cb)).collect(),
                None => return 0,
            }
        };

        for callback in &snapshot {
            callback();
        }
        snapshot.len()
    }

    /// Drop all observers of `id`. Safe when none are registered.
    pub fn purge(&self, id: &str) {
        self.registry.borrow_mut().lists.remove(id);
    }

    /// Number of observers currently registered for `id`.
    pub fn count(&self, id: &str) -> usize {
        self.registry
            .borrow()
            .lists
            .get(id)
            .map_or(0, Vec::len)
    }

    /// Drop every observer of every identity.
    ///
    /// Tokens keep counting so disposers issued before the clear stay inert.
    pub fn clear(&self) {
        self.registry.borrow_mut().lists.clear();
    }
}

impl fmt::Debug for Subscriptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reg = self.registry.borrow();
        f.debug_struct("Subscriptions")
            .field("identities", &reg.lists.len())
            .field("next_token", &reg.next_token)
            .finish()
    }
}

// =============================================================================
// DISPOSER
// =============================================================================

/// Disposer returned by `subscribe`.
///
/// Dropping it does NOT unsubscribe. Call [`Subscription::dispose`], which is
/// idempotent and never fails.
#[must_use = "keep the Subscription to be able to unsubscribe"]
pub struct Subscription {
    registry: Weak<RefCell<Registry>>,
    id: String,
    token: u64,
    disposed: Cell<bool>,
}

impl Subscription {
    /// Remove this registration. Calling it again does nothing.
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().remove_token(&self.id, self.token);
        }
    }

    /// Identity this subscription observes.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether `dispose` has been called.
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Convert into a plain cleanup closure.
    pub fn into_cleanup(self) -> impl FnOnce() {
        move || self.dispose()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("token", &self.token)
            .field("disposed", &self.disposed.get())
            .finish()
    }
}
