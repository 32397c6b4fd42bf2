//! Component Tree Index - parent identity to ordered child identities.
//!
//! Holds back-references only (identity strings). Positions are clamped to
//! the valid range so callers can pass "append" as any large index.

use std::collections::HashMap;

#[derive(Debug, Default)]
pub(crate) struct ComponentTree {
    children: HashMap<String, Vec<String>>,
}

impl ComponentTree {
    /// Ordered children of `parent`; empty when it has none.
    pub(crate) fn children_of(&self, parent: &str) -> &[String] {
        self.children.get(parent).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn position(&self, parent: &str, child: &str) -> Option<usize> {
        self.children_of(parent).iter().position(|c| c == child)
    }

    /// Insert `child` at `at` (clamped). Returns the actual position.
    pub(crate) fn insert(&mut self, parent: &str, child: &str, at: usize) -> usize {
        let list = self.children.entry(parent.to_string()).or_default();
        let at = at.min(list.len());
        list.insert(at, child.to_string());
        at
    }

    /// Remove `child` from `parent`. Returns its former position.
    pub(crate) fn remove(&mut self, parent: &str, child: &str) -> Option<usize> {
        let list = self.children.get_mut(parent)?;
        let pos = list.iter().position(|c| c == child)?;
        list.remove(pos);
        if list.is_empty() {
            self.children.remove(parent);
        }
        Some(pos)
    }

    /// Move `child` within `parent` to `to` (clamped).
    ///
    /// Returns `(from, to)` or `None` when `child` is not under `parent`.
    pub(crate) fn move_to(&mut self, parent: &str, child: &str, to: usize) -> Option<(usize, usize)> {
        let list = self.children.get_mut(parent)?;
        let from = list.iter().position(|c| c == child)?;
        let item = list.remove(from);
        let to = to.min(list.len());
        list.insert(to, item);
        Some((from, to))
    }

    /// Forget the child list of a removed node.
    pub(crate) fn drop_parent(&mut self, parent: &str) {
        self.children.remove(parent);
    }

    /// `root` and every descendant, depth-first pre-order.
    pub(crate) fn subtree(&self, root: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack = vec![root.to_string()];
        while let Some(id) = stack.pop() {
            stack.extend(self.children_of(&id).iter().rev().cloned());
            out.push(id);
        }
        out
    }
}
