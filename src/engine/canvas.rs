//! Canvas - the component store, tree index and subscriptions as one unit.
//!
//! [`Canvas`] is a cheap-to-clone handle. Every mutating method is one
//! logical operation:
//!
//! 1. validate (nothing changes on error)
//! 2. update the store and the tree index together
//! 3. purge observers of removed nodes
//! 4. notify each identity whose own record changed
//!
//! No borrow is held during step 4, so observers can read the canvas,
//! subscribe, unsubscribe and run nested mutations.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, warn};

use super::store::ComponentStore;
use super::tree::ComponentTree;
use crate::config::CanvasConfig;
use crate::error::{CanvasError, Result};
use crate::pipeline::Dispatch;
use crate::primitives::{ActionDescriptor, CALLBACKS_KEY, CHILDREN_KEY, Props};
use crate::state::{ChangeCallback, Subscription, Subscriptions};
use crate::types::{CanvasNode, Catcher, Changes, Decorator, DefinitionRef, ParentLink, ROOT_ID, is_root};

// =============================================================================
// Canvas State
// =============================================================================

#[derive(Debug)]
struct CanvasData {
    store: ComponentStore,
    tree: ComponentTree,
}

impl CanvasData {
    fn seeded(config: &CanvasConfig) -> Self {
        Self {
            store: ComponentStore::seeded(config.root_node()),
            tree: ComponentTree::default(),
        }
    }

    /// Rewrite `parent`'s `props.children` from the tree and re-index
    /// children from position `from` on, touching only what changed.
    fn sync_children(&mut self, parent: &str, from: usize, dispatch: &mut Dispatch) -> Result<()> {
        let children = self.tree.children_of(parent).to_vec();
        for (index, child) in children.iter().enumerate().skip(from) {
            let node = self.store.get_mut(child)?;
            let link = ParentLink::new(parent, index);
            if node.parent.as_ref() != Some(&link) {
                node.parent = Some(link);
                dispatch.touch(child, Changes::PARENT);
            }
        }
        let props = &mut self.store.get_mut(parent)?.props;
        if props.children() != children {
            props.set_children(&children);
            dispatch.touch(parent, Changes::CHILDREN);
        }
        Ok(())
    }

    /// Detach `id` from its parent and delete it with its whole subtree.
    ///
    /// Returns the deleted identities (pre-order).
    fn delete_subtree(&mut self, id: &str, dispatch: &mut Dispatch) -> Result<Vec<String>> {
        let parent = self
            .store
            .get(id)?
            .parent
            .clone()
            .ok_or(CanvasError::ForbiddenForRoot { operation: "remove" })?;

        let removed = self.tree.subtree(id);
        if let Some(pos) = self.tree.remove(&parent.id, id) {
            self.sync_children(&parent.id, pos, dispatch)?;
        }
        for gone in &removed {
            self.store.remove(gone)?;
            self.tree.drop_parent(gone);
            dispatch.forget(gone);
        }
        Ok(removed)
    }

    fn require(&self, id: &str) -> Result<()> {
        if self.store.contains(id) {
            Ok(())
        } else {
            Err(CanvasError::not_found(id))
        }
    }
}

struct CanvasInner {
    config: CanvasConfig,
    data: RefCell<CanvasData>,
    subscriptions: Subscriptions,
}

// =============================================================================
// Canvas Handle
// =============================================================================

/// Handle to one canvas: store, tree index and subscription registry.
///
/// Starts seeded with the root node. Clones share the same canvas.
#[derive(Clone)]
pub struct Canvas {
    inner: Rc<CanvasInner>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canvas")
            .field("components", &self.len())
            .field("subscriptions", &self.inner.subscriptions)
            .finish()
    }
}

impl Canvas {
    /// Create a canvas seeded with the default root.
    pub fn new() -> Self {
        Self::with_config(CanvasConfig::default())
    }

    /// Create a canvas seeded from `config`.
    pub fn with_config(config: CanvasConfig) -> Self {
        let data = CanvasData::seeded(&config);
        Self {
            inner: Rc::new(CanvasInner {
                config,
                data: RefCell::new(data),
                subscriptions: Subscriptions::new(),
            }),
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.inner.config
    }

    /// Restore the seeded state: only the root, no observers.
    pub fn reset(&self) {
        *self.inner.data.borrow_mut() = CanvasData::seeded(&self.inner.config);
        self.inner.subscriptions.clear();
        debug!("canvas reset");
    }

    /// Run one mutation: apply `op` under the borrow, purge, then notify.
    fn mutate<T>(&self, op: impl FnOnce(&mut CanvasData, &mut Dispatch) -> Result<(T, Vec<String>)>) -> Result<T> {
        let mut dispatch = Dispatch::new();
        let (out, removed) = {
            let mut data = self.inner.data.borrow_mut();
            op(&mut *data, &mut dispatch)?
        };
        for id in &removed {
            self.inner.subscriptions.purge(id);
        }
        dispatch.deliver(&self.inner.subscriptions);
        Ok(out)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Copy of the node record for `id`.
    pub fn get(&self, id: &str) -> Result<CanvasNode> {
        self.inner.data.borrow().store.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.data.borrow().store.contains(id)
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.inner.data.borrow().store.len()
    }

    /// Always false: the root cannot be removed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parent link of `id` (`None` for the root).
    pub fn parent_of(&self, id: &str) -> Result<Option<ParentLink>> {
        Ok(self.inner.data.borrow().store.get(id)?.parent.clone())
    }

    /// Ordered children of `id`.
    pub fn children_of(&self, id: &str) -> Result<Vec<String>> {
        let data = self.inner.data.borrow();
        data.require(id)?;
        Ok(data.tree.children_of(id).to_vec())
    }

    /// Every descendant of `id`, depth-first pre-order, excluding `id`.
    pub fn descendants(&self, id: &str) -> Result<Vec<String>> {
        let data = self.inner.data.borrow();
        data.require(id)?;
        let mut all = data.tree.subtree(id);
        all.remove(0);
        Ok(all)
    }

    // =========================================================================
    // Store operations
    // =========================================================================

    /// Place a new component under `parent.id` at `parent.index` (clamped).
    ///
    /// `props.children` must be absent or empty; children are added with
    /// [`Canvas::insert_child`] or by creating them under this node.
    pub fn create(
        &self,
        id: impl Into<String>,
        definition: impl Into<DefinitionRef>,
        props: Props,
        parent: ParentLink,
        decorators: Vec<Decorator>,
        catchers: Vec<Catcher>,
    ) -> Result<CanvasNode> {
        let id = id.into();
        let definition = definition.into();

        self.mutate(|data, dispatch| {
            if data.store.contains(&id) {
                return Err(CanvasError::AlreadyExists { id });
            }
            data.require(&parent.id)?;
            if !props.has_no_children() {
                return Err(CanvasError::ReservedProperty {
                    id,
                    key: CHILDREN_KEY,
                });
            }

            let mut props = props;
            props.set_children(&[]);
            data.store.insert(CanvasNode {
                id: id.clone(),
                definition,
                props,
                parent: Some(parent.clone()),
                decorators,
                catchers,
            })?;

            let pos = data.tree.insert(&parent.id, &id, parent.index);
            data.sync_children(&parent.id, pos, dispatch)?;
            dispatch.touch(&id, Changes::CREATED);

            debug!(id = %id, parent = %parent.id, index = pos, "component created");
            Ok((data.store.get(&id)?.clone(), Vec::new()))
        })
    }

    /// Shallow-merge `delta` into the props of `id` and notify it.
    ///
    /// `children` cannot be patched; use the tree operations.
    pub fn patch(&self, id: &str, delta: Props) -> Result<()> {
        self.mutate(|data, dispatch| {
            data.require(id)?;
            if delta.contains_key(CHILDREN_KEY) {
                return Err(CanvasError::ReservedProperty {
                    id: id.to_string(),
                    key: CHILDREN_KEY,
                });
            }
            data.store.merge_props(id, delta)?;
            dispatch.touch(id, Changes::PROPS);
            Ok(((), Vec::new()))
        })
    }

    /// Remove `id` and its whole subtree. The former parent is notified;
    /// observers of removed nodes are dropped without being called.
    pub fn remove(&self, id: &str) -> Result<()> {
        self.mutate(|data, dispatch| {
            data.require(id)?;
            if is_root(id) {
                warn!("rejected removal of the root component");
                return Err(CanvasError::ForbiddenForRoot { operation: "remove" });
            }
            let removed = data.delete_subtree(id, dispatch)?;
            debug!(id = %id, removed = removed.len(), "component removed");
            Ok(((), removed))
        })
    }

    /// Replace the decorators of `id`.
    pub fn set_decorators(&self, id: &str, decorators: Vec<Decorator>) -> Result<()> {
        self.mutate(|data, dispatch| {
            data.store.get_mut(id)?.decorators = decorators;
            dispatch.touch(id, Changes::DECORATORS);
            Ok(((), Vec::new()))
        })
    }

    /// Replace the catchers of `id`.
    pub fn set_catchers(&self, id: &str, catchers: Vec<Catcher>) -> Result<()> {
        self.mutate(|data, dispatch| {
            data.store.get_mut(id)?.catchers = catchers;
            dispatch.touch(id, Changes::CATCHERS);
            Ok(((), Vec::new()))
        })
    }

    // =========================================================================
    // Tree operations
    // =========================================================================

    /// Insert `child` under `parent` at `at` (clamped).
    ///
    /// A child already under `parent` is repositioned; a child under another
    /// parent is moved over, and both parents are notified.
    pub fn insert_child(&self, parent: &str, child: &str, at: usize) -> Result<()> {
        self.mutate(|data, dispatch| {
            data.require(parent)?;
            data.require(child)?;
            if is_root(child) {
                warn!(parent = %parent, "rejected reparenting of the root component");
                return Err(CanvasError::ForbiddenForRoot { operation: "reparent" });
            }
            if parent == child || data.store.ancestors(parent).iter().any(|a| a == child) {
                return Err(CanvasError::CyclicParent {
                    parent: parent.to_string(),
                    child: child.to_string(),
                });
            }

            let current = data.store.get(child)?.parent.clone();
            match current {
                Some(link) if link.id == parent && data.tree.position(parent, child).is_some() => {
                    reposition(data, parent, child, at, dispatch)?;
                }
                current => {
                    if let Some(old) = current {
                        if let Some(pos) = data.tree.remove(&old.id, child) {
                            data.sync_children(&old.id, pos, dispatch)?;
                        }
                    }
                    let pos = data.tree.insert(parent, child, at);
                    data.sync_children(parent, pos, dispatch)?;
                    debug!(child = %child, parent = %parent, index = pos, "child inserted");
                }
            }
            Ok(((), Vec::new()))
        })
    }

    /// Move `child` to position `to` (clamped) within `parent`.
    pub fn move_child(&self, parent: &str, child: &str, to: usize) -> Result<()> {
        self.mutate(|data, dispatch| {
            data.require(parent)?;
            data.require(child)?;
            reposition(data, parent, child, to, dispatch)?;
            Ok(((), Vec::new()))
        })
    }

    /// Remove `child` from `parent`'s children and delete it with its subtree.
    pub fn remove_child(&self, parent: &str, child: &str) -> Result<()> {
        self.mutate(|data, dispatch| {
            data.require(parent)?;
            data.require(child)?;
            if data.tree.position(parent, child).is_none() {
                return Err(CanvasError::NotAChild {
                    parent: parent.to_string(),
                    child: child.to_string(),
                });
            }
            let removed = data.delete_subtree(child, dispatch)?;
            debug!(child = %child, parent = %parent, removed = removed.len(), "child removed");
            Ok(((), removed))
        })
    }

    // =========================================================================
    // Callback actions
    // =========================================================================

    /// Actions bound to `event` on `id`. Missing lists read as empty.
    pub fn callback_actions(&self, id: &str, event: &str) -> Result<Vec<ActionDescriptor>> {
        Ok(self.inner.data.borrow().store.get(id)?.props.callbacks().actions(event))
    }

    /// Append `action` to the `event` list of `id`.
    pub fn push_callback_action(&self, id: &str, event: &str, action: ActionDescriptor) -> Result<()> {
        self.edit_callback_actions(id, event, |actions| {
            actions.push(action.to_value());
            Ok(())
        })
    }

    /// Replace the action at `index` of the `event` list of `id`.
    pub fn replace_callback_action(
        &self,
        id: &str,
        event: &str,
        index: usize,
        action: ActionDescriptor,
    ) -> Result<()> {
        self.edit_callback_actions(id, event, |actions| {
            let len = actions.len();
            let slot = actions.get_mut(index).ok_or_else(|| CanvasError::ActionIndexOutOfRange {
                id: id.to_string(),
                event: event.to_string(),
                index,
                len,
            })?;
            *slot = action.to_value();
            Ok(())
        })
    }

    /// Remove the action at `index` of the `event` list of `id`.
    pub fn remove_callback_action(&self, id: &str, event: &str, index: usize) -> Result<()> {
        self.edit_callback_actions(id, event, |actions| {
            if index >= actions.len() {
                return Err(CanvasError::ActionIndexOutOfRange {
                    id: id.to_string(),
                    event: event.to_string(),
                    index,
                    len: actions.len(),
                });
            }
            actions.remove(index);
            Ok(())
        })
    }

    // Edits the stored entries as-is, so untouched actions keep their exact
    // shape. The whole `callbacks` map is re-patched so shallow merge keeps
    // the other events' lists.
    fn edit_callback_actions(
        &self,
        id: &str,
        event: &str,
        edit: impl FnOnce(&mut Vec<Value>) -> Result<()>,
    ) -> Result<()> {
        let mut callbacks = self.inner.data.borrow().store.get(id)?.props.callbacks();
        let mut entries = callbacks.raw_actions(event);
        edit(&mut entries)?;
        callbacks.set_raw_actions(event, entries);
        self.patch(id, Props::new().with(CALLBACKS_KEY, callbacks.into_value()))
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Observe changes to `id`. The node need not exist yet.
    pub fn subscribe<F>(&self, id: &str, callback: F) -> Subscription
    where
        F: Fn() + 'static,
    {
        self.inner.subscriptions.subscribe(id, callback)
    }

    /// Observe with a shared callback, for later [`Canvas::unsubscribe`].
    pub fn subscribe_rc(&self, id: &str, callback: ChangeCallback) -> Subscription {
        self.inner.subscriptions.subscribe_rc(id, callback)
    }

    /// Remove the first registration of `callback` for `id`. No-op when absent.
    pub fn unsubscribe(&self, id: &str, callback: &ChangeCallback) -> bool {
        self.inner.subscriptions.unsubscribe(id, callback)
    }

    /// Notify the observers of `id` without changing anything.
    pub fn notify(&self, id: &str) -> usize {
        self.inner.subscriptions.notify(id)
    }

    pub fn subscriber_count(&self, id: &str) -> usize {
        self.inner.subscriptions.count(id)
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Check the store/tree invariants. Returns a description of the first violation.
    pub fn check_consistency(&self) -> std::result::Result<(), String> {
        let data = self.inner.data.borrow();
        let root = data.store.get(ROOT_ID).map_err(|e| e.to_string())?;
        if root.parent.is_some() {
            return Err("root has a parent".into());
        }

        let reachable = data.tree.subtree(ROOT_ID);
        if reachable.len() != data.store.len() {
            return Err(format!(
                "{} nodes stored, {} reachable from root",
                data.store.len(),
                reachable.len()
            ));
        }

        for id in &reachable {
            let node = data.store.get(id).map_err(|e| e.to_string())?;
            let children = data.tree.children_of(id);
            if node.props.children() != children {
                return Err(format!("props.children of '{id}' differ from the tree index"));
            }
            if !matches!(node.props.get(CHILDREN_KEY), Some(Value::Array(_))) {
                return Err(format!("'{id}' has no children list"));
            }
            for (index, child) in children.iter().enumerate() {
                let link = data.store.get(child).map_err(|e| e.to_string())?.parent.clone();
                if link != Some(ParentLink::new(id.as_str(), index)) {
                    return Err(format!("'{child}' records {link:?}, expected ('{id}', {index})"));
                }
            }
        }
        Ok(())
    }
}

/// Shared by `insert_child` (same parent) and `move_child`.
fn reposition(data: &mut CanvasData, parent: &str, child: &str, to: usize, dispatch: &mut Dispatch) -> Result<()> {
    let (from, to) = data
        .tree
        .move_to(parent, child, to)
        .ok_or_else(|| CanvasError::NotAChild {
            parent: parent.to_string(),
            child: child.to_string(),
        })?;
    if from == to {
        return Ok(());
    }
    data.sync_children(parent, from.min(to), dispatch)?;
    debug!(child = %child, parent = %parent, from, to, "child moved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    fn place(canvas: &Canvas, id: &str, parent: &str, index: usize) {
        canvas
            .create(id, "Div", Props::new(), ParentLink::new(parent, index), Vec::new(), Vec::new())
            .unwrap();
    }

    fn counter(canvas: &Canvas, id: &str) -> (Rc<Cell<usize>>, Subscription) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let sub = canvas.subscribe(id, move || c.set(c.get() + 1));
        (count, sub)
    }

    #[test]
    fn test_seeded_root() {
        let canvas = Canvas::new();
        let root = canvas.get(ROOT_ID).unwrap();
        assert_eq!(root.parent, None);
        assert!(root.children().is_empty());
        assert_eq!(canvas.len(), 1);
        assert!(!canvas.is_empty());
        canvas.check_consistency().unwrap();
    }

    #[test]
    fn test_create_links_into_parent() {
        let canvas = Canvas::new();
        let (root_count, _r) = counter(&canvas, ROOT_ID);

        let node = canvas
            .create(
                "n1",
                "Button",
                Props::try_from(json!({ "children": [], "label": "Go" })).unwrap(),
                ParentLink::new(ROOT_ID, 0),
                Vec::new(),
                Vec::new(),
            )
            .unwrap();

        assert_eq!(node.parent, Some(ParentLink::new(ROOT_ID, 0)));
        assert_eq!(canvas.children_of(ROOT_ID).unwrap(), vec!["n1"]);
        assert_eq!(canvas.get(ROOT_ID).unwrap().children(), vec!["n1"]);
        assert_eq!(root_count.get(), 1);
        canvas.check_consistency().unwrap();
    }

    #[test]
    fn test_create_errors() {
        let canvas = Canvas::new();
        place(&canvas, "n1", ROOT_ID, 0);

        let dup = canvas.create("n1", "Div", Props::new(), ParentLink::new(ROOT_ID, 0), vec![], vec![]);
        assert_eq!(dup, Err(CanvasError::AlreadyExists { id: "n1".into() }));

        let root = canvas.create(ROOT_ID, "Div", Props::new(), ParentLink::new("n1", 0), vec![], vec![]);
        assert_eq!(root, Err(CanvasError::AlreadyExists { id: "root".into() }));

        let orphan = canvas.create("n2", "Div", Props::new(), ParentLink::new("ghost", 0), vec![], vec![]);
        assert_eq!(orphan, Err(CanvasError::not_found("ghost")));

        let with_kids = canvas.create(
            "n3",
            "Div",
            Props::try_from(json!({ "children": ["n1"] })).unwrap(),
            ParentLink::new(ROOT_ID, 0),
            vec![],
            vec![],
        );
        assert_eq!(
            with_kids,
            Err(CanvasError::ReservedProperty { id: "n3".into(), key: "children" })
        );

        assert_eq!(canvas.len(), 2);
        canvas.check_consistency().unwrap();
    }

    #[test]
    fn test_create_clamps_and_shifts_siblings() {
        let canvas = Canvas::new();
        place(&canvas, "a", ROOT_ID, 0);
        place(&canvas, "b", ROOT_ID, 50);
        let (a_count, _a) = counter(&canvas, "a");
        let (b_count, _b) = counter(&canvas, "b");

        place(&canvas, "c", ROOT_ID, 1);

        assert_eq!(canvas.children_of(ROOT_ID).unwrap(), vec!["a", "c", "b"]);
        assert_eq!(canvas.parent_of("b").unwrap(), Some(ParentLink::new(ROOT_ID, 2)));
        // Only the shifted sibling changed
        assert_eq!(a_count.get(), 0);
        assert_eq!(b_count.get(), 1);
        canvas.check_consistency().unwrap();
    }

    #[test]
    fn test_patch_notifies_once() {
        let canvas = Canvas::new();
        place(&canvas, "n1", ROOT_ID, 0);
        let (count, _sub) = counter(&canvas, "n1");
        let (root_count, _r) = counter(&canvas, ROOT_ID);

        canvas
            .patch("n1", Props::try_from(json!({ "label": "Go", "size": 2 })).unwrap())
            .unwrap();

        assert_eq!(count.get(), 1);
        assert_eq!(root_count.get(), 0);
        assert_eq!(canvas.get("n1").unwrap().props.get("label"), Some(&json!("Go")));
    }

    #[test]
    fn test_patch_errors() {
        let canvas = Canvas::new();
        place(&canvas, "n1", ROOT_ID, 0);
        let (count, _sub) = counter(&canvas, "n1");

        assert_eq!(canvas.patch("ghost", Props::new()), Err(CanvasError::not_found("ghost")));
        assert_eq!(
            canvas.patch("n1", Props::new().with("children", json!([]))),
            Err(CanvasError::ReservedProperty { id: "n1".into(), key: "children" })
        );
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_remove_subtree_and_purge() {
        let canvas = Canvas::new();
        place(&canvas, "a", ROOT_ID, 0);
        place(&canvas, "b", ROOT_ID, 1);
        place(&canvas, "a1", "a", 0);
        place(&canvas, "a1x", "a1", 0);

        let (a_count, _a) = counter(&canvas, "a");
        let (deep_count, _d) = counter(&canvas, "a1x");
        let (root_count, _r) = counter(&canvas, ROOT_ID);
        let (b_count, _b) = counter(&canvas, "b");

        canvas.remove("a").unwrap();

        assert!(!canvas.contains("a"));
        assert!(!canvas.contains("a1"));
        assert!(!canvas.contains("a1x"));
        assert_eq!(canvas.children_of(ROOT_ID).unwrap(), vec!["b"]);
        assert_eq!(canvas.parent_of("b").unwrap(), Some(ParentLink::new(ROOT_ID, 0)));

        assert_eq!(a_count.get(), 0);
        assert_eq!(deep_count.get(), 0);
        assert_eq!(root_count.get(), 1);
        assert_eq!(b_count.get(), 1);
        assert_eq!(canvas.subscriber_count("a"), 0);
        assert_eq!(canvas.subscriber_count("a1x"), 0);
        canvas.check_consistency().unwrap();
    }

    #[test]
    fn test_remove_root_forbidden() {
        let canvas = Canvas::new();
        assert_eq!(
            canvas.remove(ROOT_ID),
            Err(CanvasError::ForbiddenForRoot { operation: "remove" })
        );
        assert_eq!(canvas.remove("ghost"), Err(CanvasError::not_found("ghost")));
    }

    #[test]
    fn test_insert_child_reparents() {
        let canvas = Canvas::new();
        place(&canvas, "a", ROOT_ID, 0);
        place(&canvas, "b", ROOT_ID, 1);
        place(&canvas, "x", "a", 0);

        let (a_count, _a) = counter(&canvas, "a");
        let (b_count, _b) = counter(&canvas, "b");
        let (x_count, _x) = counter(&canvas, "x");
        let (root_count, _r) = counter(&canvas, ROOT_ID);

        canvas.insert_child("b", "x", 0).unwrap();

        assert!(canvas.children_of("a").unwrap().is_empty());
        assert_eq!(canvas.children_of("b").unwrap(), vec!["x"]);
        assert_eq!(canvas.parent_of("x").unwrap(), Some(ParentLink::new("b", 0)));
        assert_eq!((a_count.get(), b_count.get(), x_count.get()), (1, 1, 1));
        assert_eq!(root_count.get(), 0);
        canvas.check_consistency().unwrap();
    }

    #[test]
    fn test_insert_child_same_parent_repositions() {
        let canvas = Canvas::new();
        place(&canvas, "a", ROOT_ID, 0);
        place(&canvas, "b", ROOT_ID, 1);

        canvas.insert_child(ROOT_ID, "a", 1).unwrap();
        assert_eq!(canvas.children_of(ROOT_ID).unwrap(), vec!["b", "a"]);

        let (root_count, _r) = counter(&canvas, ROOT_ID);
        let (a_count, _a) = counter(&canvas, "a");
        let (b_count, _b) = counter(&canvas, "b");

        // Already in place: still a single entry, nothing changed
        canvas.insert_child(ROOT_ID, "a", 1).unwrap();
        canvas.insert_child(ROOT_ID, "a", 99).unwrap();
        canvas.move_child(ROOT_ID, "b", 0).unwrap();
        assert_eq!(canvas.children_of(ROOT_ID).unwrap(), vec!["b", "a"]);
        assert_eq!((root_count.get(), a_count.get(), b_count.get()), (0, 0, 0));
        canvas.check_consistency().unwrap();
    }

    #[test]
    fn test_move_only_child_in_place_is_silent() {
        let canvas = Canvas::new();
        place(&canvas, "a", ROOT_ID, 0);
        let (root_count, _r) = counter(&canvas, ROOT_ID);

        canvas.move_child(ROOT_ID, "a", 0).unwrap();
        assert_eq!(root_count.get(), 0);

        place(&canvas, "b", ROOT_ID, 1);
        canvas.move_child(ROOT_ID, "a", 1).unwrap();
        assert_eq!(root_count.get(), 2);
        canvas.check_consistency().unwrap();
    }

    #[test]
    fn test_insert_child_errors() {
        let canvas = Canvas::new();
        place(&canvas, "a", ROOT_ID, 0);
        place(&canvas, "a1", "a", 0);

        assert_eq!(canvas.insert_child("ghost", "a", 0), Err(CanvasError::not_found("ghost")));
        assert_eq!(canvas.insert_child("a", "ghost", 0), Err(CanvasError::not_found("ghost")));
        assert_eq!(
            canvas.insert_child("a", ROOT_ID, 0),
            Err(CanvasError::ForbiddenForRoot { operation: "reparent" })
        );
        assert_eq!(
            canvas.insert_child("a1", "a", 0),
            Err(CanvasError::CyclicParent { parent: "a1".into(), child: "a".into() })
        );
        assert_eq!(
            canvas.insert_child("a", "a", 0),
            Err(CanvasError::CyclicParent { parent: "a".into(), child: "a".into() })
        );
        canvas.check_consistency().unwrap();
    }

    #[test]
    fn test_move_child() {
        let canvas = Canvas::new();
        for (i, id) in ["a", "b", "c", "d"].iter().enumerate() {
            place(&canvas, id, ROOT_ID, i);
        }
        let (a_count, _a) = counter(&canvas, "a");
        let (d_count, _d) = counter(&canvas, "d");

        canvas.move_child(ROOT_ID, "b", 2).unwrap();

        assert_eq!(canvas.children_of(ROOT_ID).unwrap(), vec!["a", "c", "b", "d"]);
        // Outside the moved range
        assert_eq!(a_count.get(), 0);
        assert_eq!(d_count.get(), 0);
        canvas.check_consistency().unwrap();
    }

    #[test]
    fn test_move_child_errors() {
        let canvas = Canvas::new();
        place(&canvas, "a", ROOT_ID, 0);
        place(&canvas, "a1", "a", 0);

        assert_eq!(
            canvas.move_child(ROOT_ID, "a1", 0),
            Err(CanvasError::NotAChild { parent: "root".into(), child: "a1".into() })
        );
        assert_eq!(canvas.move_child(ROOT_ID, "ghost", 0), Err(CanvasError::not_found("ghost")));
    }

    #[test]
    fn test_remove_child() {
        let canvas = Canvas::new();
        place(&canvas, "a", ROOT_ID, 0);
        place(&canvas, "b", ROOT_ID, 1);

        assert_eq!(
            canvas.remove_child("a", "b"),
            Err(CanvasError::NotAChild { parent: "a".into(), child: "b".into() })
        );

        canvas.remove_child(ROOT_ID, "a").unwrap();
        assert_eq!(canvas.children_of(ROOT_ID).unwrap(), vec!["b"]);
        assert_eq!(canvas.get("a"), Err(CanvasError::not_found("a")));
        canvas.check_consistency().unwrap();
    }

    #[test]
    fn test_decorators_and_catchers() {
        let canvas = Canvas::new();
        place(&canvas, "n1", ROOT_ID, 0);
        let (count, _sub) = counter(&canvas, "n1");

        canvas
            .set_decorators("n1", vec![Decorator::new(json!({ "outline": true }))])
            .unwrap();
        canvas.set_catchers("n1", vec![Catcher::new("drop")]).unwrap();

        let node = canvas.get("n1").unwrap();
        assert_eq!(node.decorators.len(), 1);
        assert_eq!(node.catchers, vec![Catcher::new("drop")]);
        assert_eq!(count.get(), 2);
        assert_eq!(canvas.set_catchers("ghost", vec![]), Err(CanvasError::not_found("ghost")));
    }

    #[test]
    fn test_callback_action_editing() {
        let canvas = Canvas::new();
        place(&canvas, "n1", ROOT_ID, 0);
        canvas
            .push_callback_action("n1", "onHover", ActionDescriptor::SendEventData)
            .unwrap();
        let (count, _sub) = counter(&canvas, "n1");

        canvas
            .push_callback_action("n1", "onClick", ActionDescriptor::default_action())
            .unwrap();
        canvas
            .push_callback_action("n1", "onClick", ActionDescriptor::NavigateExternal { url: String::new() })
            .unwrap();
        canvas
            .replace_callback_action(
                "n1",
                "onClick",
                1,
                ActionDescriptor::NavigateExternal { url: "https://example.com".into() },
            )
            .unwrap();
        canvas.remove_callback_action("n1", "onClick", 0).unwrap();

        assert_eq!(
            canvas.callback_actions("n1", "onClick").unwrap(),
            vec![ActionDescriptor::NavigateExternal { url: "https://example.com".into() }]
        );
        // Other event lists survive the shallow patch
        assert_eq!(
            canvas.callback_actions("n1", "onHover").unwrap(),
            vec![ActionDescriptor::SendEventData]
        );
        assert!(canvas.callback_actions("n1", "onBlur").unwrap().is_empty());
        assert_eq!(count.get(), 4);

        assert_eq!(
            canvas.remove_callback_action("n1", "onClick", 5),
            Err(CanvasError::ActionIndexOutOfRange {
                id: "n1".into(),
                event: "onClick".into(),
                index: 5,
                len: 1
            })
        );
        assert_eq!(count.get(), 4);
    }

    #[test]
    fn test_callback_editing_keeps_other_entries_verbatim() {
        let canvas = Canvas::new();
        place(&canvas, "n1", ROOT_ID, 0);
        let stored = json!([
            { "sendEventData": false },
            { "navigate": { "type": "internal", "url": "/a", "replace": true } },
            { "sendFile": { "self": true }, "note": "keep" },
            { "navigate": { "type": "external" } }
        ]);
        canvas
            .patch("n1", Props::new().with(CALLBACKS_KEY, json!({ "onClick": stored.clone() })))
            .unwrap();

        canvas
            .push_callback_action("n1", "onClick", ActionDescriptor::SendEventData)
            .unwrap();
        let callbacks = canvas.get("n1").unwrap().props.get(CALLBACKS_KEY).cloned().unwrap();
        let mut expected = stored.as_array().unwrap().clone();
        expected.push(json!({ "sendEventData": true }));
        assert_eq!(callbacks["onClick"], Value::Array(expected));

        canvas
            .replace_callback_action("n1", "onClick", 3, ActionDescriptor::NavigateExternal { url: "https://x.dev".into() })
            .unwrap();
        canvas.remove_callback_action("n1", "onClick", 4).unwrap();
        let callbacks = canvas.get("n1").unwrap().props.get(CALLBACKS_KEY).cloned().unwrap();
        assert_eq!(
            callbacks["onClick"],
            json!([
                { "sendEventData": false },
                { "navigate": { "type": "internal", "url": "/a", "replace": true } },
                { "sendFile": { "self": true }, "note": "keep" },
                { "navigate": { "type": "external", "url": "https://x.dev" } }
            ])
        );
    }

    #[test]
    fn test_nested_mutation_from_observer() {
        let canvas = Canvas::new();
        place(&canvas, "n1", ROOT_ID, 0);
        place(&canvas, "n2", ROOT_ID, 1);

        let c = canvas.clone();
        let _mirror = canvas.subscribe("n1", move || {
            let label = c.get("n1").unwrap().props.get("label").cloned().unwrap_or(Value::Null);
            c.patch("n2", Props::new().with("mirror", label)).unwrap();
        });
        let (n2_count, _n2) = counter(&canvas, "n2");

        canvas.patch("n1", Props::new().with("label", "Hi")).unwrap();

        assert_eq!(canvas.get("n2").unwrap().props.get("mirror"), Some(&json!("Hi")));
        assert_eq!(n2_count.get(), 1);
    }

    #[test]
    fn test_observer_sees_consistent_state() {
        let canvas = Canvas::new();
        let c = canvas.clone();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let _sub = canvas.subscribe(ROOT_ID, move || {
            c.check_consistency().unwrap();
            s.borrow_mut().push(c.children_of(ROOT_ID).unwrap());
        });

        place(&canvas, "a", ROOT_ID, 0);
        canvas.remove("a").unwrap();

        assert_eq!(*seen.borrow(), vec![vec!["a".to_string()], vec![]]);
    }

    #[test]
    fn test_descendants() {
        let canvas = Canvas::new();
        place(&canvas, "a", ROOT_ID, 0);
        place(&canvas, "a1", "a", 0);
        place(&canvas, "b", ROOT_ID, 1);

        assert_eq!(canvas.descendants(ROOT_ID).unwrap(), vec!["a", "a1", "b"]);
        assert!(canvas.descendants("b").unwrap().is_empty());
        assert_eq!(canvas.descendants("ghost"), Err(CanvasError::not_found("ghost")));
    }

    #[test]
    fn test_reset() {
        let canvas = Canvas::with_config(CanvasConfig::default().with_root_definition("Page"));
        place(&canvas, "a", ROOT_ID, 0);
        let _sub = canvas.subscribe("a", || {});

        canvas.reset();

        assert_eq!(canvas.len(), 1);
        assert!(canvas.children_of(ROOT_ID).unwrap().is_empty());
        assert_eq!(canvas.subscriber_count("a"), 0);
        assert_eq!(canvas.get(ROOT_ID).unwrap().definition.as_str(), "Page");
    }
}
