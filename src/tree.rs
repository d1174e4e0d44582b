//! The control tree: a slotmap arena of controls with parent/child links.
//!
//! All controls live in one `SlotMap`; parent and child relations sit in
//! secondary maps so removal is O(subtree) and lookup is O(1). The slotmap
//! key doubles as the control's identity for the state services, which is
//! what lets transient UI state survive the per-cycle rebuild of layout
//! nodes. Parents are plain keys — non-owning handles used for traversal
//! only, never for lifetime.

use std::collections::VecDeque;

use slotmap::{new_key_type, SecondaryMap, SlotMap};

use crate::control::{Control, ControlRef};
use crate::scheduler::Scheduler;
use crate::state::StateServices;

new_key_type! {
    /// Identity of a control in the tree. Copy, lightweight, and the key
    /// for every state-service map.
    pub struct ControlId;
}

const NO_CHILDREN: &[ControlId] = &[];

/// Arena of controls plus the tree structure over them.
pub struct ControlTree {
    nodes: SlotMap<ControlId, ControlRef>,
    children: SecondaryMap<ControlId, Vec<ControlId>>,
    parent: SecondaryMap<ControlId, ControlId>,
    root: Option<ControlId>,
}

impl ControlTree {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            root: None,
        }
    }

    /// Insert a parentless control. The first one inserted becomes the root.
    pub fn insert(&mut self, control: impl Control + 'static) -> ControlId {
        let id = self.insert_detached(control);
        if self.root.is_none() {
            self.root = Some(id);
        }
        id
    }

    /// Insert a parentless control that never becomes the root implicitly.
    /// Portal content lives in the arena this way.
    pub fn insert_detached(&mut self, control: impl Control + 'static) -> ControlId {
        let id = self.nodes.insert(std::rc::Rc::new(std::cell::RefCell::new(control)));
        self.children.insert(id, Vec::new());
        id
    }

    /// Insert a control as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics (debug) if `parent` is not in the tree.
    pub fn insert_child(&mut self, parent: ControlId, control: impl Control + 'static) -> ControlId {
        let index = self.children.get(parent).map(Vec::len).unwrap_or(0);
        self.insert_child_at(parent, index, control)
    }

    /// Insert a control as a child of `parent` at `index` (clamped to the
    /// child count). Splitters are inserted between existing columns this
    /// way.
    pub fn insert_child_at(
        &mut self,
        parent: ControlId,
        index: usize,
        control: impl Control + 'static,
    ) -> ControlId {
        debug_assert!(self.nodes.contains_key(parent), "parent control does not exist");
        let id = self.insert_detached(control);
        self.parent.insert(id, parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            let index = index.min(siblings.len());
            siblings.insert(index, id);
        }
        id
    }

    /// Remove a control and its whole subtree.
    ///
    /// For every removed control, in order: the control's `on_dispose` hook
    /// runs, its scheduler entries are cancelled, and its state-service
    /// entries are dropped. The parent container is notified through
    /// `child_removed` so remembered focus references cannot dangle.
    ///
    /// Returns `false` if `id` was not in the tree.
    pub fn remove(
        &mut self,
        id: ControlId,
        state: &mut StateServices,
        scheduler: &mut Scheduler,
    ) -> bool {
        if !self.nodes.contains_key(id) {
            return false;
        }

        // Detach from the parent and tell it the child is gone. A parent
        // removing a child from its own handler is already borrowed; it is
        // responsible for its own bookkeeping in that case.
        if let Some(parent_id) = self.parent.remove(id) {
            if let Some(siblings) = self.children.get_mut(parent_id) {
                siblings.retain(|&child| child != id);
            }
            if let Some(handle) = self.handle(parent_id) {
                if let Ok(mut parent) = handle.try_borrow_mut() {
                    if let Some(container) = parent.container() {
                        container.child_removed(id);
                    }
                }
            }
        }

        if self.root == Some(id) {
            self.root = None;
        }

        let mut queue = VecDeque::new();
        queue.push_back(id);
        while let Some(current) = queue.pop_front() {
            if let Some(kids) = self.children.remove(current) {
                queue.extend(kids);
            }
            self.parent.remove(current);
            if let Some(control) = self.nodes.remove(current) {
                // A control removing itself mid-handler is still borrowed;
                // the dispose hook is skipped for it (state and scheduler
                // cleanup below run regardless).
                if let Ok(mut control) = control.try_borrow_mut() {
                    control.on_dispose(current, state);
                }
            }
            scheduler.cancel_owned(current);
            state.remove_control(current);
        }
        true
    }

    /// Clone the shared handle for a control.
    pub fn handle(&self, id: ControlId) -> Option<ControlRef> {
        self.nodes.get(id).cloned()
    }

    /// The control's parent, if any.
    pub fn parent(&self, id: ControlId) -> Option<ControlId> {
        self.parent.get(id).copied()
    }

    /// The control's children in visual order. Empty for unknown ids.
    pub fn children(&self, id: ControlId) -> &[ControlId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(NO_CHILDREN)
    }

    /// Ancestor chain from the immediate parent up to the root.
    pub fn ancestors(&self, id: ControlId) -> Vec<ControlId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// Whether `id` equals `ancestor` or sits somewhere below it.
    pub fn is_descendant_or_self(&self, id: ControlId, ancestor: ControlId) -> bool {
        if id == ancestor {
            return self.nodes.contains_key(id);
        }
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            if p == ancestor {
                return true;
            }
            current = p;
        }
        false
    }

    pub fn root(&self) -> Option<ControlId> {
        self.root
    }

    pub fn set_root(&mut self, id: ControlId) {
        self.root = Some(id);
    }

    pub fn contains(&self, id: ControlId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pre-order depth-first traversal from `start`.
    pub fn walk_depth_first(&self, start: ControlId) -> Vec<ControlId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Every control in the arena, including detached portal content.
    pub fn all_ids(&self) -> Vec<ControlId> {
        self.nodes.keys().collect()
    }
}

impl Default for ControlTree {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
