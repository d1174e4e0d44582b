//! Per-window state services keyed by control identity.
//!
//! Transient UI state — scroll offsets, selection indices, last-arranged
//! bounds, render caches — lives here rather than on control instances, so
//! the per-cycle rebuild of layout nodes loses nothing. Entries are created
//! lazily on first access and removed explicitly when the owning control is
//! removed from the tree ([`StateServices::remove_control`]); nothing relies
//! on drop order to clean up.
//!
//! The dirty/render-cache half implements invalidation: a control's
//! `invalidate` marks it dirty, drops its cached cells, and bubbles up the
//! parent chain so every enclosing cache boundary repaints on the next
//! cycle.

pub mod scroll;

use std::collections::HashSet;

use slotmap::SecondaryMap;

use crate::geometry::{Region, Size};
use crate::render::Cell;
use crate::tree::{ControlId, ControlTree};

pub use scroll::{ScrollState, ScrollbarState};

// ---------------------------------------------------------------------------
// Entry types
// ---------------------------------------------------------------------------

/// Selection and highlight indices for list-shaped controls (dropdown,
/// tree, table).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    /// The committed selection.
    pub selected: Option<usize>,
    /// The transient highlight (e.g. the row under the cursor in an open
    /// dropdown list).
    pub highlighted: Option<usize>,
}

/// Geometry recorded by the last layout pass, used for hit-testing and
/// rerender checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutRecord {
    /// Arranged bounds in buffer coordinates.
    pub bounds: Region,
    /// Effective clip at paint time (bounds intersected with every ancestor
    /// clip). Hit-testing requires the point inside this, which is what
    /// keeps scrolled-out children unclickable.
    pub clip: Region,
    /// Desired size from the last measure.
    pub desired: Size,
}

/// Dirty flag plus cached painted cells for a container.
#[derive(Debug, Clone)]
pub struct RenderCache {
    dirty: bool,
    size: Size,
    cells: Option<Vec<Vec<Cell>>>,
}

impl Default for RenderCache {
    fn default() -> Self {
        // New containers start dirty so their first paint is never skipped.
        Self { dirty: true, size: Size::ZERO, cells: None }
    }
}

// ---------------------------------------------------------------------------
// StateServices
// ---------------------------------------------------------------------------

/// The per-window bundle of keyed state maps.
#[derive(Default)]
pub struct StateServices {
    scroll: SecondaryMap<ControlId, ScrollState>,
    selection: SecondaryMap<ControlId, SelectionState>,
    layout: SecondaryMap<ControlId, LayoutRecord>,
    cache: SecondaryMap<ControlId, RenderCache>,
}

impl StateServices {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Scroll ───────────────────────────────────────────────────────

    pub fn scroll(&self, id: ControlId) -> Option<&ScrollState> {
        self.scroll.get(id)
    }

    pub fn scroll_mut(&mut self, id: ControlId) -> &mut ScrollState {
        if !self.scroll.contains_key(id) {
            self.scroll.insert(id, ScrollState::new());
        }
        &mut self.scroll[id]
    }

    // ── Selection ────────────────────────────────────────────────────

    pub fn selection(&self, id: ControlId) -> Option<&SelectionState> {
        self.selection.get(id)
    }

    pub fn selection_mut(&mut self, id: ControlId) -> &mut SelectionState {
        if !self.selection.contains_key(id) {
            self.selection.insert(id, SelectionState::default());
        }
        &mut self.selection[id]
    }

    // ── Layout records ───────────────────────────────────────────────

    pub fn layout(&self, id: ControlId) -> Option<&LayoutRecord> {
        self.layout.get(id)
    }

    pub fn layout_mut(&mut self, id: ControlId) -> &mut LayoutRecord {
        if !self.layout.contains_key(id) {
            self.layout.insert(id, LayoutRecord::default());
        }
        &mut self.layout[id]
    }

    /// Last-arranged bounds, or empty if never arranged.
    pub fn bounds(&self, id: ControlId) -> Region {
        self.layout.get(id).map(|r| r.bounds).unwrap_or(Region::EMPTY)
    }

    /// Effective clip from the last paint, or empty.
    pub fn clip(&self, id: ControlId) -> Region {
        self.layout.get(id).map(|r| r.clip).unwrap_or(Region::EMPTY)
    }

    // ── Dirty tracking & render cache ────────────────────────────────

    /// Mark `id` dirty and bubble dirtiness up the parent chain.
    ///
    /// `redraw_all` additionally drops caches for the whole subtree under
    /// `id`. The visited set is the structural guard against reference
    /// cycles; it bounds the walk even if parent links were ever corrupted
    /// into a loop.
    pub fn invalidate(&mut self, tree: &ControlTree, id: ControlId, redraw_all: bool) {
        self.invalidate_from(tree, id, None, redraw_all);
    }

    /// [`StateServices::invalidate`] with a cycle guard on the caller: when
    /// the invalidation came from the control's own parent, it does not
    /// propagate back up to that parent.
    pub fn invalidate_from(
        &mut self,
        tree: &ControlTree,
        id: ControlId,
        caller: Option<ControlId>,
        redraw_all: bool,
    ) {
        if redraw_all {
            for node in tree.walk_depth_first(id) {
                self.mark_dirty(node);
            }
        }

        let mut visited = HashSet::new();
        let mut current = Some(id);
        while let Some(node) = current {
            if !visited.insert(node) {
                break;
            }
            self.mark_dirty(node);
            let parent = tree.parent(node);
            if node == id && parent.is_some() && parent == caller {
                break;
            }
            current = parent;
        }
    }

    fn mark_dirty(&mut self, id: ControlId) {
        let entry = self.cache_mut(id);
        entry.dirty = true;
        entry.cells = None;
    }

    /// Whether `id` must actually repaint: true when dirty, never painted,
    /// or the arranged size changed since the cached paint.
    pub fn needs_rerender(&self, id: ControlId, size: Size) -> bool {
        match self.cache.get(id) {
            Some(entry) => entry.dirty || entry.cells.is_none() || entry.size != size,
            None => true,
        }
    }

    /// The cached cells for `id`, if a clean cache exists.
    pub fn cached_cells(&self, id: ControlId) -> Option<&Vec<Vec<Cell>>> {
        self.cache.get(id).filter(|e| !e.dirty).and_then(|e| e.cells.as_ref())
    }

    /// Store freshly painted cells and clear the dirty flag.
    pub fn store_cache(&mut self, id: ControlId, size: Size, cells: Vec<Vec<Cell>>) {
        let entry = self.cache_mut(id);
        entry.dirty = false;
        entry.size = size;
        entry.cells = Some(cells);
    }

    fn cache_mut(&mut self, id: ControlId) -> &mut RenderCache {
        if !self.cache.contains_key(id) {
            self.cache.insert(id, RenderCache::default());
        }
        &mut self.cache[id]
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Drop every entry for a removed control.
    pub fn remove_control(&mut self, id: ControlId) {
        self.scroll.remove(id);
        self.selection.remove(id);
        self.layout.remove(id);
        self.cache.remove(id);
    }

    /// Whether any map still holds an entry for `id`.
    pub fn has_entries(&self, id: ControlId) -> bool {
        self.scroll.contains_key(id)
            || self.selection.contains_key(id)
            || self.layout.contains_key(id)
            || self.cache.contains_key(id)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
