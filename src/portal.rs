//! Portals: floating overlays anchored to a control.
//!
//! A portal lets a control (the dropdown being the canonical case) render
//! content outside its own bounds and clip region, positioned in absolute
//! buffer coordinates. The window paints portals after the main tree, so
//! they sit on top; the router hit-tests them first for the same reason.
//! Placement prefers the row below the anchor and flips upward when the
//! popup would overflow the bottom of the screen.

use slotmap::{new_key_type, SlotMap};

use crate::geometry::{Region, Size};
use crate::tree::ControlId;

new_key_type! {
    /// Handle to an open portal.
    pub struct PortalId;
}

/// An open overlay: who anchors it and which (detached) control renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Portal {
    pub anchor: ControlId,
    pub content: ControlId,
}

/// Registry of open portals, owned by the window.
#[derive(Default)]
pub struct PortalSet {
    portals: SlotMap<PortalId, Portal>,
}

impl PortalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a portal. `content` must be a detached control in the same tree.
    pub fn create(&mut self, anchor: ControlId, content: ControlId) -> PortalId {
        self.portals.insert(Portal { anchor, content })
    }

    /// Close a portal by anchor and handle. Returns the portal only when
    /// the handle exists and the anchor matches.
    pub fn remove(&mut self, anchor: ControlId, id: PortalId) -> Option<Portal> {
        match self.portals.get(id) {
            Some(portal) if portal.anchor == anchor => self.portals.remove(id),
            _ => None,
        }
    }

    /// Close whatever portal `anchor` has open.
    pub fn remove_by_anchor(&mut self, anchor: ControlId) -> Option<(PortalId, Portal)> {
        let id = self.anchored(anchor)?;
        self.portals.remove(id).map(|portal| (id, portal))
    }

    /// The portal currently anchored by `anchor`, if any.
    pub fn anchored(&self, anchor: ControlId) -> Option<PortalId> {
        self.portals.iter().find(|(_, p)| p.anchor == anchor).map(|(id, _)| id)
    }

    pub fn contains(&self, id: PortalId) -> bool {
        self.portals.contains_key(id)
    }

    /// Open portals in creation order (stable z-order, last on top).
    pub fn iter(&self) -> impl Iterator<Item = (PortalId, &Portal)> {
        self.portals.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.portals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.portals.len()
    }
}

/// Compute where a portal of `desired` size goes relative to its anchor.
///
/// Preferred placement is flush below the anchor, left-aligned. When the
/// popup would overflow the bottom of the screen it flips to sit above the
/// anchor instead. The result is clamped into the screen on both axes.
pub fn place(anchor: Region, desired: Size, screen: Size) -> Region {
    let width = desired.width.min(screen.width).max(0);
    let height = desired.height.min(screen.height).max(0);

    let x = anchor.x.clamp(0, (screen.width - width).max(0));

    let below = anchor.bottom();
    let y = if below + height <= screen.height {
        below
    } else {
        // Flip upward; clamp keeps it on screen when there is no room
        // above either.
        (anchor.y - height).max(0)
    };
    let y = y.clamp(0, (screen.height - height).max(0));

    Region::new(x, y, width, height)
}

// ===========================================================================
// Tests
// ===========================================================================
