//! Events controls emit toward application code.
//!
//! Controls push [`UiEvent`]s through the event context during key/mouse
//! handling; the application drains them from the window after each input.
//! This is a closed set: the framework's own controls are the only
//! producers.

use crate::tree::ControlId;

/// An event raised by a control, tagged with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiEvent {
    pub source: ControlId,
    pub kind: UiEventKind,
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEventKind {
    /// A button was activated.
    Pressed,
    /// A checkbox changed state.
    Toggled { checked: bool },
    /// The selected row of a list-shaped control changed.
    SelectionChanged { index: usize },
    /// A tree row was expanded or collapsed.
    TreeToggled { row: usize, expanded: bool },
    /// A dropdown committed a choice.
    DropdownCommitted { index: usize },
    /// A prompt submitted its text.
    Submitted { text: String },
    /// A splitter drag committed new neighbor widths.
    SplitterMoved { left_width: i32, right_width: i32 },
    /// A control gained or lost focus.
    FocusChanged { gained: bool },
}

impl UiEvent {
    pub fn new(source: ControlId, kind: UiEventKind) -> Self {
        Self { source, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn event_carries_source() {
        let mut sm: SlotMap<ControlId, ()> = SlotMap::with_key();
        let id = sm.insert(());
        let ev = UiEvent::new(id, UiEventKind::Pressed);
        assert_eq!(ev.source, id);
        assert_eq!(ev.kind, UiEventKind::Pressed);
    }

    #[test]
    fn kinds_compare_by_payload() {
        assert_eq!(UiEventKind::Toggled { checked: true }, UiEventKind::Toggled { checked: true });
        assert_ne!(UiEventKind::Toggled { checked: true }, UiEventKind::Toggled { checked: false });
    }
}
