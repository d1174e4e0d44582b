//! Built-in controls: leaves and containers.

pub mod button;
pub mod checkbox;
pub mod column;
pub mod dropdown;
pub mod grid;
pub mod label;
pub mod prompt;
pub mod scroll_panel;
pub mod sparkline;
pub mod splitter;
pub mod table;
pub mod tabs;
pub mod tree_view;

pub use button::Button;
pub use checkbox::Checkbox;
pub use column::Column;
pub use dropdown::{Dropdown, DropdownItemList};
pub use grid::Grid;
pub use label::Label;
pub use prompt::Prompt;
pub use scroll_panel::ScrollPanel;
pub use sparkline::{Sparkline, SparklineHandle};
pub use splitter::Splitter;
pub use table::{Table, TableColumn};
pub use tabs::Tabs;
pub use tree_view::{TreeItem, TreeView};

use crate::control::FocusHint;
use crate::focus::{tab_within, EventCtx};
use crate::input::{Key, KeyEvent};
use crate::tree::ControlId;

/// Shared Tab/BackTab handling for containers: move focus to the next (or
/// previous) target among this container's children in visual order.
/// Returns `false` past either end so the event keeps bubbling outward —
/// which is what lets tab chains cross container boundaries.
pub(crate) fn container_tab(
    own: ControlId,
    from: ControlId,
    ev: &KeyEvent,
    ctx: &mut EventCtx<'_>,
) -> bool {
    let forward = match ev.code {
        Key::Tab => true,
        Key::BackTab => false,
        _ => return false,
    };
    match tab_within(ctx.tree, ctx.state, own, from, forward) {
        Some(target) => {
            let hint = if forward { FocusHint::Forward } else { FocusHint::Backward };
            ctx.request_focus_with(target, hint);
            true
        }
        None => false,
    }
}
