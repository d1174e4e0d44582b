//! End-to-end tests driving the framework through the headless pilot:
//! layout distribution, scrolling and clipping, focus routing, portals.

use pretty_assertions::assert_eq;

use weft_tui::controls::{
    Button, Checkbox, Column, Dropdown, Grid, Label, ScrollPanel, Splitter,
};
use weft_tui::event::UiEventKind;
use weft_tui::geometry::Size;
use weft_tui::input::Key;
use weft_tui::testing::Pilot;
use weft_tui::tree::ControlId;

// ---------------------------------------------------------------------------
// Layout distribution
// ---------------------------------------------------------------------------

#[test]
fn grid_splits_width_by_flex_factor() {
    let mut pilot = Pilot::new(100, 10);
    let grid = pilot.window().tree.insert(Grid::new());
    let a = pilot.window().tree.insert_child(grid, Column::new().with_flex(1));
    let b = pilot.window().tree.insert_child(grid, Column::new().with_flex(1));
    let c = pilot.window().tree.insert_child(grid, Column::new().with_flex(2));
    pilot.tick();

    let widths: Vec<i32> = [a, b, c]
        .iter()
        .map(|&id| pilot.window().state.bounds(id).width)
        .collect();
    assert_eq!(widths, vec![25, 25, 50]);
}

#[test]
fn column_width_follows_content_minimum() {
    let mut pilot = Pilot::new(100, 10);
    let grid = pilot.window().tree.insert(Grid::new());
    let narrow = pilot.window().tree.insert_child(grid, Column::new());
    let wide = pilot.window().tree.insert_child(grid, Column::new());
    pilot
        .window()
        .tree
        .insert_child(wide, Label::new("a-twenty-cell-label!"));
    pilot.tick();

    assert!(pilot.window().state.bounds(wide).width >= 20);
    let total = pilot.window().state.bounds(narrow).width + pilot.window().state.bounds(wide).width;
    assert_eq!(total, 100);
}

// ---------------------------------------------------------------------------
// Scrolling and clipping
// ---------------------------------------------------------------------------

fn scroll_fixture(pilot: &mut Pilot, rows: usize) -> ControlId {
    let panel = pilot.window().tree.insert(ScrollPanel::new());
    for i in 0..rows {
        pilot
            .window()
            .tree
            .insert_child(panel, Label::new(format!("row {i:02}")));
    }
    pilot.tick();
    panel
}

#[test]
fn overscroll_clamps_to_zero() {
    let mut pilot = Pilot::new(20, 10);
    let panel = scroll_fixture(&mut pilot, 50);
    pilot.window().state.scroll_mut(panel).scroll_by(0, -100);
    assert_eq!(pilot.window().state.scroll(panel).unwrap().offset.y, 0);
}

#[test]
fn scroll_offset_stays_in_bounds_under_any_sequence() {
    let mut pilot = Pilot::new(20, 10);
    let panel = scroll_fixture(&mut pilot, 50);
    for delta in [3, -100, 500, -7, 39, -1, 1000] {
        pilot.window().state.scroll_mut(panel).scroll_by(0, delta);
        let scroll = pilot.window().state.scroll(panel).unwrap();
        let max = scroll.max_scroll().y;
        assert!(scroll.offset.y >= 0 && scroll.offset.y <= max);
    }
}

#[test]
fn content_outside_viewport_is_never_painted() {
    let mut pilot = Pilot::new(30, 12);
    let root = pilot.window().tree.insert(Column::new());
    let panel = pilot.window().tree.insert_child(root, ScrollPanel::new());
    for i in 0..40 {
        pilot
            .window()
            .tree
            .insert_child(panel, Label::new(format!("row {i:02}")));
    }
    pilot.window().tree.insert_child(root, Label::new("below-the-panel"));
    pilot.tick();

    // The panel fills what the column gives it; the trailing label sits
    // after it. Scroll deep into the content and verify no scrolled row
    // leaks outside the viewport rows.
    pilot.window().set_scroll(panel, 0, 20);
    let text = pilot.screen_text();
    assert!(text.contains("row 20"));
    assert!(!text.contains("row 00"));
    assert!(!text.contains("row 39"));
}

#[test]
fn auto_scroll_follows_appended_content() {
    let mut pilot = Pilot::new(20, 6);
    let panel = pilot
        .window()
        .tree
        .insert(ScrollPanel::new().with_auto_scroll(true));
    for i in 0..12 {
        pilot
            .window()
            .tree
            .insert_child(panel, Label::new(format!("log {i:02}")));
    }
    pilot.tick();

    for i in 12..17 {
        let label = Label::new(format!("log {i:02}"));
        pilot.window().add_child(panel, label);
        pilot.tick();
        let scroll = pilot.window().state.scroll(panel).unwrap();
        assert_eq!(scroll.offset.y, scroll.max_scroll().y);
    }
    // The newest line is on screen.
    assert!(pilot.screen_text().contains("log 16"));
}

#[test]
fn wheel_scrolls_panel_under_cursor() {
    let mut pilot = Pilot::new(20, 6);
    let panel = scroll_fixture(&mut pilot, 30);
    pilot.wheel(5, 3, 2);
    let offset = pilot.window().state.scroll(panel).unwrap().offset.y;
    assert_eq!(offset, 6);
    pilot.wheel(5, 3, -1);
    assert_eq!(pilot.window().state.scroll(panel).unwrap().offset.y, 3);
}

// ---------------------------------------------------------------------------
// Focus routing
// ---------------------------------------------------------------------------

#[test]
fn tab_cycle_closes_over_columns_and_splitters() {
    let mut pilot = Pilot::new(60, 10);
    let grid = pilot.window().tree.insert(Grid::new());
    let col1 = pilot.window().tree.insert_child(grid, Column::new());
    let col2 = pilot.window().tree.insert_child(grid, Column::new());
    let splitter = pilot
        .window()
        .tree
        .insert_child_at(grid, 1, Splitter::new(col1, col2));
    let b1 = pilot.window().tree.insert_child(col1, Button::new("one"));
    let b2 = pilot.window().tree.insert_child(col2, Button::new("two"));
    let cb = pilot.window().tree.insert_child(col2, Checkbox::new("opt"));
    pilot.tick();

    // Visual order interleaves the splitter between the columns.
    pilot.press_key(Key::Tab);
    assert_eq!(pilot.focused(), Some(b1));
    pilot.press_key(Key::Tab);
    assert_eq!(pilot.focused(), Some(splitter));
    pilot.press_key(Key::Tab);
    assert_eq!(pilot.focused(), Some(b2));
    pilot.press_key(Key::Tab);
    assert_eq!(pilot.focused(), Some(cb));
    // N focusables: the N-th press from the start wraps back around.
    pilot.press_key(Key::Tab);
    assert_eq!(pilot.focused(), Some(b1));
}

#[test]
fn shift_tab_walks_the_same_order_backwards() {
    let mut pilot = Pilot::new(60, 10);
    let grid = pilot.window().tree.insert(Grid::new());
    let col1 = pilot.window().tree.insert_child(grid, Column::new());
    let col2 = pilot.window().tree.insert_child(grid, Column::new());
    let splitter = pilot
        .window()
        .tree
        .insert_child_at(grid, 1, Splitter::new(col1, col2));
    let b1 = pilot.window().tree.insert_child(col1, Button::new("one"));
    let b2 = pilot.window().tree.insert_child(col2, Button::new("two"));
    pilot.tick();

    pilot.press_key(Key::BackTab);
    assert_eq!(pilot.focused(), Some(b2));
    pilot.press_key(Key::BackTab);
    assert_eq!(pilot.focused(), Some(splitter));
    pilot.press_key(Key::BackTab);
    assert_eq!(pilot.focused(), Some(b1));
}

#[test]
fn escape_hands_focus_to_panel_and_tab_restores_child() {
    let mut pilot = Pilot::new(30, 6);
    let panel = pilot.window().tree.insert(ScrollPanel::new());
    let _b1 = pilot.window().tree.insert_child(panel, Button::new("first"));
    let b2 = pilot.window().tree.insert_child(panel, Button::new("second"));
    for i in 0..20 {
        pilot
            .window()
            .tree
            .insert_child(panel, Label::new(format!("filler {i}")));
    }
    pilot.tick();

    pilot.window().focus_control(b2);
    assert_eq!(pilot.focused(), Some(b2));

    // Child releases focus; the panel keeps it for scroll navigation.
    pilot.press_key(Key::Escape);
    assert_eq!(pilot.focused(), Some(panel));

    let before = pilot.window().state.scroll(panel).unwrap().offset.y;
    pilot.press_key(Key::Down);
    let after = pilot.window().state.scroll(panel).unwrap().offset.y;
    assert_eq!(after, before + 1);

    // Tab restores the remembered child.
    pilot.press_key(Key::Tab);
    assert_eq!(pilot.focused(), Some(b2));
}

#[test]
fn click_transfers_focus_before_handling() {
    let mut pilot = Pilot::new(40, 6);
    let root = pilot.window().tree.insert(Column::new());
    let top = pilot.window().tree.insert_child(root, Button::new("top"));
    let bottom = pilot.window().tree.insert_child(root, Button::new("bottom"));
    pilot.tick();

    pilot.window().focus_control(top);
    pilot.take_events();
    pilot.click(2, 1);
    assert_eq!(pilot.focused(), Some(bottom));
    let events = pilot.take_events();
    assert!(events.iter().any(|e| e.source == bottom && e.kind == UiEventKind::Pressed));
}

// ---------------------------------------------------------------------------
// Controls through the full pipeline
// ---------------------------------------------------------------------------

#[test]
fn space_toggles_checkbox_exactly_once() {
    let mut pilot = Pilot::new(30, 4);
    let root = pilot.window().tree.insert(Column::new());
    let cb = pilot.window().tree.insert_child(root, Checkbox::new("ready"));
    pilot.tick();
    pilot.window().focus_control(cb);
    pilot.take_events();

    pilot.press_key(Key::Char(' '));
    let toggles: Vec<_> = pilot
        .take_events()
        .into_iter()
        .filter(|e| matches!(e.kind, UiEventKind::Toggled { .. }))
        .collect();
    assert_eq!(toggles.len(), 1);
    assert_eq!(toggles[0].kind, UiEventKind::Toggled { checked: true });

    pilot.press_key(Key::Char(' '));
    let toggles: Vec<_> = pilot
        .take_events()
        .into_iter()
        .filter(|e| matches!(e.kind, UiEventKind::Toggled { .. }))
        .collect();
    assert_eq!(toggles.len(), 1);
    assert_eq!(toggles[0].kind, UiEventKind::Toggled { checked: false });
}

#[test]
fn dropdown_popup_fits_items_without_indicator() {
    let mut pilot = Pilot::new(40, 12);
    let root = pilot.window().tree.insert(Column::new());
    let dd = pilot
        .window()
        .tree
        .insert_child(root, Dropdown::new(["red", "green", "blue"]).with_max_visible(5));
    pilot.tick();
    pilot.window().focus_control(dd);

    pilot.press_key(Key::Enter);
    pilot.tick();

    let contents: Vec<ControlId> = pilot
        .window()
        .portals
        .iter()
        .map(|(_, p)| p.content)
        .collect();
    assert_eq!(contents.len(), 1);
    // Three items all fit under the five-row cap: no indicator row.
    assert_eq!(pilot.window().state.bounds(contents[0]).height, 3);
}

#[test]
fn dropdown_commits_highlight_on_enter() {
    let mut pilot = Pilot::new(40, 12);
    let root = pilot.window().tree.insert(Column::new());
    let dd = pilot
        .window()
        .tree
        .insert_child(root, Dropdown::new(["red", "green", "blue"]));
    pilot.tick();
    pilot.window().focus_control(dd);
    pilot.take_events();

    pilot.press_key(Key::Enter); // open
    pilot.press_key(Key::Down); // highlight "green"
    pilot.press_key(Key::Enter); // commit
    pilot.tick();

    let events = pilot.take_events();
    assert!(events
        .iter()
        .any(|e| e.source == dd && e.kind == UiEventKind::DropdownCommitted { index: 1 }));
    assert!(pilot.window().portals.is_empty());
}

#[test]
fn splitter_nudge_emits_and_moves_columns() {
    let mut pilot = Pilot::new(41, 8);
    let grid = pilot.window().tree.insert(Grid::new());
    let left = pilot.window().tree.insert_child(grid, Column::new());
    let right = pilot.window().tree.insert_child(grid, Column::new());
    let splitter = pilot
        .window()
        .tree
        .insert_child_at(grid, 1, Splitter::new(left, right));
    pilot.tick();

    pilot.window().focus_control(splitter);
    pilot.take_events();
    pilot.press_key(Key::Right);
    pilot.tick();

    let events = pilot.take_events();
    assert!(events.iter().any(|e| matches!(
        e.kind,
        UiEventKind::SplitterMoved { left_width: 21, right_width: 19 }
    )));
    assert_eq!(pilot.window().state.bounds(left).width, 21);
    assert_eq!(pilot.window().state.bounds(right).width, 19);
    assert_eq!(pilot.window().size(), Size::new(41, 8));
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

#[test]
fn simple_frame_snapshot() {
    let mut pilot = Pilot::new(12, 3);
    let root = pilot.window().tree.insert(Column::new());
    pilot.window().tree.insert_child(root, Label::new("hi"));
    pilot.window().tree.insert_child(root, Button::new("Go"));
    let text = pilot.screen_text();
    insta::assert_snapshot!(text.trim_end(), @r"
    hi
    [ Go ]
    ");
}
