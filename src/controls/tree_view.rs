//! TreeView: an expandable/collapsible tree of labeled rows.

use crate::control::{Control, Focusable, FocusHint, Interactive, MouseAware};
use crate::event::UiEventKind;
use crate::focus::EventCtx;
use crate::geometry::{Constraints, Region, Size};
use crate::input::{Key, KeyEvent, MouseButton, MouseEvent, MouseKind};
use crate::layout::node::{LayoutCtx, LayoutNode, PaintCtx};
use crate::render::{Buffer, CellStyle};
use crate::theme::{resolve_bg, resolve_fg, Inherited};
use crate::tree::ControlId;

/// One node of the tree model.
#[derive(Debug, Clone)]
pub struct TreeItem {
    pub label: String,
    pub expanded: bool,
    pub children: Vec<TreeItem>,
}

impl TreeItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            expanded: false,
            children: Vec::new(),
        }
    }

    pub fn expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self
    }

    pub fn with_child(mut self, child: TreeItem) -> Self {
        self.children.push(child);
        self
    }
}

/// A visible row: path into the model plus its depth.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Row {
    path: Vec<usize>,
    depth: usize,
}

/// Renders the visible rows of a tree model; the selected row lives in the
/// selection state service. Rows that are collapsed out of view simply do
/// not exist for navigation or painting.
pub struct TreeView {
    roots: Vec<TreeItem>,
    focused: bool,
}

impl TreeView {
    pub fn new(roots: impl IntoIterator<Item = TreeItem>) -> Self {
        Self {
            roots: roots.into_iter().collect(),
            focused: false,
        }
    }

    pub fn roots(&self) -> &[TreeItem] {
        &self.roots
    }

    fn flatten(&self) -> Vec<Row> {
        fn walk(items: &[TreeItem], depth: usize, path: &mut Vec<usize>, out: &mut Vec<Row>) {
            for (i, item) in items.iter().enumerate() {
                path.push(i);
                out.push(Row { path: path.clone(), depth });
                if item.expanded && !item.children.is_empty() {
                    walk(&item.children, depth + 1, path, out);
                }
                path.pop();
            }
        }
        let mut out = Vec::new();
        let mut path = Vec::new();
        walk(&self.roots, 0, &mut path, &mut out);
        out
    }

    fn item(&self, path: &[usize]) -> Option<&TreeItem> {
        let mut items = &self.roots;
        let mut found = None;
        for &index in path {
            found = items.get(index);
            items = &found?.children;
        }
        found
    }

    fn item_mut(&mut self, path: &[usize]) -> Option<&mut TreeItem> {
        fn descend<'a>(items: &'a mut [TreeItem], path: &[usize]) -> Option<&'a mut TreeItem> {
            let (&first, rest) = path.split_first()?;
            let item = items.get_mut(first)?;
            if rest.is_empty() {
                Some(item)
            } else {
                descend(&mut item.children, rest)
            }
        }
        descend(&mut self.roots, path)
    }

    fn selected(&self, ctx_selected: Option<usize>, row_count: usize) -> usize {
        ctx_selected.unwrap_or(0).min(row_count.saturating_sub(1))
    }

    fn move_selection(&mut self, own: ControlId, ctx: &mut EventCtx<'_>, delta: i32) -> bool {
        let rows = self.flatten();
        if rows.is_empty() {
            return false;
        }
        let current = self.selected(ctx.state.selection(own).and_then(|s| s.selected), rows.len());
        let next = (current as i32 + delta).clamp(0, rows.len() as i32 - 1) as usize;
        if next != current {
            ctx.state.selection_mut(own).selected = Some(next);
            ctx.emit(own, UiEventKind::SelectionChanged { index: next });
            ctx.invalidate(own);
        }
        true
    }

    fn set_expanded(&mut self, own: ControlId, ctx: &mut EventCtx<'_>, expand: bool) -> bool {
        let rows = self.flatten();
        if rows.is_empty() {
            return false;
        }
        let current = self.selected(ctx.state.selection(own).and_then(|s| s.selected), rows.len());
        let path = rows[current].path.clone();
        let Some(item) = self.item_mut(&path) else {
            return false;
        };
        if item.children.is_empty() || item.expanded == expand {
            return true;
        }
        item.expanded = expand;
        ctx.emit(own, UiEventKind::TreeToggled { row: current, expanded: expand });
        ctx.invalidate(own);
        true
    }

    fn toggle(&mut self, own: ControlId, ctx: &mut EventCtx<'_>) -> bool {
        let rows = self.flatten();
        if rows.is_empty() {
            return false;
        }
        let current = self.selected(ctx.state.selection(own).and_then(|s| s.selected), rows.len());
        let expand = !self
            .item(&rows[current].path)
            .map(|i| i.expanded)
            .unwrap_or(false);
        self.set_expanded(own, ctx, expand)
    }
}

impl Control for TreeView {
    fn type_name(&self) -> &'static str {
        "TreeView"
    }

    fn measure(
        &mut self,
        _own: ControlId,
        _children: &mut [LayoutNode],
        ctx: &mut LayoutCtx<'_>,
        _constraints: Constraints,
    ) -> Size {
        let rows = self.flatten();
        let mut width = 0;
        for row in &rows {
            if let Some(item) = self.item(&row.path) {
                width = width.max(row.depth as i32 * 2 + 2 + ctx.text.width(&item.label));
            }
        }
        Size::new(width, rows.len() as i32)
    }

    fn paint(
        &self,
        own: ControlId,
        _children: &[LayoutNode],
        bounds: Region,
        clip: Region,
        inherited: &Inherited,
        ctx: &mut PaintCtx<'_>,
        buffer: &mut Buffer,
    ) {
        let style = CellStyle {
            fg: Some(resolve_fg(None, inherited, ctx.theme).to_owned()),
            bg: Some(resolve_bg(None, inherited, ctx.theme).to_owned()),
            ..CellStyle::default()
        };
        buffer.fill(bounds, &style, clip);

        let rows = self.flatten();
        let selected = self.selected(
            ctx.state.selection(own).and_then(|s| s.selected),
            rows.len(),
        );

        for (i, row) in rows.iter().enumerate() {
            let Some(item) = self.item(&row.path) else {
                continue;
            };
            let y = bounds.y + i as i32;
            let row_style = if i == selected && self.focused {
                style.reversed()
            } else {
                style.clone()
            };
            if i == selected && self.focused {
                buffer.fill(Region::new(bounds.x, y, bounds.width, 1), &row_style, clip);
            }
            let glyph = if item.children.is_empty() {
                ' '
            } else if item.expanded {
                '▾'
            } else {
                '▸'
            };
            let x = bounds.x + row.depth as i32 * 2;
            buffer.set(x, y, crate::render::Cell::new(glyph, row_style.clone()), clip);
            buffer.write_str(x + 2, y, &item.label, &row_style, clip);
        }
    }

    fn interactive(&mut self) -> Option<&mut dyn Interactive> {
        Some(self)
    }

    fn focusable(&mut self) -> Option<&mut dyn Focusable> {
        Some(self)
    }

    fn mouse_aware(&mut self) -> Option<&mut dyn MouseAware> {
        Some(self)
    }
}

impl Interactive for TreeView {
    fn handle_key(&mut self, own: ControlId, ev: &KeyEvent, ctx: &mut EventCtx<'_>) -> bool {
        match ev.code {
            Key::Up => self.move_selection(own, ctx, -1),
            Key::Down => self.move_selection(own, ctx, 1),
            Key::Right => self.set_expanded(own, ctx, true),
            Key::Left => self.set_expanded(own, ctx, false),
            Key::Enter | Key::Char(' ') => self.toggle(own, ctx),
            _ => false,
        }
    }
}

impl Focusable for TreeView {
    fn focused(&self) -> bool {
        self.focused
    }

    fn focus_in(&mut self, _hint: FocusHint) {
        self.focused = true;
    }

    fn focus_out(&mut self) {
        self.focused = false;
    }
}

impl MouseAware for TreeView {
    fn handle_mouse(
        &mut self,
        own: ControlId,
        ev: &MouseEvent,
        bounds: Region,
        ctx: &mut EventCtx<'_>,
    ) -> bool {
        let row = (ev.y - bounds.y) as usize;
        match ev.kind {
            MouseKind::Down(MouseButton::Left) => {
                let rows = self.flatten();
                if row < rows.len() {
                    ctx.state.selection_mut(own).selected = Some(row);
                    ctx.emit(own, UiEventKind::SelectionChanged { index: row });
                    ctx.invalidate(own);
                }
                true
            }
            MouseKind::DoubleClick(MouseButton::Left) => {
                let rows = self.flatten();
                if row < rows.len() {
                    ctx.state.selection_mut(own).selected = Some(row);
                    self.toggle(own, ctx);
                }
                true
            }
            _ => false,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
