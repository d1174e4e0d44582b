//! Table: columns with headers over selectable rows.

use crate::control::{Control, Focusable, FocusHint, Interactive, MouseAware, SizePolicy};
use crate::event::UiEventKind;
use crate::focus::EventCtx;
use crate::geometry::{Constraints, Region, Size};
use crate::input::{Key, KeyEvent, MouseButton, MouseEvent, MouseKind};
use crate::layout::flex::distribute;
use crate::layout::node::{LayoutCtx, LayoutNode, PaintCtx};
use crate::render::{Buffer, CellStyle};
use crate::theme::{resolve_bg, resolve_fg, Inherited};
use crate::tree::ControlId;

/// One table column: a header title and a width policy fed to the same
/// distribution algorithm the grid container uses.
#[derive(Debug, Clone)]
pub struct TableColumn {
    pub title: String,
    pub policy: SizePolicy,
}

impl TableColumn {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), policy: SizePolicy::flex(1) }
    }

    pub fn fixed(title: impl Into<String>, width: i32) -> Self {
        Self { title: title.into(), policy: SizePolicy::fixed(width) }
    }

    pub fn with_policy(mut self, policy: SizePolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// A header row plus string rows. The selected row index lives in the
/// selection state service; Up/Down move it, a click sets it.
pub struct Table {
    columns: Vec<TableColumn>,
    rows: Vec<Vec<String>>,
    widths: Vec<i32>,
    focused: bool,
}

impl Table {
    pub fn new(columns: impl IntoIterator<Item = TableColumn>) -> Self {
        Self {
            columns: columns.into_iter().collect(),
            rows: Vec::new(),
            widths: Vec::new(),
            focused: false,
        }
    }

    pub fn with_rows(mut self, rows: impl IntoIterator<Item = Vec<String>>) -> Self {
        self.rows = rows.into_iter().collect();
        self
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column widths computed by the last measure pass.
    pub fn column_widths(&self) -> &[i32] {
        &self.widths
    }

    fn selected(&self, state_selected: Option<usize>) -> usize {
        state_selected.unwrap_or(0).min(self.rows.len().saturating_sub(1))
    }

    fn move_selection(&mut self, own: ControlId, ctx: &mut EventCtx<'_>, delta: i32) -> bool {
        if self.rows.is_empty() {
            return false;
        }
        let current = self.selected(ctx.state.selection(own).and_then(|s| s.selected));
        let next = (current as i32 + delta).clamp(0, self.rows.len() as i32 - 1) as usize;
        if next != current {
            ctx.state.selection_mut(own).selected = Some(next);
            ctx.emit(own, UiEventKind::SelectionChanged { index: next });
            ctx.invalidate(own);
        }
        true
    }

    fn write_cells(
        &self,
        buffer: &mut Buffer,
        y: i32,
        x0: i32,
        values: &[String],
        style: &CellStyle,
        clip: Region,
    ) {
        let mut x = x0;
        for (column_index, &width) in self.widths.iter().enumerate() {
            if width <= 0 {
                continue;
            }
            let empty = String::new();
            let value = values.get(column_index).unwrap_or(&empty);
            let truncated: String = value.chars().take((width - 1).max(0) as usize).collect();
            buffer.write_str(x, y, &truncated, style, clip);
            x += width;
        }
    }
}

impl Control for Table {
    fn type_name(&self) -> &'static str {
        "Table"
    }

    fn measure(
        &mut self,
        _own: ControlId,
        _children: &mut [LayoutNode],
        ctx: &mut LayoutCtx<'_>,
        constraints: Constraints,
    ) -> Size {
        // Column widths come from the same distribution the grid uses,
        // with header titles as content-driven minimums.
        let policies: Vec<SizePolicy> = self
            .columns
            .iter()
            .map(|c| match c.policy {
                SizePolicy::Fixed(w) => SizePolicy::Fixed(w),
                SizePolicy::Flex { min, max, factor } => SizePolicy::Flex {
                    min: min.max(ctx.text.width(&c.title) + 1),
                    max,
                    factor,
                },
            })
            .collect();

        let available = if constraints.width_bounded() {
            constraints.max.width
        } else {
            policies
                .iter()
                .map(|p| match *p {
                    SizePolicy::Fixed(w) => w,
                    SizePolicy::Flex { min, .. } => min,
                })
                .sum()
        };

        self.widths = distribute(&policies, available).widths;
        Size::new(available, self.rows.len() as i32 + 1)
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

        let titles: Vec<String> = self.columns.iter().map(|c| c.title.clone()).collect();
        self.write_cells(buffer, bounds.y, bounds.x, &titles, &style.bolded(), clip);

        let selected = self.selected(ctx.state.selection(own).and_then(|s| s.selected));
        for (i, row) in self.rows.iter().enumerate() {
            let y = bounds.y + 1 + i as i32;
            let row_style = if i == selected && self.focused {
                style.reversed()
            } else {
                style.clone()
            };
            if i == selected && self.focused {
                buffer.fill(Region::new(bounds.x, y, bounds.width, 1), &row_style, clip);
            }
            self.write_cells(buffer, y, bounds.x, row, &row_style, clip);
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

impl Interactive for Table {
    fn handle_key(&mut self, own: ControlId, ev: &KeyEvent, ctx: &mut EventCtx<'_>) -> bool {
        match ev.code {
            Key::Up => self.move_selection(own, ctx, -1),
            Key::Down => self.move_selection(own, ctx, 1),
            Key::Home => self.move_selection(own, ctx, -(self.rows.len() as i32)),
            Key::End => self.move_selection(own, ctx, self.rows.len() as i32),
            _ => false,
        }
    }
}

impl Focusable for Table {
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

impl MouseAware for Table {
    fn handle_mouse(
        &mut self,
        own: ControlId,
        ev: &MouseEvent,
        bounds: Region,
        ctx: &mut EventCtx<'_>,
    ) -> bool {
        if let MouseKind::Down(MouseButton::Left) = ev.kind {
            // Row 0 is the header.
            let clicked = ev.y - bounds.y - 1;
            if clicked >= 0 && (clicked as usize) < self.rows.len() {
                let index = clicked as usize;
                ctx.state.selection_mut(own).selected = Some(index);
                ctx.emit(own, UiEventKind::SelectionChanged { index });
                ctx.invalidate(own);
            }
            return true;
        }
        false
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateServices;
    use crate::text::TextMeasurer;
    use crate::tree::ControlTree;

    fn sample() -> Table {
        Table::new([TableColumn::new("name"), TableColumn::fixed("id", 6)]).with_rows([
            vec!["alpha".into(), "1".into()],
            vec!["beta".into(), "2".into()],
        ])
    }

    #[test]
    fn measure_counts_header_row() {
        let mut tree = ControlTree::new();
        let id = tree.insert(sample());
        let mut node = LayoutNode::build(&tree, id).unwrap();
        let mut state = StateServices::new();
        let mut text = TextMeasurer::new();
        let mut ctx = LayoutCtx { state: &mut state, text: &mut text };
        let size = node.measure(&mut ctx, Constraints::loose(Size::new(40, 20)));
        assert_eq!(size.height, 3);
        assert_eq!(size.width, 40);
    }

    #[test]
    fn fixed_column_width_is_respected() {
        let mut sm: slotmap::SlotMap<ControlId, ()> = slotmap::SlotMap::with_key();
        let own = sm.insert(());
        let mut table = sample();
        let mut state = StateServices::new();
        let mut text = TextMeasurer::new();
        let mut ctx = LayoutCtx { state: &mut state, text: &mut text };
        Control::measure(&mut table, own, &mut [], &mut ctx, Constraints::loose(Size::new(40, 20)));
        assert_eq!(table.column_widths(), &[34, 6]);
    }

    #[test]
    fn selection_clamps_to_rows() {
        let table = sample();
        assert_eq!(table.selected(None), 0);
        assert_eq!(table.selected(Some(1)), 1);
        assert_eq!(table.selected(Some(99)), 1);
    }

    #[test]
    fn push_row_grows_table() {
        let mut table = sample();
        table.push_row(vec!["gamma".into(), "3".into()]);
        assert_eq!(table.row_count(), 3);
    }
}
