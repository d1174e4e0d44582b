//! Sparkline: a one-row bar graph fed from any thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::control::Control;
use crate::geometry::{Constraints, Region, Size};
use crate::layout::node::{LayoutCtx, LayoutNode, PaintCtx};
use crate::render::{Buffer, Cell, CellStyle};
use crate::theme::{resolve_bg, resolve_fg, Inherited};
use crate::tree::ControlId;

/// Eight-level block glyphs, lowest to highest.
const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Producer-side handle to a sparkline's data series.
///
/// Pushes lock the shared series and then raise an atomic dirty flag; the
/// UI thread drains the flag into a real invalidation at the start of the
/// next render cycle. The handle is the only cross-thread surface in the
/// pipeline.
#[derive(Clone)]
pub struct SparklineHandle {
    data: Arc<Mutex<Vec<f64>>>,
    dirty: Arc<AtomicBool>,
}

impl SparklineHandle {
    /// Append one sample.
    pub fn push(&self, value: f64) {
        if let Ok(mut data) = self.data.lock() {
            data.push(value);
        }
        self.dirty.store(true, Ordering::Release);
    }

    /// Append many samples under one lock.
    pub fn extend(&self, values: impl IntoIterator<Item = f64>) {
        if let Ok(mut data) = self.data.lock() {
            data.extend(values);
        }
        self.dirty.store(true, Ordering::Release);
    }
}

/// Renders the most recent samples as a single row of bar glyphs scaled to
/// the series maximum.
pub struct Sparkline {
    data: Arc<Mutex<Vec<f64>>>,
    dirty: Arc<AtomicBool>,
    max_points: usize,
    fg: Option<String>,
}

impl Sparkline {
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(Vec::new())),
            dirty: Arc::new(AtomicBool::new(false)),
            max_points: 120,
            fg: None,
        }
    }

    pub fn with_max_points(mut self, max: usize) -> Self {
        self.max_points = max.max(1);
        self
    }

    pub fn with_fg(mut self, color: impl Into<String>) -> Self {
        self.fg = Some(color.into());
        self
    }

    /// A cloneable handle for producer threads.
    pub fn handle(&self) -> SparklineHandle {
        SparklineHandle {
            data: Arc::clone(&self.data),
            dirty: Arc::clone(&self.dirty),
        }
    }

    fn glyph(value: f64, max: f64) -> char {
        if max <= 0.0 {
            return BARS[0];
        }
        let level = ((value / max) * 8.0).ceil() as usize;
        BARS[level.clamp(1, 8) - 1]
    }
}

impl Default for Sparkline {
    fn default() -> Self {
        Self::new()
    }
}

impl Control for Sparkline {
    fn type_name(&self) -> &'static str {
        "Sparkline"
    }

    fn colors(&self) -> (Option<&str>, Option<&str>) {
        (self.fg.as_deref(), None)
    }

    fn take_async_invalidate(&mut self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }

    fn measure(
        &mut self,
        _own: ControlId,
        _children: &mut [LayoutNode],
        _ctx: &mut LayoutCtx<'_>,
        constraints: Constraints,
    ) -> Size {
        let points = self.data.lock().map(|d| d.len()).unwrap_or(0);
        let width = if constraints.width_bounded() {
            constraints.max.width
        } else {
            points.min(self.max_points) as i32
        };
        Size::new(width, 1)
    }

    fn paint(
        &self,
        _own: ControlId,
        _children: &[LayoutNode],
        bounds: Region,
        clip: Region,
        inherited: &Inherited,
        ctx: &mut PaintCtx<'_>,
        buffer: &mut Buffer,
    ) {
        let style = CellStyle {
            fg: Some(resolve_fg(self.fg.as_deref(), inherited, ctx.theme).to_owned()),
            bg: Some(resolve_bg(None, inherited, ctx.theme).to_owned()),
            ..CellStyle::default()
        };
        buffer.fill(bounds, &style, clip);

        let Ok(data) = self.data.lock() else {
            return;
        };
        let take = (bounds.width.max(0) as usize).min(self.max_points);
        let window: Vec<f64> = data.iter().rev().take(take).rev().copied().collect();
        drop(data);

        let max = window.iter().copied().fold(0.0_f64, f64::max);
        for (i, &value) in window.iter().enumerate() {
            buffer.set(
                bounds.x + i as i32,
                bounds.y,
                Cell::new(Self::glyph(value, max), style.clone()),
                clip,
            );
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_pushes_are_visible() {
        let spark = Sparkline::new();
        let handle = spark.handle();
        handle.push(1.0);
        handle.extend([2.0, 3.0]);
        assert_eq!(spark.data.lock().unwrap().len(), 3);
    }

    #[test]
    fn push_raises_dirty_flag_once_drained() {
        let mut spark = Sparkline::new();
        let handle = spark.handle();
        assert!(!spark.take_async_invalidate());
        handle.push(1.0);
        assert!(spark.take_async_invalidate());
        // Draining resets the flag.
        assert!(!spark.take_async_invalidate());
    }

    #[test]
    fn handle_works_from_another_thread() {
        let mut spark = Sparkline::new();
        let handle = spark.handle();
        let worker = std::thread::spawn(move || {
            for i in 0..10 {
                handle.push(i as f64);
            }
        });
        worker.join().unwrap();
        assert_eq!(spark.data.lock().unwrap().len(), 10);
        assert!(spark.take_async_invalidate());
    }

    #[test]
    fn glyph_scales_with_maximum() {
        assert_eq!(Sparkline::glyph(8.0, 8.0), '█');
        assert_eq!(Sparkline::glyph(0.5, 8.0), '▁');
        assert_eq!(Sparkline::glyph(4.0, 8.0), '▄');
        // Degenerate series renders the lowest bar.
        assert_eq!(Sparkline::glyph(3.0, 0.0), '▁');
    }
}
