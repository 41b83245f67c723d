//! Visible and render row ranges for a virtualized viewport.

use horizon_grid_core::logging::targets;

use crate::error::Result;
use crate::options::ViewportOptions;

/// Direction of the most recent scroll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
    /// No recent scroll; both sides get the full buffer.
    #[default]
    Neutral,
}

/// An inclusive span of row positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowSpan {
    pub top: usize,
    pub bottom: usize,
}

impl RowSpan {
    pub fn new(top: usize, bottom: usize) -> Self {
        Self { top, bottom }
    }

    pub fn contains(&self, row: usize) -> bool {
        self.top <= row && row <= self.bottom
    }

    /// Number of rows covered.
    pub fn len(&self) -> usize {
        self.bottom.saturating_sub(self.top) + 1
    }

    /// Rows between `row` and the nearest edge; `0` inside the span.
    pub fn distance(&self, row: usize) -> usize {
        if row < self.top {
            self.top - row
        } else {
            row.saturating_sub(self.bottom)
        }
    }

    pub fn rows(&self) -> std::ops::RangeInclusive<usize> {
        self.top..=self.bottom
    }
}

/// Output of a range computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRange {
    /// Rows intersecting the viewport. Not clamped to the row count.
    pub visible: RowSpan,
    /// Rows to materialize, clamped to existing rows. `None` when there are
    /// no rows.
    pub render: Option<RowSpan>,
    /// The leading buffer size used.
    pub buffer: usize,
}

/// Computes the visible range and the buffered render range.
///
/// The side scrolled toward gets `buffer` extra rows (one viewport's worth,
/// at least `min_buffer`); the trailing side gets `min_buffer`.
pub fn compute_range(
    scroll_top: f64,
    container_height: f64,
    row_height: f64,
    total_rows: usize,
    direction: ScrollDirection,
    min_buffer: usize,
) -> WindowRange {
    if row_height.is_nan() || row_height <= 0.0 {
        return WindowRange {
            visible: RowSpan::new(0, 0),
            render: None,
            buffer: min_buffer,
        };
    }
    let scroll_top = scroll_top.max(0.0);
    let container_height = container_height.max(0.0);

    let visible = RowSpan::new(
        (scroll_top / row_height).floor() as usize,
        ((scroll_top + container_height) / row_height).floor() as usize,
    );
    let buffer = ((container_height / row_height).round() as usize).max(min_buffer);
    let (above, below) = match direction {
        ScrollDirection::Up => (buffer, min_buffer),
        ScrollDirection::Down => (min_buffer, buffer),
        ScrollDirection::Neutral => (buffer, buffer),
    };

    let render = (total_rows > 0).then(|| {
        let last = total_rows - 1;
        RowSpan::new(
            visible.top.saturating_sub(above).min(last),
            visible.bottom.saturating_add(below).min(last),
        )
    });

    WindowRange {
        visible,
        render,
        buffer,
    }
}

/// Where a scroll came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Wheel,
    Scrollbar,
    Keyboard,
    /// Scroll set by the application.
    Programmatic,
    /// Container resized; always re-renders.
    Resize,
}

/// Raw viewport input from the UI layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollInput {
    pub source: InputSource,
    pub scroll_top: f64,
    pub container_height: f64,
}

/// Tracks scroll state and decides when the render range must be recomputed.
#[derive(Debug, Clone)]
pub struct ViewportWindow {
    options: ViewportOptions,
    scroll_top: f64,
    container_height: f64,
    total_rows: usize,
    direction: ScrollDirection,
    last_render_top: Option<f64>,
}

impl ViewportWindow {
    pub fn new(options: ViewportOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            scroll_top: 0.0,
            container_height: 0.0,
            total_rows: 0,
            direction: ScrollDirection::Neutral,
            last_render_top: None,
        })
    }

    pub fn options(&self) -> &ViewportOptions {
        &self.options
    }

    pub fn direction(&self) -> ScrollDirection {
        self.direction
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    /// Updates the row count, e.g. from `row_count_changed`. The next
    /// `on_scroll` always re-renders.
    pub fn set_total_rows(&mut self, total_rows: usize) {
        if total_rows != self.total_rows {
            self.total_rows = total_rows;
            self.last_render_top = None;
        }
    }

    /// Feeds a scroll event.
    ///
    /// Returns the new range when a re-render is due, or `None` when the
    /// scroll moved less than the skip threshold since the last render.
    pub fn on_scroll(&mut self, input: ScrollInput) -> Option<WindowRange> {
        if input.scroll_top > self.scroll_top {
            self.direction = ScrollDirection::Down;
        } else if input.scroll_top < self.scroll_top {
            self.direction = ScrollDirection::Up;
        }
        let resized = input.container_height != self.container_height;
        self.scroll_top = input.scroll_top;
        self.container_height = input.container_height;

        if !resized && input.source != InputSource::Resize && !self.should_render() {
            tracing::trace!(target: targets::VIEWPORT, scroll_top = self.scroll_top, "render skipped");
            return None;
        }
        Some(self.render())
    }

    /// Computes the current range and records it as rendered.
    pub fn render(&mut self) -> WindowRange {
        self.last_render_top = Some(self.scroll_top);
        let range = self.range();
        tracing::trace!(
            target: targets::VIEWPORT,
            visible_top = range.visible.top,
            visible_bottom = range.visible.bottom,
            direction = ?self.direction,
            "render range computed"
        );
        range
    }

    /// The range for the current state, without recording a render.
    pub fn range(&self) -> WindowRange {
        compute_range(
            self.scroll_top,
            self.container_height,
            self.options.row_height,
            self.total_rows,
            self.direction,
            self.options.min_buffer,
        )
    }

    /// Forgets the scroll direction, e.g. after the scroll settles.
    pub fn reset_direction(&mut self) {
        self.direction = ScrollDirection::Neutral;
    }

    fn should_render(&self) -> bool {
        let Some(last) = self.last_render_top else {
            return true;
        };
        let threshold = (self.container_height * self.options.skip_fraction)
            .min(self.options.skip_rows as f64 * self.options.row_height);
        (self.scroll_top - last).abs() >= threshold
    }
}
