//! Line-based scroll state for one pane.
//!
//! The editor pane scrolls over source lines and the preview pane over
//! rendered lines; both are [`Viewport`]s and both take part in scroll
//! sync through [`Scrollable`].

use std::ops::Range;

use crate::scroll_sync::{ScrollMetrics, Scrollable};

/// Visible window into `total_lines` lines.
///
/// # Example
///
/// ```
/// use zenith::ui::viewport::Viewport;
///
/// let mut vp = Viewport::new(40, 10, 100);
/// vp.scroll_by(15);
/// assert_eq!(vp.visible_range(), 15..25);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    width: u16,
    height: u16,
    offset: usize,
    total_lines: usize,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(80, 24, 0)
    }
}

impl Viewport {
    pub const fn new(width: u16, height: u16, total_lines: usize) -> Self {
        Self {
            width,
            height,
            offset: 0,
            total_lines,
        }
    }

    /// Index of the first visible line.
    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    pub const fn total_lines(&self) -> usize {
        self.total_lines
    }

    pub fn visible_range(&self) -> Range<usize> {
        let end = (self.offset + self.height as usize).min(self.total_lines);
        self.offset..end
    }

    /// Scroll position as a percentage; 100 when everything fits.
    pub fn scroll_percent(&self) -> u8 {
        let max_offset = self.max_offset();
        if max_offset == 0 {
            return 100;
        }
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        {
            ((self.offset as f64 / max_offset as f64) * 100.0).round() as u8
        }
    }

    /// Scroll by `delta` lines; negative scrolls up. Returns whether the
    /// offset moved.
    pub fn scroll_by(&mut self, delta: isize) -> bool {
        let before = self.offset;
        let target = if delta < 0 {
            self.offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.offset.saturating_add(delta.unsigned_abs())
        };
        self.offset = target.min(self.max_offset());
        self.offset != before
    }

    pub fn go_to_line(&mut self, line: usize) {
        self.offset = line.min(self.max_offset());
    }

    /// Scroll the least amount that brings `line` into view.
    pub fn ensure_visible(&mut self, line: usize) -> bool {
        let before = self.offset;
        let height = (self.height as usize).max(1);
        if line < self.offset {
            self.offset = line;
        } else if line >= self.offset + height {
            self.offset = line + 1 - height;
        }
        self.offset = self.offset.min(self.max_offset());
        self.offset != before
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn set_total_lines(&mut self, total: usize) {
        self.total_lines = total;
        self.offset = self.offset.min(self.max_offset());
    }

    const fn max_offset(&self) -> usize {
        self.total_lines.saturating_sub(self.height as usize)
    }
}

impl Scrollable for Viewport {
    fn scroll_metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top: self.offset,
            scroll_height: self.total_lines,
            client_height: self.height as usize,
        }
    }

    fn set_scroll_top(&mut self, top: usize) {
        self.go_to_line(top);
    }
}
