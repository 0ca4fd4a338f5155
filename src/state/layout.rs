//! Pane widths and divider drag gestures.
//!
//! Widths are stored in the units the layout was designed in: the outline
//! in pixels, the preview as a percentage of the space right of the
//! outline. One terminal column counts as [`CELL_WIDTH_PX`] pixels.

use serde::{Deserialize, Serialize};

pub const DEFAULT_OUTLINE_WIDTH: u32 = 250;
pub const DEFAULT_PREVIEW_WIDTH: f64 = 50.0;
pub const CELL_WIDTH_PX: u32 = 10;

const OUTLINE_MIN: u32 = 150;
const OUTLINE_MAX: u32 = 400;
const PREVIEW_MIN: f64 = 20.0;
const PREVIEW_MAX: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Layout {
    outline_width: u32,
    preview_width: f64,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            outline_width: DEFAULT_OUTLINE_WIDTH,
            preview_width: DEFAULT_PREVIEW_WIDTH,
        }
    }
}

impl Layout {
    /// Build from persisted values, falling back to defaults for anything
    /// outside the accepted ranges.
    pub fn new(outline_width: u32, preview_width: f64) -> Self {
        let mut layout = Self::default();
        layout.set_outline_width(outline_width);
        layout.set_preview_width(preview_width);
        layout
    }

    pub const fn outline_width(&self) -> u32 {
        self.outline_width
    }

    pub const fn preview_width(&self) -> f64 {
        self.preview_width
    }

    /// Accept `px` only when strictly inside (150, 400).
    pub fn set_outline_width(&mut self, px: u32) -> bool {
        if px > OUTLINE_MIN && px < OUTLINE_MAX {
            self.outline_width = px;
            true
        } else {
            false
        }
    }

    /// Accept `pct` only when strictly inside (20, 80).
    pub fn set_preview_width(&mut self, pct: f64) -> bool {
        if pct > PREVIEW_MIN && pct < PREVIEW_MAX {
            self.preview_width = pct;
            true
        } else {
            false
        }
    }

    /// Outline width in terminal columns.
    pub fn outline_columns(&self) -> u16 {
        u16::try_from(self.outline_width / CELL_WIDTH_PX).unwrap_or(u16::MAX)
    }

    /// Preview width in columns for a main area `columns` wide.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn preview_columns(&self, columns: u16) -> u16 {
        ((f64::from(columns) * self.preview_width / 100.0).round() as u16).min(columns)
    }
}

/// Which divider is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Divider {
    /// Between the outline and the editor
    Outline,
    /// Between the editor and the preview
    Preview,
}

/// An in-progress divider drag: where it started and the width at that time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeDrag {
    pub divider: Divider,
    pub start_x: u16,
    pub start_outline: u32,
    pub start_preview: f64,
}

impl ResizeDrag {
    pub const fn begin(divider: Divider, start_x: u16, layout: &Layout) -> Self {
        Self {
            divider,
            start_x,
            start_outline: layout.outline_width,
            start_preview: layout.preview_width,
        }
    }

    /// Apply pointer position `x` to `layout`.
    ///
    /// The outline grows with rightward motion. The preview grows with
    /// leftward motion, relative to the container right of the outline
    /// (the whole window in zen mode). Out-of-range results are ignored.
    /// Returns `true` when a width changed.
    pub fn update(&self, x: u16, window_columns: u16, zen: bool, layout: &mut Layout) -> bool {
        let delta_px = (i64::from(x) - i64::from(self.start_x)) * i64::from(CELL_WIDTH_PX);
        match self.divider {
            Divider::Outline => {
                let width = i64::from(self.start_outline) + delta_px;
                u32::try_from(width).is_ok_and(|px| layout.set_outline_width(px))
            }
            Divider::Preview => {
                let window_px = i64::from(window_columns) * i64::from(CELL_WIDTH_PX);
                let container = window_px - if zen { 0 } else { i64::from(layout.outline_width) };
                if container <= 0 {
                    return false;
                }
                #[allow(clippy::cast_precision_loss)]
                let pct = self.start_preview - (delta_px as f64) / (container as f64) * 100.0;
                layout.set_preview_width(pct)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let layout = Layout::default();
        assert_eq!(layout.outline_width(), 250);
        assert!((layout.preview_width() - 50.0).abs() < f64::EPSILON);
        assert_eq!(layout.outline_columns(), 25);
    }

    #[test]
    fn test_outline_bounds_are_exclusive() {
        let mut layout = Layout::default();
        assert!(!layout.set_outline_width(150));
        assert!(!layout.set_outline_width(400));
        assert!(layout.set_outline_width(151));
        assert_eq!(layout.outline_width(), 151);
    }

    #[test]
    fn test_preview_bounds_are_exclusive() {
        let mut layout = Layout::default();
        assert!(!layout.set_preview_width(20.0));
        assert!(!layout.set_preview_width(80.0));
        assert!(layout.set_preview_width(79.9));
    }

    #[test]
    fn test_new_ignores_invalid_persisted_values() {
        let layout = Layout::new(9000, 5.0);
        assert_eq!(layout, Layout::default());
    }

    #[test]
    fn test_outline_drag_right_grows() {
        let mut layout = Layout::default();
        let drag = ResizeDrag::begin(Divider::Outline, 25, &layout);
        assert!(drag.update(30, 200, false, &mut layout));
        assert_eq!(layout.outline_width(), 300);
        // beyond the limit the last accepted value stays
        assert!(!drag.update(50, 200, false, &mut layout));
        assert_eq!(layout.outline_width(), 300);
    }

    #[test]
    fn test_preview_drag_left_grows() {
        let mut layout = Layout::default();
        // window 125 cols = 1250px, container = 1000px
        let drag = ResizeDrag::begin(Divider::Preview, 75, &layout);
        assert!(drag.update(65, 125, false, &mut layout));
        assert!((layout.preview_width() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_preview_drag_in_zen_uses_full_window() {
        let mut layout = Layout::default();
        let drag = ResizeDrag::begin(Divider::Preview, 50, &layout);
        assert!(drag.update(60, 100, true, &mut layout));
        assert!((layout.preview_width() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_preview_columns_rounds() {
        let layout = Layout::default();
        assert_eq!(layout.preview_columns(81), 41);
    }

    #[test]
    fn test_layout_serializes_camel_case() {
        let json = serde_json::to_string(&Layout::default()).unwrap();
        assert!(json.contains("\"outlineWidth\":250"));
        assert!(json.contains("\"previewWidth\":50"));
    }
}
