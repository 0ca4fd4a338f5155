//! Terminal UI components.
//!
//! - [`viewport`]: Scroll state shared by the editor and preview panes
//! - [`style`]: Light and dark palettes
//! - [`pane_areas`]: Screen layout used by drawing and mouse hit-testing

pub mod style;
pub mod viewport;

mod overlays;
mod render;
mod status;

pub use render::{byte_for_column, editor_gutter_width, editor_hscroll, render};

use ratatui::layout::Rect;

use crate::state::Layout;

pub const HEADER_ROWS: u16 = 1;
pub const PREVIEW_LEFT_PADDING: u16 = 1;
/// Rows above the first outline entry.
pub const OUTLINE_TITLE_ROWS: u16 = 1;
/// Narrowest editor kept when the side panes are wide.
const MIN_EDITOR_COLUMNS: u16 = 10;

/// Where each part of the screen goes for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneAreas {
    pub header: Rect,
    pub outline: Option<Rect>,
    pub outline_divider: Option<Rect>,
    pub editor: Rect,
    pub preview_divider: Option<Rect>,
    pub preview: Option<Rect>,
    pub toast: Option<Rect>,
    pub status: Rect,
}

/// Split `area` into header, panes and footer.
///
/// Zen mode leaves only the editor between header and footer.
pub fn pane_areas(area: Rect, layout: &Layout, zen: bool, toast: bool) -> PaneAreas {
    let footer_rows = 1 + u16::from(toast);
    let header = Rect {
        height: HEADER_ROWS.min(area.height),
        ..area
    };
    let main_top = area.y + header.height;
    let main_height = area
        .height
        .saturating_sub(header.height)
        .saturating_sub(footer_rows);
    let status = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: area.height.min(1),
        ..area
    };
    let toast = toast.then(|| Rect {
        y: area.y + area.height.saturating_sub(2),
        height: 1,
        ..area
    });
    let main = Rect::new(area.x, main_top, area.width, main_height);

    if zen {
        return PaneAreas {
            header,
            outline: None,
            outline_divider: None,
            editor: main,
            preview_divider: None,
            preview: None,
            toast,
            status,
        };
    }

    let outline_cols = layout
        .outline_columns()
        .min(main.width.saturating_sub(MIN_EDITOR_COLUMNS + 2) / 2);
    let rest = main.width.saturating_sub(outline_cols + 1);
    let preview_cols = layout
        .preview_columns(rest)
        .min(rest.saturating_sub(MIN_EDITOR_COLUMNS + 1));
    let editor_cols = rest.saturating_sub(preview_cols + 1);

    let column = |x: u16, width: u16| Rect::new(x, main.y, width, main.height);
    let outline = column(main.x, outline_cols);
    let outline_divider = column(outline.right(), 1);
    let editor = column(outline_divider.right(), editor_cols);
    let preview_divider = column(editor.right(), 1);
    let preview = column(preview_divider.right(), preview_cols);

    PaneAreas {
        header,
        outline: Some(outline),
        outline_divider: Some(outline_divider),
        editor,
        preview_divider: Some(preview_divider),
        preview: Some(preview),
        toast,
        status,
    }
}

/// Whether `(col, row)` falls inside `rect`.
pub const fn contains(rect: Rect, col: u16, row: u16) -> bool {
    col >= rect.x
        && col < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

#[cfg(test)]
mod tests;
