//! Markdown document rendering.
//!
//! This module handles:
//! - Rendering markdown to styled preview lines with comrak
//! - Heading outline extraction and anchor ids
//! - Mapping rendered checkboxes back to source lines

mod outline;
mod preview;
mod types;

pub use outline::{OutlineEntry, Slugger, extract_outline, slugify};
pub use preview::render_preview;
pub use types::{
    CheckboxRef, HeadingRef, InlineColor, InlineSpan, InlineStyle, LineType, Preview,
    RenderedLine,
};

use comrak::Options;

/// Enable the GitHub-flavored extensions shared by the preview and HTML
/// export.
pub fn apply_gfm_extensions(options: &mut Options) {
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;
    options.extension.shortcodes = true;
    options.extension.header_ids = Some(String::new());
}
