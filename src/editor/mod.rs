//! Markdown editing primitives.
//!
//! A rope-backed text buffer with cursor management, plus the pure
//! structural edits (list continuation, checkbox toggling, formatting)
//! the app applies on top of it.

mod buffer;
mod checkbox;
mod continuation;
mod format;

pub use buffer::{Cursor, Direction, EditorBuffer};
pub use checkbox::toggle_line_checkbox;
pub use continuation::{Edit, continue_list, expand_checkbox_shorthand};
pub use format::FormatCommand;

impl EditorBuffer {
    /// Apply a computed edit and place the cursor where it asks.
    pub fn apply_edit(&mut self, edit: &Edit) {
        self.replace_range(edit.range.clone(), &edit.insert);
        self.set_cursor_offset(edit.cursor);
    }
}
