use crate::editor::{Edit, EditorBuffer, toggle_line_checkbox};
use crate::history::History;

use super::{Layout, Theme};

/// Initial document on first launch.
pub const WELCOME_TEXT: &str = "# Welcome to Zenith Editor\n\nStart typing...";

/// The document state container.
///
/// Owns the text buffer and its undo log. Typed changes reach the log
/// only through [`EditorState::commit`], which the app calls once typing
/// settles; structural changes (checkbox toggles, formatting, loads)
/// commit immediately.
#[derive(Debug)]
pub struct EditorState {
    buffer: EditorBuffer,
    history: History,
    pub theme: Theme,
    pub zen: bool,
    pub layout: Layout,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(WELCOME_TEXT, Theme::default(), Layout::default())
    }
}

impl EditorState {
    pub fn new(markdown: &str, theme: Theme, layout: Layout) -> Self {
        Self {
            buffer: EditorBuffer::from_text(markdown),
            history: History::new(markdown),
            theme,
            zen: false,
            layout,
        }
    }

    pub const fn buffer(&self) -> &EditorBuffer {
        &self.buffer
    }

    /// Mutable buffer access for cursor movement and typing.
    pub const fn buffer_mut(&mut self) -> &mut EditorBuffer {
        &mut self.buffer
    }

    pub fn markdown(&self) -> String {
        self.buffer.text()
    }

    pub const fn history(&self) -> &History {
        &self.history
    }

    /// Whether the buffer differs from the newest history entry.
    pub fn has_uncommitted_changes(&self) -> bool {
        self.buffer.text() != self.history.current()
    }

    /// Record the current text in the undo log.
    pub fn commit(&mut self) -> bool {
        self.history.push(self.buffer.text())
    }

    /// Replace the document and record it. Used for loads and new files.
    pub fn replace_document(&mut self, markdown: &str) {
        self.buffer = EditorBuffer::from_text(markdown);
        self.history.push(markdown);
    }

    pub fn apply_edit(&mut self, edit: &Edit) {
        self.buffer.apply_edit(edit);
    }

    /// Apply an edit and record the result right away.
    pub fn apply_edit_and_commit(&mut self, edit: &Edit) {
        self.buffer.apply_edit(edit);
        self.commit();
    }

    /// Step back one snapshot. Pending typed changes are committed first so
    /// the undo lands on the state before them.
    pub fn undo(&mut self) -> bool {
        self.commit();
        let Some(text) = self.history.undo().map(str::to_string) else {
            return false;
        };
        self.buffer.set_text(&text);
        true
    }

    pub fn redo(&mut self) -> bool {
        if self.has_uncommitted_changes() {
            return false;
        }
        let Some(text) = self.history.redo().map(str::to_string) else {
            return false;
        };
        self.buffer.set_text(&text);
        true
    }

    /// Toggle the checkbox on 1-based source `line`. Records history when
    /// something changed.
    pub fn toggle_checkbox(&mut self, line: usize) -> bool {
        let Some(updated) = toggle_line_checkbox(&self.buffer.text(), line) else {
            return false;
        };
        self.buffer.set_text(&updated);
        self.commit();
        true
    }

    pub const fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }

    pub const fn toggle_zen(&mut self) {
        self.zen = !self.zen;
    }

    /// True when "new file" should ask before discarding the text.
    pub fn needs_new_file_confirmation(&self) -> bool {
        let text = self.buffer.text();
        !text.trim().is_empty() && text != WELCOME_TEXT
    }
}
