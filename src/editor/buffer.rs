use std::ops::Range;

use ropey::Rope;

/// Cursor position in the editor buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column (byte offset within the line).
    pub col: usize,
    /// Remembered column for vertical movement (sticky column).
    col_memory: usize,
}

impl Cursor {
    pub const fn new() -> Self {
        Self::at(0, 0)
    }

    pub const fn at(line: usize, col: usize) -> Self {
        Self {
            line,
            col,
            col_memory: col,
        }
    }

    const fn set_col(&mut self, col: usize) {
        self.col = col;
        self.col_memory = col;
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Direction for cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Markdown source held in a rope, with a single cursor.
///
/// Every mutation funnels through [`EditorBuffer::replace_range`], which
/// works on byte offsets into the full text. Structural edits computed
/// elsewhere (list continuation, formatting) are expressed the same way.
pub struct EditorBuffer {
    rope: Rope,
    cursor: Cursor,
    revision: u64,
}

impl EditorBuffer {
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Cursor::new(),
            revision: 0,
        }
    }

    pub fn empty() -> Self {
        Self::from_text("")
    }

    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Monotonic counter bumped on every content change.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Content of a line without its line terminator.
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let s = self.rope.line(line_idx).to_string();
        Some(s.trim_end_matches('\n').trim_end_matches('\r').to_string())
    }

    /// Length of a line in bytes, excluding the terminator.
    pub fn line_len(&self, line_idx: usize) -> usize {
        self.line_at(line_idx).map_or(0, |s| s.len())
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    /// Replace the whole document, keeping the cursor as close as possible.
    pub fn set_text(&mut self, text: &str) {
        let cursor = self.cursor;
        self.rope = Rope::from_str(text);
        self.revision += 1;
        self.move_to(cursor.line, cursor.col);
    }

    // --- Offsets ---

    /// Byte offset at which `line` starts.
    pub fn line_start_offset(&self, line: usize) -> usize {
        let line = line.min(self.line_count().saturating_sub(1));
        self.rope.line_to_byte(line)
    }

    /// Byte offset of the cursor in the full text.
    pub fn cursor_offset(&self) -> usize {
        self.line_start_offset(self.cursor.line) + self.cursor.col
    }

    /// Line/column for a byte offset, clamped to the document and snapped
    /// back to a char boundary.
    pub fn position_of(&self, offset: usize) -> (usize, usize) {
        let offset = self.snap_to_char(offset.min(self.len_bytes()));
        let line = self.rope.byte_to_line(offset);
        let col = offset - self.rope.line_to_byte(line);
        (line, col.min(self.line_len(line)))
    }

    pub fn set_cursor_offset(&mut self, offset: usize) {
        let (line, col) = self.position_of(offset);
        self.cursor.line = line;
        self.cursor.set_col(col);
    }

    /// Replace the bytes in `range` with `insert`.
    ///
    /// The cursor is not moved; callers place it afterwards. Out-of-range
    /// bounds are clamped.
    pub fn replace_range(&mut self, range: Range<usize>, insert: &str) {
        let len = self.len_bytes();
        let start = self.snap_to_char(range.start.min(len));
        let end = self.snap_to_char(range.end.clamp(start, len));
        let start_char = self.rope.byte_to_char(start);
        let end_char = self.rope.byte_to_char(end);
        if start_char == end_char && insert.is_empty() {
            return;
        }
        self.rope.remove(start_char..end_char);
        self.rope.insert(start_char, insert);
        self.revision += 1;
        let (line, col) = self.position_of(self.cursor_offset().min(self.len_bytes()));
        self.cursor.line = line;
        self.cursor.col = col;
    }

    /// Byte range of the word under (or just before) the cursor.
    pub fn word_range_at_cursor(&self) -> Option<Range<usize>> {
        let line = self.line_at(self.cursor.line)?;
        let col = self.cursor.col.min(line.len());
        let is_word = |c: char| c.is_alphanumeric() || c == '_';
        let start = line[..col]
            .rfind(|c: char| !is_word(c))
            .map_or(0, |i| i + line[i..].chars().next().map_or(1, char::len_utf8));
        let end = line[col..].find(|c: char| !is_word(c)).map_or(line.len(), |i| col + i);
        if start >= end {
            return None;
        }
        let base = self.line_start_offset(self.cursor.line);
        Some(base + start..base + end)
    }

    // --- Editing at the cursor ---

    pub fn insert_char(&mut self, ch: char) {
        let mut encoded = [0u8; 4];
        self.insert_str(ch.encode_utf8(&mut encoded));
    }

    /// Insert text at the cursor and move past it.
    pub fn insert_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        let at = self.cursor_offset();
        self.replace_range(at..at, s);
        self.set_cursor_offset(at + s.len());
    }

    /// Split the current line at the cursor (plain Enter).
    pub fn split_line(&mut self) {
        self.insert_str("\n");
    }

    /// Delete the character before the cursor. Returns `true` on change.
    pub fn delete_back(&mut self) -> bool {
        let at = self.cursor_offset();
        if at == 0 {
            return false;
        }
        let start = self.prev_char_boundary(at);
        self.replace_range(start..at, "");
        self.set_cursor_offset(start);
        true
    }

    /// Delete the character at the cursor. Returns `true` on change.
    pub fn delete_forward(&mut self) -> bool {
        let at = self.cursor_offset();
        if at >= self.len_bytes() {
            return false;
        }
        let end = self.next_char_boundary(at);
        self.replace_range(at..end, "");
        self.set_cursor_offset(at);
        true
    }

    // --- Movement ---

    pub fn move_cursor(&mut self, direction: Direction) {
        match direction {
            Direction::Left => self.move_left(),
            Direction::Right => self.move_right(),
            Direction::Up => self.move_vertical(-1),
            Direction::Down => self.move_vertical(1),
        }
    }

    pub const fn move_home(&mut self) {
        self.cursor.set_col(0);
    }

    pub fn move_end(&mut self) {
        let len = self.line_len(self.cursor.line);
        self.cursor.set_col(len);
    }

    /// Move to the start of the previous word, wrapping to the previous line.
    pub fn move_word_left(&mut self) {
        if self.cursor.col == 0 {
            if self.cursor.line > 0 {
                self.cursor.line -= 1;
                self.cursor.set_col(self.line_len(self.cursor.line));
            }
            return;
        }
        let line = self.line_at(self.cursor.line).unwrap_or_default();
        let trimmed = line[..self.cursor.col].trim_end();
        let pos = trimmed
            .rfind(|c: char| !c.is_alphanumeric() && c != '_')
            .map_or(0, |i| i + 1);
        self.cursor.set_col(pos);
    }

    /// Move past the current word and the gap after it.
    pub fn move_word_right(&mut self) {
        let line = self.line_at(self.cursor.line).unwrap_or_default();
        if self.cursor.col >= line.len() {
            if self.cursor.line + 1 < self.line_count() {
                self.cursor.line += 1;
                self.cursor.set_col(0);
            }
            return;
        }
        let after = &line[self.cursor.col..];
        let word_end = after
            .find(|c: char| !c.is_alphanumeric() && c != '_')
            .unwrap_or(after.len());
        let gap_end = after[word_end..]
            .find(|c: char| c.is_alphanumeric() || c == '_')
            .map_or(after.len(), |i| word_end + i);
        self.cursor.set_col(self.cursor.col + gap_end);
    }

    /// Move by `lines` rows up (negative) or down, keeping the sticky column.
    pub fn move_lines(&mut self, lines: isize) {
        self.move_vertical(lines);
    }

    pub fn move_to(&mut self, line: usize, col: usize) {
        let max_line = self.line_count().saturating_sub(1);
        self.cursor.line = line.min(max_line);
        let line_text = self.line_at(self.cursor.line).unwrap_or_default();
        let mut col = col.min(line_text.len());
        while !line_text.is_char_boundary(col) {
            col -= 1;
        }
        self.cursor.set_col(col);
    }

    pub const fn move_to_start(&mut self) {
        self.cursor.line = 0;
        self.cursor.set_col(0);
    }

    pub fn move_to_end(&mut self) {
        let last = self.line_count().saturating_sub(1);
        self.cursor.line = last;
        self.cursor.set_col(self.line_len(last));
    }

    // --- Private helpers ---

    fn snap_to_char(&self, offset: usize) -> usize {
        let char_idx = self.rope.byte_to_char(offset);
        self.rope.char_to_byte(char_idx)
    }

    fn prev_char_boundary(&self, offset: usize) -> usize {
        let char_idx = self.rope.byte_to_char(offset);
        self.rope.char_to_byte(char_idx.saturating_sub(1))
    }

    fn next_char_boundary(&self, offset: usize) -> usize {
        let char_idx = self.rope.byte_to_char(offset);
        self.rope
            .char_to_byte((char_idx + 1).min(self.rope.len_chars()))
    }

    fn move_left(&mut self) {
        if self.cursor.col > 0 {
            let at = self.cursor_offset();
            self.set_cursor_offset(self.prev_char_boundary(at));
        } else if self.cursor.line > 0 {
            self.cursor.line -= 1;
            self.cursor.set_col(self.line_len(self.cursor.line));
        }
    }

    fn move_right(&mut self) {
        if self.cursor.col < self.line_len(self.cursor.line) {
            let at = self.cursor_offset();
            self.set_cursor_offset(self.next_char_boundary(at));
        } else if self.cursor.line + 1 < self.line_count() {
            self.cursor.line += 1;
            self.cursor.set_col(0);
        }
    }

    fn move_vertical(&mut self, delta: isize) {
        let max_line = self.line_count().saturating_sub(1);
        let target = self.cursor.line.saturating_add_signed(delta).min(max_line);
        if target == self.cursor.line {
            return;
        }
        let memory = self.cursor.col_memory;
        let line_text = self.line_at(target).unwrap_or_default();
        let mut col = memory.min(line_text.len());
        while !line_text.is_char_boundary(col) {
            col -= 1;
        }
        self.cursor.line = target;
        self.cursor.col = col;
    }
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBuffer")
            .field(
                "rope",
                &format_args!("Rope({} lines)", self.rope.len_lines()),
            )
            .field("cursor", &self.cursor)
            .field("revision", &self.revision)
            .finish()
    }
}

impl Default for EditorBuffer {
    fn default() -> Self {
        Self::empty()
    }
}
