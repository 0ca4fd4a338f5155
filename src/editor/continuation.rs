//! Structural editing on Enter and Space.
//!
//! Both functions are pure: they inspect the text before the cursor on the
//! current line and return an [`Edit`] to apply, or `None` to let the key
//! fall through to plain insertion.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)([-*]|\d+\.|>)(\s+(\[([ x])\]\s)?)").expect("Invalid list item regex")
});

static CHECKBOX_SHORTHAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)\[ \]$").expect("Invalid checkbox shorthand regex"));

/// A text replacement plus where the cursor ends up, in byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub range: Range<usize>,
    pub insert: String,
    pub cursor: usize,
}

impl Edit {
    /// Apply to a plain string. Used by tests and by callers without a rope.
    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + self.insert.len());
        out.push_str(&text[..self.range.start]);
        out.push_str(&self.insert);
        out.push_str(&text[self.range.end..]);
        out
    }
}

fn line_start(text: &str, cursor: usize) -> usize {
    text[..cursor].rfind('\n').map_or(0, |i| i + 1)
}

/// Enter inside a list item, task item or block quote.
///
/// An item with nothing but its marker ends the list: the marker is
/// removed and the cursor returns to the line start. Otherwise a new item
/// is opened on the next line with the same indent, an incremented number
/// for ordered lists, and an unchecked box for task items.
pub fn continue_list(text: &str, cursor: usize) -> Option<Edit> {
    let cursor = cursor.min(text.len());
    let start = line_start(text, cursor);
    let before = &text[start..cursor];
    let caps = LIST_ITEM.captures(before)?;

    let indent = caps.get(1).map_or("", |m| m.as_str());
    let marker = caps.get(2).map_or("", |m| m.as_str());
    let has_checkbox = caps.get(4).is_some();

    let trimmed = before.trim();
    if trimmed == marker || (has_checkbox && trimmed == format!("{marker} [ ]")) {
        return Some(Edit {
            range: start..cursor,
            insert: String::new(),
            cursor: start,
        });
    }

    let next_marker = next_marker(marker);
    let gap = if has_checkbox { " [ ] " } else { " " };
    let insert = format!("\n{indent}{next_marker}{gap}");
    Some(Edit {
        range: cursor..cursor,
        cursor: cursor + insert.len(),
        insert,
    })
}

fn next_marker(marker: &str) -> String {
    marker
        .strip_suffix('.')
        .and_then(|digits| digits.parse::<u64>().ok())
        .and_then(|n| n.checked_add(1))
        .map_or_else(|| marker.to_string(), |n| format!("{n}."))
}

/// Space right after a bare `[ ]` at the start of a line.
///
/// Expands the shorthand into a full task item (`- [ ] `) and consumes the
/// space.
pub fn expand_checkbox_shorthand(text: &str, cursor: usize) -> Option<Edit> {
    let cursor = cursor.min(text.len());
    let start = line_start(text, cursor);
    let caps = CHECKBOX_SHORTHAND.captures(&text[start..cursor])?;
    let indent = caps.get(1).map_or("", |m| m.as_str());
    let insert = format!("{indent}- [ ] ");
    Some(Edit {
        range: start..cursor,
        cursor: start + insert.len(),
        insert,
    })
}
