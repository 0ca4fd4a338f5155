//! Toolbar-style formatting commands.

use std::ops::Range;

use super::continuation::Edit;

/// Formatting applied at the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatCommand {
    Bold,
    Italic,
    Code,
    Strikethrough,
    /// Cycle the line's heading level: none, `#` .. `######`, none.
    Heading,
    Link,
}

impl FormatCommand {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bold => "Bold",
            Self::Italic => "Italic",
            Self::Code => "Inline code",
            Self::Strikethrough => "Strikethrough",
            Self::Heading => "Heading",
            Self::Link => "Link",
        }
    }

    /// Compute the edit for this command.
    ///
    /// `word` is the byte range of the word under the cursor, if any. Inline
    /// markers wrap that word; with no word an empty pair is inserted and
    /// the cursor lands between the markers.
    pub fn apply(self, text: &str, cursor: usize, word: Option<Range<usize>>) -> Edit {
        let cursor = cursor.min(text.len());
        match self {
            Self::Bold => wrap(text, cursor, word, "**"),
            Self::Italic => wrap(text, cursor, word, "*"),
            Self::Code => wrap(text, cursor, word, "`"),
            Self::Strikethrough => wrap(text, cursor, word, "~~"),
            Self::Heading => cycle_heading(text, cursor),
            Self::Link => link(text, cursor, word),
        }
    }
}

fn wrap(text: &str, cursor: usize, word: Option<Range<usize>>, marker: &str) -> Edit {
    match word {
        Some(range) => {
            let inner = &text[range.clone()];
            let insert = format!("{marker}{inner}{marker}");
            Edit {
                cursor: range.start + marker.len() + inner.len(),
                range,
                insert,
            }
        }
        None => Edit {
            range: cursor..cursor,
            insert: format!("{marker}{marker}"),
            cursor: cursor + marker.len(),
        },
    }
}

fn link(text: &str, cursor: usize, word: Option<Range<usize>>) -> Edit {
    let (range, label) = match word {
        Some(range) => {
            let label = text[range.clone()].to_string();
            (range, label)
        }
        None => (cursor..cursor, "link".to_string()),
    };
    let insert = format!("[{label}](https://)");
    Edit {
        // inside the parentheses, after the scheme
        cursor: range.start + insert.len() - 1,
        range,
        insert,
    }
}

fn cycle_heading(text: &str, cursor: usize) -> Edit {
    let start = text[..cursor].rfind('\n').map_or(0, |i| i + 1);
    let line_end = text[start..].find('\n').map_or(text.len(), |i| start + i);
    let line = &text[start..line_end];

    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    let is_heading = (1..=6).contains(&hashes)
        && line[hashes..].starts_with(|c: char| c == ' ' || c == '\t');
    let old_prefix_len = if is_heading {
        hashes + line[hashes..].len() - line[hashes..].trim_start_matches([' ', '\t']).len()
    } else {
        0
    };
    let level = if is_heading { hashes } else { 0 };
    let new_prefix = if level >= 6 {
        String::new()
    } else {
        format!("{} ", "#".repeat(level + 1))
    };

    let column = cursor - start;
    let new_column = if column >= old_prefix_len {
        column - old_prefix_len + new_prefix.len()
    } else {
        new_prefix.len()
    };
    Edit {
        range: start..start + old_prefix_len,
        cursor: start + new_column,
        insert: new_prefix,
    }
}
