//! Task checkbox toggling by source line.

/// Flip the first checkbox on 1-based `line` of `text`.
///
/// An unchecked `[ ]` becomes `[x]`; failing that, the first `[x]` or
/// `[X]` becomes `[ ]`. Only lowercase `x` is ever written. Returns `None`
/// when the line does not exist or carries no checkbox token.
pub fn toggle_line_checkbox(text: &str, line: usize) -> Option<String> {
    let index = line.checked_sub(1)?;
    let (start, end) = line_bounds(text, index)?;
    let content = &text[start..end];

    let toggled = if let Some(pos) = content.find("[ ]") {
        splice(content, pos, "[x]")
    } else {
        let pos = content
            .find("[x]")
            .into_iter()
            .chain(content.find("[X]"))
            .min()?;
        splice(content, pos, "[ ]")
    };

    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..start]);
    out.push_str(&toggled);
    out.push_str(&text[end..]);
    Some(out)
}

/// Byte bounds of line `index` (0-based), excluding its newline.
fn line_bounds(text: &str, index: usize) -> Option<(usize, usize)> {
    let mut start = 0;
    for _ in 0..index {
        start += text[start..].find('\n')? + 1;
    }
    let end = text[start..].find('\n').map_or(text.len(), |i| start + i);
    Some((start, end))
}

fn splice(content: &str, pos: usize, token: &str) -> String {
    format!("{}{token}{}", &content[..pos], &content[pos + 3..])
}
