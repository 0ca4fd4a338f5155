use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::app::{Focus, Model};
use crate::document::LineType;

use super::style::{Palette, style_for_inline, style_for_line_type};
use super::{OUTLINE_TITLE_ROWS, PREVIEW_LEFT_PADDING, overlays, status};

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let palette = Palette::for_theme(model.editor.theme);
    let areas = model.areas();

    frame.render_widget(Clear, area);
    frame.render_widget(Block::default().style(palette.base()), area);

    status::render_header(model, &palette, frame, areas.header);
    if let Some(outline) = areas.outline {
        render_outline(model, &palette, frame, outline);
    }
    for divider in [areas.outline_divider, areas.preview_divider]
        .into_iter()
        .flatten()
    {
        render_divider(model, &palette, frame, divider);
    }
    render_editor(model, &palette, frame, areas.editor);
    if let Some(preview) = areas.preview {
        render_preview(model, &palette, frame, preview);
    }
    if let Some(toast) = areas.toast {
        status::render_toast_bar(model, frame, toast);
    }
    status::render_status_bar(model, &palette, frame, areas.status);

    if model.help_visible {
        overlays::render_help_overlay(model, &palette, frame, area);
    } else if model.modal.is_some() {
        overlays::render_modal(model, &palette, frame, area);
    }
}

fn render_outline(model: &Model, palette: &Palette, frame: &mut Frame, area: Rect) {
    let focused = model.focus == Focus::Outline;
    let title_style = if focused {
        Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.dim).add_modifier(Modifier::BOLD)
    };

    let visible_rows = area.height.saturating_sub(OUTLINE_TITLE_ROWS) as usize;
    let width = area.width as usize;
    let mut items = vec![Line::styled(" OUTLINE", title_style)];
    if model.outline.is_empty() {
        items.push(Line::styled(" No headings", Style::default().fg(palette.dim)));
    }
    items.extend(
        model
            .outline
            .iter()
            .enumerate()
            .skip(model.outline_offset)
            .take(visible_rows)
            .map(|(i, entry)| {
                let indent = "  ".repeat(usize::from(entry.level.saturating_sub(1)));
                let text = truncate_to_width(&format!(" {indent}{}", entry.text), width);
                let base = style_for_line_type(&LineType::Heading(entry.level), palette)
                    .remove_modifier(Modifier::UNDERLINED);
                let style = if model.outline_selected == Some(i) && focused {
                    base.reversed()
                } else if model.outline_selected == Some(i) {
                    base.bg(palette.active_line_bg)
                } else {
                    base
                };
                Line::styled(text, style)
            }),
    );

    frame.render_widget(Paragraph::new(items).style(palette.base()), area);
}

fn render_divider(model: &Model, palette: &Palette, frame: &mut Frame, area: Rect) {
    let dragging = model.drag.is_some();
    let style = if dragging {
        Style::default().fg(palette.accent).bg(palette.bg)
    } else {
        Style::default().fg(palette.divider).bg(palette.bg)
    };
    let lines = (0..area.height)
        .map(|_| Line::raw("\u{2502}"))
        .collect::<Vec<_>>();
    frame.render_widget(Paragraph::new(lines).style(style), area);
}

fn render_editor(model: &Model, palette: &Palette, frame: &mut Frame, area: Rect) {
    let buffer = model.editor.buffer();
    let total_lines = buffer.line_count();
    let gutter_width = editor_gutter_width(total_lines);
    let text_width = area.width.saturating_sub(gutter_width) as usize;
    let cursor = buffer.cursor();
    let hscroll = editor_hscroll(model);

    let mut content: Vec<Line> = Vec::new();
    for line_idx in model.editor_view.visible_range() {
        let line_text = buffer.line_at(line_idx).unwrap_or_default();
        let active = line_idx == cursor.line;
        let number_style = if active {
            Style::default().fg(palette.accent)
        } else {
            Style::default().fg(palette.dim)
        };
        let line_num = format!(
            "{:>width$} ",
            line_idx + 1,
            width = gutter_width.saturating_sub(1) as usize
        );
        let text_style = if active {
            palette.base().bg(palette.active_line_bg)
        } else {
            palette.base()
        };
        let visible = slice_columns(&line_text, hscroll, text_width);
        let padding = text_width.saturating_sub(display_width(&visible));
        content.push(Line::from(vec![
            Span::styled(line_num, number_style),
            Span::styled(visible, text_style),
            Span::styled(" ".repeat(padding), text_style),
        ]));
    }

    frame.render_widget(Paragraph::new(content).style(palette.base()), area);

    if model.modal.is_none() && !model.help_visible && model.focus == Focus::Editor {
        let line_text = buffer.line_at(cursor.line).unwrap_or_default();
        let before = line_text.get(..cursor.col).unwrap_or(line_text.as_str());
        let col = display_width(before).saturating_sub(hscroll);
        let row = cursor.line.saturating_sub(model.editor_view.offset());
        if row < area.height as usize && col < text_width {
            #[allow(clippy::cast_possible_truncation)]
            frame.set_cursor_position(Position::new(
                area.x + gutter_width + col as u16,
                area.y + row as u16,
            ));
        }
    }
}

fn render_preview(model: &Model, palette: &Palette, frame: &mut Frame, area: Rect) {
    let visible_lines = model.preview.visible_lines(
        model.preview_view.offset(),
        model.preview_view.height() as usize,
    );

    let content: Vec<Line> = visible_lines
        .iter()
        .map(|line| {
            let line_style = style_for_line_type(line.line_type(), palette);
            line.spans().map_or_else(
                || Line::styled(line.content().to_string(), line_style),
                |spans| {
                    Line::from(
                        spans
                            .iter()
                            .map(|span| {
                                Span::styled(
                                    span.text().to_string(),
                                    style_for_inline(line_style, span.style(), palette),
                                )
                            })
                            .collect::<Vec<_>>(),
                    )
                },
            )
        })
        .collect();

    let block = Block::default()
        .borders(Borders::NONE)
        .padding(Padding::left(PREVIEW_LEFT_PADDING));
    frame.render_widget(
        Paragraph::new(content).block(block).style(palette.base()),
        area,
    );
}

/// Gutter width for line numbers, including the trailing space.
pub const fn editor_gutter_width(total_lines: usize) -> u16 {
    line_number_width(total_lines) + 1
}

/// Calculate the width needed for line numbers.
const fn line_number_width(total_lines: usize) -> u16 {
    if total_lines < 10 {
        1
    } else if total_lines < 100 {
        2
    } else if total_lines < 1_000 {
        3
    } else if total_lines < 10_000 {
        4
    } else if total_lines < 100_000 {
        5
    } else {
        6
    }
}

/// Columns scrolled off the left of the editor so the cursor stays visible.
pub fn editor_hscroll(model: &Model) -> usize {
    let buffer = model.editor.buffer();
    let cursor = buffer.cursor();
    let line = buffer.line_at(cursor.line).unwrap_or_default();
    let before = line.get(..cursor.col).unwrap_or(line.as_str());
    let text_width = usize::from(model.editor_text_columns()).max(1);
    display_width(before).saturating_sub(text_width - 1)
}

/// Byte offset in `line` of display column `column`, snapped to a char.
pub fn byte_for_column(line: &str, column: usize) -> usize {
    let mut width = 0;
    for (idx, ch) in line.char_indices() {
        let w = char_width(ch);
        if width + w > column {
            return idx;
        }
        width += w;
    }
    line.len()
}

fn char_width(ch: char) -> usize {
    if ch == '\t' { 1 } else { ch.width().unwrap_or(0) }
}

fn display_width(text: &str) -> usize {
    text.chars().map(char_width).sum()
}

/// The part of `line` between display columns `skip` and `skip + width`.
fn slice_columns(line: &str, skip: usize, width: usize) -> String {
    let mut column = 0;
    let mut out = String::new();
    for ch in line.chars() {
        let w = char_width(ch);
        if column >= skip && column + w <= skip + width {
            out.push(if ch == '\t' { ' ' } else { ch });
        }
        column += w;
        if column >= skip + width {
            break;
        }
    }
    out
}

fn truncate_to_width(text: &str, width: usize) -> String {
    if display_width(text) <= width {
        return text.to_string();
    }
    let mut out = slice_columns(text, 0, width.saturating_sub(1));
    out.push('\u{2026}');
    out
}
