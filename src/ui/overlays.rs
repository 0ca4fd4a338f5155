use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::app::{DriveMenuItem, Modal, Model};
use crate::export::ExportFormat;

use super::style::Palette;

const HELP_KEY_COLUMN: usize = 22;

pub fn render_help_overlay(model: &Model, palette: &Palette, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(4).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let global_cfg = model
        .config_global_path
        .as_ref()
        .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string());
    let local_cfg = model
        .config_local_path
        .as_ref()
        .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());

    let section_style = Style::default()
        .fg(palette.accent)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(palette.dim);

    let sections: [(&str, &[(&str, &str)]); 5] = [
        (
            "Editing",
            &[
                ("Enter", "New line, continues lists"),
                ("[ ] + Space", "Turn into a task item"),
                ("Ctrl-z / Ctrl-y", "Undo / redo"),
                ("Alt-b / Alt-i", "Bold / italic"),
                ("Alt-c / Alt-s", "Inline code / strikethrough"),
                ("Alt-h / Alt-k", "Cycle heading / link"),
            ],
        ),
        (
            "Panes",
            &[
                ("F2", "Focus outline"),
                ("F5", "Toggle light/dark theme"),
                ("F6", "Toggle zen mode"),
                ("Alt-Left/Right", "Resize outline"),
                ("Alt-[ / Alt-]", "Resize preview"),
                ("Mouse", "Drag dividers, click tasks"),
            ],
        ),
        (
            "Files",
            &[
                ("Ctrl-n", "New document"),
                ("Ctrl-o", "Open file"),
                ("Ctrl-s / F4", "Save / save as"),
                ("F7", "Export (PDF, DOCX, HTML)"),
                ("F8", "Google Drive"),
            ],
        ),
        ("Other", &[("F1", "Toggle help"), ("Ctrl-q", "Quit")]),
        ("Config", &[]),
    ];

    let mut lines: Vec<Line> = Vec::new();
    for (title, bindings) in sections {
        lines.push(Line::styled(title, section_style));
        for (keys, action) in bindings {
            lines.push(Line::raw(format!(
                "  {keys:<width$}{action}",
                width = HELP_KEY_COLUMN - 2
            )));
        }
        if title != "Config" {
            lines.push(Line::raw(""));
        }
    }
    lines.push(Line::raw(format!("  Global: {global_cfg}")));
    lines.push(Line::raw(format!("  Local override: {local_cfg}")));
    lines.push(Line::raw(""));
    lines.push(Line::styled("Any key closes", dim_style));

    render_popup("Help", lines, palette, frame, popup);
}

/// Draw whichever modal is open.
pub fn render_modal(model: &Model, palette: &Palette, frame: &mut Frame, area: Rect) {
    let Some(modal) = model.modal.as_ref() else {
        return;
    };
    let dim = Style::default().fg(palette.dim);

    match modal {
        Modal::Prompt(prompt) => {
            let popup = centered_popup_rect(area.width.saturating_sub(10).clamp(30, 70), 7, area);
            let lines = vec![
                Line::from(vec![
                    Span::styled("> ", Style::default().fg(palette.accent)),
                    Span::raw(prompt.input.clone()),
                    Span::styled("\u{2588}", Style::default().fg(palette.accent)),
                ]),
                Line::raw(""),
                Line::styled("Enter confirms \u{2502} Esc cancels", dim),
            ];
            render_popup(prompt.kind.title(), lines, palette, frame, popup);
        }
        Modal::ConfirmNewFile => {
            let popup = centered_popup_rect(46, 7, area);
            let lines = vec![
                Line::raw("Discard the current document?"),
                Line::raw(""),
                Line::styled("y / Enter discards \u{2502} any other key keeps it", dim),
            ];
            render_popup("New document", lines, palette, frame, popup);
        }
        Modal::ExportMenu { selected } => {
            let labels = ExportFormat::ALL.iter().map(|format| format.label());
            let lines = menu_lines(labels, *selected, palette);
            let popup = list_popup_rect(area, lines.len());
            render_popup("Export", lines, palette, frame, popup);
        }
        Modal::DriveMenu { selected } => {
            let items = DriveMenuItem::available(model.auth.is_authenticated());
            let lines = menu_lines(items.iter().map(|item| item.label()), *selected, palette);
            let popup = list_popup_rect(area, lines.len());
            render_popup("Google Drive", lines, palette, frame, popup);
        }
        Modal::DrivePicker { files, selected } => {
            let visible = area.height.saturating_sub(8).max(3) as usize;
            let start = selected.saturating_sub(visible.saturating_sub(1));
            let lines = menu_lines(
                files
                    .iter()
                    .skip(start)
                    .take(visible)
                    .map(|file| file.name.as_str()),
                selected - start,
                palette,
            );
            let popup = list_popup_rect(area, lines.len());
            render_popup("Open from Drive", lines, palette, frame, popup);
        }
    }
}

fn menu_lines<'a>(
    labels: impl Iterator<Item = &'a str>,
    selected: usize,
    palette: &Palette,
) -> Vec<Line<'a>> {
    labels
        .enumerate()
        .map(|(idx, label)| {
            if idx == selected {
                Line::styled(
                    format!("\u{25b8} {label}"),
                    Style::default()
                        .fg(palette.accent)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Line::raw(format!("  {label}"))
            }
        })
        .collect()
}

fn list_popup_rect(area: Rect, rows: usize) -> Rect {
    // borders and padding take 4 rows
    let height = u16::try_from(rows).unwrap_or(u16::MAX).saturating_add(4);
    centered_popup_rect(area.width.saturating_sub(10).clamp(30, 60), height, area)
}

fn render_popup(title: &str, lines: Vec<Line>, palette: &Palette, frame: &mut Frame, popup: Rect) {
    let block = Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent))
        .padding(Padding::uniform(1))
        .style(palette.chrome());
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
