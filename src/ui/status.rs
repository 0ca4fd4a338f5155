use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};

use super::style::Palette;

pub fn render_header(model: &Model, palette: &Palette, frame: &mut Frame, area: Rect) {
    let chrome = palette.chrome();
    let title = Style::default()
        .fg(palette.accent)
        .bg(palette.chrome_bg)
        .add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(palette.dim).bg(palette.chrome_bg);

    let document = model
        .drive_file
        .as_ref()
        .map(|file| format!("{} (Drive)", file.name))
        .or_else(|| {
            model
                .file_path
                .as_ref()
                .and_then(|path| path.file_name())
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "untitled".to_string());
    let drive = model.auth.user().map_or_else(
        || "Drive: signed out".to_string(),
        |user| format!("Drive: {}", user.email),
    );

    let mut spans = vec![
        Span::styled(" Zenith ", title),
        Span::styled("\u{2502} ", dim),
        Span::styled(format!("{document} "), chrome),
        Span::styled("\u{2502} ", dim),
        Span::styled(format!("{drive} "), chrome),
    ];
    if model.editor.zen {
        spans.push(Span::styled("\u{2502} ", dim));
        spans.push(Span::styled("zen ", chrome));
    }
    if let Some(busy) = model.busy.as_deref() {
        spans.push(Span::styled("\u{2502} ", dim));
        spans.push(Span::styled(
            format!("{busy} "),
            Style::default().fg(palette.accent).bg(palette.chrome_bg),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).style(chrome), area);
}

pub fn render_status_bar(model: &Model, palette: &Palette, frame: &mut Frame, area: Rect) {
    let buffer = model.editor.buffer();
    let cursor = buffer.cursor();
    let text = buffer.text();
    let words = text.split_whitespace().count();
    let history = model.editor.history();

    let preview_info = if model.preview_visible() {
        format!("  preview {}%", model.preview_view.scroll_percent())
    } else {
        String::new()
    };
    let status = format!(
        " Ln {}, Col {}  {} words  history {}/{}{}  {}  F1:help",
        cursor.line + 1,
        cursor.col + 1,
        words,
        history.index() + 1,
        history.len(),
        preview_info,
        model.editor.theme.label(),
    );

    frame.render_widget(Paragraph::new(status).style(palette.chrome()), area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
