use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::app::model::{DriveMenuItem, Focus, Modal, Prompt, PromptKind};
use crate::app::update::drive_menu_message;
use crate::app::{App, Message, Model};
use crate::editor::{Direction, FormatCommand};
use crate::export::ExportFormat;
use crate::state::Divider;
use crate::ui::{
    OUTLINE_TITLE_ROWS, PREVIEW_LEFT_PADDING, byte_for_column, contains, editor_gutter_width,
    editor_hscroll,
};

use super::event_loop::Debouncer;

/// Lines moved per mouse wheel notch.
const WHEEL_LINES: isize = 3;
/// Columns a divider moves per resize key press.
const NUDGE_COLUMNS: i16 = 2;

impl App {
    pub(super) fn handle_event(
        &self,
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut Debouncer<(u16, u16)>,
    ) -> Option<Message> {
        match event {
            Event::Key(key) => self.handle_key(*key, model),
            Event::Mouse(mouse) => self.handle_mouse(*mouse, model),
            Event::Resize(w, h) => {
                tracing::trace!(width = w, height = h, "queued resize");
                resize_debouncer.queue((*w, *h), now_ms);
                None
            }
            Event::Paste(text) if !model.help_visible => Some(Message::Paste(text.clone())),
            _ => None,
        }
    }

    pub(super) fn handle_key(&self, key: KeyEvent, model: &Model) -> Option<Message> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        if model.help_visible {
            return Some(Message::HideHelp);
        }
        if let Some(modal) = model.modal.as_ref() {
            return modal_key(key, modal, model);
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        // Global bindings
        let global = match key.code {
            KeyCode::Char('q' | 'c') if ctrl => Some(Message::Quit),
            KeyCode::Char('s') if ctrl => Some(Message::Save),
            KeyCode::Char('o') if ctrl => Some(Message::OpenPrompt(PromptKind::OpenFile)),
            KeyCode::Char('n') if ctrl => Some(Message::NewFile),
            KeyCode::Char('z') if ctrl => Some(Message::Undo),
            KeyCode::Char('y' | 'Z') if ctrl => Some(Message::Redo),
            KeyCode::F(1) => Some(Message::ToggleHelp),
            KeyCode::F(2) => Some(Message::ToggleOutlineFocus),
            KeyCode::F(4) => Some(Message::OpenPrompt(PromptKind::SaveAs)),
            KeyCode::F(5) => Some(Message::ToggleTheme),
            KeyCode::F(6) => Some(Message::ToggleZen),
            KeyCode::F(7) => Some(Message::OpenExportMenu),
            KeyCode::F(8) => Some(Message::OpenDriveMenu),
            KeyCode::Left if alt => Some(Message::NudgeDivider(Divider::Outline, -NUDGE_COLUMNS)),
            KeyCode::Right if alt => Some(Message::NudgeDivider(Divider::Outline, NUDGE_COLUMNS)),
            KeyCode::Char('[') if alt => {
                Some(Message::NudgeDivider(Divider::Preview, -NUDGE_COLUMNS))
            }
            KeyCode::Char(']') if alt => {
                Some(Message::NudgeDivider(Divider::Preview, NUDGE_COLUMNS))
            }
            _ => None,
        };
        if global.is_some() {
            return global;
        }

        if model.focus == Focus::Outline {
            return match key.code {
                KeyCode::Up => Some(Message::OutlineUp),
                KeyCode::Down => Some(Message::OutlineDown),
                KeyCode::Enter | KeyCode::Char(' ') => Some(Message::OutlineSelect),
                KeyCode::Esc | KeyCode::Tab => Some(Message::ToggleOutlineFocus),
                _ => None,
            };
        }

        let page = isize::try_from(model.editor_view.height().max(1)).unwrap_or(1);
        match key.code {
            KeyCode::Char(c) if alt => format_for_key(c).map(Message::Format),
            KeyCode::Char(c) if !ctrl => Some(Message::InsertChar(c)),
            KeyCode::Tab => Some(Message::InsertChar('\t')),
            KeyCode::Enter => Some(Message::InsertNewline),
            KeyCode::Backspace => Some(Message::DeleteBack),
            KeyCode::Delete => Some(Message::DeleteForward),
            KeyCode::Left if ctrl => Some(Message::MoveWordLeft),
            KeyCode::Right if ctrl => Some(Message::MoveWordRight),
            KeyCode::Up if ctrl => Some(Message::ScrollEditor(-1)),
            KeyCode::Down if ctrl => Some(Message::ScrollEditor(1)),
            KeyCode::Left => Some(Message::MoveCursor(Direction::Left)),
            KeyCode::Right => Some(Message::MoveCursor(Direction::Right)),
            KeyCode::Up => Some(Message::MoveCursor(Direction::Up)),
            KeyCode::Down => Some(Message::MoveCursor(Direction::Down)),
            KeyCode::Home if ctrl => Some(Message::MoveToStart),
            KeyCode::End if ctrl => Some(Message::MoveToEnd),
            KeyCode::Home => Some(Message::MoveHome),
            KeyCode::End => Some(Message::MoveEnd),
            KeyCode::PageUp => Some(Message::MoveLines(-page)),
            KeyCode::PageDown => Some(Message::MoveLines(page)),
            _ => None,
        }
    }

    pub(super) fn handle_mouse(&self, mouse: MouseEvent, model: &Model) -> Option<Message> {
        if model.help_visible || model.modal.is_some() {
            return None;
        }

        let areas = model.areas();
        let (col, row) = (mouse.column, mouse.row);
        let in_area = |area: Option<Rect>| area.is_some_and(|area| contains(area, col, row));

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if in_area(areas.outline_divider) {
                    return Some(Message::BeginDrag(Divider::Outline, col));
                }
                if in_area(areas.preview_divider) {
                    return Some(Message::BeginDrag(Divider::Preview, col));
                }
                if contains(areas.editor, col, row) {
                    let (line, byte) = editor_position(model, areas.editor, col, row);
                    return Some(Message::MoveTo(line, byte));
                }
                if let Some(outline) = areas.outline.filter(|area| contains(*area, col, row)) {
                    let rel = row.saturating_sub(outline.y);
                    if rel < OUTLINE_TITLE_ROWS {
                        return None;
                    }
                    let idx = model.outline_offset + usize::from(rel - OUTLINE_TITLE_ROWS);
                    return (idx < model.outline.len()).then_some(Message::OutlineClick(idx));
                }
                if let Some(preview) = areas.preview.filter(|area| contains(*area, col, row)) {
                    // Hit boxes of a stale preview point at old source lines.
                    if model.preview_is_stale() {
                        return Some(Message::RefreshPreview);
                    }
                    let line = model.preview_view.offset() + usize::from(row - preview.y);
                    let column = col.saturating_sub(preview.x + PREVIEW_LEFT_PADDING);
                    return model
                        .preview
                        .checkbox_at(line, usize::from(column))
                        .map(|checkbox| Message::ToggleCheckbox(checkbox.source_line));
                }
                None
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if model.drag.is_some() {
                    return Some(Message::DragTo(col));
                }
                if contains(areas.editor, col, row) {
                    let (line, byte) = editor_position(model, areas.editor, col, row);
                    return Some(Message::MoveTo(line, byte));
                }
                None
            }
            MouseEventKind::Up(MouseButton::Left) => model.drag.map(|_| Message::EndDrag),
            MouseEventKind::ScrollDown | MouseEventKind::ScrollUp => {
                let delta = if mouse.kind == MouseEventKind::ScrollDown {
                    WHEEL_LINES
                } else {
                    -WHEEL_LINES
                };
                if contains(areas.editor, col, row) {
                    Some(Message::ScrollEditor(delta))
                } else if in_area(areas.preview) {
                    Some(Message::ScrollPreview(delta))
                } else if in_area(areas.outline) {
                    Some(Message::ScrollOutline(delta.signum()))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    pub(super) fn view(&self, model: &Model, frame: &mut Frame) {
        crate::ui::render(model, frame);
    }
}

fn modal_key(key: KeyEvent, modal: &Modal, model: &Model) -> Option<Message> {
    match modal {
        Modal::Prompt(Prompt { kind, input }) => match key.code {
            KeyCode::Esc => Some(Message::CloseModal),
            KeyCode::Enter => Some(submit_prompt(*kind, input)),
            KeyCode::Backspace => Some(Message::PromptBackspace),
            KeyCode::Char(c)
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT) =>
            {
                Some(Message::PromptInput(c))
            }
            _ => None,
        },
        Modal::ConfirmNewFile => match key.code {
            KeyCode::Char('y' | 'Y') | KeyCode::Enter => Some(Message::NewFileConfirmed),
            _ => Some(Message::CloseModal),
        },
        Modal::ExportMenu { selected } => match key.code {
            KeyCode::Char('p') => Some(Message::Export(ExportFormat::Pdf)),
            KeyCode::Char('d') => Some(Message::Export(ExportFormat::Docx)),
            KeyCode::Char('h') => Some(Message::Export(ExportFormat::Html)),
            KeyCode::Enter => ExportFormat::ALL
                .get(*selected)
                .map(|format| Message::Export(*format)),
            code => list_navigation(code),
        },
        Modal::DriveMenu { selected } => match key.code {
            KeyCode::Enter => DriveMenuItem::available(model.auth.is_authenticated())
                .get(*selected)
                .map(|item| drive_menu_message(*item)),
            code => list_navigation(code),
        },
        Modal::DrivePicker { files, selected } => match key.code {
            KeyCode::Enter => files.get(*selected).cloned().map(Message::DriveOpen),
            code => list_navigation(code),
        },
    }
}

fn list_navigation(code: KeyCode) -> Option<Message> {
    match code {
        KeyCode::Up => Some(Message::ModalUp),
        KeyCode::Down => Some(Message::ModalDown),
        KeyCode::Esc => Some(Message::CloseModal),
        _ => None,
    }
}

fn submit_prompt(kind: PromptKind, input: &str) -> Message {
    let value = input.trim();
    if value.is_empty() && kind != PromptKind::DriveToken {
        return Message::CloseModal;
    }
    match kind {
        PromptKind::OpenFile => Message::OpenFile(value.into()),
        PromptKind::SaveAs => Message::SaveAs(value.into()),
        PromptKind::DriveToken => Message::DriveSignIn(value.to_string()),
        PromptKind::DriveSaveAs => Message::DriveSave(Some(value.to_string())),
    }
}

const fn format_for_key(c: char) -> Option<FormatCommand> {
    match c {
        'b' => Some(FormatCommand::Bold),
        'i' => Some(FormatCommand::Italic),
        'c' => Some(FormatCommand::Code),
        's' => Some(FormatCommand::Strikethrough),
        'h' => Some(FormatCommand::Heading),
        'k' => Some(FormatCommand::Link),
        _ => None,
    }
}

/// Buffer position under a click in the editor pane.
fn editor_position(model: &Model, area: Rect, col: u16, row: u16) -> (usize, usize) {
    let buffer = model.editor.buffer();
    let line = model.editor_view.offset() + usize::from(row.saturating_sub(area.y));
    let line = line.min(buffer.line_count().saturating_sub(1));
    let gutter = editor_gutter_width(buffer.line_count());
    let text_col = usize::from(col.saturating_sub(area.x + gutter)) + editor_hscroll(model);
    let text = buffer.line_at(line).unwrap_or_default();
    (line, byte_for_column(&text, text_col))
}
