use std::path::PathBuf;
use std::time::Instant;

use crate::app::Model;
use crate::app::model::{
    DriveMenuItem, Focus, Modal, Prompt, PromptKind, ToastLevel, timestamped_file_name,
};
use crate::drive::{DriveError, DriveFile, UserProfile};
use crate::editor::{Direction, FormatCommand, continue_list, expand_checkbox_shorthand};
use crate::export::ExportFormat;
use crate::scroll_sync::Pane;
use crate::state::{Divider, ResizeDrag};

/// Drive request a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveOp {
    SignIn,
    Save,
    List,
    Open,
}

impl DriveOp {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SignIn => "Sign-in",
            Self::Save => "Drive save",
            Self::List => "Drive listing",
            Self::Open => "Drive open",
        }
    }
}

/// All possible events and actions in the application.
///
/// These represent user input, system events, background results and
/// internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Editing
    /// Insert a character at the cursor
    InsertChar(char),
    /// Enter: continue a list item or split the line
    InsertNewline,
    /// Bracketed paste
    Paste(String),
    /// Delete character before cursor (Backspace)
    DeleteBack,
    /// Delete character at cursor (Delete)
    DeleteForward,
    MoveCursor(Direction),
    MoveHome,
    MoveEnd,
    MoveWordLeft,
    MoveWordRight,
    MoveToStart,
    MoveToEnd,
    /// Move the cursor by whole rows (page keys)
    MoveLines(isize),
    /// Move cursor to (line, byte column), e.g. from a mouse click
    MoveTo(usize, usize),
    Format(FormatCommand),
    Undo,
    Redo,
    /// Toggle the task checkbox on a 1-based source line
    ToggleCheckbox(usize),

    // Panes
    ScrollEditor(isize),
    ScrollPreview(isize),
    ToggleOutlineFocus,
    OutlineUp,
    OutlineDown,
    OutlineSelect,
    OutlineClick(usize),
    ScrollOutline(isize),
    BeginDrag(Divider, u16),
    DragTo(u16),
    EndDrag,
    /// Move a divider by a number of columns from the keyboard
    NudgeDivider(Divider, i16),
    ToggleTheme,
    ToggleZen,
    ToggleHelp,
    HideHelp,

    // Timers
    /// Preview debounce elapsed
    RefreshPreview,
    /// Typing settled; record a history snapshot
    CommitHistory,

    // Modals
    OpenPrompt(PromptKind),
    PromptInput(char),
    PromptBackspace,
    ModalUp,
    ModalDown,
    CloseModal,
    OpenExportMenu,
    OpenDriveMenu,

    // Local files
    NewFile,
    NewFileConfirmed,
    OpenFile(PathBuf),
    /// Save to the current path, or ask for one
    Save,
    SaveAs(PathBuf),

    // Export
    Export(ExportFormat),
    ExportFinished(Result<PathBuf, String>),

    // Google Drive
    DriveSignIn(String),
    DriveSignedIn { token: String, user: UserProfile },
    DriveSignOut,
    /// Save to Drive; `Some(name)` creates a new file with that name
    DriveSave(Option<String>),
    DriveSaved(DriveFile),
    DriveOpenPicker,
    DriveFilesListed(Vec<DriveFile>),
    DriveOpen(DriveFile),
    DriveLoaded { file: DriveFile, text: String },
    DriveFailed { op: DriveOp, error: DriveError },

    // Window
    /// Terminal resized
    Resize(u16, u16),

    // Application
    /// Quit the application
    Quit,
}

/// Pure function that updates the model based on a message.
///
/// This is the core of TEA - all state transitions happen here. File and
/// network I/O happen afterwards in the side-effect handler.
pub fn update(mut model: Model, msg: Message) -> Model {
    let now = Instant::now();
    match msg {
        // Editing
        Message::InsertChar(' ') => {
            let buffer = model.editor.buffer();
            let edit = expand_checkbox_shorthand(&buffer.text(), buffer.cursor_offset());
            match edit {
                Some(edit) => model.editor.apply_edit(&edit),
                None => model.editor.buffer_mut().insert_char(' '),
            }
            after_cursor_change(&mut model, now);
        }
        Message::InsertChar(ch) => {
            model.editor.buffer_mut().insert_char(ch);
            after_cursor_change(&mut model, now);
        }
        Message::InsertNewline => {
            let buffer = model.editor.buffer();
            let edit = continue_list(&buffer.text(), buffer.cursor_offset());
            match edit {
                Some(edit) => model.editor.apply_edit(&edit),
                None => model.editor.buffer_mut().split_line(),
            }
            after_cursor_change(&mut model, now);
        }
        Message::Paste(text) => {
            if let Some(Modal::Prompt(prompt)) = model.modal.as_mut() {
                prompt
                    .input
                    .extend(text.chars().filter(|c| !c.is_control()));
            } else if model.modal.is_none() {
                let text = text.replace("\r\n", "\n").replace('\r', "\n");
                model.editor.buffer_mut().insert_str(&text);
                after_cursor_change(&mut model, now);
            }
        }
        Message::DeleteBack => {
            if model.editor.buffer_mut().delete_back() {
                after_cursor_change(&mut model, now);
            }
        }
        Message::DeleteForward => {
            if model.editor.buffer_mut().delete_forward() {
                after_cursor_change(&mut model, now);
            }
        }
        Message::MoveCursor(direction) => {
            model.editor.buffer_mut().move_cursor(direction);
            after_cursor_change(&mut model, now);
        }
        Message::MoveHome => {
            model.editor.buffer_mut().move_home();
            after_cursor_change(&mut model, now);
        }
        Message::MoveEnd => {
            model.editor.buffer_mut().move_end();
            after_cursor_change(&mut model, now);
        }
        Message::MoveWordLeft => {
            model.editor.buffer_mut().move_word_left();
            after_cursor_change(&mut model, now);
        }
        Message::MoveWordRight => {
            model.editor.buffer_mut().move_word_right();
            after_cursor_change(&mut model, now);
        }
        Message::MoveToStart => {
            model.editor.buffer_mut().move_to_start();
            after_cursor_change(&mut model, now);
        }
        Message::MoveToEnd => {
            model.editor.buffer_mut().move_to_end();
            after_cursor_change(&mut model, now);
        }
        Message::MoveLines(lines) => {
            model.editor.buffer_mut().move_lines(lines);
            after_cursor_change(&mut model, now);
        }
        Message::MoveTo(line, col) => {
            model.focus = Focus::Editor;
            model.editor.buffer_mut().move_to(line, col);
            after_cursor_change(&mut model, now);
        }
        Message::Format(command) => {
            let buffer = model.editor.buffer();
            let edit = command.apply(
                &buffer.text(),
                buffer.cursor_offset(),
                buffer.word_range_at_cursor(),
            );
            model.editor.apply_edit_and_commit(&edit);
            after_cursor_change(&mut model, now);
        }
        Message::Undo => {
            if model.editor.undo() {
                after_cursor_change(&mut model, now);
            } else {
                model.show_toast(ToastLevel::Info, "Nothing to undo");
            }
        }
        Message::Redo => {
            if model.editor.redo() {
                after_cursor_change(&mut model, now);
            } else {
                model.show_toast(ToastLevel::Info, "Nothing to redo");
            }
        }
        Message::ToggleCheckbox(line) => {
            if model.editor.toggle_checkbox(line) {
                model.refresh_preview();
            }
        }

        // Panes
        Message::ScrollEditor(delta) => {
            if model.editor_view.scroll_by(delta) {
                model.sync_scroll(Pane::Editor, now);
            }
        }
        Message::ScrollPreview(delta) => {
            if model.preview_visible() && model.preview_view.scroll_by(delta) {
                model.sync_scroll(Pane::Preview, now);
            }
        }
        Message::ToggleOutlineFocus => {
            model.focus = match model.focus {
                Focus::Editor if model.preview_visible() && !model.outline.is_empty() => {
                    if model.outline_selected.is_none() {
                        model.outline_selected = Some(0);
                    }
                    Focus::Outline
                }
                _ => Focus::Editor,
            };
        }
        Message::OutlineUp => {
            if let Some(selected) = model.outline_selected {
                model.outline_selected = Some(selected.saturating_sub(1));
                model.reveal_outline_selection();
            }
        }
        Message::OutlineDown => {
            if let Some(selected) = model.outline_selected {
                let last = model.outline.len().saturating_sub(1);
                model.outline_selected = Some((selected + 1).min(last));
                model.reveal_outline_selection();
            }
        }
        Message::OutlineSelect => {
            if let Some(idx) = model.outline_selected {
                jump_to_heading(&mut model, idx, now);
            }
        }
        Message::OutlineClick(idx) => {
            if idx < model.outline.len() {
                model.outline_selected = Some(idx);
                jump_to_heading(&mut model, idx, now);
            }
        }
        Message::ScrollOutline(delta) => {
            let max = model
                .outline
                .len()
                .saturating_sub(model.outline_rows().max(1));
            model.outline_offset = model
                .outline_offset
                .saturating_add_signed(delta)
                .min(max);
        }
        Message::BeginDrag(divider, x) => {
            model.drag = Some(ResizeDrag::begin(divider, x, &model.editor.layout));
        }
        Message::DragTo(x) => {
            if let Some(drag) = model.drag {
                let (columns, _) = model.window();
                let zen = model.editor.zen;
                if drag.update(x, columns, zen, &mut model.editor.layout) {
                    model.relayout();
                }
            }
        }
        Message::EndDrag => {
            model.drag = None;
        }
        Message::NudgeDivider(divider, delta) => {
            const ORIGIN: u16 = 1000;
            let drag = ResizeDrag::begin(divider, ORIGIN, &model.editor.layout);
            let (columns, _) = model.window();
            let zen = model.editor.zen;
            if drag.update(
                ORIGIN.saturating_add_signed(delta),
                columns,
                zen,
                &mut model.editor.layout,
            ) {
                model.relayout();
            }
        }
        Message::ToggleTheme => {
            model.editor.toggle_theme();
            model.refresh_preview();
        }
        Message::ToggleZen => {
            model.editor.toggle_zen();
            model.focus = Focus::Editor;
            model.drag = None;
            model.relayout();
        }
        Message::ToggleHelp => {
            model.help_visible = !model.help_visible;
        }
        Message::HideHelp => {
            model.help_visible = false;
        }

        // Timers
        Message::RefreshPreview => {
            if model.preview_is_stale() {
                model.refresh_preview();
            }
        }
        Message::CommitHistory => {
            model.editor.commit();
        }

        // Modals
        Message::OpenPrompt(kind) => {
            let input = match kind {
                PromptKind::OpenFile => model
                    .file_path
                    .as_ref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_default(),
                PromptKind::SaveAs => model.file_path.as_ref().map_or_else(
                    || timestamped_file_name(chrono::Local::now()),
                    |path| path.display().to_string(),
                ),
                PromptKind::DriveToken => String::new(),
                PromptKind::DriveSaveAs => model.suggested_drive_name(),
            };
            model.modal = Some(Modal::Prompt(Prompt { kind, input }));
        }
        Message::PromptInput(ch) => {
            if let Some(Modal::Prompt(prompt)) = model.modal.as_mut() {
                prompt.input.push(ch);
            }
        }
        Message::PromptBackspace => {
            if let Some(Modal::Prompt(prompt)) = model.modal.as_mut() {
                prompt.input.pop();
            }
        }
        Message::ModalUp => {
            if let Some(selected) = model.modal.as_mut().and_then(Modal::selected_mut) {
                *selected = selected.saturating_sub(1);
            }
        }
        Message::ModalDown => {
            let signed_in = model.auth.is_authenticated();
            if let Some(modal) = model.modal.as_mut() {
                let last = modal.item_count(signed_in).saturating_sub(1);
                if let Some(selected) = modal.selected_mut() {
                    *selected = (*selected + 1).min(last);
                }
            }
        }
        Message::CloseModal => {
            model.modal = None;
        }
        Message::OpenExportMenu => {
            model.modal = Some(Modal::ExportMenu { selected: 0 });
        }
        Message::OpenDriveMenu => {
            model.modal = Some(Modal::DriveMenu { selected: 0 });
        }

        // Local files
        Message::NewFile => {
            if model.editor.needs_new_file_confirmation() {
                model.modal = Some(Modal::ConfirmNewFile);
            } else {
                model.load_document("", None, None);
            }
        }
        Message::NewFileConfirmed => {
            model.modal = None;
            model.load_document("", None, None);
        }
        // Reading and writing happen in side effects
        Message::OpenFile(_) | Message::SaveAs(_) => {
            model.modal = None;
        }
        Message::Save => {
            if model.file_path.is_none() {
                model = update(model, Message::OpenPrompt(PromptKind::SaveAs));
            }
        }

        // Export
        Message::Export(format) => {
            model.modal = None;
            if format == ExportFormat::Pdf && !model.preview_visible() {
                model.show_toast(
                    ToastLevel::Warning,
                    "PDF export needs the preview; leave zen mode first",
                );
            } else {
                model.busy = Some(format!("Exporting {}…", format.label()));
            }
        }
        Message::ExportFinished(result) => {
            model.busy = None;
            match result {
                Ok(path) => model.show_toast(
                    ToastLevel::Info,
                    format!("Exported {}", path.display()),
                ),
                Err(err) => model.show_toast(ToastLevel::Error, format!("Export failed: {err}")),
            }
        }

        // Google Drive
        Message::DriveSignIn(token) => {
            model.modal = None;
            if token.trim().is_empty() {
                model.show_toast(ToastLevel::Warning, "No access token entered");
            } else {
                model.busy = Some("Signing in…".to_string());
            }
        }
        Message::DriveSignedIn { token, user } => {
            model.busy = None;
            let who = if user.email.is_empty() {
                user.name.clone()
            } else {
                user.email.clone()
            };
            model.auth.login(token, user);
            model.show_toast(ToastLevel::Info, format!("Signed in as {who}"));
        }
        Message::DriveSignOut => {
            model.modal = None;
            model.auth.logout();
            model.drive_file = None;
            model.show_toast(ToastLevel::Info, "Signed out of Google Drive");
        }
        Message::DriveSave(name) => {
            model.modal = None;
            if !model.auth.is_authenticated() {
                model.show_toast(ToastLevel::Warning, "Sign in to Google Drive first");
            } else if name.is_none() && model.drive_file.is_none() {
                model = update(model, Message::OpenPrompt(PromptKind::DriveSaveAs));
            } else {
                model.busy = Some("Saving to Drive…".to_string());
            }
        }
        Message::DriveSaved(file) => {
            model.busy = None;
            model.show_toast(ToastLevel::Info, format!("Saved {} to Drive", file.name));
            model.drive_file = Some(file);
        }
        Message::DriveOpenPicker => {
            model.modal = None;
            if !model.auth.is_authenticated() {
                model.show_toast(ToastLevel::Warning, "Sign in to Google Drive first");
            } else if model.drive_api_key.is_none() {
                model.show_toast(ToastLevel::Error, DriveError::MissingApiKey.to_string());
            } else {
                model.busy = Some("Loading Drive files…".to_string());
            }
        }
        Message::DriveFilesListed(files) => {
            model.busy = None;
            if files.is_empty() {
                model.show_toast(ToastLevel::Info, "No markdown files found in Drive");
            } else {
                model.modal = Some(Modal::DrivePicker { files, selected: 0 });
            }
        }
        Message::DriveOpen(file) => {
            model.modal = None;
            if model.auth.is_authenticated() {
                model.busy = Some(format!("Opening {}…", file.name));
            } else {
                model.show_toast(ToastLevel::Warning, "Sign in to Google Drive first");
            }
        }
        Message::DriveLoaded { file, text } => {
            model.busy = None;
            let name = file.name.clone();
            model.load_document(&text, None, Some(file));
            model.show_toast(ToastLevel::Info, format!("Opened {name} from Drive"));
        }
        Message::DriveFailed { op, error } => {
            model.busy = None;
            if error.is_auth_failure() && op != DriveOp::SignIn {
                model.auth.logout();
                model.drive_file = None;
                model.show_toast(
                    ToastLevel::Warning,
                    "Google session expired; sign in again",
                );
            } else {
                model.show_toast(ToastLevel::Error, format!("{} failed: {error}", op.label()));
            }
        }

        // Window
        Message::Resize(width, height) => {
            model.resize(width, height);
        }

        Message::Quit => {
            model.should_quit = true;
        }
    }

    model
}

/// Menu entry under the Drive menu cursor, mapped to its action.
pub fn drive_menu_message(item: DriveMenuItem) -> Message {
    match item {
        DriveMenuItem::SignIn => Message::OpenPrompt(PromptKind::DriveToken),
        DriveMenuItem::Save => Message::DriveSave(None),
        DriveMenuItem::SaveAs => Message::OpenPrompt(PromptKind::DriveSaveAs),
        DriveMenuItem::Open => Message::DriveOpenPicker,
        DriveMenuItem::SignOut => Message::DriveSignOut,
    }
}

/// Keep the cursor on screen and let the preview follow the editor.
fn after_cursor_change(model: &mut Model, now: Instant) {
    if model.ensure_cursor_visible() {
        model.sync_scroll(Pane::Editor, now);
    }
}

/// Scroll the preview to outline entry `idx`. Entries without a rendered
/// anchor, such as `#` lines inside fenced code, do nothing.
fn jump_to_heading(model: &mut Model, idx: usize, now: Instant) {
    let Some(entry) = model.outline.get(idx) else {
        return;
    };
    let id = entry.id.clone();
    if model.preview_is_stale() {
        model.refresh_preview();
    }
    if let Some(line) = model.preview.heading_line(&id) {
        model.preview_view.go_to_line(line);
        model.sync_scroll(Pane::Preview, now);
    }
}
