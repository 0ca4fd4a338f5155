use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use tempfile::tempdir;

use crate::drive::{DriveApi, DriveError, DriveFile, UserProfile};
use crate::export::ExportFormat;
use crate::state::{AuthState, Divider, EditorState, Layout, Theme, WELCOME_TEXT};
use crate::storage::{EDITOR_KEY, LocalStorage, PersistedEditor};

use super::event_loop::Debouncer;
use super::{
    App, DriveMenuItem, DriveOp, Focus, Message, Modal, Model, PromptKind, ToastLevel, update,
};

/// In-memory Drive that records uploads.
#[derive(Default)]
struct FakeDrive {
    files: Mutex<Vec<(DriveFile, String)>>,
    failure: Option<DriveError>,
}

impl FakeDrive {
    fn failing(error: DriveError) -> Self {
        Self {
            files: Mutex::default(),
            failure: Some(error),
        }
    }

    fn check(&self) -> Result<(), DriveError> {
        self.failure.clone().map_or(Ok(()), Err)
    }
}

impl DriveApi for FakeDrive {
    fn user_info(&self, token: &str) -> Result<UserProfile, DriveError> {
        self.check()?;
        Ok(UserProfile {
            email: format!("{token}@example.com"),
            name: "Test User".to_string(),
            picture: String::new(),
        })
    }

    fn save(
        &self,
        _token: &str,
        name: &str,
        content: &str,
        file_id: Option<&str>,
    ) -> Result<DriveFile, DriveError> {
        self.check()?;
        let mut files = self.files.lock().unwrap();
        let id = file_id.map_or_else(|| format!("file-{}", files.len() + 1), str::to_string);
        let file = DriveFile {
            id,
            name: name.to_string(),
        };
        files.retain(|(existing, _)| existing.id != file.id);
        files.push((file.clone(), content.to_string()));
        Ok(file)
    }

    fn load(&self, _token: &str, file_id: &str) -> Result<String, DriveError> {
        self.check()?;
        self.files
            .lock()
            .unwrap()
            .iter()
            .find(|(file, _)| file.id == file_id)
            .map(|(_, content)| content.clone())
            .ok_or(DriveError::Http {
                status: 404,
                body: "not found".to_string(),
            })
    }

    fn list_markdown_files(
        &self,
        _token: &str,
        _api_key: &str,
    ) -> Result<Vec<DriveFile>, DriveError> {
        self.check()?;
        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .map(|(file, _)| file.clone())
            .collect())
    }
}

fn create_test_model(text: &str) -> Model {
    let editor = EditorState::new(text, Theme::Dark, Layout::default());
    Model::new(editor, AuthState::default(), (120, 40))
}

fn signed_in_model(text: &str) -> Model {
    let mut model = create_test_model(text);
    model.auth.login(
        "token".to_string(),
        UserProfile {
            email: "me@example.com".to_string(),
            ..UserProfile::default()
        },
    );
    model
}

fn test_app() -> App {
    App::new(Arc::new(FakeDrive::default()))
}

fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
    KeyEvent::new(code, modifiers)
}

fn recv(rx: &Receiver<Message>) -> Message {
    rx.recv_timeout(Duration::from_secs(5))
        .expect("worker should report back")
}

fn unauthorized() -> DriveError {
    DriveError::Http {
        status: 401,
        body: "invalid credentials".to_string(),
    }
}

#[test]
fn test_enter_continues_bullet_list() {
    let mut model = create_test_model("- item");
    model = update(model, Message::MoveToEnd);
    model = update(model, Message::InsertNewline);
    assert_eq!(model.editor.markdown(), "- item\n- ");
    assert_eq!(model.editor.buffer().cursor().line, 1);
}

#[test]
fn test_enter_on_empty_item_ends_list() {
    let mut model = create_test_model("- item\n- ");
    model = update(model, Message::MoveToEnd);
    model = update(model, Message::InsertNewline);
    assert_eq!(model.editor.markdown(), "- item\n");
}

#[test]
fn test_enter_outside_list_splits_line() {
    let mut model = create_test_model("hello");
    model = update(model, Message::MoveTo(0, 2));
    model = update(model, Message::InsertNewline);
    assert_eq!(model.editor.markdown(), "he\nllo");
}

#[test]
fn test_checkbox_shorthand_expands_on_space() {
    let mut model = create_test_model("");
    for ch in ['[', ' ', ']', ' '] {
        model = update(model, Message::InsertChar(ch));
    }
    assert_eq!(model.editor.markdown(), "- [ ] ");
}

#[test]
fn test_toggle_checkbox_updates_text_history_and_preview() {
    let mut model = create_test_model("# Tasks\n\n- [ ] write tests");
    let before = model.editor.history().len();
    model = update(model, Message::ToggleCheckbox(3));
    assert_eq!(model.editor.markdown(), "# Tasks\n\n- [x] write tests");
    assert_eq!(model.editor.history().len(), before + 1);
    assert!(!model.preview_is_stale());
}

#[test]
fn test_toggle_checkbox_on_plain_line_is_noop() {
    let mut model = create_test_model("plain");
    model = update(model, Message::ToggleCheckbox(1));
    assert_eq!(model.editor.markdown(), "plain");
    assert_eq!(model.editor.history().len(), 1);
}

#[test]
fn test_undo_reverts_uncommitted_typing_and_redo_restores() {
    let mut model = create_test_model("abc");
    model = update(model, Message::MoveToEnd);
    model = update(model, Message::InsertChar('d'));
    assert!(model.editor.has_uncommitted_changes());

    model = update(model, Message::Undo);
    assert_eq!(model.editor.markdown(), "abc");

    model = update(model, Message::Redo);
    assert_eq!(model.editor.markdown(), "abcd");
}

#[test]
fn test_undo_with_empty_history_shows_toast() {
    let model = update(create_test_model("abc"), Message::Undo);
    assert_eq!(model.editor.markdown(), "abc");
    let (message, level) = model.active_toast().unwrap();
    assert_eq!(message, "Nothing to undo");
    assert_eq!(level, ToastLevel::Info);
}

#[test]
fn test_commit_history_records_typing() {
    let mut model = create_test_model("");
    model = update(model, Message::InsertChar('x'));
    model = update(model, Message::CommitHistory);
    assert!(!model.editor.has_uncommitted_changes());
    assert_eq!(model.editor.history().len(), 2);
}

#[test]
fn test_format_bold_wraps_word_and_commits() {
    let mut model = create_test_model("hello");
    model = update(model, Message::MoveTo(0, 2));
    model = update(
        model,
        Message::Format(crate::editor::FormatCommand::Bold),
    );
    assert_eq!(model.editor.markdown(), "**hello**");
    assert_eq!(model.editor.history().len(), 2);
}

#[test]
fn test_paste_normalizes_line_endings() {
    let model = update(create_test_model(""), Message::Paste("a\r\nb\rc".to_string()));
    assert_eq!(model.editor.markdown(), "a\nb\nc");
}

#[test]
fn test_paste_into_prompt_strips_newlines() {
    let mut model = update(create_test_model(""), Message::OpenPrompt(PromptKind::DriveToken));
    model = update(model, Message::Paste("abc\ndef".to_string()));
    assert_eq!(model.editor.markdown(), "");
    match model.modal {
        Some(Modal::Prompt(prompt)) => assert_eq!(prompt.input, "abcdef"),
        other => panic!("expected prompt, got {other:?}"),
    }
}

#[test]
fn test_refresh_preview_tracks_edits() {
    let mut model = create_test_model("# One");
    model = update(model, Message::MoveToEnd);
    model = update(model, Message::InsertChar('!'));
    assert!(model.preview_is_stale());
    model = update(model, Message::RefreshPreview);
    assert!(!model.preview_is_stale());
    assert_eq!(model.outline[0].text, "One!");
}

#[test]
fn test_toggle_zen_hides_outline_and_preview() {
    let model = update(create_test_model("# A"), Message::ToggleZen);
    assert!(model.editor.zen);
    let areas = model.areas();
    assert!(areas.outline.is_none());
    assert!(areas.preview.is_none());
    assert_eq!(areas.editor.width, 120);
}

#[test]
fn test_outline_focus_requires_headings() {
    let model = update(create_test_model("no headings"), Message::ToggleOutlineFocus);
    assert_eq!(model.focus, Focus::Editor);

    let model = update(create_test_model("# A\n\n## B"), Message::ToggleOutlineFocus);
    assert_eq!(model.focus, Focus::Outline);
    assert_eq!(model.outline_selected, Some(0));

    let model = update(model, Message::OutlineDown);
    assert_eq!(model.outline_selected, Some(1));
    let model = update(model, Message::OutlineDown);
    assert_eq!(model.outline_selected, Some(1));
}

#[test]
fn test_outline_click_scrolls_preview_to_heading() {
    let mut md = String::from("# Top\n\n");
    for i in 0..80 {
        md.push_str(&format!("Paragraph {i}\n\n"));
    }
    md.push_str("## Bottom\n");
    let model = create_test_model(&md);
    let target = model.preview.heading_line("bottom").unwrap();

    let model = update(model, Message::OutlineClick(1));
    assert_eq!(model.outline_selected, Some(1));
    assert!(model.preview_view.offset() > 0);
    assert!(model.preview_view.offset() <= target);
}

#[test]
fn test_outline_entry_without_preview_anchor_is_noop() {
    let md = format!("{}```\n# inside code\n```\n", "Paragraph\n\n".repeat(60));
    let model = create_test_model(&md);
    assert_eq!(model.outline.len(), 1);
    assert!(model.preview.headings().is_empty());

    let model = update(model, Message::OutlineClick(0));
    assert_eq!(model.outline_selected, Some(0));
    assert_eq!(model.preview_view.offset(), 0);
    assert_eq!(model.editor_view.offset(), 0);
    assert_eq!(model.editor.buffer().cursor().line, 0);
}

#[test]
fn test_drag_preview_divider_changes_layout() {
    let mut model = create_test_model("text");
    let divider = model.areas().preview_divider.unwrap();
    let before = model.editor.layout.preview_width();

    model = update(model, Message::BeginDrag(Divider::Preview, divider.x));
    model = update(model, Message::DragTo(divider.x - 10));
    model = update(model, Message::EndDrag);

    assert!(model.editor.layout.preview_width() > before);
    assert!(model.drag.is_none());
}

#[test]
fn test_save_without_path_opens_save_as_prompt() {
    let model = update(create_test_model("text"), Message::Save);
    match model.modal {
        Some(Modal::Prompt(prompt)) => {
            assert_eq!(prompt.kind, PromptKind::SaveAs);
            assert!(prompt.input.starts_with("zenith-"));
            assert!(prompt.input.ends_with(".md"));
        }
        other => panic!("expected save-as prompt, got {other:?}"),
    }
}

#[test]
fn test_new_file_asks_before_discarding_text() {
    let model = update(create_test_model("draft"), Message::NewFile);
    assert_eq!(model.modal, Some(Modal::ConfirmNewFile));

    let model = update(model, Message::NewFileConfirmed);
    assert!(model.modal.is_none());
    assert_eq!(model.editor.markdown(), "");
}

#[test]
fn test_new_file_skips_confirmation_for_welcome_text() {
    let model = update(create_test_model(WELCOME_TEXT), Message::NewFile);
    assert!(model.modal.is_none());
    assert_eq!(model.editor.markdown(), "");
}

#[test]
fn test_pdf_export_in_zen_warns_without_starting() {
    let mut model = update(create_test_model("# A"), Message::ToggleZen);
    model = update(model, Message::Export(ExportFormat::Pdf));
    assert!(model.busy.is_none());
    assert_eq!(model.active_toast().unwrap().1, ToastLevel::Warning);
}

#[test]
fn test_html_export_marks_busy_until_finished() {
    let model = update(create_test_model("# A"), Message::Export(ExportFormat::Html));
    assert!(model.busy.is_some());
    let model = update(
        model,
        Message::ExportFinished(Ok(PathBuf::from("document.html"))),
    );
    assert!(model.busy.is_none());
    assert_eq!(model.active_toast().unwrap().1, ToastLevel::Info);
}

#[test]
fn test_modal_navigation_clamps_to_items() {
    let mut model = update(create_test_model(""), Message::OpenExportMenu);
    for _ in 0..5 {
        model = update(model, Message::ModalDown);
    }
    assert_eq!(
        model.modal,
        Some(Modal::ExportMenu {
            selected: ExportFormat::ALL.len() - 1
        })
    );
    model = update(model, Message::CloseModal);
    assert!(model.modal.is_none());
}

#[test]
fn test_drive_menu_enter_runs_selected_item() {
    let app = test_app();
    let mut model = update(signed_in_model("x"), Message::OpenDriveMenu);
    model = update(model, Message::ModalDown);
    model = update(model, Message::ModalDown);
    let selected = DriveMenuItem::available(true)[2];
    assert_eq!(
        app.handle_key(key(KeyCode::Enter, KeyModifiers::NONE), &model),
        Some(super::drive_menu_message(selected))
    );
    assert_eq!(selected, DriveMenuItem::Open);
    assert_eq!(
        super::drive_menu_message(DriveMenuItem::SignIn),
        Message::OpenPrompt(PromptKind::DriveToken)
    );
}

#[test]
fn test_drive_save_requires_sign_in() {
    let model = update(create_test_model("x"), Message::DriveSave(None));
    assert!(model.busy.is_none());
    assert_eq!(model.active_toast().unwrap().1, ToastLevel::Warning);
}

#[test]
fn test_drive_save_without_remote_file_prompts_for_name() {
    let model = update(signed_in_model("x"), Message::DriveSave(None));
    match model.modal {
        Some(Modal::Prompt(prompt)) => assert_eq!(prompt.kind, PromptKind::DriveSaveAs),
        other => panic!("expected Drive save-as prompt, got {other:?}"),
    }
}

#[test]
fn test_drive_auth_failure_signs_out() {
    let mut model = signed_in_model("x");
    model.drive_file = Some(DriveFile {
        id: "abc".to_string(),
        name: "notes.md".to_string(),
    });
    model = update(
        model,
        Message::DriveFailed {
            op: DriveOp::Save,
            error: unauthorized(),
        },
    );
    assert!(!model.auth.is_authenticated());
    assert!(model.drive_file.is_none());
    assert_eq!(
        model.active_toast(),
        Some(("Google session expired; sign in again", ToastLevel::Warning))
    );
}

#[test]
fn test_rejected_sign_in_reports_error() {
    let model = update(
        create_test_model("x"),
        Message::DriveFailed {
            op: DriveOp::SignIn,
            error: unauthorized(),
        },
    );
    let (message, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Error);
    assert!(message.starts_with("Sign-in failed"));
}

#[test]
fn test_drive_loaded_replaces_document() {
    let file = DriveFile {
        id: "id-1".to_string(),
        name: "remote.md".to_string(),
    };
    let model = update(
        signed_in_model("local"),
        Message::DriveLoaded {
            file: file.clone(),
            text: "# Remote".to_string(),
        },
    );
    assert_eq!(model.editor.markdown(), "# Remote");
    assert_eq!(model.drive_file, Some(file));
    assert!(model.file_path.is_none());
    assert_eq!(model.outline.len(), 1);
}

#[test]
fn test_quit_sets_should_quit() {
    let model = update(create_test_model(""), Message::Quit);
    assert!(model.should_quit);
}

#[test]
fn test_global_keys() {
    let app = test_app();
    let model = create_test_model("");
    let cases = [
        (key(KeyCode::Char('s'), KeyModifiers::CONTROL), Message::Save),
        (key(KeyCode::Char('q'), KeyModifiers::CONTROL), Message::Quit),
        (key(KeyCode::Char('z'), KeyModifiers::CONTROL), Message::Undo),
        (key(KeyCode::F(6), KeyModifiers::NONE), Message::ToggleZen),
        (key(KeyCode::F(7), KeyModifiers::NONE), Message::OpenExportMenu),
        (
            key(KeyCode::Char('b'), KeyModifiers::ALT),
            Message::Format(crate::editor::FormatCommand::Bold),
        ),
        (key(KeyCode::Char('a'), KeyModifiers::NONE), Message::InsertChar('a')),
    ];
    for (event, expected) in cases {
        assert_eq!(app.handle_key(event, &model), Some(expected));
    }
}

#[test]
fn test_key_release_is_ignored() {
    let app = test_app();
    let model = create_test_model("");
    let mut event = key(KeyCode::Char('a'), KeyModifiers::NONE);
    event.kind = KeyEventKind::Release;
    assert_eq!(app.handle_key(event, &model), None);
}

#[test]
fn test_any_key_closes_help() {
    let app = test_app();
    let model = update(create_test_model(""), Message::ToggleHelp);
    assert_eq!(
        app.handle_key(key(KeyCode::Char('x'), KeyModifiers::NONE), &model),
        Some(Message::HideHelp)
    );
}

#[test]
fn test_prompt_enter_submits_path() {
    let app = test_app();
    let mut model = update(create_test_model(""), Message::OpenPrompt(PromptKind::OpenFile));
    for ch in "notes.md".chars() {
        model = update(model, Message::PromptInput(ch));
    }
    assert_eq!(
        app.handle_key(key(KeyCode::Enter, KeyModifiers::NONE), &model),
        Some(Message::OpenFile(PathBuf::from("notes.md")))
    );
    assert_eq!(
        app.handle_key(key(KeyCode::Esc, KeyModifiers::NONE), &model),
        Some(Message::CloseModal)
    );
}

#[test]
fn test_export_menu_shortcut_keys() {
    let app = test_app();
    let model = update(create_test_model(""), Message::OpenExportMenu);
    assert_eq!(
        app.handle_key(key(KeyCode::Char('d'), KeyModifiers::NONE), &model),
        Some(Message::Export(ExportFormat::Docx))
    );
}

#[test]
fn test_mouse_down_on_divider_begins_drag() {
    let app = test_app();
    let model = create_test_model("text");
    let divider = model.areas().preview_divider.unwrap();
    let mouse = MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column: divider.x,
        row: divider.y + 1,
        modifiers: KeyModifiers::NONE,
    };
    assert_eq!(
        app.handle_mouse(mouse, &model),
        Some(Message::BeginDrag(Divider::Preview, divider.x))
    );
}

#[test]
fn test_mouse_click_in_editor_moves_cursor() {
    let app = test_app();
    let model = create_test_model("first\nsecond");
    let editor = model.areas().editor;
    let gutter = crate::ui::editor_gutter_width(2);
    let mouse = MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column: editor.x + gutter + 3,
        row: editor.y + 1,
        modifiers: KeyModifiers::NONE,
    };
    assert_eq!(app.handle_mouse(mouse, &model), Some(Message::MoveTo(1, 3)));
}

fn left_click(column: u16, row: u16) -> MouseEvent {
    MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column,
        row,
        modifiers: KeyModifiers::NONE,
    }
}

/// Scroll the preview so its last checkbox is on screen and return the
/// screen cell of that checkbox glyph.
fn scroll_to_last_checkbox(model: &mut Model) -> (u16, u16) {
    let checkbox = *model.preview.checkboxes().last().unwrap();
    model.preview_view.go_to_line(checkbox.line);
    let preview = model.areas().preview.unwrap();
    let row = preview.y + u16::try_from(checkbox.line - model.preview_view.offset()).unwrap();
    let column =
        preview.x + crate::ui::PREVIEW_LEFT_PADDING + u16::try_from(checkbox.column).unwrap();
    (column, row)
}

#[test]
fn test_click_on_checkbox_in_scrolled_preview_toggles_source_line() {
    let app = test_app();
    let text = format!("{}- [ ] late task\n", "paragraph\n\n".repeat(40));
    let mut model = create_test_model(&text);
    let (column, row) = scroll_to_last_checkbox(&mut model);
    assert!(model.preview_view.offset() > 0);

    assert_eq!(
        app.handle_mouse(left_click(column, row), &model),
        Some(Message::ToggleCheckbox(81))
    );
    // the hit box spans one cell either side of the glyph
    assert_eq!(
        app.handle_mouse(left_click(column + 2, row), &model),
        Some(Message::ToggleCheckbox(81))
    );
    assert_eq!(app.handle_mouse(left_click(column + 3, row), &model), None);
    assert_eq!(app.handle_mouse(left_click(column, row - 1), &model), None);

    model = update(model, Message::ToggleCheckbox(81));
    assert!(model.editor.markdown().ends_with("- [x] late task\n"));
}

#[test]
fn test_click_on_quoted_checkbox_toggles_it() {
    let app = test_app();
    let mut model = create_test_model("> - [ ] quoted task\n> - item two\n");
    let (column, row) = scroll_to_last_checkbox(&mut model);
    assert_eq!(
        app.handle_mouse(left_click(column, row), &model),
        Some(Message::ToggleCheckbox(1))
    );
}

#[test]
fn test_click_on_stale_preview_refreshes_instead_of_toggling() {
    let app = test_app();
    let mut model = create_test_model("- [ ] first\n- [ ] second\n");
    let (column, row) = scroll_to_last_checkbox(&mut model);

    // a new line above shifts every task down before the preview catches up
    model = update(model, Message::MoveToStart);
    model = update(model, Message::Paste("\n".to_string()));
    assert!(model.preview_is_stale());
    assert_eq!(
        app.handle_mouse(left_click(column, row), &model),
        Some(Message::RefreshPreview)
    );

    model = update(model, Message::RefreshPreview);
    let (column, row) = scroll_to_last_checkbox(&mut model);
    assert_eq!(
        app.handle_mouse(left_click(column, row), &model),
        Some(Message::ToggleCheckbox(3))
    );
}

#[test]
fn test_paste_event_becomes_paste_message() {
    let app = test_app();
    let model = create_test_model("");
    let mut resize = Debouncer::new(100);
    assert_eq!(
        app.handle_event(&Event::Paste("hi".to_string()), &model, 0, &mut resize),
        Some(Message::Paste("hi".to_string()))
    );
}

#[test]
fn test_resize_event_is_debounced() {
    let app = test_app();
    let model = create_test_model("");
    let mut resize = Debouncer::new(100);
    assert_eq!(app.handle_event(&Event::Resize(90, 30), &model, 0, &mut resize), None);
    assert!(resize.is_pending());
    assert_eq!(resize.take_ready(50), None);
    assert_eq!(resize.take_ready(100), Some((90, 30)));
    assert!(!resize.is_pending());
}

#[test]
fn test_debouncer_restarts_on_requeue() {
    let mut debouncer = Debouncer::new(300);
    debouncer.queue(1, 0);
    debouncer.queue(2, 200);
    assert_eq!(debouncer.take_ready(350), None);
    assert_eq!(debouncer.take_ready(500), Some(2));
    assert_eq!(debouncer.take_ready(900), None);
}

#[test]
fn test_save_as_writes_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.md");
    let app = test_app();
    let (tx, _rx) = mpsc::channel();
    let mut model = create_test_model("# Notes");

    let msg = Message::SaveAs(path.clone());
    model = update(model, msg.clone());
    app.handle_message_side_effects(&mut model, &msg, &tx);

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Notes");
    assert_eq!(model.file_path.as_deref(), Some(path.as_path()));
    assert_eq!(model.active_toast().unwrap().1, ToastLevel::Info);
}

#[test]
fn test_failed_save_falls_back_to_timestamped_copy() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    let fallback = dir.path().join("fallback");

    let app = test_app().with_fallback_dir(Some(fallback.clone()));
    let (tx, _rx) = mpsc::channel();
    let mut model = create_test_model("keep me");
    let msg = Message::SaveAs(blocker.join("doc.md"));
    app.handle_message_side_effects(&mut model, &msg, &tx);

    let saved = model.file_path.clone().unwrap();
    assert!(saved.starts_with(&fallback));
    assert!(
        saved
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("zenith-")
    );
    assert_eq!(std::fs::read_to_string(saved).unwrap(), "keep me");
    assert_eq!(model.active_toast().unwrap().1, ToastLevel::Warning);
}

#[test]
fn test_open_file_loads_document() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("doc.md");
    std::fs::write(&path, "# Loaded\n\n- [ ] task").unwrap();
    let app = test_app();
    let (tx, _rx) = mpsc::channel();
    let mut model = create_test_model("old");

    app.handle_message_side_effects(&mut model, &Message::OpenFile(path.clone()), &tx);

    assert_eq!(model.editor.markdown(), "# Loaded\n\n- [ ] task");
    assert_eq!(model.file_path, Some(path));
    assert_eq!(model.outline.len(), 1);
    assert_eq!(model.preview.checkboxes().len(), 1);
}

#[test]
fn test_open_missing_file_reports_error() {
    let dir = tempdir().unwrap();
    let app = test_app();
    let (tx, _rx) = mpsc::channel();
    let mut model = create_test_model("old");

    let msg = Message::OpenFile(dir.path().join("missing.md"));
    app.handle_message_side_effects(&mut model, &msg, &tx);

    assert_eq!(model.editor.markdown(), "old");
    assert_eq!(model.active_toast().unwrap().1, ToastLevel::Error);
}

#[test]
fn test_export_writes_next_to_document() {
    let dir = tempdir().unwrap();
    let app = test_app();
    let (tx, rx) = mpsc::channel();
    let mut model = create_test_model("# Export me");
    model.file_path = Some(dir.path().join("doc.md"));

    app.handle_message_side_effects(&mut model, &Message::Export(ExportFormat::Html), &tx);

    match recv(&rx) {
        Message::ExportFinished(Ok(path)) => {
            assert_eq!(path.parent(), Some(dir.path()));
            let html = std::fs::read_to_string(path).unwrap();
            assert!(html.contains("Export me"));
        }
        other => panic!("unexpected message {other:?}"),
    }
}

#[test]
fn test_drive_sign_in_reports_profile() {
    let app = test_app();
    let (tx, rx) = mpsc::channel();
    let mut model = create_test_model("");

    let msg = Message::DriveSignIn(" tok ".to_string());
    app.handle_message_side_effects(&mut model, &msg, &tx);

    match recv(&rx) {
        Message::DriveSignedIn { token, user } => {
            assert_eq!(token, "tok");
            assert_eq!(user.email, "tok@example.com");
        }
        other => panic!("unexpected message {other:?}"),
    }
}

#[test]
fn test_drive_save_then_overwrite_reuses_file_id() {
    let app = test_app();
    let (tx, rx) = mpsc::channel();
    let mut model = signed_in_model("v1");

    let msg = Message::DriveSave(Some("notes.md".to_string()));
    app.handle_message_side_effects(&mut model, &msg, &tx);
    let saved = recv(&rx);
    let Message::DriveSaved(file) = saved.clone() else {
        panic!("unexpected message {saved:?}");
    };
    assert_eq!(file.name, "notes.md");
    model = update(model, saved);
    assert_eq!(model.drive_file, Some(file.clone()));

    app.handle_message_side_effects(&mut model, &Message::DriveSave(None), &tx);
    assert_eq!(recv(&rx), Message::DriveSaved(file));
}

#[test]
fn test_drive_rejection_becomes_failure_message() {
    let app = App::new(Arc::new(FakeDrive::failing(unauthorized())));
    let (tx, rx) = mpsc::channel();
    let mut model = signed_in_model("x");
    model.drive_api_key = Some("key".to_string());

    app.handle_message_side_effects(&mut model, &Message::DriveOpenPicker, &tx);
    assert_eq!(
        recv(&rx),
        Message::DriveFailed {
            op: DriveOp::List,
            error: unauthorized(),
        }
    );
}

#[test]
fn test_drive_picker_requires_api_key() {
    let model = update(signed_in_model("x"), Message::DriveOpenPicker);
    assert!(model.busy.is_none());
    assert_eq!(model.active_toast().unwrap().1, ToastLevel::Error);
}

#[test]
fn test_persisted_state_restores_on_next_launch() {
    let dir = tempdir().unwrap();
    let storage = LocalStorage::new(dir.path());
    let app = test_app().with_storage(Some(storage.clone()));

    let mut model = app.init_model((120, 40));
    assert_eq!(model.editor.markdown(), WELCOME_TEXT);
    model = update(model, Message::NewFileConfirmed);
    model = update(model, Message::Paste("# Draft".to_string()));
    model = update(model, Message::ToggleTheme);
    app.persist_editor(&model);

    let stored: PersistedEditor = storage.get(EDITOR_KEY).unwrap().unwrap();
    assert_eq!(stored.markdown, "# Draft");

    let restored = test_app().with_storage(Some(storage)).init_model((120, 40));
    assert_eq!(restored.editor.markdown(), "# Draft");
    assert_eq!(restored.editor.theme, Theme::Light);
}

#[test]
fn test_persisted_auth_restores_session() {
    let dir = tempdir().unwrap();
    let storage = LocalStorage::new(dir.path());
    let app = test_app().with_storage(Some(storage.clone()));
    let model = signed_in_model("");
    app.persist_auth(&model);

    let restored = test_app().with_storage(Some(storage)).init_model((120, 40));
    assert!(restored.auth.is_authenticated());
    assert_eq!(restored.auth.token(), Some("token"));
}

#[test]
fn test_file_argument_overrides_stored_draft() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("readme.md");
    std::fs::write(&path, "# Readme").unwrap();
    let app = test_app()
        .with_file(Some(path.clone()))
        .with_theme(Some(Theme::Light))
        .with_zen(true);

    let model = app.init_model((100, 30));
    assert_eq!(model.editor.markdown(), "# Readme");
    assert_eq!(model.file_path, Some(path));
    assert_eq!(model.editor.theme, Theme::Light);
    assert!(model.editor.zen);
    assert_eq!(model.editor.history().len(), 1);
}

#[test]
fn test_missing_file_argument_starts_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("new.md");
    let model = test_app().with_file(Some(path.clone())).init_model((100, 30));
    assert_eq!(model.editor.markdown(), "");
    assert_eq!(model.file_path, Some(path));
}

#[test]
fn test_startup_token_signs_in_once() {
    let app = test_app().with_drive_token(Some("fresh".to_string()));
    let model = create_test_model("");
    assert_eq!(
        app.startup_messages(&model),
        vec![Message::DriveSignIn("fresh".to_string())]
    );

    let model = signed_in_model("");
    let app = test_app().with_drive_token(Some("token".to_string()));
    assert!(app.startup_messages(&model).is_empty());
}
