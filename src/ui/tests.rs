use super::*;
use crate::app::{Message, Model, PromptKind, update};
use crate::state::{AuthState, EditorState, Theme};
use ratatui::Terminal;
use ratatui::backend::TestBackend;

fn create_test_model(text: &str, size: (u16, u16)) -> Model {
    let editor = EditorState::new(text, Theme::Dark, Layout::default());
    Model::new(editor, AuthState::default(), size)
}

fn draw(model: &Model) -> Vec<String> {
    let (width, height) = model.window();
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|frame| render(model, frame)).unwrap();
    let buffer = terminal.backend().buffer();
    (0..height)
        .map(|y| {
            (0..width)
                .map(|x| buffer[(x, y)].symbol().to_string())
                .collect::<String>()
        })
        .collect()
}

#[test]
fn test_pane_areas_split_width() {
    let areas = pane_areas(Rect::new(0, 0, 120, 40), &Layout::default(), false, false);
    let outline = areas.outline.unwrap();
    let preview = areas.preview.unwrap();
    assert_eq!(areas.header.height, 1);
    assert_eq!(areas.status.y, 39);
    assert_eq!(outline.width, 25);
    assert_eq!(
        outline.width + 1 + areas.editor.width + 1 + preview.width,
        120
    );
    assert_eq!(areas.editor.height, 38);
    assert!(areas.toast.is_none());
}

#[test]
fn test_pane_areas_zen_gives_editor_full_width() {
    let areas = pane_areas(Rect::new(0, 0, 80, 24), &Layout::default(), true, true);
    assert!(areas.outline.is_none());
    assert!(areas.preview_divider.is_none());
    assert_eq!(areas.editor.width, 80);
    assert_eq!(areas.toast.unwrap().y, 22);
    assert_eq!(areas.editor.height, 21);
}

#[test]
fn test_pane_areas_keep_editor_usable_when_narrow() {
    let areas = pane_areas(Rect::new(0, 0, 40, 10), &Layout::default(), false, false);
    assert!(areas.editor.width >= MIN_EDITOR_COLUMNS);
}

#[test]
fn test_contains_is_half_open() {
    let rect = Rect::new(2, 3, 4, 5);
    assert!(contains(rect, 2, 3));
    assert!(contains(rect, 5, 7));
    assert!(!contains(rect, 6, 3));
    assert!(!contains(rect, 2, 8));
}

#[test]
fn test_render_header_and_status() {
    let model = create_test_model("# Title\n\nbody", (120, 30));
    let rows = draw(&model);
    assert!(rows[0].contains("Zenith"));
    assert!(rows[0].contains("untitled"));
    assert!(rows[0].contains("Drive: signed out"));
    assert!(rows[29].contains("Ln 1, Col 1"));
    assert!(rows[29].contains("F1:help"));
}

#[test]
fn test_render_shows_outline_and_preview() {
    let model = create_test_model("# Title\n\n## Section\n\nbody", (120, 30));
    let rows = draw(&model);
    assert!(rows[1].contains("OUTLINE"));
    assert!(rows.iter().any(|row| row.contains(" Section")));
    // editor shows raw markdown, preview shows the rendered heading
    assert!(rows.iter().any(|row| row.contains("## Section")));
}

#[test]
fn test_render_zen_hides_outline() {
    let model = update(create_test_model("# Title", (100, 20)), Message::ToggleZen);
    let rows = draw(&model);
    assert!(!rows.iter().any(|row| row.contains("OUTLINE")));
    assert!(rows[0].contains("zen"));
}

#[test]
fn test_render_toast_above_status() {
    let model = update(create_test_model("text", (100, 20)), Message::Undo);
    let rows = draw(&model);
    assert!(rows[18].contains("[info] Nothing to undo"));
}

#[test]
fn test_render_help_overlay() {
    let model = update(create_test_model("text", (100, 40)), Message::ToggleHelp);
    let rows = draw(&model);
    assert!(rows.iter().any(|row| row.contains("Help")));
    assert!(rows.iter().any(|row| row.contains("Toggle zen mode")));
    assert!(rows.iter().any(|row| row.contains("Any key closes")));
}

#[test]
fn test_render_prompt_modal() {
    let mut model = update(
        create_test_model("text", (100, 30)),
        Message::OpenPrompt(PromptKind::OpenFile),
    );
    for ch in "a.md".chars() {
        model = update(model, Message::PromptInput(ch));
    }
    let rows = draw(&model);
    assert!(rows.iter().any(|row| row.contains("> a.md")));
}

#[test]
fn test_render_light_theme_uses_light_background() {
    let model = update(create_test_model("text", (60, 10)), Message::ToggleTheme);
    let (width, height) = model.window();
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|frame| render(&model, frame)).unwrap();
    let palette = style::Palette::for_theme(Theme::Light);
    let cell = &terminal.backend().buffer()[(width - 2, 5)];
    assert_eq!(cell.bg, palette.bg);
}
