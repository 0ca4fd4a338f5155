use std::path::PathBuf;
use std::time::{Duration, Instant};

use ratatui::layout::Rect;

use crate::document::{OutlineEntry, Preview, extract_outline, render_preview};
use crate::drive::DriveFile;
use crate::scroll_sync::{Pane, ScrollSync};
use crate::state::{AuthState, EditorState, Layout, ResizeDrag, Theme};
use crate::storage::PersistedEditor;
use crate::ui::viewport::Viewport;
use crate::ui::{
    OUTLINE_TITLE_ROWS, PREVIEW_LEFT_PADDING, PaneAreas, editor_gutter_width, pane_areas,
};

const TOAST_TTL: Duration = Duration::from_secs(4);
/// Wrap width used while the preview pane is hidden.
const HIDDEN_PREVIEW_COLUMNS: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Which pane receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Editor,
    Outline,
}

/// What a text prompt is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    OpenFile,
    SaveAs,
    DriveToken,
    DriveSaveAs,
}

impl PromptKind {
    pub const fn title(self) -> &'static str {
        match self {
            Self::OpenFile => "Open file",
            Self::SaveAs => "Save as",
            Self::DriveToken => "Google access token",
            Self::DriveSaveAs => "Save to Drive as",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

/// Entries of the Drive menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveMenuItem {
    SignIn,
    Save,
    SaveAs,
    Open,
    SignOut,
}

impl DriveMenuItem {
    const SIGNED_OUT: &'static [Self] = &[Self::SignIn];
    const SIGNED_IN: &'static [Self] = &[Self::Save, Self::SaveAs, Self::Open, Self::SignOut];

    pub const fn available(signed_in: bool) -> &'static [Self] {
        if signed_in {
            Self::SIGNED_IN
        } else {
            Self::SIGNED_OUT
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::SignIn => "Sign in with access token",
            Self::Save => "Save to Drive",
            Self::SaveAs => "Save to Drive as new file",
            Self::Open => "Open from Drive",
            Self::SignOut => "Sign out",
        }
    }
}

/// A popup that captures the keyboard until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    Prompt(Prompt),
    ConfirmNewFile,
    ExportMenu { selected: usize },
    DriveMenu { selected: usize },
    DrivePicker { files: Vec<DriveFile>, selected: usize },
}

impl Modal {
    /// Number of selectable rows, for list-style modals.
    pub fn item_count(&self, signed_in: bool) -> usize {
        match self {
            Self::ExportMenu { .. } => crate::export::ExportFormat::ALL.len(),
            Self::DriveMenu { .. } => DriveMenuItem::available(signed_in).len(),
            Self::DrivePicker { files, .. } => files.len(),
            Self::Prompt(_) | Self::ConfirmNewFile => 0,
        }
    }

    pub(super) const fn selected_mut(&mut self) -> Option<&mut usize> {
        match self {
            Self::ExportMenu { selected }
            | Self::DriveMenu { selected }
            | Self::DrivePicker { selected, .. } => Some(selected),
            Self::Prompt(_) | Self::ConfirmNewFile => None,
        }
    }
}

/// The complete application state.
///
/// All state lives here - no global or scattered state.
#[derive(Debug, Default)]
pub struct Model {
    /// Document, undo log, theme, zen flag and pane widths
    pub editor: EditorState,
    /// Google Drive session
    pub auth: AuthState,
    /// Rendered preview of the buffer as of `preview_revision`
    pub preview: Preview,
    /// Headings for the outline pane
    pub outline: Vec<OutlineEntry>,
    pub editor_view: Viewport,
    pub preview_view: Viewport,
    pub outline_offset: usize,
    pub outline_selected: Option<usize>,
    pub focus: Focus,
    /// Local file backing the buffer, if any
    pub file_path: Option<PathBuf>,
    /// Drive file the buffer was loaded from or last saved to
    pub drive_file: Option<DriveFile>,
    pub drive_api_key: Option<String>,
    pub modal: Option<Modal>,
    pub help_visible: bool,
    /// Label of the background job in flight
    pub busy: Option<String>,
    pub drag: Option<ResizeDrag>,
    pub scroll_sync: ScrollSync,
    pub config_global_path: Option<PathBuf>,
    pub config_local_path: Option<PathBuf>,
    pub should_quit: bool,
    preview_revision: u64,
    preview_columns: usize,
    window: (u16, u16),
    toast: Option<Toast>,
}

impl Model {
    pub fn new(editor: EditorState, auth: AuthState, size: (u16, u16)) -> Self {
        let mut model = Self {
            editor,
            auth,
            window: size,
            ..Self::default()
        };
        model.relayout();
        model
    }

    pub const fn window(&self) -> (u16, u16) {
        self.window
    }

    pub const fn preview_visible(&self) -> bool {
        !self.editor.zen
    }

    /// Screen layout for the current window, widths and toast.
    pub fn areas(&self) -> PaneAreas {
        let (width, height) = self.window;
        pane_areas(
            Rect::new(0, 0, width, height),
            &self.editor.layout,
            self.editor.zen,
            self.toast.is_some(),
        )
    }

    /// Text columns available in the editor pane, after the gutter.
    pub fn editor_text_columns(&self) -> u16 {
        let gutter = editor_gutter_width(self.editor.buffer().line_count());
        self.editor_view.width().saturating_sub(gutter)
    }

    /// Rows available for outline entries.
    pub fn outline_rows(&self) -> usize {
        self.areas()
            .outline
            .map_or(0, |area| area.height.saturating_sub(OUTLINE_TITLE_ROWS) as usize)
    }

    pub(super) fn resize(&mut self, width: u16, height: u16) {
        self.window = (width, height);
        self.relayout();
    }

    /// Fit both viewports to the current areas. Re-wraps the preview when
    /// its width changed.
    pub(super) fn relayout(&mut self) {
        let areas = self.areas();
        self.editor_view
            .resize(areas.editor.width, areas.editor.height);
        self.editor_view
            .set_total_lines(self.editor.buffer().line_count());
        if let Some(preview) = areas.preview {
            self.preview_view.resize(
                preview.width.saturating_sub(PREVIEW_LEFT_PADDING),
                preview.height,
            );
        }
        if self.wrap_columns() != self.preview_columns {
            self.refresh_preview();
        }
        self.ensure_cursor_visible();
        self.clamp_outline();
    }

    fn wrap_columns(&self) -> usize {
        self.areas().preview.map_or(HIDDEN_PREVIEW_COLUMNS, |area| {
            usize::from(area.width.saturating_sub(PREVIEW_LEFT_PADDING * 2)).max(1)
        })
    }

    /// Whether the preview lags behind the buffer.
    pub fn preview_is_stale(&self) -> bool {
        self.preview_revision != self.editor.buffer().revision()
    }

    /// Re-render the preview and outline from the buffer.
    pub fn refresh_preview(&mut self) {
        let markdown = self.editor.markdown();
        let columns = self.wrap_columns();
        self.preview = render_preview(&markdown, columns, self.editor.theme);
        self.preview_columns = columns;
        self.preview_revision = self.editor.buffer().revision();
        self.preview_view.set_total_lines(self.preview.line_count());
        self.outline = extract_outline(&markdown);
        self.clamp_outline();
    }

    fn clamp_outline(&mut self) {
        let len = self.outline.len();
        self.outline_selected = self.outline_selected.filter(|&idx| idx < len);
        let rows = self.outline_rows().max(1);
        let max_offset = len.saturating_sub(rows);
        self.outline_offset = self.outline_offset.min(max_offset);
    }

    /// Keep `outline_selected` on screen.
    pub(super) fn reveal_outline_selection(&mut self) {
        let Some(selected) = self.outline_selected else {
            return;
        };
        let rows = self.outline_rows().max(1);
        if selected < self.outline_offset {
            self.outline_offset = selected;
        } else if selected >= self.outline_offset + rows {
            self.outline_offset = selected + 1 - rows;
        }
    }

    /// Track buffer length and bring the cursor line into view. Returns
    /// whether the editor scrolled.
    pub(super) fn ensure_cursor_visible(&mut self) -> bool {
        self.editor_view
            .set_total_lines(self.editor.buffer().line_count());
        self.editor_view
            .ensure_visible(self.editor.buffer().cursor().line)
    }

    /// Mirror a scroll of `source` onto the other pane.
    pub(super) fn sync_scroll(&mut self, source: Pane, now: Instant) -> bool {
        if !self.preview_visible() {
            return false;
        }
        match source {
            Pane::Editor => {
                self.scroll_sync
                    .on_scroll(Pane::Editor, &self.editor_view, &mut self.preview_view, now)
            }
            Pane::Preview => {
                self.scroll_sync
                    .on_scroll(Pane::Preview, &self.preview_view, &mut self.editor_view, now)
            }
        }
    }

    /// Swap in a new document, resetting views and history position.
    pub(super) fn load_document(
        &mut self,
        text: &str,
        file_path: Option<PathBuf>,
        drive_file: Option<DriveFile>,
    ) {
        self.editor.replace_document(text);
        self.file_path = file_path;
        self.drive_file = drive_file;
        self.editor_view.go_to_line(0);
        self.preview_view.go_to_line(0);
        self.outline_offset = 0;
        self.outline_selected = None;
        self.refresh_preview();
        self.ensure_cursor_visible();
    }

    /// Snapshot for local storage.
    pub fn persisted_editor(&self) -> PersistedEditor {
        PersistedEditor {
            markdown: self.editor.markdown(),
            theme: self.editor.theme,
            layout: self.editor.layout,
        }
    }

    /// Cheap fingerprint of everything [`Model::persisted_editor`] covers.
    pub(super) fn persist_key(&self) -> (u64, Theme, Layout) {
        (
            self.editor.buffer().revision(),
            self.editor.theme,
            self.editor.layout,
        )
    }

    /// Name offered when saving to Drive as a new file.
    pub fn suggested_drive_name(&self) -> String {
        self.drive_file
            .as_ref()
            .map(|file| file.name.clone())
            .filter(|name| !name.is_empty())
            .or_else(|| {
                self.file_path
                    .as_ref()
                    .and_then(|path| path.file_name())
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "document.md".to_string())
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        let had_toast = self.toast.is_some();
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + TOAST_TTL,
        });
        if !had_toast {
            self.relayout();
        }
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            self.relayout();
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}

/// Default local file name: `zenith-YYYYMMDD-HHMMSS.md`.
pub fn timestamped_file_name(now: chrono::DateTime<chrono::Local>) -> String {
    format!("zenith-{}.md", now.format("%Y%m%d-%H%M%S"))
}
