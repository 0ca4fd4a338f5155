//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering
//!
//! File, export and Drive I/O happen in side effects after `update`.
//! Slow work runs on worker threads that send their result back as a
//! [`Message`].

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{
    DriveMenuItem, Focus, Modal, Model, Prompt, PromptKind, ToastLevel, timestamped_file_name,
};
pub use update::{DriveOp, Message, drive_menu_message, update};

use std::path::PathBuf;
use std::sync::Arc;

use crate::drive::DriveApi;
use crate::state::{AuthState, EditorState, Layout, Theme, WELCOME_TEXT};
use crate::storage::{AUTH_KEY, EDITOR_KEY, LocalStorage, PersistedEditor};

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    file_path: Option<PathBuf>,
    theme: Option<Theme>,
    zen: bool,
    drive_api_key: Option<String>,
    drive_token: Option<String>,
    storage: Option<LocalStorage>,
    drive: Arc<dyn DriveApi>,
    fallback_dir: Option<PathBuf>,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create an application that talks to Drive through `drive`.
    pub fn new(drive: Arc<dyn DriveApi>) -> Self {
        Self {
            file_path: None,
            theme: None,
            zen: false,
            drive_api_key: None,
            drive_token: None,
            storage: None,
            drive,
            fallback_dir: None,
            config_global_path: None,
            config_local_path: None,
        }
    }

    /// Open this file at startup instead of the stored draft.
    pub fn with_file(mut self, path: Option<PathBuf>) -> Self {
        self.file_path = path;
        self
    }

    /// Override the stored theme.
    pub const fn with_theme(mut self, theme: Option<Theme>) -> Self {
        self.theme = theme;
        self
    }

    /// Start in zen mode.
    pub const fn with_zen(mut self, zen: bool) -> Self {
        self.zen = zen;
        self
    }

    /// API key used for Drive file listings.
    pub fn with_drive_api_key(mut self, key: Option<String>) -> Self {
        self.drive_api_key = key;
        self
    }

    /// Sign in with this access token at startup.
    pub fn with_drive_token(mut self, token: Option<String>) -> Self {
        self.drive_token = token;
        self
    }

    /// Persist editor and session state here. Without storage nothing
    /// survives a restart.
    pub fn with_storage(mut self, storage: Option<LocalStorage>) -> Self {
        self.storage = storage;
        self
    }

    /// Directory for timestamped copies when a save fails.
    pub fn with_fallback_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.fallback_dir = dir;
        self
    }

    /// Set config paths to show in help.
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }

    /// Build the starting model: stored draft and session first, then
    /// command-line overrides, then the file argument.
    pub fn init_model(&self, size: (u16, u16)) -> Model {
        let mut warnings = Vec::new();

        let stored = self.storage.as_ref().and_then(|storage| {
            storage
                .get::<PersistedEditor>(EDITOR_KEY)
                .unwrap_or_else(|err| {
                    tracing::warn!(error = %err, "ignoring stored editor state");
                    warnings.push("Stored draft was unreadable; starting fresh".to_string());
                    None
                })
        });
        let auth = self
            .storage
            .as_ref()
            .and_then(|storage| {
                storage.get::<AuthState>(AUTH_KEY).unwrap_or_else(|err| {
                    tracing::warn!(error = %err, "ignoring stored Drive session");
                    None
                })
            })
            .unwrap_or_default();

        let (stored_markdown, theme, layout) = stored.map_or_else(
            || (WELCOME_TEXT.to_string(), Theme::default(), Layout::default()),
            |stored| {
                let layout = Layout::new(
                    stored.layout.outline_width(),
                    stored.layout.preview_width(),
                );
                (stored.markdown, stored.theme, layout)
            },
        );

        // A file argument replaces the stored draft. A missing file starts
        // empty and is created on first save.
        let mut file_path = None;
        let markdown = match self.file_path.as_ref() {
            Some(path) if path.exists() => match effects::read_document(path) {
                Ok(text) => {
                    file_path = Some(path.clone());
                    text
                }
                Err(err) => {
                    tracing::error!(error = %format!("{err:#}"), "could not open startup file");
                    warnings.push(format!("Open failed: {err:#}"));
                    stored_markdown
                }
            },
            Some(path) => {
                tracing::info!(path = %path.display(), "starting new file");
                file_path = Some(path.clone());
                String::new()
            }
            None => stored_markdown,
        };

        let mut editor = EditorState::new(&markdown, self.theme.unwrap_or(theme), layout);
        editor.zen = self.zen;

        let mut model = Model::new(editor, auth, size);
        model.file_path = file_path;
        model.drive_api_key.clone_from(&self.drive_api_key);
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);

        for warning in warnings {
            model.show_toast(ToastLevel::Warning, warning);
        }
        model
    }

    /// Messages to dispatch once the loop is running.
    pub fn startup_messages(&self, model: &Model) -> Vec<Message> {
        self.drive_token
            .as_ref()
            .map(|token| token.trim())
            .filter(|token| !token.is_empty() && model.auth.token() != Some(*token))
            .map(|token| Message::DriveSignIn(token.to_string()))
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests;
