use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use anyhow::{Context, Result};

use crate::app::model::timestamped_file_name;
use crate::app::{App, DriveOp, Message, Model, ToastLevel};
use crate::drive::DriveApi;
use crate::export::{ExportFormat, render_export, write_export};
use crate::storage::{AUTH_KEY, EDITOR_KEY, atomic_write};

impl App {
    /// Run the I/O a message asks for, after `update` has applied it.
    ///
    /// Local files are read and written inline. Exports and Drive calls run
    /// on worker threads and report back through `tx`.
    pub(super) fn handle_message_side_effects(
        &self,
        model: &mut Model,
        msg: &Message,
        tx: &Sender<Message>,
    ) {
        match msg {
            Message::OpenFile(path) => self.open_local(model, path),
            Message::Save => {
                if let Some(path) = model.file_path.clone() {
                    self.save_local(model, &path);
                }
            }
            Message::SaveAs(path) => self.save_local(model, path),
            Message::Export(format) => Self::spawn_export(model, *format, tx),
            Message::ExportFinished(Err(err)) => {
                tracing::error!(error = %err, "export failed");
            }
            Message::DriveSignIn(token) => {
                let token = token.trim().to_string();
                if token.is_empty() {
                    return;
                }
                self.spawn_drive(tx, move |drive| match drive.user_info(&token) {
                    Ok(user) => Message::DriveSignedIn { token, user },
                    Err(error) => Message::DriveFailed {
                        op: DriveOp::SignIn,
                        error,
                    },
                });
            }
            Message::DriveSignedIn { .. } | Message::DriveSignOut => self.persist_auth(model),
            Message::DriveSave(name) => self.spawn_drive_save(model, name.as_deref(), tx),
            Message::DriveOpenPicker => {
                let (Some(token), Some(api_key)) = (
                    model.auth.token().map(str::to_string),
                    model.drive_api_key.clone(),
                ) else {
                    return;
                };
                self.spawn_drive(tx, move |drive| {
                    match drive.list_markdown_files(&token, &api_key) {
                        Ok(files) => Message::DriveFilesListed(files),
                        Err(error) => Message::DriveFailed {
                            op: DriveOp::List,
                            error,
                        },
                    }
                });
            }
            Message::DriveOpen(file) => {
                let Some(token) = model.auth.token().map(str::to_string) else {
                    return;
                };
                let file = file.clone();
                self.spawn_drive(tx, move |drive| match drive.load(&token, &file.id) {
                    Ok(text) => Message::DriveLoaded { file, text },
                    Err(error) => Message::DriveFailed {
                        op: DriveOp::Open,
                        error,
                    },
                });
            }
            Message::DriveFailed { op, error } => {
                tracing::error!(op = op.label(), %error, "Drive request failed");
                if error.is_auth_failure() {
                    self.persist_auth(model);
                }
            }
            _ => {}
        }
    }

    fn open_local(&self, model: &mut Model, path: &Path) {
        match read_document(path) {
            Ok(text) => {
                model.load_document(&text, Some(path.to_path_buf()), None);
                tracing::info!(path = %path.display(), "opened document");
                model.show_toast(ToastLevel::Info, format!("Opened {}", path.display()));
            }
            Err(err) => {
                tracing::error!(error = %format!("{err:#}"), "open failed");
                model.show_toast(ToastLevel::Error, format!("Open failed: {err:#}"));
            }
        }
    }

    /// Write the buffer to `path`. When that fails, write a timestamped
    /// copy into the fallback directory instead.
    fn save_local(&self, model: &mut Model, path: &Path) {
        let markdown = model.editor.markdown();
        let err = match write_document(path, &markdown) {
            Ok(()) => {
                model.file_path = Some(path.to_path_buf());
                tracing::info!(path = %path.display(), "saved document");
                model.show_toast(ToastLevel::Info, format!("Saved {}", path.display()));
                return;
            }
            Err(err) => err,
        };
        tracing::error!(error = %format!("{err:#}"), "save failed, trying fallback location");

        let fallback = self
            .fallback_dir()
            .join(timestamped_file_name(chrono::Local::now()));
        match write_document(&fallback, &markdown) {
            Ok(()) => {
                model.show_toast(
                    ToastLevel::Warning,
                    format!(
                        "Could not write {}; saved to {}",
                        path.display(),
                        fallback.display()
                    ),
                );
                model.file_path = Some(fallback);
            }
            Err(fallback_err) => {
                tracing::error!(error = %format!("{fallback_err:#}"), "fallback save failed");
                model.show_toast(ToastLevel::Error, format!("Save failed: {err:#}"));
            }
        }
    }

    fn fallback_dir(&self) -> PathBuf {
        self.fallback_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn spawn_export(model: &Model, format: ExportFormat, tx: &Sender<Message>) {
        let preview_visible = model.preview_visible();
        if format == ExportFormat::Pdf && !preview_visible {
            return;
        }
        let markdown = model.editor.markdown();
        let dir = export_dir(model);
        let tx = tx.clone();
        thread::spawn(move || {
            let result = render_export(format, &markdown, preview_visible)
                .and_then(|output| write_export(&dir, &output))
                .map_err(|err| err.to_string());
            let _ = tx.send(Message::ExportFinished(result));
        });
    }

    fn spawn_drive_save(&self, model: &Model, name: Option<&str>, tx: &Sender<Message>) {
        let Some(token) = model.auth.token().map(str::to_string) else {
            return;
        };
        let (name, file_id) = match (name, model.drive_file.as_ref()) {
            (Some(name), _) => (name.to_string(), None),
            (None, Some(file)) => (file.name.clone(), Some(file.id.clone())),
            (None, None) => return,
        };
        let markdown = model.editor.markdown();
        self.spawn_drive(tx, move |drive| {
            match drive.save(&token, &name, &markdown, file_id.as_deref()) {
                Ok(mut file) => {
                    if file.name.is_empty() {
                        file.name = name;
                    }
                    Message::DriveSaved(file)
                }
                Err(error) => Message::DriveFailed {
                    op: DriveOp::Save,
                    error,
                },
            }
        });
    }

    fn spawn_drive<F>(&self, tx: &Sender<Message>, job: F)
    where
        F: FnOnce(&dyn DriveApi) -> Message + Send + 'static,
    {
        let drive = Arc::clone(&self.drive);
        let tx = tx.clone();
        thread::spawn(move || {
            let _ = tx.send(job(drive.as_ref()));
        });
    }

    pub(super) fn persist_editor(&self, model: &Model) {
        let Some(storage) = self.storage.as_ref() else {
            return;
        };
        if let Err(err) = storage.set(EDITOR_KEY, &model.persisted_editor()) {
            tracing::warn!(error = %err, "failed to persist editor state");
        }
    }

    pub(super) fn persist_auth(&self, model: &Model) {
        let Some(storage) = self.storage.as_ref() else {
            return;
        };
        if let Err(err) = storage.set(AUTH_KEY, &model.auth) {
            tracing::warn!(error = %err, "failed to persist Drive session");
        }
    }
}

pub(super) fn read_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write_document(path: &Path, text: &str) -> Result<()> {
    atomic_write(path, text.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Exports land next to the current file, else in the working directory.
fn export_dir(model: &Model) -> PathBuf {
    model
        .file_path
        .as_ref()
        .and_then(|path| path.parent())
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
