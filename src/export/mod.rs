//! Document export to HTML, DOCX and PDF.
//!
//! Each format renders to bytes first; [`write_export`] then writes them
//! through a temp file so a failed export leaves nothing behind.

mod docx;
mod html;
mod pdf;

pub use docx::render_docx;
pub use html::{HTML_STYLESHEET, render_html};
pub use pdf::render_pdf;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::storage::atomic_write;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF export needs the preview; leave zen mode first")]
    PreviewHidden,
    #[error("failed to build DOCX package: {0}")]
    Docx(#[from] zip::result::ZipError),
    #[error("failed to build PDF: {0}")]
    Pdf(String),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Html,
    Docx,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [Self; 3] = [Self::Pdf, Self::Docx, Self::Html];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Html => "HTML",
            Self::Docx => "Word (DOCX)",
            Self::Pdf => "PDF",
        }
    }

    pub const fn default_file_name(self) -> &'static str {
        match self {
            Self::Html => "document.html",
            Self::Docx => "document.docx",
            Self::Pdf => "document.pdf",
        }
    }
}

/// A finished export, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutput {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Render `markdown` in `format`.
///
/// `preview_visible` is false in zen mode: HTML then falls back to the
/// raw markdown as `document.md`, and PDF is refused.
pub fn render_export(
    format: ExportFormat,
    markdown: &str,
    preview_visible: bool,
) -> Result<ExportOutput, ExportError> {
    let file_name = format.default_file_name();
    match format {
        ExportFormat::Html if !preview_visible => Ok(ExportOutput {
            file_name: file_name.replace(".html", ".md"),
            bytes: markdown.as_bytes().to_vec(),
        }),
        ExportFormat::Html => Ok(ExportOutput {
            file_name: file_name.to_string(),
            bytes: render_html(markdown, file_name).into_bytes(),
        }),
        ExportFormat::Docx => Ok(ExportOutput {
            file_name: file_name.to_string(),
            bytes: render_docx(markdown)?,
        }),
        ExportFormat::Pdf if !preview_visible => Err(ExportError::PreviewHidden),
        ExportFormat::Pdf => Ok(ExportOutput {
            file_name: file_name.to_string(),
            bytes: render_pdf(markdown, file_name)?,
        }),
    }
}

/// Write `output` into `dir` and return the final path.
pub fn write_export(dir: &Path, output: &ExportOutput) -> Result<PathBuf, ExportError> {
    let path = dir.join(&output.file_name);
    atomic_write(&path, &output.bytes).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;
    tracing::info!(path = %path.display(), bytes = output.bytes.len(), "exported document");
    Ok(path)
}
