//! Google Drive persistence.
//!
//! The app talks to Drive through the [`DriveApi`] trait so effects can be
//! exercised against an in-memory fake. [`HttpDrive`] is the real client.

mod client;

pub use client::HttpDrive;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// MIME type Zenith uploads documents with.
pub const MARKDOWN_MIME: &str = "text/markdown";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriveError {
    #[error("no Drive API key configured (set --drive-api-key)")]
    MissingApiKey,
    #[error("Drive request failed: {status} {body}")]
    Http { status: u16, body: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected Drive response: {0}")]
    Decode(String),
}

impl DriveError {
    /// The token was rejected and the session should be dropped.
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Http { status: 401 | 403, .. })
    }
}

impl From<reqwest::Error> for DriveError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// A remote file, as far as Zenith cares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Signed-in Google account.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: String,
}

/// Drive operations used by the editor. Implementations block; callers run
/// them off the UI thread.
pub trait DriveApi: Send + Sync {
    fn user_info(&self, token: &str) -> Result<UserProfile, DriveError>;

    /// Create a file, or overwrite `file_id` when given.
    fn save(
        &self,
        token: &str,
        name: &str,
        content: &str,
        file_id: Option<&str>,
    ) -> Result<DriveFile, DriveError>;

    fn load(&self, token: &str, file_id: &str) -> Result<String, DriveError>;

    /// Markdown and plain-text files visible to the user.
    fn list_markdown_files(&self, token: &str, api_key: &str)
    -> Result<Vec<DriveFile>, DriveError>;
}
