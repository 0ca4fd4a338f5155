use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response, multipart};
use serde::Deserialize;

use super::{DriveApi, DriveError, DriveFile, MARKDOWN_MIME, UserProfile};

const UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";
const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";
const PICKER_QUERY: &str =
    "(mimeType='text/markdown' or mimeType='text/plain') and trashed=false";

/// Blocking Drive v3 client.
#[derive(Debug, Clone)]
pub struct HttpDrive {
    client: Client,
}

impl HttpDrive {
    pub fn new() -> Result<Self, DriveError> {
        let client = Client::builder()
            .user_agent(concat!("zenith/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }

    fn send(request: RequestBuilder) -> Result<Response, DriveError> {
        let response = request.send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        tracing::warn!(status = status.as_u16(), "Drive request failed");
        Err(DriveError::Http {
            status: status.as_u16(),
            body,
        })
    }
}

/// Target URL and method for an upload.
fn upload_target(file_id: Option<&str>) -> (reqwest::Method, String) {
    match file_id {
        Some(id) => (
            reqwest::Method::PATCH,
            format!("{UPLOAD_URL}/{id}?uploadType=multipart"),
        ),
        None => (
            reqwest::Method::POST,
            format!("{UPLOAD_URL}?uploadType=multipart"),
        ),
    }
}

fn upload_metadata(name: &str) -> String {
    serde_json::json!({ "name": name, "mimeType": MARKDOWN_MIME }).to_string()
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

impl DriveApi for HttpDrive {
    fn user_info(&self, token: &str) -> Result<UserProfile, DriveError> {
        let response = Self::send(self.client.get(USERINFO_URL).bearer_auth(token))?;
        Ok(response.json()?)
    }

    fn save(
        &self,
        token: &str,
        name: &str,
        content: &str,
        file_id: Option<&str>,
    ) -> Result<DriveFile, DriveError> {
        let metadata = multipart::Part::text(upload_metadata(name))
            .mime_str("application/json")?;
        let file = multipart::Part::text(content.to_string()).mime_str(MARKDOWN_MIME)?;
        let form = multipart::Form::new()
            .part("metadata", metadata)
            .part("file", file);

        let (method, url) = upload_target(file_id);
        tracing::debug!(%method, has_id = file_id.is_some(), "uploading to Drive");
        let response = Self::send(
            self.client
                .request(method, url)
                .bearer_auth(token)
                .multipart(form),
        )?;
        let mut saved: DriveFile = response.json()?;
        if saved.name.is_empty() {
            saved.name = name.to_string();
        }
        Ok(saved)
    }

    fn load(&self, token: &str, file_id: &str) -> Result<String, DriveError> {
        let url = format!("{FILES_URL}/{file_id}?alt=media");
        let response = Self::send(self.client.get(url).bearer_auth(token))?;
        Ok(response.text()?)
    }

    fn list_markdown_files(
        &self,
        token: &str,
        api_key: &str,
    ) -> Result<Vec<DriveFile>, DriveError> {
        if api_key.is_empty() {
            return Err(DriveError::MissingApiKey);
        }
        let request = self
            .client
            .get(FILES_URL)
            .bearer_auth(token)
            .query(&[
                ("q", PICKER_QUERY),
                ("fields", "files(id,name)"),
                ("orderBy", "modifiedTime desc"),
                ("pageSize", "100"),
                ("key", api_key),
            ]);
        let list: FileList = Self::send(request)?.json()?;
        Ok(list.files)
    }
}
