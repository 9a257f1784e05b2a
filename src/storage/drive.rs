//! Google Drive v3 implementation of [`FileStore`].
//!
//! Folder and image lookups are `files.list` calls with a `q` filter; the
//! proxy uses `files.get` twice (metadata, then `alt=media` content).

use std::sync::Arc;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::credentials::TokenProvider;
use super::{ByteStream, DriveFile, FileStore};
use crate::error::StorageError;

/// Drive REST endpoint.
pub const DEFAULT_DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// MIME type Drive uses for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Largest page Drive will return for `files.list`.
const LIST_PAGE_SIZE: usize = 1000;

const IMAGE_FIELDS: &str = "nextPageToken, files(id, name, mimeType)";
const FOLDER_FIELDS: &str = "files(id, name)";

// =============================================================================
// Query Builders
// =============================================================================

/// Escape a value for use inside a single-quoted Drive query literal.
pub fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Query matching a non-trashed folder with an exact name.
pub fn folder_query(name: &str, parent: Option<&str>) -> String {
    let mut q = format!(
        "mimeType = '{}' and name = '{}' and trashed = false",
        FOLDER_MIME_TYPE,
        escape_query_value(name)
    );
    if let Some(parent) = parent {
        q.push_str(&format!(" and '{}' in parents", escape_query_value(parent)));
    }
    q
}

/// Query matching non-trashed image files directly inside a folder.
pub fn image_query(folder_id: &str) -> String {
    format!(
        "'{}' in parents and mimeType contains 'image/' and trashed = false",
        escape_query_value(folder_id)
    )
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileMetadata {
    mime_type: Option<String>,
}

// =============================================================================
// DriveClient
// =============================================================================

/// Drive-backed implementation of `FileStore`.
///
/// Cloning is cheap; the HTTP client and token provider are shared.
#[derive(Clone)]
pub struct DriveClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenProvider>,
}

impl DriveClient {
    /// Create a client against the public Drive endpoint.
    pub fn new(http: reqwest::Client, tokens: TokenProvider) -> Self {
        Self {
            http,
            base_url: DEFAULT_DRIVE_API_BASE.to_string(),
            tokens: Arc::new(tokens),
        }
    }

    /// Point the client at a different API base (emulators, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// The API base this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Description of the credentials in use, safe to log.
    pub fn credentials(&self) -> String {
        self.tokens.describe()
    }

    fn file_url(&self, file_id: &str) -> String {
        format!("{}/files/{}", self.base_url, urlencoding::encode(file_id))
    }

    async fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        resource: &str,
    ) -> Result<Response, StorageError> {
        let token = self.tokens.access_token().await?;

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        check_status(response, resource).await
    }

    async fn list_files(
        &self,
        q: &str,
        fields: &str,
        page_size: usize,
        page_token: Option<&str>,
    ) -> Result<FileList, StorageError> {
        let url = format!("{}/files", self.base_url);
        let page_size = page_size.to_string();

        let mut query = vec![
            ("q", q),
            ("fields", fields),
            ("pageSize", page_size.as_str()),
            ("supportsAllDrives", "true"),
            ("includeItemsFromAllDrives", "true"),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response = self.get(&url, &query, "file listing").await?;

        response
            .json::<FileList>()
            .await
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))
    }
}

/// Map non-success provider statuses to storage errors.
async fn check_status(response: Response, resource: &str) -> Result<Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(StorageError::NotFound(resource.to_string()));
    }

    let message = response.text().await.unwrap_or_default();
    Err(StorageError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl FileStore for DriveClient {
    async fn find_folder(
        &self,
        name: &str,
        parent: Option<&str>,
    ) -> Result<Option<String>, StorageError> {
        let q = folder_query(name, parent);
        debug!(name, parent, "Looking up folder");

        let list = self.list_files(&q, FOLDER_FIELDS, 1, None).await?;
        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    async fn list_images(
        &self,
        folder_id: &str,
        limit: usize,
    ) -> Result<Vec<DriveFile>, StorageError> {
        let q = image_query(folder_id);
        let mut images = Vec::new();
        let mut page_token: Option<String> = None;

        while images.len() < limit {
            let page_size = (limit - images.len()).min(LIST_PAGE_SIZE);
            let page = self
                .list_files(&q, IMAGE_FIELDS, page_size, page_token.as_deref())
                .await?;

            images.extend(page.files);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        images.truncate(limit);
        debug!(folder_id, count = images.len(), "Listed images");
        Ok(images)
    }

    async fn file_mime_type(&self, file_id: &str) -> Result<String, StorageError> {
        let response = self
            .get(
                &self.file_url(file_id),
                &[("fields", "mimeType"), ("supportsAllDrives", "true")],
                file_id,
            )
            .await?;

        let metadata: FileMetadata = response
            .json()
            .await
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))?;

        Ok(metadata
            .mime_type
            .unwrap_or_else(|| "application/octet-stream".to_string()))
    }

    async fn download(&self, file_id: &str) -> Result<ByteStream, StorageError> {
        let response = self
            .get(
                &self.file_url(file_id),
                &[("alt", "media"), ("supportsAllDrives", "true")],
                file_id,
            )
            .await?;

        Ok(response
            .bytes_stream()
            .map_err(|e| StorageError::Connection(e.to_string()))
            .boxed())
    }
}
