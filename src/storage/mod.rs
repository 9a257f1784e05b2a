//! Storage provider layer.
//!
//! The gallery never talks HTTP to the provider directly. Everything goes
//! through the [`FileStore`] trait, which exposes the four operations the
//! gallery needs:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │       GalleryService / FolderResolver   │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │            FileStore Trait              │
//! │  find_folder · list_images ·            │
//! │  file_mime_type · download              │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │   DriveClient  (Drive v3 REST API)      │
//! │   TokenProvider (service account JWT)   │
//! └─────────────────────────────────────────┘
//! ```

mod credentials;
mod drive;

pub use credentials::{
    CredentialSource, ServiceAccountAuth, ServiceAccountKey, TokenProvider, DEFAULT_TOKEN_URI,
    DRIVE_READONLY_SCOPE,
};
pub use drive::{
    escape_query_value, folder_query, image_query, DriveClient, DEFAULT_DRIVE_API_BASE,
    FOLDER_MIME_TYPE,
};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Raw file content streamed from the provider.
pub type ByteStream = BoxStream<'static, Result<Bytes, StorageError>>;

/// A file entry as returned by the provider's listing call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// Opaque provider identifier
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// MIME type reported by the provider
    #[serde(default)]
    pub mime_type: String,
}

/// Operations the gallery needs from a cloud file store.
///
/// Implementations must be cheap to share across requests; the service holds
/// a single instance behind an `Arc`.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Find a folder by exact name, optionally restricted to a parent folder.
    ///
    /// Returns `Ok(None)` when nothing matches. When several folders match,
    /// the first one the provider returns is used.
    async fn find_folder(
        &self,
        name: &str,
        parent: Option<&str>,
    ) -> Result<Option<String>, StorageError>;

    /// List image files directly inside `folder_id`, returning at most `limit`.
    async fn list_images(
        &self,
        folder_id: &str,
        limit: usize,
    ) -> Result<Vec<DriveFile>, StorageError>;

    /// Fetch the MIME type of a single file.
    async fn file_mime_type(&self, file_id: &str) -> Result<String, StorageError>;

    /// Open a byte stream over the file's content.
    async fn download(&self, file_id: &str) -> Result<ByteStream, StorageError>;
}
