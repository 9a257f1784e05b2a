//! Gallery service: resolve, list, and open images.
//!
//! ```text
//! list_images(query)
//!   └─ timeout(30s)
//!        ├─ FolderResolver::resolve   (cache-assisted, sequential)
//!        │     └─ FolderNotFound  ──▶  Ok(vec![])
//!        └─ FileStore::list_images    (capped at MAX_IMAGES)
//!              └─ map to ImageRef { id, url: /api/image/{id}, type }
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{GalleryError, StorageError};
use crate::storage::{ByteStream, DriveFile, FileStore};

use super::folders::FolderResolver;
use super::level::ImageQuery;

/// Hard cap on the number of images returned for one folder.
pub const MAX_IMAGES: usize = 10_000;

/// Default budget for the resolve-and-list sequence.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// Response Types
// =============================================================================

/// An image as handed to the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    /// Provider file id
    pub id: String,

    /// Proxy URL serving the bytes
    pub url: String,

    /// MIME type
    #[serde(rename = "type")]
    pub mime_type: String,
}

/// An open image ready to be streamed to the client.
pub struct ImageStream {
    pub content_type: String,
    pub body: ByteStream,
}

// =============================================================================
// GalleryService
// =============================================================================

/// Entry point for gallery lookups and the image proxy.
pub struct GalleryService<S: FileStore> {
    store: Arc<S>,
    resolver: FolderResolver<S>,
    timeout: Duration,
    public_url: String,
    max_images: usize,
}

impl<S: FileStore> GalleryService<S> {
    /// Create a service with the default timeout, relative proxy URLs and
    /// the standard image cap.
    pub fn new(store: S) -> Self {
        let store = Arc::new(store);
        Self {
            resolver: FolderResolver::new(Arc::clone(&store)),
            store,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            public_url: String::new(),
            max_images: MAX_IMAGES,
        }
    }

    /// Set the resolve-and-list timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Prefix proxy URLs with an absolute base such as `https://api.example.com`.
    pub fn with_public_url(mut self, public_url: impl Into<String>) -> Self {
        self.public_url = public_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Lower the image cap. Values above [`MAX_IMAGES`] are clamped.
    pub fn with_max_images(mut self, max_images: usize) -> Self {
        self.max_images = max_images.min(MAX_IMAGES);
        self
    }

    pub fn resolver(&self) -> &FolderResolver<S> {
        &self.resolver
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Proxy URL for a file id.
    pub fn image_url(&self, file_id: &str) -> String {
        format!("{}/api/image/{}", self.public_url, urlencoding::encode(file_id))
    }

    /// List images for a validated query.
    ///
    /// A missing folder anywhere on the path produces an empty list. Storage
    /// failures and the timeout are returned as errors.
    pub async fn list_images(&self, query: &ImageQuery) -> Result<Vec<ImageRef>, GalleryError> {
        match tokio::time::timeout(self.timeout, self.resolve_and_list(query)).await {
            Ok(result) => result,
            Err(_) => Err(GalleryError::Timeout {
                seconds: self.timeout.as_secs(),
            }),
        }
    }

    async fn resolve_and_list(&self, query: &ImageQuery) -> Result<Vec<ImageRef>, GalleryError> {
        let folder_id = match self
            .resolver
            .resolve(query.level, query.roll_number.as_ref())
            .await
        {
            Ok(id) => id,
            Err(GalleryError::FolderNotFound { path }) => {
                info!(path = %path, "Folder not found, returning no images");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let mut files = self.store.list_images(&folder_id, self.max_images).await?;
        files.truncate(self.max_images);

        debug!(
            level = %query.level,
            folder_id = %folder_id,
            count = files.len(),
            "Listed gallery images"
        );

        Ok(files.into_iter().map(|f| self.image_ref(f)).collect())
    }

    fn image_ref(&self, file: DriveFile) -> ImageRef {
        ImageRef {
            url: self.image_url(&file.id),
            id: file.id,
            mime_type: file.mime_type,
        }
    }

    /// Fetch the MIME type, then open the content stream.
    pub async fn open_image(&self, file_id: &str) -> Result<ImageStream, StorageError> {
        let content_type = self.store.file_mime_type(file_id).await?;
        let body = self.store.download(file_id).await?;

        Ok(ImageStream { content_type, body })
    }
}
