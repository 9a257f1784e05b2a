//! Test utilities for integration tests.
//!
//! This module provides an in-memory [`FileStore`] that records calls, plus
//! helpers for building routers and reading responses.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use bytes::Bytes;
use futures::StreamExt;
use http_body_util::BodyExt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower::ServiceExt;

use drive_gallery::error::StorageError;
use drive_gallery::gallery::GalleryService;
use drive_gallery::storage::{ByteStream, DriveFile, FileStore};
use drive_gallery::{create_router, RouterConfig};

// =============================================================================
// Well-known ids for the standard hierarchy
// =============================================================================

pub const ROOT_ID: &str = "root-folder";
pub const UG_ID: &str = "ug-folder";
pub const PG_ID: &str = "pg-folder";
pub const PHD_ID: &str = "phd-folder";
pub const ROLL_NUMBER: &str = "2021000123";
pub const ROLL_ID: &str = "roll-folder";

// =============================================================================
// Mock File Store
// =============================================================================

/// An in-memory file store with call tracking.
///
/// Clones share their call counters, so a clone kept by the test observes
/// calls made through the router.
#[derive(Clone, Default)]
pub struct MockFileStore {
    folders: HashMap<(String, Option<String>), String>,
    files: HashMap<String, Vec<DriveFile>>,
    contents: HashMap<String, (String, Bytes)>,
    failing: bool,
    delay: Option<Duration>,
    find_folder_calls: Arc<RwLock<HashMap<String, usize>>>,
    list_calls: Arc<AtomicUsize>,
    download_calls: Arc<AtomicUsize>,
}

impl MockFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Images` with `UG`, `PG` and `PHD` children, and one roll-number
    /// folder under `UG`.
    pub fn with_hierarchy() -> Self {
        Self::new()
            .with_folder("Images", None, ROOT_ID)
            .with_folder("UG", Some(ROOT_ID), UG_ID)
            .with_folder("PG", Some(ROOT_ID), PG_ID)
            .with_folder("PHD", Some(ROOT_ID), PHD_ID)
            .with_folder(ROLL_NUMBER, Some(UG_ID), ROLL_ID)
    }

    pub fn with_folder(
        mut self,
        name: impl Into<String>,
        parent: Option<&str>,
        id: impl Into<String>,
    ) -> Self {
        self.folders
            .insert((name.into(), parent.map(str::to_string)), id.into());
        self
    }

    /// Add `count` JPEG entries to a folder.
    pub fn with_images(mut self, folder_id: &str, count: usize) -> Self {
        let entries = self.files.entry(folder_id.to_string()).or_default();
        let start = entries.len();
        entries.extend((start..start + count).map(|i| DriveFile {
            id: format!("{}-img-{}", folder_id, i),
            name: format!("photo-{}.jpg", i),
            mime_type: "image/jpeg".to_string(),
        }));
        self
    }

    /// Make a file downloadable.
    pub fn with_content(
        mut self,
        file_id: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        self.contents
            .insert(file_id.into(), (mime_type.into(), data.into()));
        self
    }

    /// Fail every operation with a connection error.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Sleep before answering each folder lookup.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn find_folder_calls(&self, name: &str) -> usize {
        self.find_folder_calls
            .read()
            .await
            .get(name)
            .copied()
            .unwrap_or(0)
    }

    pub async fn total_find_folder_calls(&self) -> usize {
        self.find_folder_calls.read().await.values().sum()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn download_calls(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }

    fn check_failing(&self) -> Result<(), StorageError> {
        if self.failing {
            Err(StorageError::Connection("simulated outage".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl FileStore for MockFileStore {
    async fn find_folder(
        &self,
        name: &str,
        parent: Option<&str>,
    ) -> Result<Option<String>, StorageError> {
        *self
            .find_folder_calls
            .write()
            .await
            .entry(name.to_string())
            .or_insert(0) += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.check_failing()?;

        Ok(self
            .folders
            .get(&(name.to_string(), parent.map(str::to_string)))
            .cloned())
    }

    async fn list_images(
        &self,
        folder_id: &str,
        _limit: usize,
    ) -> Result<Vec<DriveFile>, StorageError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;

        // Ignores the limit so the service-side cap is exercised
        Ok(self.files.get(folder_id).cloned().unwrap_or_default())
    }

    async fn file_mime_type(&self, file_id: &str) -> Result<String, StorageError> {
        self.check_failing()?;
        self.contents
            .get(file_id)
            .map(|(mime, _)| mime.clone())
            .ok_or_else(|| StorageError::NotFound(file_id.to_string()))
    }

    async fn download(&self, file_id: &str) -> Result<ByteStream, StorageError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;

        let (_, data) = self
            .contents
            .get(file_id)
            .ok_or_else(|| StorageError::NotFound(file_id.to_string()))?;

        // Two chunks so the proxy has to stitch a real stream
        let mid = data.len() / 2;
        let chunks = vec![Ok(data.slice(..mid)), Ok(data.slice(mid..))];
        Ok(futures::stream::iter(chunks).boxed())
    }
}

// =============================================================================
// Router Helpers
// =============================================================================

/// Router with rate limiting and tracing off.
pub fn test_router(store: MockFileStore) -> Router {
    test_router_with(GalleryService::new(store), RouterConfig::new())
}

pub fn test_router_with(gallery: GalleryService<MockFileStore>, config: RouterConfig) -> Router {
    create_router(gallery, config.without_rate_limit().with_tracing(false))
}

/// Issue a GET and collect the whole response.
pub async fn get(router: &Router, uri: &str) -> (StatusCode, HeaderMap, Bytes) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();

    (status, headers, body)
}

/// Issue a GET and parse the body as JSON.
pub async fn get_json(router: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, _, body) = get(router, uri).await;
    let json = serde_json::from_slice(&body).unwrap();
    (status, json)
}
