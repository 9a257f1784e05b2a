//! Folder resolution with a process-wide path cache.
//!
//! Folders are laid out as
//!
//! ```text
//! Images/
//! ├── UG/
//! │   ├── 2021000001/
//! │   └── ...
//! ├── PG/
//! └── PHD/
//! ```
//!
//! Each segment costs one `find_folder` call the first time it is resolved.
//! The resulting id is cached under its path (`"Images"`, `"Images/UG"`,
//! `"Images/UG/2021000001"`) for the life of the process. Entries are never
//! evicted or invalidated, so a folder renamed while the server runs keeps
//! resolving to its old id until restart.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::error::GalleryError;
use crate::storage::FileStore;

use super::level::{Level, RollNumber};

/// Name of the root folder holding every level.
pub const ROOT_FOLDER_NAME: &str = "Images";

// =============================================================================
// FolderCache
// =============================================================================

/// Path-to-folder-id map shared by all requests.
///
/// Concurrent misses on the same path may both resolve and insert; the
/// provider returns the same id each time so the last write is harmless.
#[derive(Debug, Default)]
pub struct FolderCache {
    entries: DashMap<String, String>,
}

impl FolderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a resolved folder id by path.
    pub fn get(&self, path: &str) -> Option<String> {
        self.entries.get(path).map(|id| id.value().clone())
    }

    /// Record a resolved folder id.
    pub fn insert(&self, path: impl Into<String>, folder_id: impl Into<String>) {
        self.entries.insert(path.into(), folder_id.into());
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// FolderResolver
// =============================================================================

/// Walks `Images/{level}[/{roll_number}]` to a folder id.
pub struct FolderResolver<S: FileStore> {
    store: Arc<S>,
    cache: FolderCache,
}

impl<S: FileStore> FolderResolver<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            cache: FolderCache::new(),
        }
    }

    pub fn cache(&self) -> &FolderCache {
        &self.cache
    }

    /// Resolve the root image folder.
    pub async fn resolve_root(&self) -> Result<String, GalleryError> {
        self.resolve_segment(ROOT_FOLDER_NAME.to_string(), ROOT_FOLDER_NAME, None)
            .await
    }

    /// Resolve the terminal folder for a level and optional roll number.
    ///
    /// Lookups are strictly sequential since each needs its parent's id.
    /// A missing segment yields `GalleryError::FolderNotFound` carrying the
    /// path that failed.
    pub async fn resolve(
        &self,
        level: Level,
        roll_number: Option<&RollNumber>,
    ) -> Result<String, GalleryError> {
        let root_id = self.resolve_root().await?;

        let level_path = format!("{}/{}", ROOT_FOLDER_NAME, level.as_str());
        let level_id = self
            .resolve_segment(level_path.clone(), level.as_str(), Some(&root_id))
            .await?;

        match roll_number {
            Some(roll) => {
                let roll_path = format!("{}/{}", level_path, roll.as_str());
                self.resolve_segment(roll_path, roll.as_str(), Some(&level_id))
                    .await
            }
            None => Ok(level_id),
        }
    }

    async fn resolve_segment(
        &self,
        path: String,
        name: &str,
        parent: Option<&str>,
    ) -> Result<String, GalleryError> {
        if let Some(id) = self.cache.get(&path) {
            debug!(path = %path, folder_id = %id, "Folder cache hit");
            return Ok(id);
        }

        match self.store.find_folder(name, parent).await? {
            Some(id) => {
                debug!(path = %path, folder_id = %id, "Resolved folder");
                self.cache.insert(path, id.clone());
                Ok(id)
            }
            None => Err(GalleryError::FolderNotFound { path }),
        }
    }
}
