//! Gallery domain: query validation, folder resolution and image listing.
//!
//! # Components
//!
//! - [`ImageQuery`], [`Level`], [`RollNumber`]: validated request parameters
//! - [`FolderResolver`]: walks `Images/{level}[/{roll}]` using a [`FolderCache`]
//! - [`GalleryService`]: timeout-guarded resolve-and-list, plus the image proxy lookup
//! - [`ImageRef`]: `{id, url, type}` entries returned to the frontend

mod folders;
mod level;
mod service;

pub use folders::{FolderCache, FolderResolver, ROOT_FOLDER_NAME};
pub use level::{ImageQuery, Level, RollNumber};
pub use service::{GalleryService, ImageRef, ImageStream, DEFAULT_REQUEST_TIMEOUT, MAX_IMAGES};
