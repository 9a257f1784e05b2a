//! # Drive Gallery
//!
//! A backend for browsing level-partitioned image galleries kept in a
//! Google Drive folder tree.
//!
//! Images live under a fixed hierarchy:
//!
//! ```text
//! Images/
//! ├── UG/
//! │   └── 2021000123/      (optional per-student folder)
//! ├── PG/
//! └── PHD/
//! ```
//!
//! The server resolves that path folder by folder, lists the images it
//! contains and hands out proxy URLs so browsers never see provider links.
//!
//! ## Features
//!
//! - **Validated queries**: level must be `UG`, `PG` or `PHD`; roll numbers are exactly 10 digits
//! - **Folder cache**: resolved folder ids are remembered for the life of the process
//! - **Image proxy**: bytes are streamed through the server with long-lived cache headers
//! - **Rate limiting**: 100 requests per 15 minutes per client IP on `/api`
//! - **Built-in page**: a small gallery UI with a lightbox at `/gallery`
//!
//! ## Architecture
//!
//! - [`storage`] - Provider abstraction and the Drive v3 client
//! - [`gallery`] - Query validation, folder resolution and image listing
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use drive_gallery::{create_router, DriveClient, GalleryService, RouterConfig, TokenProvider};
//!
//! #[tokio::main]
//! async fn main() {
//!     let http = reqwest::Client::new();
//!     let tokens = TokenProvider::Static("dev-token".to_string());
//!     let drive = DriveClient::new(http, tokens);
//!
//!     let gallery = GalleryService::new(drive);
//!     let router = create_router(gallery, RouterConfig::new());
//!
//!     // Serve the router...
//! }
//! ```

pub mod config;
pub mod error;
pub mod gallery;
pub mod server;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use error::{GalleryError, StorageError, ValidationError};
pub use gallery::{
    FolderCache, FolderResolver, GalleryService, ImageQuery, ImageRef, ImageStream, Level,
    RollNumber, DEFAULT_REQUEST_TIMEOUT, MAX_IMAGES, ROOT_FOLDER_NAME,
};
pub use server::{
    create_router, health_handler, image_proxy_handler, images_handler, root_handler, AppState,
    ErrorResponse, HealthResponse, ImagesQueryParams, ImagesResponse, RouterConfig,
};
pub use storage::{
    ByteStream, CredentialSource, DriveClient, DriveFile, FileStore, ServiceAccountAuth,
    ServiceAccountKey, TokenProvider,
};
