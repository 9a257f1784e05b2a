//! HTTP request handlers for the gallery API.
//!
//! # Endpoints
//!
//! - `GET /` - Plain-text liveness message
//! - `GET /health` - JSON health check
//! - `GET /gallery` - Gallery page (form, grid, lightbox)
//! - `GET /api/images?level=..&rollNumber=..` - List images for a level
//! - `GET /api/image/{image_id}` - Stream an image's bytes

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequestParts, Path, Query, State},
    http::{header, request::Parts, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::{GalleryError, StorageError, ValidationError};
use crate::gallery::{GalleryService, ImageQuery, ImageRef, Level};
use crate::storage::FileStore;

use super::page::generate_gallery_html;

/// Default `Cache-Control` max-age for proxied images (24 hours).
pub const DEFAULT_IMAGE_MAX_AGE: u32 = 86_400;

/// Message returned for any internal failure. Details stay in the logs.
const GENERIC_FAILURE_MESSAGE: &str = "Failed to fetch images";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the gallery service.
pub struct AppState<S: FileStore> {
    /// The gallery service for lookups and proxying
    pub gallery: Arc<GalleryService<S>>,

    /// Reject image listings that carry no roll number
    pub require_roll_number: bool,

    /// Cache-Control max-age for proxied images, in seconds
    pub image_max_age: u32,
}

impl<S: FileStore> AppState<S> {
    pub fn new(gallery: GalleryService<S>) -> Self {
        Self {
            gallery: Arc::new(gallery),
            require_roll_number: false,
            image_max_age: DEFAULT_IMAGE_MAX_AGE,
        }
    }

    pub fn with_require_roll_number(mut self, required: bool) -> Self {
        self.require_roll_number = required;
        self
    }

    pub fn with_image_max_age(mut self, seconds: u32) -> Self {
        self.image_max_age = seconds;
        self
    }
}

impl<S: FileStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            gallery: Arc::clone(&self.gallery),
            require_roll_number: self.require_roll_number,
            image_max_age: self.image_max_age,
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Raw query parameters for the image listing endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagesQueryParams {
    #[serde(default)]
    pub level: Option<String>,

    #[serde(default)]
    pub roll_number: Option<String>,

    /// Student name. Collected by the form but not used for lookups.
    #[serde(default)]
    pub name: Option<String>,
}

/// Extractor that validates listing parameters before the handler runs.
///
/// Rejections short-circuit with 400 and never reach the storage provider.
#[derive(Debug)]
pub struct ValidatedImageQuery(pub ImageQuery);

impl<S> FromRequestParts<AppState<S>> for ValidatedImageQuery
where
    S: FileStore + 'static,
{
    type Rejection = GalleryError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<ImagesQueryParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ValidationError::MalformedQuery(e.body_text()))?;

        let query = ImageQuery::validate(
            params.level.as_deref(),
            params.roll_number.as_deref(),
            state.require_roll_number,
        )?;

        Ok(ValidatedImageQuery(query))
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error body returned for all failures.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,

    /// Error type identifier (e.g., "invalid_request", "not_found")
    pub error: String,

    /// Human-readable error message
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Successful image listing.
#[derive(Debug, Serialize)]
pub struct ImagesResponse {
    pub success: bool,
    pub level: Level,
    #[serde(rename = "rollNumber", skip_serializing_if = "Option::is_none")]
    pub roll_number: Option<String>,
    pub images: Vec<ImageRef>,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert GalleryError to an HTTP response.
///
/// Validation problems are echoed back; everything else is reported with a
/// generic message and logged in full.
impl IntoResponse for GalleryError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            GalleryError::Validation(e) => {
                (StatusCode::BAD_REQUEST, "invalid_request", e.to_string())
            }
            GalleryError::FolderNotFound { .. } => (
                StatusCode::NOT_FOUND,
                "not_found",
                "Folder not found".to_string(),
            ),
            GalleryError::Timeout { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "timeout",
                GENERIC_FAILURE_MESSAGE.to_string(),
            ),
            GalleryError::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage_error",
                GENERIC_FAILURE_MESSAGE.to_string(),
            ),
        };

        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                self
            );
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                self
            );
        }

        (status, Json(ErrorResponse::new(error_type, message))).into_response()
    }
}

/// Wrapper for image proxy failures. Every failure is a 404.
pub struct ProxyError(pub StorageError);

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match &self.0 {
            StorageError::NotFound(id) => debug!(image_id = %id, "Image not found"),
            other => warn!(error = %other, "Image proxy failed"),
        }

        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("not_found", "Image not found")),
        )
            .into_response()
    }
}

impl From<StorageError> for ProxyError {
    fn from(err: StorageError) -> Self {
        ProxyError(err)
    }
}

/// Drive ids are URL-safe base64-ish tokens.
fn is_valid_file_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle `GET /`.
pub async fn root_handler() -> &'static str {
    "Gallery backend is running"
}

/// Handle health check requests.
///
/// `200 OK` with `{"status": "healthy", "version": "0.1.0"}`.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Serve the gallery page.
pub async fn gallery_page_handler<S: FileStore + 'static>(
    State(state): State<AppState<S>>,
) -> Html<String> {
    Html(generate_gallery_html(state.require_roll_number))
}

/// Handle image listing requests.
///
/// # Endpoint
///
/// `GET /api/images?level=UG&rollNumber=2021000123`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "success": true,
///   "level": "UG",
///   "rollNumber": "2021000123",
///   "images": [{"id": "1a2b", "url": "/api/image/1a2b", "type": "image/jpeg"}]
/// }
/// ```
///
/// A level or roll-number folder that does not exist yields `"images": []`.
///
/// # Errors
///
/// - `400 Bad Request`: Missing or invalid level, invalid roll number
/// - `429 Too Many Requests`: Rate limit exceeded
/// - `500 Internal Server Error`: Timeout or storage failure
pub async fn images_handler<S: FileStore + 'static>(
    State(state): State<AppState<S>>,
    ValidatedImageQuery(query): ValidatedImageQuery,
) -> Result<Json<ImagesResponse>, GalleryError> {
    let images = state.gallery.list_images(&query).await?;

    Ok(Json(ImagesResponse {
        success: true,
        level: query.level,
        roll_number: query.roll_number.map(|r| r.as_str().to_string()),
        images,
    }))
}

/// Handle image proxy requests.
///
/// # Endpoint
///
/// `GET /api/image/{image_id}`
///
/// # Response
///
/// `200 OK` streaming the file bytes.
///
/// # Headers
///
/// - `Content-Type`: the file's MIME type
/// - `Cache-Control: public, max-age={image_max_age}`
/// - `Access-Control-Allow-Origin: *`
/// - `Cross-Origin-Resource-Policy: cross-origin`
///
/// # Errors
///
/// - `404 Not Found`: Unknown id, malformed id, or any upstream failure
pub async fn image_proxy_handler<S: FileStore + 'static>(
    State(state): State<AppState<S>>,
    Path(image_id): Path<String>,
) -> Result<Response, ProxyError> {
    if !is_valid_file_id(&image_id) {
        return Err(ProxyError(StorageError::NotFound(image_id)));
    }

    let image = state.gallery.open_image(&image_id).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, image.content_type)
        .header(
            header::CACHE_CONTROL,
            format!("public, max-age={}", state.image_max_age),
        )
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header("Cross-Origin-Resource-Policy", "cross-origin")
        .body(Body::from_stream(image.body))
        .map_err(|e| ProxyError(StorageError::InvalidResponse(e.to_string())))
}

// =============================================================================
// Tests
// =============================================================================
