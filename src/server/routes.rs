//! Router configuration for the gallery server.
//!
//! # Route Structure
//!
//! ```text
//! /                        - Liveness text (public)
//! /health                  - Health check (public)
//! /gallery                 - Gallery page (public)
//! /api/images              - Image listing (rate limited)
//! /api/image/{image_id}    - Image proxy (rate limited)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use drive_gallery::gallery::GalleryService;
//! use drive_gallery::server::{create_router, RouterConfig};
//!
//! let gallery = GalleryService::new(drive_client);
//! let config = RouterConfig::new()
//!     .with_cors_origins(vec!["https://gallery.example.com".to_string()]);
//!
//! let router = create_router(gallery, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(
//!     listener,
//!     router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
//! )
//! .await?;
//! ```

use std::time::Duration;

use axum::{routing::get, Router};
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    gallery_page_handler, health_handler, image_proxy_handler, images_handler, root_handler,
    AppState, DEFAULT_IMAGE_MAX_AGE,
};
use super::rate_limit::{RateLimitLayer, DEFAULT_RATE_LIMIT_REQUESTS, DEFAULT_RATE_LIMIT_WINDOW};
use crate::gallery::GalleryService;
use crate::storage::FileStore;

// =============================================================================
// Router Configuration
// =============================================================================

/// Per-IP request budget for the `/api` routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub requests: u32,
    pub window: Duration,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            requests: DEFAULT_RATE_LIMIT_REQUESTS,
            window: DEFAULT_RATE_LIMIT_WINDOW,
        }
    }
}

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Cache-Control max-age for proxied images, in seconds
    pub image_max_age: u32,

    /// Rate limit for `/api` routes (None = unlimited)
    pub rate_limit: Option<RateLimit>,

    /// Reject listings without a roll number
    pub require_roll_number: bool,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a router configuration.
    ///
    /// By default:
    /// - CORS allows any origin
    /// - Images are cacheable for 24 hours
    /// - `/api` is limited to 100 requests per 15 minutes per IP
    /// - Roll numbers are optional
    /// - Tracing is enabled
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            image_max_age: DEFAULT_IMAGE_MAX_AGE,
            rate_limit: Some(RateLimit::default()),
            require_roll_number: false,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    pub fn with_image_max_age(mut self, seconds: u32) -> Self {
        self.image_max_age = seconds;
        self
    }

    /// Set the `/api` rate limit.
    pub fn with_rate_limit(mut self, requests: u32, window: Duration) -> Self {
        self.rate_limit = Some(RateLimit { requests, window });
        self
    }

    /// Disable rate limiting entirely.
    pub fn without_rate_limit(mut self) -> Self {
        self.rate_limit = None;
        self
    }

    pub fn with_require_roll_number(mut self, required: bool) -> Self {
        self.require_roll_number = required;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// The rate limiter needs the peer address, so serve the router with
/// `into_make_service_with_connect_info::<SocketAddr>()`. Without it every
/// request is let through.
pub fn create_router<S>(gallery: GalleryService<S>, config: RouterConfig) -> Router
where
    S: FileStore + 'static,
{
    let app_state = AppState::new(gallery)
        .with_require_roll_number(config.require_roll_number)
        .with_image_max_age(config.image_max_age);

    let cors = build_cors_layer(&config);

    let api_routes = Router::new()
        .route("/images", get(images_handler::<S>))
        .route("/image/{image_id}", get(image_proxy_handler::<S>))
        .with_state(app_state.clone());

    let api_routes = match config.rate_limit {
        Some(limit) => api_routes.layer(RateLimitLayer::new(limit.requests, limit.window)),
        None => api_routes,
    };

    let router = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/gallery", get(gallery_page_handler::<S>))
        .with_state(app_state)
        .nest("/api", api_routes)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
