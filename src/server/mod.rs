//! HTTP server layer for the gallery.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │        GET /api/images          GET /api/image/{id}             │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  handlers   │  │ rate_limit  │  │        routes           │  │
//! │  │ (requests)  │  │ (per IP)    │  │  (router config, CORS)  │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod page;
pub mod rate_limit;
pub mod routes;

pub use handlers::{
    gallery_page_handler, health_handler, image_proxy_handler, images_handler, root_handler,
    AppState, ErrorResponse, HealthResponse, ImagesQueryParams, ImagesResponse, ProxyError,
    ValidatedImageQuery, DEFAULT_IMAGE_MAX_AGE,
};
pub use rate_limit::{RateLimitLayer, DEFAULT_RATE_LIMIT_REQUESTS, DEFAULT_RATE_LIMIT_WINDOW};
pub use routes::{create_router, RateLimit, RouterConfig};
