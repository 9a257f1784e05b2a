//! Configuration management for the gallery server.
//!
//! This module provides a configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `GALLERY_` prefix (a `.env` file is loaded first)
//! - Sensible defaults for all optional settings
//!
//! # Environment Variables
//!
//! - `GALLERY_HOST` - Server bind address (default: 0.0.0.0)
//! - `GALLERY_PORT` - Server port (default: 3000)
//! - `GALLERY_FRONTEND_URL` - Frontend base URL, allowed for CORS
//! - `GALLERY_ALLOWED_ORIGIN` - Additional allowed CORS origin
//! - `GALLERY_CREDENTIALS` - Service-account JSON key, inline
//! - `GALLERY_CREDENTIALS_FILE` - Path to a service-account JSON key
//! - `GALLERY_ACCESS_TOKEN` - Static bearer token (development only)
//! - `GALLERY_DRIVE_API_BASE` - Drive API base URL
//! - `GALLERY_PUBLIC_URL` - Absolute prefix for proxy URLs (default: relative)
//! - `GALLERY_REQUIRE_ROLL_NUMBER` - Require a roll number on listings
//! - `GALLERY_REQUEST_TIMEOUT_SECS` - Resolve-and-list timeout (default: 30)
//! - `GALLERY_RATE_LIMIT_REQUESTS` - Requests per window per IP (default: 100)
//! - `GALLERY_RATE_LIMIT_WINDOW_SECS` - Rate limit window (default: 900)

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::gallery::DEFAULT_REQUEST_TIMEOUT;
use crate::server::{DEFAULT_RATE_LIMIT_REQUESTS, DEFAULT_RATE_LIMIT_WINDOW};
use crate::storage::{CredentialSource, DEFAULT_DRIVE_API_BASE};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Drive Gallery - serves level-partitioned image galleries from Google Drive.
#[derive(Parser, Debug, Clone)]
#[command(name = "drive-gallery")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "GALLERY_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "GALLERY_PORT")]
    pub port: u16,

    /// Absolute base for generated image URLs (e.g. https://api.example.com).
    ///
    /// If not specified, image URLs are relative (`/api/image/{id}`).
    #[arg(long, env = "GALLERY_PUBLIC_URL")]
    pub public_url: Option<String>,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Frontend base URL. Allowed as a CORS origin.
    #[arg(long, env = "GALLERY_FRONTEND_URL")]
    pub frontend_url: Option<String>,

    /// Additional allowed CORS origin.
    ///
    /// If neither this nor the frontend URL is set, any origin is allowed.
    #[arg(long, env = "GALLERY_ALLOWED_ORIGIN")]
    pub allowed_origin: Option<String>,

    // =========================================================================
    // Storage Configuration
    // =========================================================================
    /// Service-account JSON key, passed inline.
    #[arg(long, env = "GALLERY_CREDENTIALS", hide_env_values = true)]
    pub credentials: Option<String>,

    /// Path to a service-account JSON key file.
    #[arg(long, env = "GALLERY_CREDENTIALS_FILE")]
    pub credentials_file: Option<PathBuf>,

    /// Static bearer token. For local development against emulators only.
    #[arg(long, env = "GALLERY_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Drive API base URL.
    #[arg(long, default_value = DEFAULT_DRIVE_API_BASE, env = "GALLERY_DRIVE_API_BASE")]
    pub drive_api_base: String,

    // =========================================================================
    // Gallery Configuration
    // =========================================================================
    /// Require a 10-digit roll number on every listing request.
    #[arg(long, default_value_t = false, env = "GALLERY_REQUIRE_ROLL_NUMBER")]
    pub require_roll_number: bool,

    /// Timeout for folder resolution plus listing, in seconds.
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs(), env = "GALLERY_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: u64,

    // =========================================================================
    // Rate Limiting
    // =========================================================================
    /// Maximum `/api` requests per client IP per window.
    #[arg(long, default_value_t = DEFAULT_RATE_LIMIT_REQUESTS, env = "GALLERY_RATE_LIMIT_REQUESTS")]
    pub rate_limit_requests: u32,

    /// Rate limit window length, in seconds.
    #[arg(long, default_value_t = DEFAULT_RATE_LIMIT_WINDOW.as_secs(), env = "GALLERY_RATE_LIMIT_WINDOW_SECS")]
    pub rate_limit_window_secs: u64,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        let sources = [
            self.credentials.is_some(),
            self.credentials_file.is_some(),
            self.access_token.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count();

        if sources == 0 {
            return Err("No storage credentials provided. Set --credentials (GALLERY_CREDENTIALS), \
                 --credentials-file (GALLERY_CREDENTIALS_FILE) or --access-token"
                .to_string());
        }
        if sources > 1 {
            return Err(
                "Provide only one of --credentials, --credentials-file and --access-token"
                    .to_string(),
            );
        }

        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }
        if self.rate_limit_requests == 0 {
            return Err("rate_limit_requests must be greater than 0".to_string());
        }
        if self.rate_limit_window_secs == 0 {
            return Err("rate_limit_window_secs must be greater than 0".to_string());
        }

        for (name, value) in [
            ("frontend_url", &self.frontend_url),
            ("allowed_origin", &self.allowed_origin),
            ("public_url", &self.public_url),
        ] {
            if let Some(value) = value {
                url::Url::parse(value).map_err(|e| format!("{} is not a valid URL: {}", name, e))?;
            }
        }

        url::Url::parse(&self.drive_api_base)
            .map_err(|e| format!("drive_api_base is not a valid URL: {}", e))?;

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Allowed CORS origins, or `None` to allow any origin.
    ///
    /// Trailing slashes are stripped since browsers send origins without one.
    pub fn cors_origins(&self) -> Option<Vec<String>> {
        let origins: Vec<String> = [&self.frontend_url, &self.allowed_origin]
            .into_iter()
            .flatten()
            .map(|o| o.trim_end_matches('/').to_string())
            .collect();

        if origins.is_empty() {
            None
        } else {
            Some(origins)
        }
    }

    /// The configured credential source (call validate() first).
    pub fn credential_source(&self) -> Option<CredentialSource> {
        if let Some(ref json) = self.credentials {
            return Some(CredentialSource::InlineKey(json.clone()));
        }
        if let Some(ref path) = self.credentials_file {
            return Some(CredentialSource::KeyFile(path.clone()));
        }
        self.access_token
            .as_ref()
            .map(|token| CredentialSource::StaticToken(token.clone()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }
}

// =============================================================================
// Tests
// =============================================================================
