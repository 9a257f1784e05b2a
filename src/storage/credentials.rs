//! Access tokens for the Drive API.
//!
//! Production deployments authenticate with a Google service account: a JSON
//! key holding the account e-mail and an RSA private key. The key signs a
//! short-lived JWT which is exchanged at the token endpoint for a bearer token
//! (the OAuth 2.0 JWT bearer grant):
//!
//! ```text
//! assertion = RS256(private_key, {iss, scope, aud, iat, exp})
//! POST token_uri  grant_type=urn:ietf:params:oauth:grant-type:jwt-bearer&assertion=...
//!   -> {"access_token": "...", "expires_in": 3599}
//! ```
//!
//! Tokens are cached until shortly before they expire.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::StorageError;

/// Token endpoint used when the key file does not name one.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Read-only Drive scope requested for every token.
pub const DRIVE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each signed assertion (the provider maximum).
const ASSERTION_LIFETIME_SECS: u64 = 3600;

/// Tokens are refreshed this many seconds before they expire.
const REFRESH_MARGIN_SECS: u64 = 60;

// =============================================================================
// Service Account Key
// =============================================================================

/// The fields of a service-account JSON key that token exchange needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Parse a key from its JSON text.
    ///
    /// Keys pasted into environment variables often carry literal `\n`
    /// sequences inside the PEM block; those are turned back into newlines.
    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        let mut key: ServiceAccountKey = serde_json::from_str(json)
            .map_err(|e| StorageError::Auth(format!("invalid service account key: {}", e)))?;

        if key.private_key.contains("\\n") {
            key.private_key = key.private_key.replace("\\n", "\n");
        }
        if key.client_email.is_empty() {
            return Err(StorageError::Auth(
                "service account key has an empty client_email".to_string(),
            ));
        }

        Ok(key)
    }

    /// Read and parse a key file.
    pub fn from_file(path: &Path) -> Result<Self, StorageError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            StorageError::Auth(format!("cannot read key file {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }
}

// =============================================================================
// Credential Source
// =============================================================================

/// Where the server gets its provider credentials from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// A fixed bearer token (development and tests only)
    StaticToken(String),

    /// Service-account JSON passed inline
    InlineKey(String),

    /// Path to a service-account JSON file
    KeyFile(PathBuf),
}

// =============================================================================
// Service Account Auth
// =============================================================================

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_LIFETIME_SECS
}

struct CachedToken {
    token: String,
    expires_at: u64,
}

impl CachedToken {
    fn is_fresh(&self, now: u64) -> bool {
        now + REFRESH_MARGIN_SECS < self.expires_at
    }
}

/// Exchanges signed service-account assertions for bearer tokens.
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    /// Create an authenticator, failing early if the private key is not a valid RSA PEM.
    pub fn new(key: ServiceAccountKey, http: reqwest::Client) -> Result<Self, StorageError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| StorageError::Auth(format!("invalid private key: {}", e)))?;

        Ok(Self {
            key,
            encoding_key,
            http,
            cached: Mutex::new(None),
        })
    }

    /// Service account e-mail, used in startup logs.
    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Return a valid access token, exchanging a new assertion when needed.
    ///
    /// The lock is held across the exchange so concurrent callers wait for a
    /// single refresh instead of each starting their own.
    pub async fn access_token(&self) -> Result<String, StorageError> {
        let mut cached = self.cached.lock().await;
        let now = unix_now();

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.token.clone());
        }

        let fresh = self.exchange(now).await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }

    async fn exchange(&self, now: u64) -> Result<CachedToken, StorageError> {
        let claims = Claims {
            iss: &self.key.client_email,
            scope: DRIVE_READONLY_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| StorageError::Auth(format!("failed to sign assertion: {}", e)))?;

        debug!(token_uri = %self.key.token_uri, "Exchanging service account assertion");

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Auth(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))?;

        info!(expires_in = body.expires_in, "Obtained Drive access token");

        Ok(CachedToken {
            token: body.access_token,
            expires_at: now + body.expires_in,
        })
    }
}

// =============================================================================
// Token Provider
// =============================================================================

/// Supplies bearer tokens to the Drive client.
pub enum TokenProvider {
    /// Always returns the same token
    Static(String),

    /// Service-account JWT bearer flow
    ServiceAccount(ServiceAccountAuth),
}

impl TokenProvider {
    /// Build a provider from a configured credential source.
    pub fn from_source(
        source: CredentialSource,
        http: reqwest::Client,
    ) -> Result<Self, StorageError> {
        match source {
            CredentialSource::StaticToken(token) => Ok(TokenProvider::Static(token)),
            CredentialSource::InlineKey(json) => {
                let key = ServiceAccountKey::from_json(&json)?;
                Ok(TokenProvider::ServiceAccount(ServiceAccountAuth::new(key, http)?))
            }
            CredentialSource::KeyFile(path) => {
                let key = ServiceAccountKey::from_file(&path)?;
                Ok(TokenProvider::ServiceAccount(ServiceAccountAuth::new(key, http)?))
            }
        }
    }

    /// Get a bearer token for the next request.
    pub async fn access_token(&self) -> Result<String, StorageError> {
        match self {
            TokenProvider::Static(token) => Ok(token.clone()),
            TokenProvider::ServiceAccount(auth) => auth.access_token().await,
        }
    }

    /// Short description for startup logging. Never includes secrets.
    pub fn describe(&self) -> String {
        match self {
            TokenProvider::Static(_) => "static bearer token".to_string(),
            TokenProvider::ServiceAccount(auth) => {
                format!("service account {}", auth.client_email())
            }
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
