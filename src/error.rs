use thiserror::Error;

/// Errors that can occur when talking to the storage provider
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// The provider answered with a non-success status
    #[error("Drive API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Network or connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// File or folder not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Could not obtain an access token
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The provider returned a body we could not decode
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Rejections produced while validating gallery query parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No level was supplied
    #[error("Level is required")]
    MissingLevel,

    /// Level is not one of UG, PG, PHD
    #[error("Invalid level: {0} (expected one of UG, PG, PHD)")]
    InvalidLevel(String),

    /// Roll number is required but absent
    #[error("Roll number is required")]
    MissingRollNumber,

    /// Roll number is not exactly ten digits
    #[error("Invalid roll number: must be exactly 10 digits")]
    InvalidRollNumber,

    /// Query string could not be decoded at all
    #[error("Malformed query string: {0}")]
    MalformedQuery(String),
}

/// Errors surfaced by the gallery service
#[derive(Debug, Clone, Error)]
pub enum GalleryError {
    /// Request parameters failed validation (HTTP 400)
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A folder along the resolution path does not exist.
    ///
    /// The service turns this into an empty image list; it only escapes when
    /// the resolver is used directly.
    #[error("Folder not found: {path}")]
    FolderNotFound { path: String },

    /// Resolve-and-list did not finish in time
    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Upstream storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
