//! Error types for the persistence boundary.

use thiserror::Error;

/// Failure reported by a persistence backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Requested resource does not exist
    #[error("Not found: {what}")]
    NotFound {
        /// Description of the missing resource
        what: String,
    },

    /// The remote side refused the request or the transport failed
    #[error("Request rejected: {0}")]
    Rejected(String),
}

impl BackendError {
    /// Create a not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create a rejection error.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

/// Loading an image's annotation context failed.
///
/// Loading is all-or-nothing: any of these leaves the view without an
/// interactive canvas.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Category/location vocabulary could not be fetched
    #[error("Failed to load configuration: {0}")]
    Config(#[source] BackendError),

    /// Image bytes could not be fetched
    #[error("Failed to load image: {0}")]
    Image(#[source] BackendError),

    /// Image bytes could not be decoded or have no usable size
    #[error("Failed to decode image: {message}")]
    ImageDecode {
        /// Decoder message
        message: String,
    },

    /// Persisted annotations could not be fetched
    #[error("Failed to load annotations: {0}")]
    Annotations(#[source] BackendError),
}

impl LoadError {
    pub fn image_decode(message: impl Into<String>) -> Self {
        Self::ImageDecode {
            message: message.into(),
        }
    }
}

/// Saving the annotation set failed. The in-memory set is left untouched.
#[derive(Error, Debug)]
pub enum SaveError {
    /// Nothing is loaded, or the load failed
    #[error("No annotations loaded")]
    NotReady,

    /// A save for this view is already running
    #[error("A save is already in progress")]
    InFlight,

    /// The backend refused or failed the save
    #[error(transparent)]
    Backend(#[from] BackendError),
}
