//! Error types for canvass.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CanvassError {
    #[error("No marker with address id {0}")]
    MarkerNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A form fragment failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("field `{0}` is required")]
    Missing(&'static str),

    #[error("field `{0}` must not be blank")]
    Blank(&'static str),
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Missing(f) | ValidationError::Blank(f) => f,
        }
    }
}

/// The backend could not be told about a new address or unit.
#[derive(Error, Debug, Clone)]
pub enum RegistrationError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Server returned {status} for {path}")]
    Status { status: u16, path: String },

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),
}
