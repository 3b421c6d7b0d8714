use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Settings error: {0}")]
    Settings(String),
}

/// Failure to turn a location fragment back into a state payload.
///
/// Every stage collapses into this one type; callers never see a partially
/// decoded payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("fragment is not valid base64: {0}")]
    Base64(String),

    #[error("fragment could not be inflated: {0}")]
    Inflate(String),

    #[error("state could not be compressed: {0}")]
    Deflate(String),

    #[error("state envelope is not parsable: {0}")]
    Envelope(String),

    #[error("state envelope has neither short nor long field names")]
    MissingFields,
}

/// Convenience type alias for Results with AppError
pub type Result<T> = std::result::Result<T, AppError>;
