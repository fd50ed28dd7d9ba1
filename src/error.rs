use thiserror::Error;

#[derive(Error, Debug)]
pub enum HgSaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed metadata: {0}")]
    MalformedMetadata(String),

    #[error("Truncated payload: metadata declares {expected} bytes, file has {actual}")]
    TruncatedPayload { expected: usize, actual: usize },

    #[error("Integrity mismatch: {0}")]
    IntegrityMismatch(String),

    #[error("Decompression failure: {0}")]
    DecompressionFailure(String),

    #[error("Unsupported layout: {0}")]
    UnsupportedLayout(String),

    #[error("Compression error: {0}")]
    CompressionError(String),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Invalid format configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid profile key: {0}")]
    InvalidProfileKey(String),
}

pub type Result<T> = std::result::Result<T, HgSaveError>;
