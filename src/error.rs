use exif::Error as ExifError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Walkdir error: {0}")]
    Walkdir(#[from] walkdir::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("EXIF error: {0}")]
    Exif(#[from] ExifError),

    #[error("JSON error: {0}")]
    Json(#[from] SerdeJsonError),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Unknown hash algorithm: {0}")]
    UnknownHashAlgorithm(String),

    #[error("Channel send error")]
    SendError,

    #[error("Channel receive error")]
    RecvError,

    #[error("Generic error: {0}")]
    Generic(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl<T> From<crossbeam_channel::SendError<T>> for AppError {
    fn from(_: crossbeam_channel::SendError<T>) -> Self {
        AppError::SendError
    }
}

impl From<crossbeam_channel::RecvError> for AppError {
    fn from(_: crossbeam_channel::RecvError) -> Self {
        AppError::RecvError
    }
}
