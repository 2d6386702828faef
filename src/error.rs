//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid album name: {0:?}")]
    InvalidAlbumName(String),

    #[error("Unsupported file: {0} (expected .jpg or .png)")]
    UnsupportedFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("S3 error: {0}")]
    Storage(String),

    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
