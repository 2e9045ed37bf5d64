use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BundleError {
    // JSON/parsing errors
    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    // Host errors
    #[error("Extension manifest not found: {}", .path.display())]
    ManifestNotFound { path: PathBuf },

    #[error("Invalid extension manifest {}: {message}", .path.display())]
    InvalidManifest { path: PathBuf, message: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Archive errors
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    // Storage errors
    #[error("Storage error at {path}: {reason}")]
    Storage { path: String, reason: String },

    #[error("Invalid storage path: {0}")]
    InvalidStoragePath(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BundleError>;
