use std::path::PathBuf;
use thiserror::Error;

/// Failures reported by the file store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to open database: {0}")]
    Open(String),

    #[error("Failed to write to file store: {0}")]
    Write(String),

    #[error("Failed to read from file store: {0}")]
    Read(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Why an upload sequence stopped early.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Failed to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config value: {0}")]
    Invalid(String),
}
