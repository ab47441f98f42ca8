//! Talk Board Error Hierarchy
//!
//! Process-level failures (configuration, storage, shutdown signalling) live in
//! [`Error`]. Per-request failures of the talk service live in [`TalkError`],
//! whose `Display` text is exactly what the HTTP layer writes back.

use std::path::PathBuf;

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration loading and validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Document store failures (I/O, corrupt file)
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("{0}")]
    SignalSenderClosed(String),

    /// Unrecoverable failures requiring process termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Disk I/O failures
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("Error occurred at path: {path}")]
    PathError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The store file exists but is not a valid talk mapping
    #[error("Corrupt talk store at {path}: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to serialize talks: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Outcome of a rejected talk-service request.
#[derive(Debug, thiserror::Error)]
pub enum TalkError {
    #[error("Bad talk data")]
    BadTalkData,

    #[error("Bad comment data")]
    BadCommentData,

    #[error("No talk '{0}' found")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
