//! Error types for `Universalis`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `Universalis` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal failed.
    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    // ==================== Engine Errors ====================
    /// Error raised by the script engine.
    #[error(transparent)]
    Engine(#[from] clausewitz::Error),

    /// A file could not be scanned.
    #[error("{}: {source}", path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: clausewitz::error::ScanError,
    },

    // ==================== Settings Errors ====================
    /// Settings file is not valid TOML or does not match the schema.
    #[error("invalid settings: {0}")]
    Settings(#[from] toml::de::Error),

    /// Settings could not be serialized.
    #[error("settings serialization failed: {0}")]
    SettingsSerialize(#[from] toml::ser::Error),

    /// A setting the run needs was not supplied.
    #[error("Missing required setting: {key}")]
    MissingSetting {
        /// The settings key, as written in the TOML file.
        key: &'static str,
    },

    // ==================== Output Errors ====================
    /// Two outputs were registered for the same path.
    #[error("output path registered twice: {}", path.display())]
    DuplicateOutput {
        /// Path relative to the mod root.
        path: PathBuf,
    },

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for `Universalis` operations.
pub type Result<T> = std::result::Result<T, Error>;
