//! Error types for mig-core

use thiserror::Error;

/// Core error type for mig
#[derive(Error, Debug)]
pub enum CoreError {
    /// M001: Configuration file not found
    #[error("[M001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// M002: Failed to parse configuration file
    #[error("[M002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// M003: Invalid configuration value
    #[error("[M003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// M004: Describe script does not exist
    #[error("[M004] Describe script not found at {path}")]
    DescribeScriptNotFound { path: String },

    /// M005: Describe script exited non-zero or could not be spawned
    #[error("[M005] Failed to run describe {field}: {message}")]
    DescribeFailed { field: String, message: String },

    /// M006: No describe script under any candidate path of a submodule
    #[error("[M006] Submodule {path} has no describe script")]
    SubmoduleDescribeMissing { path: String },

    /// M007: `git submodule` could not be listed
    #[error("[M007] Failed to get git submodules: {message}")]
    SubmoduleListFailed { message: String },

    /// M008: A migration file with this name already exists
    #[error("[M008] Migration file already exists: {path}")]
    MigrationExists { path: String },

    /// M009: IO error
    #[error("[M009] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// M010: IO error with file path context
    #[error("[M010] Failed to access '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// M011: Sequence numbers for a prefix are used up
    #[error("[M011] No sequence number left after {prefix}-{last}")]
    SequenceExhausted { prefix: String, last: u32 },
}

impl CoreError {
    /// Wrap an IO error with the path it occurred on
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        CoreError::IoWithPath {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
