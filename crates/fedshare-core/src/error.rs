use std::path::PathBuf;
use thiserror::Error;

/// Stable error codes for machine-readable output.
pub mod codes {
    pub const CONFIG_READ_FAILED: &str = "CONFIG_READ_FAILED";
    pub const CONFIG_PARSE_FAILED: &str = "CONFIG_PARSE_FAILED";
    pub const PROVIDES_UNEXPECTED_ARRAY: &str = "PROVIDES_UNEXPECTED_ARRAY";
    pub const PROVIDES_INVALID_FORMAT: &str = "PROVIDES_INVALID_FORMAT";
    pub const PROVIDES_INVALID_VERSION: &str = "PROVIDES_INVALID_VERSION";
    pub const INCLUDE_FAILED: &str = "INCLUDE_FAILED";
}

/// Core error type for fedshare operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unexpected array of provides (at '{request}')")]
    UnexpectedArrayOfProvides { request: String },

    #[error("Unexpected options format: {0}")]
    UnexpectedOptionsFormat(String),

    #[error("Invalid version for provide '{request}': expected a string or false")]
    InvalidVersion { request: String },

    #[error(transparent)]
    Include(#[from] IncludeError),
}

impl Error {
    /// Get the stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigRead { .. } => codes::CONFIG_READ_FAILED,
            Self::ConfigParse { .. } => codes::CONFIG_PARSE_FAILED,
            Self::UnexpectedArrayOfProvides { .. } => codes::PROVIDES_UNEXPECTED_ARRAY,
            Self::UnexpectedOptionsFormat(_) => codes::PROVIDES_INVALID_FORMAT,
            Self::InvalidVersion { .. } => codes::PROVIDES_INVALID_VERSION,
            Self::Include(_) => codes::INCLUDE_FAILED,
        }
    }
}

/// Failure reported by the host while adding a provide dependency to the graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to include shared module {resource}: {message}")]
pub struct IncludeError {
    pub resource: String,
    pub message: String,
}

impl IncludeError {
    #[must_use]
    pub fn new(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            message: message.into(),
        }
    }
}
