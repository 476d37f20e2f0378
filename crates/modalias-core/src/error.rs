use std::path::PathBuf;
use thiserror::Error;

/// Core error type for modalias operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid specifier {specifier:?}: {reason}")]
    InvalidSpecifier { specifier: String, reason: &'static str },

    #[error("Invalid alias prefix {prefix:?}: {reason}")]
    InvalidPrefix { prefix: String, reason: &'static str },

    #[error("Alias prefix {prefix:?} is declared more than once")]
    DuplicatePrefix { prefix: String },

    #[error("Alias {prefix:?} targets {target}, which is not an absolute path")]
    RelativeTarget { prefix: String, target: PathBuf },

    #[error("Config file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("{0}")]
    Other(String),
}

impl Error {
    #[must_use]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Stable machine-readable code used in JSON output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IO_ERROR",
            Self::InvalidSpecifier { .. } => "INVALID_SPECIFIER",
            Self::InvalidPrefix { .. } => "INVALID_PREFIX",
            Self::DuplicatePrefix { .. } => "DUPLICATE_PREFIX",
            Self::RelativeTarget { .. } => "RELATIVE_TARGET",
            Self::ConfigNotFound { .. } => "CONFIG_NOT_FOUND",
            Self::ConfigRead { .. } => "CONFIG_READ_FAILED",
            Self::ConfigParse { .. } => "CONFIG_PARSE_FAILED",
            Self::Other(_) => "INTERNAL_ERROR",
        }
    }
}
