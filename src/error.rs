//! Error types for sqlgen.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for sqlgen operations.
///
/// The scanner itself never fails; every variant here comes from parsing
/// configuration values or from the file-processing collaborators.
#[derive(Debug, Error)]
pub enum SqlGenError {
    /// Unrecognized bind style name.
    #[error("Unknown bind style: '{0}'. Expected: question, dollar, named, at, or unknown")]
    UnknownBindStyle(String),

    /// Failed to read a discovered source file.
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the generated output.
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed while walking the source tree.
    #[error("Failed to walk {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A path that cannot be turned into an identifier.
    #[error("Invalid path {}: {message}", .path.display())]
    InvalidPath { path: PathBuf, message: String },

    /// A source file over the configured size limit.
    #[error("{} is {size} bytes, over the {limit} byte limit", .path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    /// Two files produce the same generated type name.
    #[error("Duplicate query name '{name}': {} and {}", .first.display(), .second.display())]
    DuplicateQuery {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Two distinct parameters in one file produce the same field name.
    #[error("Parameters '{first}' and '{second}' in {} both map to field '{field}'", .path.display())]
    FieldCollision {
        path: PathBuf,
        field: String,
        first: String,
        second: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Permission string that is not octal.
    #[error("Invalid permissions '{0}': expected an octal string such as 0644")]
    InvalidPermissions(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SqlGenError {
    /// Create an invalid path error.
    pub fn invalid_path(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a read error for the given file.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Create a write error for the given file.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for sqlgen operations.
pub type SqlGenResult<T> = Result<T, SqlGenError>;
