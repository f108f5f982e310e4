//! Central error types for cmodel.
//!
//! Uses `thiserror` for ergonomic error definitions with automatic
//! `Display` and `From` implementations.
//!
//! The error taxonomy distinguishes failures that abort extraction for a
//! whole platform (parse failures, unclassifiable types, unhandled macro
//! evaluation kinds) from per-symbol conditions that are handled inline:
//! a node that fails to materialize is `Ok(None)` at the explorer level,
//! never an error.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum CModelError {
    /// IO operation failed (without path context - prefer IoWithPath when path is available)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// IO operation failed with path context for better error messages
    #[error("IO error at {path}: {error}")]
    IoWithPath {
        error: std::io::Error,
        path: PathBuf,
    },

    /// The front end failed to parse a translation unit.
    ///
    /// Fatal for the platform being extracted; other platforms are unaffected.
    #[error("Parse error in {file}: {message}")]
    Parse { file: String, message: String },

    /// A type kind reached the classifier that it has no mapping for.
    #[error("Unsupported type kind {kind} for type '{type_name}'")]
    UnsupportedType { kind: String, type_name: String },

    /// A macro evaluated to a result kind with no handling.
    ///
    /// Silently producing a wrong value would poison the cross-platform
    /// merge, so this is fatal rather than skip-and-continue.
    #[error("Macro '{name}' evaluated to unsupported result kind: {kind}")]
    UnsupportedMacroValue { name: String, kind: String },

    /// The merger was handed structurally impossible input.
    #[error("Merge error: {0}")]
    Merge(String),

    /// Configuration error (e.g., an invalid ignore pattern)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid regular expression in a name-filter list
    #[error("Invalid name pattern '{pattern}': {error}")]
    Pattern { pattern: String, error: regex::Error },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Convenience type alias for Results using CModelError.
pub type Result<T> = std::result::Result<T, CModelError>;

impl CModelError {
    /// Create an IO error with path context.
    ///
    /// Use this when reading/writing files to provide actionable error
    /// messages that include the file path that failed.
    #[inline]
    pub fn io_with_path(error: std::io::Error, path: impl AsRef<Path>) -> Self {
        CModelError::IoWithPath {
            error,
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a parse error for the given translation unit path.
    #[inline]
    pub fn parse(file: impl AsRef<Path>, message: impl Into<String>) -> Self {
        CModelError::Parse {
            file: file.as_ref().display().to_string(),
            message: message.into(),
        }
    }
}
