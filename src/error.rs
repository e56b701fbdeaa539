//! Error handling types and utilities.

use std::path::PathBuf;

/// A specialized Result type for doxidx operations.
///
/// This is an alias for `anyhow::Result` with context added via `.context()`
/// and `.with_context()` methods throughout the codebase.
pub type Result<T> = anyhow::Result<T>;

/// Error returned when loading a search directory fails.
#[derive(Debug, Clone)]
pub enum LoadError {
    /// No search directory at the expected path.
    NotFound { path: PathBuf },
    /// A file in the directory failed to read or parse.
    ParseError { path: PathBuf, error: String },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { path } => {
                write!(f, "Search directory not found at {}", path.display())
            }
            Self::ParseError { path, error } => {
                write!(f, "Failed to load {}: {}", path.display(), error)
            }
        }
    }
}

impl std::error::Error for LoadError {}
