//! Input error types.
//!
//! These errors are fatal for a whole run: a missing or unreadable input
//! file means no evaluation can be scanned. Problems inside a single
//! evaluation are never surfaced as errors; the scanner leaves the affected
//! field absent and moves on.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while loading the evaluation corpus or vocabularies.
#[derive(Debug, Error)]
pub enum InputError {
    /// The file does not exist.
    #[error("{resource} not found: {}", path.display())]
    NotFound {
        resource: &'static str,
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("failed to read {resource} {}: {source}", path.display())]
    Unreadable {
        resource: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was read but its JSON or CSV structure is malformed.
    #[error("failed to decode {resource} {}: {message}", path.display())]
    Undecodable {
        resource: &'static str,
        path: PathBuf,
        message: String,
    },
}

impl InputError {
    /// The path of the input that caused the failure.
    pub fn path(&self) -> &Path {
        match self {
            InputError::NotFound { path, .. }
            | InputError::Unreadable { path, .. }
            | InputError::Undecodable { path, .. } => path,
        }
    }

    /// Returns `true` if the file was missing rather than unreadable.
    pub fn is_missing(&self) -> bool {
        matches!(self, InputError::NotFound { .. })
    }
}
