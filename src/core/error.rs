//! Error types and error handling for the haystack service.
//!
//! This module defines the error types used throughout the
//! application. The key distinction is fatal startup errors
//! (bad configuration, unreadable corpus, failed bind) versus
//! per-connection errors that are recovered locally.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for haystack operations
pub type Result<T> = std::result::Result<T, HaystackError>;

/// Main error type for the haystack service
#[derive(Error, Debug)]
pub enum HaystackError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to load corpus {path}: {source}")]
    CorpusLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("transport error: {0}")]
    Transport(std::io::Error),

    #[error("TLS setup error: {0}")]
    Tls(String),

    #[error("session error: {0}")]
    Session(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl HaystackError {
    /// Get user-friendly error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Errors that must abort startup: the process never begins
    /// listening when one of these is raised.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            HaystackError::Config(_)
                | HaystackError::CorpusLoad { .. }
                | HaystackError::Transport(_)
                | HaystackError::Tls(_)
                | HaystackError::TomlParse(_)
        )
    }

    /// Errors scoped to a single connection; the listener and all
    /// other sessions continue unaffected.
    pub fn is_session(&self) -> bool {
        matches!(self, HaystackError::Session(_) | HaystackError::Io(_))
    }
}
