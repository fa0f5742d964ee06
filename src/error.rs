//! Unified error types for Tally with degrade-to-warning philosophy.
//!
//! Per-skill problems never abort a ledger pass. Data-quality issues are
//! logged as warnings and the affected skill continues with safe defaults;
//! only store and config I/O failures surface as hard errors to the caller.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Tally operations.
#[derive(Error, Debug)]
pub enum TallyError {
    /// I/O errors from ledger file operations.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON parsing/serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },

    /// Skill not found in the ledger.
    #[error("skill not found: {name}")]
    SkillNotFound { name: String },

    /// Malformed skill record (bad dates, impossible level).
    #[error("invalid record for '{name}': {message}")]
    InvalidRecord { name: String, message: String },
}

/// A specialized Result type for Tally operations.
pub type Result<T> = std::result::Result<T, TallyError>;

impl TallyError {
    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a skill-not-found error.
    pub fn skill_not_found(name: impl Into<String>) -> Self {
        Self::SkillNotFound { name: name.into() }
    }

    /// Create an invalid-record error.
    pub fn invalid_record(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl From<io::Error> for TallyError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for TallyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Trait for degrade-to-warning error handling.
///
/// A skill with malformed data should not block the rest of the pass.
/// These methods log the error and substitute a safe default so the
/// pipeline can continue.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;

    /// Handle an error by logging a warning and returning the provided fallback.
    fn fail_open_with(self, context: &str, fallback: T) -> T;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (degraded: using default)", context, err);
                T::default()
            }
        }
    }

    fn fail_open_with(self, context: &str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (degraded: using fallback)", context, err);
                fallback
            }
        }
    }
}
