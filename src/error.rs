//! Unified error hierarchy for liftrs
//!
//! The statistics engine itself never fails; these errors cover loading
//! session histories, configuration and I/O around it.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all liftrs operations
#[derive(Debug, Error)]
pub enum LiftError {
    /// Session history import errors
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Session history import errors
#[derive(Debug, Error)]
pub enum ImportError {
    /// File not found at specified path
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// No loader handles this file type
    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },

    /// Format-specific parsing error
    #[error("Parse error in {format}: {reason}")]
    ParseError { format: String, reason: String },

    /// Document layout is not a session list
    #[error("Invalid data structure: {reason}")]
    InvalidStructure { reason: String },
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be parsed
    #[error("Failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// Config could not be serialized
    #[error("Failed to serialize configuration: {reason}")]
    Serialize { reason: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {key}")]
    UnknownKey { key: String },

    /// Value rejected for a known key
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Result type alias for liftrs operations
pub type Result<T> = std::result::Result<T, LiftError>;

impl LiftError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LiftError::Import(ImportError::FileNotFound { .. }) => ErrorSeverity::Warning,
            LiftError::Config(ConfigError::UnknownKey { .. }) => ErrorSeverity::Warning,
            LiftError::Validation(_) => ErrorSeverity::Warning,
            LiftError::Internal(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            LiftError::Import(ImportError::FileNotFound { path }) => {
                format!("Could not find session history: {}", path.display())
            }
            LiftError::Import(ImportError::UnsupportedFormat { format }) => {
                format!(
                    "Session files must be JSON or CSV (got '{}')",
                    format
                )
            }
            LiftError::Config(ConfigError::UnknownKey { key }) => {
                format!("'{}' is not a configuration key. Use `liftrs config --list`.", key)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical system error requiring immediate attention
    Critical,
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical | ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}
