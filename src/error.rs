//! Error types for songplay-etl
//!
//! This module defines the error hierarchy for the whole pipeline.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Only unrecoverable conditions are errors. Data-quality conditions
//! (malformed records, unresolved dimension keys, duplicate-key conflicts)
//! are counted in the run report and never surface as an `Error`.

use crate::types::SourceKind;
use thiserror::Error;

/// The main error type for songplay-etl
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Source Errors
    // ============================================================================
    #[error("Cannot read {kind} source at '{location}': {message}")]
    SourceUnreadable {
        kind: SourceKind,
        location: String,
        message: String,
    },

    // ============================================================================
    // Arrow/Parquet Errors
    // ============================================================================
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Schema mismatch for table '{table}': {message}")]
    Schema { table: String, message: String },

    #[error("Output error: {message}")]
    Output { message: String },

    // ============================================================================
    // Storage Errors
    // ============================================================================
    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("Failed to write table '{table}' to '{location}': {message}")]
    TableWrite {
        table: String,
        location: String,
        message: String,
    },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a source unreadable error
    pub fn source_unreadable(
        kind: SourceKind,
        location: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::SourceUnreadable {
            kind,
            location: location.into(),
            message: message.into(),
        }
    }

    /// Create a schema mismatch error
    pub fn schema(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Create a table write error
    pub fn table_write(
        table: impl Into<String>,
        location: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::TableWrite {
            table: table.into(),
            location: location.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for songplay-etl
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("output");
        assert_eq!(err.to_string(), "Missing required config field: output");

        let err = Error::table_write("songs", "file:///tmp/out/songs", "disk full");
        assert_eq!(
            err.to_string(),
            "Failed to write table 'songs' to 'file:///tmp/out/songs': disk full"
        );
    }

    #[test]
    fn test_source_unreadable_names_kind_and_location() {
        let err = Error::source_unreadable(SourceKind::Activity, "/data/log_data", "not found");
        let msg = err.to_string();
        assert!(msg.contains("activity"));
        assert!(msg.contains("/data/log_data"));
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
