//! Common types used throughout songplay-etl
//!
//! This module contains shared type definitions, type aliases,
//! and small enums used across multiple modules.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Source Kind
// ============================================================================

/// Which of the two independent record sources a read targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Song/artist catalog documents
    Catalog,
    /// User activity (listening log) events
    Activity,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Catalog => write!(f, "catalog"),
            SourceKind::Activity => write!(f, "activity"),
        }
    }
}

// ============================================================================
// Execution Mode
// ============================================================================

/// How the execution context schedules I/O
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Single worker, everything in sequence
    #[default]
    Local,
    /// Bounded concurrent fetches and table writes
    Cluster,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Local => write!(f, "local"),
            ExecutionMode::Cluster => write!(f, "cluster"),
        }
    }
}

// ============================================================================
// User attributes
// ============================================================================

/// Gender as reported by the activity log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl Gender {
    /// Parse a raw gender marker; anything other than M/F is `Unknown`
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("M" | "m") => Gender::Male,
            Some("F" | "f") => Gender::Female,
            _ => Gender::Unknown,
        }
    }
}

/// Subscription level of a user at the time of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Free,
    Paid,
}

impl Level {
    /// Parse a raw level string, case-insensitively
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("free") => Some(Level::Free),
            Some("paid") => Some(Level::Paid),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Free => "free",
            Level::Paid => "paid",
        }
    }
}

// ============================================================================
// Output tables
// ============================================================================

/// The five tables of the star schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableName {
    Songplays,
    Users,
    Songs,
    Artists,
    Time,
}

impl TableName {
    /// All tables, in write order
    pub const ALL: [TableName; 5] = [
        TableName::Songs,
        TableName::Artists,
        TableName::Users,
        TableName::Time,
        TableName::Songplays,
    ];

    /// Directory name under the output root
    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::Songplays => "songplays",
            TableName::Users => "users",
            TableName::Songs => "songs",
            TableName::Artists => "artists",
            TableName::Time => "time",
        }
    }

    /// Hive partition columns, outermost first
    pub fn partition_columns(&self) -> &'static [&'static str] {
        match self {
            TableName::Songplays => &["year", "month"],
            TableName::Songs => &["year", "artist_id"],
            TableName::Users | TableName::Artists | TableName::Time => &[],
        }
    }

    /// Look up a table by its directory name
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
