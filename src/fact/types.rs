//! Fact table types

use crate::types::Level;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One song play
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongplayRecord {
    pub songplay_id: i64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,
    pub user_id: String,
    pub level: Option<Level>,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub session_id: Option<i64>,
    pub location: Option<String>,
    pub user_agent: Option<String>,
    /// Partition column, calendar year of `start_time`
    pub year: i32,
    /// Partition column, month of `start_time`
    pub month: i32,
}

/// Counters for one fact assembly
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FactStats {
    /// Events handed to the assembler
    pub input: usize,
    /// Rows emitted
    pub rows: usize,
    /// Rows with song_id and artist_id resolved
    pub resolved: usize,
    /// Rows left with null song_id and artist_id
    pub unresolved: usize,
    /// Events skipped for lacking a user or timestamp
    pub incomplete: usize,
}

/// The assembled fact table
#[derive(Debug, Clone)]
pub struct FactTable {
    pub rows: Vec<SongplayRecord>,
    pub stats: FactStats,
}
