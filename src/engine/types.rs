//! Engine types
//!
//! The in-memory star schema and the report emitted at the end of a run.

use crate::dimension::{ArtistRecord, Dimension, DimensionStats, SongRecord, TimeRecord, UserRecord};
use crate::fact::{FactStats, FactTable};
use crate::output::TableReport;
use crate::reader::ReadStats;
use crate::types::ExecutionMode;
use serde::Serialize;

/// Counters from splitting the activity log into plays
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlayStats {
    /// Events that qualify as song plays
    pub qualifying: usize,
    /// Events with another page value
    pub non_play: usize,
    /// Play events lacking a user id or timestamp
    pub incomplete: usize,
}

/// Counters from the song lookup used to resolve fact keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LookupStats {
    /// Distinct (title, artist name, duration) keys indexed
    pub keys: usize,
    /// Songs shadowed by an earlier song with the same key
    pub ambiguous: usize,
}

/// All five tables, built and ready to write
#[derive(Debug, Clone)]
pub struct StarSchema {
    pub songs: Dimension<SongRecord>,
    pub artists: Dimension<ArtistRecord>,
    pub users: Dimension<UserRecord>,
    pub time: Dimension<TimeRecord>,
    pub songplays: FactTable,
    pub plays: PlayStats,
    pub lookup: LookupStats,
}

/// Per-dimension build counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DimensionReport {
    pub songs: DimensionStats,
    pub artists: DimensionStats,
    pub users: DimensionStats,
    pub time: DimensionStats,
}

/// Everything a run did, in one serializable value
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub mode: ExecutionMode,
    pub catalog: ReadStats,
    pub activity: ReadStats,
    pub plays: PlayStats,
    pub lookup: LookupStats,
    pub dimensions: DimensionReport,
    pub songplays: FactStats,
    pub tables: Vec<TableReport>,
    pub duration_ms: u64,
}

impl RunReport {
    /// Total malformed documents skipped across both sources
    pub fn malformed(&self) -> usize {
        self.catalog.malformed + self.activity.malformed
    }

    /// Total duplicate-key conflicts across the catalog dimensions
    pub fn conflicts(&self) -> usize {
        self.dimensions.songs.conflicts + self.dimensions.artists.conflicts
    }
}
