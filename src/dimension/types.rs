//! Dimension row types

use crate::types::{Gender, Level};
use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::Serialize;
use std::fmt::Display;
use std::hash::Hash;

/// A row with a primary key
pub trait Keyed {
    type Key: Eq + Hash + Clone + Display;

    fn key(&self) -> &Self::Key;
}

/// One song of the catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongRecord {
    pub song_id: String,
    pub title: Option<String>,
    pub artist_id: Option<String>,
    pub year: Option<i32>,
    /// Seconds, never negative
    pub duration: Option<f64>,
}

impl Keyed for SongRecord {
    type Key = String;

    fn key(&self) -> &String {
        &self.song_id
    }
}

/// One artist of the catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistRecord {
    pub artist_id: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Keyed for ArtistRecord {
    type Key = String;

    fn key(&self) -> &String {
        &self.artist_id
    }
}

/// One user, as last observed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Gender,
    pub level: Option<Level>,
}

impl Keyed for UserRecord {
    type Key = String;

    fn key(&self) -> &String {
        &self.user_id
    }
}

/// Calendar breakdown of one event timestamp
///
/// All fields are computed in UTC:
/// - `hour` 0-23
/// - `day` day of month, 1-31
/// - `week` ISO-8601 week number, 1-53
/// - `month` 1-12
/// - `year` calendar year (not the ISO week-year)
/// - `weekday` ISO-8601, Monday = 1 through Sunday = 7
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRecord {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,
    pub hour: i32,
    pub day: i32,
    pub week: i32,
    pub month: i32,
    pub year: i32,
    pub weekday: i32,
}

impl TimeRecord {
    pub fn from_timestamp(start_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            hour: start_time.hour() as i32,
            day: start_time.day() as i32,
            week: start_time.iso_week().week() as i32,
            month: start_time.month() as i32,
            year: start_time.year(),
            weekday: start_time.weekday().number_from_monday() as i32,
        }
    }
}

impl Keyed for TimeRecord {
    type Key = DateTime<Utc>;

    fn key(&self) -> &DateTime<Utc> {
        &self.start_time
    }
}

/// Counters for one dimension build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DimensionStats {
    /// Input records considered
    pub input: usize,
    /// Rows in the built table
    pub rows: usize,
    /// Input records dropped for lacking a primary key
    pub missing_key: usize,
    /// Input records whose key was already seen
    pub duplicates: usize,
    /// Duplicates whose attributes differed from the row they collided with
    pub conflicts: usize,
}

/// A built dimension table
#[derive(Debug, Clone)]
pub struct Dimension<T> {
    pub rows: Vec<T>,
    pub stats: DimensionStats,
}

impl<T> Dimension<T> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
