//! Typed source records
//!
//! Each source document is mapped onto an explicit struct. Every field is
//! optional and defaults to `None` when the document lacks it, carries
//! `null`, an empty string, or a value of the wrong shape.

use crate::types::{JsonObject, JsonValue, SourceKind};
use chrono::{DateTime, DurationRound, TimeDelta, TimeZone, Utc};
use serde::Serialize;

/// A record type that can be built from one JSON object
pub trait SourceRecord: Sized {
    /// Which source this record type is read from
    const KIND: SourceKind;

    /// Build the record from a JSON object, tolerating missing fields
    fn from_object(obj: &JsonObject) -> Self;
}

// ============================================================================
// Catalog
// ============================================================================

/// One song entry from the catalog, with its artist denormalized alongside
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogRecord {
    pub song_id: Option<String>,
    pub title: Option<String>,
    pub year: Option<i32>,
    /// Seconds
    pub duration: Option<f64>,
    pub artist_id: Option<String>,
    pub artist_name: Option<String>,
    pub artist_location: Option<String>,
    pub artist_latitude: Option<f64>,
    pub artist_longitude: Option<f64>,
}

impl SourceRecord for CatalogRecord {
    const KIND: SourceKind = SourceKind::Catalog;

    fn from_object(obj: &JsonObject) -> Self {
        Self {
            song_id: string_field(obj, &["song_id"]),
            title: string_field(obj, &["title"]),
            year: int_field(obj, &["year"]).and_then(|y| i32::try_from(y).ok()),
            duration: float_field(obj, &["duration"]),
            artist_id: string_field(obj, &["artist_id"]),
            artist_name: string_field(obj, &["artist_name"]),
            artist_location: string_field(obj, &["artist_location"]),
            artist_latitude: float_field(obj, &["artist_latitude"]),
            artist_longitude: float_field(obj, &["artist_longitude"]),
        }
    }
}

// ============================================================================
// Activity
// ============================================================================

/// One user activity event from the listening log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRecord {
    pub ts: Option<DateTime<Utc>>,
    pub user_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
    pub page: Option<String>,
    pub session_id: Option<i64>,
    pub location: Option<String>,
    pub user_agent: Option<String>,
    pub song: Option<String>,
    pub artist: Option<String>,
    /// Seconds
    pub length: Option<f64>,
}

impl EventRecord {
    /// Whether this event is a song play carrying both a user and a timestamp
    pub fn is_qualifying_play(&self, play_page: &str) -> bool {
        self.page.as_deref() == Some(play_page) && self.user_id.is_some() && self.ts.is_some()
    }
}

impl SourceRecord for EventRecord {
    const KIND: SourceKind = SourceKind::Activity;

    fn from_object(obj: &JsonObject) -> Self {
        Self {
            ts: timestamp_field(obj, &["ts"]),
            user_id: string_field(obj, &["userId", "user_id"]),
            first_name: string_field(obj, &["firstName", "first_name"]),
            last_name: string_field(obj, &["lastName", "last_name"]),
            gender: string_field(obj, &["gender"]),
            level: string_field(obj, &["level"]),
            page: string_field(obj, &["page"]),
            session_id: int_field(obj, &["sessionId", "session_id"]),
            location: string_field(obj, &["location"]),
            user_agent: string_field(obj, &["userAgent", "user_agent"]),
            song: string_field(obj, &["song"]),
            artist: string_field(obj, &["artist"]),
            length: float_field(obj, &["length"]),
        }
    }
}

// ============================================================================
// Read results
// ============================================================================

/// Counters collected while reading one source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReadStats {
    /// Files fetched
    pub files: usize,
    /// Documents found in those files (including malformed ones)
    pub documents: usize,
    /// Records produced
    pub records: usize,
    /// Documents skipped as malformed
    pub malformed: usize,
}

/// Records read from one source plus their counters
#[derive(Debug, Clone)]
pub struct ReadOutcome<T> {
    pub records: Vec<T>,
    pub stats: ReadStats,
}

// ============================================================================
// Field extraction
// ============================================================================

fn lookup<'a>(obj: &'a JsonObject, keys: &[&str]) -> Option<&'a JsonValue> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

pub(crate) fn string_field(obj: &JsonObject, keys: &[&str]) -> Option<String> {
    match lookup(obj, keys)? {
        JsonValue::String(s) if s.trim().is_empty() => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn float_field(obj: &JsonObject, keys: &[&str]) -> Option<f64> {
    let value = match lookup(obj, keys)? {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|f| f.is_finite())
}

#[allow(clippy::cast_precision_loss, clippy::float_cmp)]
pub(crate) fn int_field(obj: &JsonObject, keys: &[&str]) -> Option<i64> {
    match lookup(obj, keys)? {
        JsonValue::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        JsonValue::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Epoch milliseconds (number or digit string) or an RFC 3339 string, as UTC
///
/// Sub-millisecond digits are truncated: timestamps are stored at
/// millisecond precision, and two events in the same millisecond share a key.
pub(crate) fn timestamp_field(obj: &JsonObject, keys: &[&str]) -> Option<DateTime<Utc>> {
    if let Some(JsonValue::String(s)) = lookup(obj, keys) {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s.trim()) {
            let dt = dt.with_timezone(&Utc);
            return Some(dt.duration_trunc(TimeDelta::milliseconds(1)).unwrap_or(dt));
        }
    }
    let millis = int_field(obj, keys)?;
    Utc.timestamp_millis_opt(millis).single()
}
