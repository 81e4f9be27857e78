//! Dimension builder implementations

use super::types::{
    ArtistRecord, Dimension, DimensionStats, Keyed, SongRecord, TimeRecord, UserRecord,
};
use crate::reader::{CatalogRecord, EventRecord};
use crate::types::{Gender, Level};
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

// ============================================================================
// Deduplication
// ============================================================================

/// Deduplicate rows by key, keeping the last row written for each key
///
/// Output order is the order in which each key was first seen, so the
/// result is deterministic for a given input order.
fn dedup_last_write_wins<T>(
    table: &str,
    rows: impl IntoIterator<Item = T>,
    stats: &mut DimensionStats,
) -> Vec<T>
where
    T: Keyed + PartialEq,
{
    let mut index: HashMap<T::Key, usize> = HashMap::new();
    let mut out: Vec<T> = Vec::new();

    for row in rows {
        match index.get(row.key()) {
            Some(&pos) => {
                stats.duplicates += 1;
                if out[pos] != row {
                    stats.conflicts += 1;
                    warn!(table, key = %row.key(), "Conflicting attributes for duplicate key, keeping last");
                }
                out[pos] = row;
            }
            None => {
                index.insert(row.key().clone(), out.len());
                out.push(row);
            }
        }
    }

    stats.rows = out.len();
    out
}

// ============================================================================
// Songs & Artists
// ============================================================================

/// Build the songs dimension from catalog records
pub fn build_songs(records: &[CatalogRecord]) -> Dimension<SongRecord> {
    let mut stats = DimensionStats {
        input: records.len(),
        ..Default::default()
    };

    let candidates: Vec<SongRecord> = records
        .iter()
        .filter_map(|r| {
            let Some(song_id) = r.song_id.clone() else {
                stats.missing_key += 1;
                return None;
            };
            let duration = match r.duration {
                Some(d) if d < 0.0 => {
                    debug!(song_id = %song_id, duration = d, "Dropping negative duration");
                    None
                }
                other => other,
            };
            Some(SongRecord {
                song_id,
                title: r.title.clone(),
                artist_id: r.artist_id.clone(),
                year: r.year,
                duration,
            })
        })
        .collect();

    let rows = dedup_last_write_wins("songs", candidates, &mut stats);
    Dimension { rows, stats }
}

/// Build the artists dimension from catalog records
pub fn build_artists(records: &[CatalogRecord]) -> Dimension<ArtistRecord> {
    let mut stats = DimensionStats {
        input: records.len(),
        ..Default::default()
    };

    let candidates: Vec<ArtistRecord> = records
        .iter()
        .filter_map(|r| {
            let Some(artist_id) = r.artist_id.clone() else {
                stats.missing_key += 1;
                return None;
            };
            Some(ArtistRecord {
                artist_id,
                name: r.artist_name.clone(),
                location: r.artist_location.clone(),
                latitude: r.artist_latitude,
                longitude: r.artist_longitude,
            })
        })
        .collect();

    let rows = dedup_last_write_wins("artists", candidates, &mut stats);
    Dimension { rows, stats }
}

// ============================================================================
// Users
// ============================================================================

/// Build the users dimension from qualifying play events
///
/// For each user the attributes come from the event with the latest
/// timestamp; on equal timestamps the later event in input order wins.
/// Differing attributes across a user's events (typically a level change)
/// are counted as conflicts but are expected.
pub fn build_users(events: &[&EventRecord]) -> Dimension<UserRecord> {
    let mut stats = DimensionStats {
        input: events.len(),
        ..Default::default()
    };

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut latest: Vec<(DateTime<Utc>, UserRecord)> = Vec::new();

    for event in events {
        let (Some(user_id), Some(ts)) = (&event.user_id, event.ts) else {
            stats.missing_key += 1;
            continue;
        };

        let user = UserRecord {
            user_id: user_id.clone(),
            first_name: event.first_name.clone(),
            last_name: event.last_name.clone(),
            gender: Gender::parse(event.gender.as_deref()),
            level: Level::parse(event.level.as_deref()),
        };

        match index.get(user_id) {
            Some(&pos) => {
                stats.duplicates += 1;
                let (seen_ts, seen) = &latest[pos];
                if *seen != user {
                    stats.conflicts += 1;
                    debug!(user_id = %user_id, "User attributes changed between events");
                }
                if ts >= *seen_ts {
                    latest[pos] = (ts, user);
                }
            }
            None => {
                index.insert(user_id.clone(), latest.len());
                latest.push((ts, user));
            }
        }
    }

    let rows: Vec<UserRecord> = latest.into_iter().map(|(_, user)| user).collect();
    stats.rows = rows.len();
    Dimension { rows, stats }
}

// ============================================================================
// Time
// ============================================================================

/// Build the time dimension: one row per distinct event timestamp, ascending
pub fn build_time(events: &[&EventRecord]) -> Dimension<TimeRecord> {
    let mut stats = DimensionStats {
        input: events.len(),
        ..Default::default()
    };

    let mut distinct: BTreeSet<DateTime<Utc>> = BTreeSet::new();
    for event in events {
        match event.ts {
            Some(ts) => {
                if !distinct.insert(ts) {
                    stats.duplicates += 1;
                }
            }
            None => stats.missing_key += 1,
        }
    }

    let rows: Vec<TimeRecord> = distinct
        .into_iter()
        .map(TimeRecord::from_timestamp)
        .collect();
    stats.rows = rows.len();
    Dimension { rows, stats }
}
