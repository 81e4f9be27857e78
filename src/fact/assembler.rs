//! Songplay assembly

use super::types::{FactStats, FactTable, SongplayRecord};
use crate::dimension::{ArtistRecord, Dimension, SongRecord};
use crate::reader::EventRecord;
use crate::types::Level;
use chrono::Datelike;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;

// ============================================================================
// Play selection
// ============================================================================

/// Activity events split by whether they are qualifying plays
#[derive(Debug, Clone)]
pub struct PlaySelection<'a> {
    /// Qualifying plays, in input order
    pub plays: Vec<&'a EventRecord>,
    /// Events with another page value
    pub non_play: usize,
    /// Play events lacking a user id or timestamp
    pub incomplete: usize,
}

/// Keep only events whose page is `play_page` and that carry a user and timestamp
pub fn select_plays<'a>(events: &'a [EventRecord], play_page: &str) -> PlaySelection<'a> {
    let mut selection = PlaySelection {
        plays: Vec::new(),
        non_play: 0,
        incomplete: 0,
    };

    for event in events {
        if event.page.as_deref() != Some(play_page) {
            selection.non_play += 1;
        } else if event.is_qualifying_play(play_page) {
            selection.plays.push(event);
        } else {
            selection.incomplete += 1;
        }
    }

    selection
}

// ============================================================================
// Song lookup
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MatchKey {
    title: String,
    artist_name: String,
    duration_bits: u64,
}

impl MatchKey {
    #[allow(clippy::float_cmp)]
    fn new(title: &str, artist_name: &str, duration: f64) -> Self {
        // -0.0 and 0.0 compare equal but differ in bits
        let duration = if duration == 0.0 { 0.0 } else { duration };
        Self {
            title: title.to_string(),
            artist_name: artist_name.to_string(),
            duration_bits: duration.to_bits(),
        }
    }
}

/// Exact-match index from (title, artist name, duration) to (song_id, artist_id)
#[derive(Debug, Clone, Default)]
pub struct SongLookup {
    index: HashMap<MatchKey, (String, String)>,
    ambiguous: usize,
}

impl SongLookup {
    /// Index every song whose title, duration and artist name are all known
    ///
    /// When two songs share a match key, the first one in dimension order is
    /// kept.
    pub fn build(songs: &Dimension<SongRecord>, artists: &Dimension<ArtistRecord>) -> Self {
        let names: HashMap<&str, &str> = artists
            .rows
            .iter()
            .filter_map(|a| Some((a.artist_id.as_str(), a.name.as_deref()?)))
            .collect();

        let mut lookup = Self::default();
        for song in &songs.rows {
            let (Some(title), Some(duration), Some(artist_id)) =
                (&song.title, song.duration, &song.artist_id)
            else {
                continue;
            };
            let Some(artist_name) = names.get(artist_id.as_str()) else {
                continue;
            };

            match lookup.index.entry(MatchKey::new(title, artist_name, duration)) {
                Entry::Occupied(existing) => {
                    lookup.ambiguous += 1;
                    debug!(
                        song_id = %song.song_id,
                        kept = %existing.get().0,
                        "Songs share title, artist and duration"
                    );
                }
                Entry::Vacant(slot) => {
                    slot.insert((song.song_id.clone(), artist_id.clone()));
                }
            }
        }
        lookup
    }

    /// Resolve (song_id, artist_id) for an event's song, artist and length
    pub fn resolve(
        &self,
        title: Option<&str>,
        artist_name: Option<&str>,
        duration: Option<f64>,
    ) -> Option<(&str, &str)> {
        let key = MatchKey::new(title?, artist_name?, duration?);
        self.index
            .get(&key)
            .map(|(song_id, artist_id)| (song_id.as_str(), artist_id.as_str()))
    }

    /// Number of indexed match keys
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Songs left out of the index because their match key was taken
    pub fn ambiguous(&self) -> usize {
        self.ambiguous
    }
}

// ============================================================================
// Assembly
// ============================================================================

/// Assemble the songplays fact table
///
/// Emits exactly one row per event that has a user id and a timestamp, in
/// input order, with `songplay_id` counting up from 1. Events whose song
/// cannot be resolved keep null `song_id` and `artist_id`.
pub fn assemble_songplays(plays: &[&EventRecord], lookup: &SongLookup) -> FactTable {
    let mut stats = FactStats {
        input: plays.len(),
        ..Default::default()
    };
    let mut rows = Vec::with_capacity(plays.len());
    let mut next_id: i64 = 1;

    for event in plays {
        let (Some(user_id), Some(start_time)) = (&event.user_id, event.ts) else {
            stats.incomplete += 1;
            continue;
        };

        let resolved = lookup.resolve(
            event.song.as_deref(),
            event.artist.as_deref(),
            event.length,
        );
        let (song_id, artist_id) = match resolved {
            Some((song_id, artist_id)) => {
                stats.resolved += 1;
                (Some(song_id.to_string()), Some(artist_id.to_string()))
            }
            None => {
                stats.unresolved += 1;
                (None, None)
            }
        };

        rows.push(SongplayRecord {
            songplay_id: next_id,
            start_time,
            user_id: user_id.clone(),
            level: Level::parse(event.level.as_deref()),
            song_id,
            artist_id,
            session_id: event.session_id,
            location: event.location.clone(),
            user_agent: event.user_agent.clone(),
            year: start_time.year(),
            month: start_time.month() as i32,
        });
        next_id += 1;
    }

    stats.rows = rows.len();
    FactTable { rows, stats }
}
