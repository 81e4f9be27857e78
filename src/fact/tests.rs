//! Tests for fact module

use super::*;
use crate::dimension::{build_artists, build_songs};
use crate::reader::{CatalogRecord, EventRecord};
use crate::types::Level;
use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;

fn counting_crows() -> CatalogRecord {
    CatalogRecord {
        song_id: Some("SOMRJON12A8C13C480".to_string()),
        title: Some("Mr. Jones".to_string()),
        year: Some(1993),
        duration: Some(279.2),
        artist_id: Some("ARCCROW1187B99BFB1".to_string()),
        artist_name: Some("Counting Crows".to_string()),
        ..Default::default()
    }
}

fn ts() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 1, 5, 12, 0, 0).unwrap()
}

fn event(user_id: &str, song: &str, artist: &str, length: f64) -> EventRecord {
    EventRecord {
        ts: Some(ts()),
        user_id: Some(user_id.to_string()),
        level: Some("paid".to_string()),
        page: Some("NextSong".to_string()),
        session_id: Some(583),
        location: Some("San Jose-Sunnyvale-Santa Clara, CA".to_string()),
        user_agent: Some("Mozilla/5.0".to_string()),
        song: Some(song.to_string()),
        artist: Some(artist.to_string()),
        length: Some(length),
        ..Default::default()
    }
}

fn lookup_for(records: &[CatalogRecord]) -> SongLookup {
    SongLookup::build(&build_songs(records), &build_artists(records))
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_select_plays_filters_page_and_incomplete() {
    let play = event("26", "Mr. Jones", "Counting Crows", 279.2);
    let mut home = play.clone();
    home.page = Some("Home".to_string());
    let mut logged_out = play.clone();
    logged_out.user_id = None;

    let events = vec![play, home, logged_out];
    let selection = select_plays(&events, "NextSong");
    assert_eq!(selection.plays.len(), 1);
    assert_eq!(selection.non_play, 1);
    assert_eq!(selection.incomplete, 1);
}

// ============================================================================
// Lookup
// ============================================================================

#[test]
fn test_lookup_exact_match() {
    let lookup = lookup_for(&[counting_crows()]);
    assert_eq!(
        lookup.resolve(Some("Mr. Jones"), Some("Counting Crows"), Some(279.2)),
        Some(("SOMRJON12A8C13C480", "ARCCROW1187B99BFB1"))
    );
}

#[test]
fn test_lookup_requires_every_component() {
    let lookup = lookup_for(&[counting_crows()]);
    assert_eq!(lookup.resolve(Some("Mr. Jones"), Some("Counting Crows"), Some(279.3)), None);
    assert_eq!(lookup.resolve(Some("mr. jones"), Some("Counting Crows"), Some(279.2)), None);
    assert_eq!(lookup.resolve(Some("Mr. Jones"), None, Some(279.2)), None);
    assert_eq!(lookup.resolve(Some("Mr. Jones"), Some("Counting Crows"), None), None);
}

#[test]
fn test_lookup_ambiguous_keeps_first() {
    let mut duplicate = counting_crows();
    duplicate.song_id = Some("SODUPLICATE".to_string());
    let lookup = lookup_for(&[counting_crows(), duplicate]);

    assert_eq!(lookup.len(), 1);
    assert_eq!(lookup.ambiguous(), 1);
    let (song_id, _) = lookup
        .resolve(Some("Mr. Jones"), Some("Counting Crows"), Some(279.2))
        .unwrap();
    assert_eq!(song_id, "SOMRJON12A8C13C480");
}

#[test]
fn test_lookup_skips_songs_without_artist_name() {
    let mut record = counting_crows();
    record.artist_name = None;
    let lookup = lookup_for(&[record]);
    assert!(lookup.is_empty());
}

// ============================================================================
// Assembly
// ============================================================================

#[test]
fn test_assemble_resolves_matching_play() {
    let lookup = lookup_for(&[counting_crows()]);
    let play = event("26", "Mr. Jones", "Counting Crows", 279.2);
    let fact = assemble_songplays(&[&play], &lookup);

    assert_eq!(
        fact.rows,
        vec![SongplayRecord {
            songplay_id: 1,
            start_time: ts(),
            user_id: "26".to_string(),
            level: Some(Level::Paid),
            song_id: Some("SOMRJON12A8C13C480".to_string()),
            artist_id: Some("ARCCROW1187B99BFB1".to_string()),
            session_id: Some(583),
            location: Some("San Jose-Sunnyvale-Santa Clara, CA".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
            year: 2023,
            month: 1,
        }]
    );
    assert_eq!(fact.stats.resolved, 1);
}

#[test]
fn test_assemble_keeps_unresolved_play() {
    let lookup = lookup_for(&[counting_crows()]);
    let play = event("26", "Unknown Song", "Nobody", 100.0);
    let fact = assemble_songplays(&[&play], &lookup);

    assert_eq!(fact.rows.len(), 1);
    assert_eq!(fact.rows[0].song_id, None);
    assert_eq!(fact.rows[0].artist_id, None);
    assert_eq!(fact.stats.unresolved, 1);
}

#[test]
fn test_assemble_dense_ids_and_no_dedup() {
    let lookup = lookup_for(&[counting_crows()]);
    let a = event("26", "Mr. Jones", "Counting Crows", 279.2);
    let b = a.clone();
    let c = event("7", "Other", "Band", 10.0);
    let fact = assemble_songplays(&[&a, &b, &c], &lookup);

    let ids: Vec<i64> = fact.rows.iter().map(|r| r.songplay_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(fact.stats.rows, 3);
    assert_eq!(fact.stats.resolved, 2);
}

#[test]
fn test_assemble_is_reproducible() {
    let lookup = lookup_for(&[counting_crows()]);
    let a = event("26", "Mr. Jones", "Counting Crows", 279.2);
    let b = event("7", "Other", "Band", 10.0);
    let first = assemble_songplays(&[&a, &b], &lookup);
    let second = assemble_songplays(&[&a, &b], &lookup);
    assert_eq!(first.rows, second.rows);
}
