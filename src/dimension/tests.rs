//! Tests for dimension module

use super::*;
use crate::reader::{CatalogRecord, EventRecord};
use crate::types::{Gender, Level};
use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use test_case::test_case;

fn catalog(song_id: &str, title: &str, artist_id: &str, artist_name: &str) -> CatalogRecord {
    CatalogRecord {
        song_id: Some(song_id.to_string()),
        title: Some(title.to_string()),
        year: Some(1993),
        duration: Some(279.2),
        artist_id: Some(artist_id.to_string()),
        artist_name: Some(artist_name.to_string()),
        ..Default::default()
    }
}

fn play(user_id: &str, ts: DateTime<Utc>, level: &str) -> EventRecord {
    EventRecord {
        ts: Some(ts),
        user_id: Some(user_id.to_string()),
        first_name: Some("Ava".to_string()),
        last_name: Some("Robinson".to_string()),
        gender: Some("F".to_string()),
        level: Some(level.to_string()),
        page: Some("NextSong".to_string()),
        ..Default::default()
    }
}

fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2018, 11, 15, h, m, 0).unwrap()
}

// ============================================================================
// Songs
// ============================================================================

#[test]
fn test_build_songs_dedups_by_song_id() {
    let records = vec![
        catalog("S1", "Mr. Jones", "A1", "Counting Crows"),
        catalog("S2", "Round Here", "A1", "Counting Crows"),
        catalog("S1", "Mr. Jones", "A1", "Counting Crows"),
    ];

    let songs = build_songs(&records);
    assert_eq!(songs.len(), 2);
    assert_eq!(songs.stats.duplicates, 1);
    assert_eq!(songs.stats.conflicts, 0);
    assert_eq!(songs.rows[0].song_id, "S1");
    assert_eq!(songs.rows[1].song_id, "S2");
}

#[test]
fn test_build_songs_conflict_keeps_last_write() {
    let mut second = catalog("S1", "Mr. Jones (Live)", "A1", "Counting Crows");
    second.year = Some(1994);
    let records = vec![catalog("S1", "Mr. Jones", "A1", "Counting Crows"), second];

    let songs = build_songs(&records);
    assert_eq!(songs.len(), 1);
    assert_eq!(songs.stats.conflicts, 1);
    assert_eq!(songs.rows[0].title.as_deref(), Some("Mr. Jones (Live)"));
    assert_eq!(songs.rows[0].year, Some(1994));
}

#[test]
fn test_build_songs_skips_missing_key_and_negative_duration() {
    let mut no_id = catalog("S0", "Nameless", "A1", "Someone");
    no_id.song_id = None;
    let mut negative = catalog("S9", "Backwards", "A1", "Someone");
    negative.duration = Some(-3.0);

    let songs = build_songs(&[no_id, negative]);
    assert_eq!(songs.stats.missing_key, 1);
    assert_eq!(songs.len(), 1);
    assert_eq!(songs.rows[0].duration, None);
}

// ============================================================================
// Artists
// ============================================================================

#[test]
fn test_build_artists_maps_catalog_columns() {
    let mut record = catalog("S1", "Mr. Jones", "A1", "Counting Crows");
    record.artist_location = Some("San Francisco, CA".to_string());
    record.artist_latitude = Some(37.77916);
    record.artist_longitude = Some(-122.42005);

    let artists = build_artists(&[record.clone(), record]);
    assert_eq!(
        artists.rows,
        vec![ArtistRecord {
            artist_id: "A1".to_string(),
            name: Some("Counting Crows".to_string()),
            location: Some("San Francisco, CA".to_string()),
            latitude: Some(37.77916),
            longitude: Some(-122.42005),
        }]
    );
    assert_eq!(artists.stats.duplicates, 1);
    assert_eq!(artists.stats.conflicts, 0);
}

#[test]
fn test_build_artists_keys_are_unique() {
    let records = vec![
        catalog("S1", "a", "A1", "One"),
        catalog("S2", "b", "A2", "Two"),
        catalog("S3", "c", "A1", "One renamed"),
        catalog("S4", "d", "A3", "Three"),
    ];
    let artists = build_artists(&records);
    let keys: HashSet<_> = artists.rows.iter().map(|a| a.artist_id.clone()).collect();
    assert_eq!(keys.len(), artists.len());
    assert_eq!(artists.stats.conflicts, 1);
}

// ============================================================================
// Users
// ============================================================================

#[test]
fn test_build_users_latest_level_wins() {
    let free = play("7", at(10, 0), "free");
    let paid = play("7", at(11, 0), "paid");
    let users = build_users(&[&free, &paid]);

    assert_eq!(users.len(), 1);
    assert_eq!(users.rows[0].level, Some(Level::Paid));
    assert_eq!(users.stats.conflicts, 1);
}

#[test]
fn test_build_users_latest_wins_regardless_of_input_order() {
    let paid = play("7", at(11, 0), "paid");
    let free = play("7", at(10, 0), "free");
    let users = build_users(&[&paid, &free]);

    assert_eq!(users.rows[0].level, Some(Level::Paid));
}

#[test]
fn test_build_users_tie_goes_to_later_record() {
    let first = play("7", at(10, 0), "free");
    let second = play("7", at(10, 0), "paid");
    let users = build_users(&[&first, &second]);

    assert_eq!(users.rows[0].level, Some(Level::Paid));
}

#[test]
fn test_build_users_maps_attributes() {
    let event = play("26", at(12, 0), "paid");
    let users = build_users(&[&event]);

    assert_eq!(
        users.rows,
        vec![UserRecord {
            user_id: "26".to_string(),
            first_name: Some("Ava".to_string()),
            last_name: Some("Robinson".to_string()),
            gender: Gender::Female,
            level: Some(Level::Paid),
        }]
    );
}

#[test]
fn test_build_users_skips_events_without_user() {
    let mut anonymous = play("0", at(9, 0), "free");
    anonymous.user_id = None;
    let users = build_users(&[&anonymous]);
    assert!(users.is_empty());
    assert_eq!(users.stats.missing_key, 1);
}

// ============================================================================
// Time
// ============================================================================

#[test]
fn test_build_time_distinct_and_sorted() {
    let a = play("1", at(12, 0), "free");
    let b = play("2", at(9, 30), "free");
    let c = play("3", at(12, 0), "paid");
    let time = build_time(&[&a, &b, &c]);

    assert_eq!(time.len(), 2);
    assert_eq!(time.stats.duplicates, 1);
    assert_eq!(time.rows[0].start_time, at(9, 30));
    assert_eq!(time.rows[1].start_time, at(12, 0));
}

#[test]
fn test_time_record_scenario() {
    let ts = Utc.with_ymd_and_hms(2023, 1, 5, 12, 0, 0).unwrap();
    let row = TimeRecord::from_timestamp(ts);
    assert_eq!(
        row,
        TimeRecord {
            start_time: ts,
            hour: 12,
            day: 5,
            week: 1,
            month: 1,
            year: 2023,
            weekday: 4,
        }
    );
}

#[test_case(2018, 11, 4, 7, 44 ; "sunday is seven")]
#[test_case(2018, 11, 5, 1, 45 ; "monday starts the week")]
#[test_case(2021, 1, 1, 5, 53 ; "new year in last iso week")]
#[test_case(2024, 12, 30, 1, 1 ; "late december in week one")]
fn test_time_record_iso_calendar(y: i32, m: u32, d: u32, weekday: i32, week: i32) {
    let ts = Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap();
    let row = TimeRecord::from_timestamp(ts);
    assert_eq!(row.weekday, weekday);
    assert_eq!(row.week, week);
    assert_eq!(row.year, y);
}

#[test]
fn test_time_record_is_deterministic() {
    let ts = Utc.timestamp_millis_opt(1_541_106_106_796).single().unwrap();
    assert_eq!(TimeRecord::from_timestamp(ts), TimeRecord::from_timestamp(ts));
}
