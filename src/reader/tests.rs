//! Tests for reader module

use super::*;
use crate::config::Credentials;
use crate::storage::StorageLocation;
use crate::types::JsonValue;
use chrono::{TimeZone, Utc};
use serde_json::json;

fn object(value: JsonValue) -> crate::types::JsonObject {
    match value {
        JsonValue::Object(obj) => obj,
        _ => panic!("expected object"),
    }
}

// ============================================================================
// Document splitting
// ============================================================================

#[test]
fn test_documents_single_object() {
    let docs: Vec<_> = Documents::new(r#"{"song_id": "S1"}"#).collect();
    assert_eq!(docs.len(), 1);
    assert!(docs[0].is_ok());
}

#[test]
fn test_documents_pretty_printed_object() {
    let body = "{\n  \"song_id\": \"S1\",\n  \"title\": \"A\"\n}\n";
    let docs: Vec<_> = Documents::new(body).collect();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].as_ref().unwrap()["title"], "A");
}

#[test]
fn test_documents_array() {
    let docs: Vec<_> = Documents::new(r#"[{"a": 1}, {"a": 2}, {"a": 3}]"#).collect();
    assert_eq!(docs.len(), 3);
}

#[test]
fn test_documents_json_lines() {
    let body = "{\"a\": 1}\n\n{\"a\": 2}\n{\"a\": 3}\n";
    let docs: Vec<_> = Documents::new(body).collect();
    assert_eq!(docs.len(), 3);
    assert!(docs.iter().all(Result::is_ok));
}

#[test]
fn test_documents_json_lines_with_broken_line() {
    let body = "{\"a\": 1}\n{\"a\": \n{\"a\": 3}\n";
    let docs: Vec<_> = Documents::new(body).collect();
    assert_eq!(docs.len(), 3);
    let bad = docs[1].as_ref().unwrap_err();
    assert_eq!(bad.line, Some(2));
    assert!(docs[2].is_ok());
}

#[test]
fn test_documents_json_lines_with_broken_first_line() {
    let body = "{\"a\": \n{\"a\": 2}\n{\"a\": 3}\n";
    let docs: Vec<_> = Documents::new(body).collect();
    assert_eq!(docs.len(), 3);
    assert_eq!(docs[0].as_ref().unwrap_err().line, Some(1));
    assert_eq!(docs[1].as_ref().unwrap(), &json!({"a": 2}));
    assert_eq!(docs[2].as_ref().unwrap(), &json!({"a": 3}));
}

#[test]
fn test_documents_garbage_is_one_malformed_document() {
    let docs: Vec<_> = Documents::new("this is not json\nneither is this").collect();
    assert_eq!(docs.len(), 1);
    assert!(docs[0].is_err());
}

#[test]
fn test_documents_empty_body() {
    assert_eq!(Documents::new("  \n ").count(), 0);
}

#[test]
fn test_decode_records_rejects_non_objects() {
    let results: Vec<_> = decode_records::<CatalogRecord>(r#"[{"song_id": "S1"}, 42, "x"]"#)
        .collect();
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[1]
        .as_ref()
        .unwrap_err()
        .message
        .contains("a number"));
    assert!(results[2].is_err());
}

// ============================================================================
// Catalog records
// ============================================================================

#[test]
fn test_catalog_record_full() {
    let record = CatalogRecord::from_object(&object(json!({
        "num_songs": 1,
        "artist_id": "ARD7TVE1187B99BFB1",
        "artist_latitude": null,
        "artist_longitude": null,
        "artist_location": "California - LA",
        "artist_name": "Casual",
        "song_id": "SOMZWCG12A8C13C480",
        "title": "I Didn't Mean To",
        "duration": 218.93179,
        "year": 0
    })));

    assert_eq!(record.song_id.as_deref(), Some("SOMZWCG12A8C13C480"));
    assert_eq!(record.artist_name.as_deref(), Some("Casual"));
    assert_eq!(record.artist_latitude, None);
    assert_eq!(record.duration, Some(218.931_79));
    assert_eq!(record.year, Some(0));
}

#[test]
fn test_catalog_record_tolerates_missing_and_mistyped_fields() {
    let record = CatalogRecord::from_object(&object(json!({
        "song_id": "S1",
        "artist_location": "",
        "duration": "201.5",
        "year": "not a year",
        "artist_latitude": {"nested": true}
    })));

    assert_eq!(record.song_id.as_deref(), Some("S1"));
    assert_eq!(record.title, None);
    assert_eq!(record.artist_location, None);
    assert_eq!(record.duration, Some(201.5));
    assert_eq!(record.year, None);
    assert_eq!(record.artist_latitude, None);
}

// ============================================================================
// Activity records
// ============================================================================

#[test]
fn test_event_record_camel_case() {
    let record = EventRecord::from_object(&object(json!({
        "artist": "Des'ree",
        "auth": "Logged In",
        "firstName": "Kaylee",
        "gender": "F",
        "itemInSession": 1,
        "lastName": "Summers",
        "length": 246.30812,
        "level": "free",
        "location": "Phoenix-Mesa-Scottsdale, AZ",
        "method": "PUT",
        "page": "NextSong",
        "sessionId": 139,
        "song": "You Gotta Be",
        "status": 200,
        "ts": 1_541_106_106_796_i64,
        "userAgent": "Mozilla/5.0",
        "userId": "8"
    })));

    assert_eq!(record.user_id.as_deref(), Some("8"));
    assert_eq!(record.first_name.as_deref(), Some("Kaylee"));
    assert_eq!(record.session_id, Some(139));
    assert_eq!(
        record.ts,
        Utc.timestamp_millis_opt(1_541_106_106_796).single()
    );
    assert!(record.is_qualifying_play("NextSong"));
}

#[test]
fn test_event_record_numeric_user_id_and_rfc3339_ts() {
    let record = EventRecord::from_object(&object(json!({
        "user_id": 26,
        "ts": "2023-01-05T12:00:00Z",
        "page": "NextSong"
    })));

    assert_eq!(record.user_id.as_deref(), Some("26"));
    assert_eq!(
        record.ts,
        Some(Utc.with_ymd_and_hms(2023, 1, 5, 12, 0, 0).unwrap())
    );
}

#[test]
fn test_event_record_rfc3339_ts_truncated_to_millis() {
    let first = EventRecord::from_object(&object(json!({"ts": "2023-01-05T12:00:00.000100Z"})));
    let second = EventRecord::from_object(&object(json!({"ts": "2023-01-05T12:00:00.000200Z"})));
    let later = EventRecord::from_object(&object(json!({"ts": "2023-01-05T12:00:00.001900+00:00"})));

    assert_eq!(first.ts, Utc.timestamp_millis_opt(1_672_920_000_000).single());
    assert_eq!(first.ts, second.ts);
    assert_eq!(later.ts, Utc.timestamp_millis_opt(1_672_920_000_001).single());
}

#[test]
fn test_event_record_logged_out_user_does_not_qualify() {
    let record = EventRecord::from_object(&object(json!({
        "userId": "",
        "page": "NextSong",
        "ts": 1_541_106_106_796_i64
    })));

    assert_eq!(record.user_id, None);
    assert!(!record.is_qualifying_play("NextSong"));
}

#[test]
fn test_event_record_other_page_does_not_qualify() {
    let record = EventRecord::from_object(&object(json!({
        "userId": "8",
        "page": "Home",
        "ts": 1_541_106_106_796_i64
    })));

    assert!(!record.is_qualifying_play("NextSong"));
}

// ============================================================================
// RecordReader
// ============================================================================

#[tokio::test]
async fn test_reader_walks_nested_directories_in_order() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    std::fs::create_dir_all(root.join("A/B")).unwrap();
    std::fs::create_dir_all(root.join("A/C")).unwrap();
    std::fs::write(root.join("A/C/TRB.json"), r#"{"song_id": "S2"}"#).unwrap();
    std::fs::write(root.join("A/B/TRA.json"), r#"{"song_id": "S1"}"#).unwrap();
    std::fs::write(root.join("A/B/notes.txt"), "ignored").unwrap();

    let location =
        StorageLocation::for_input(root.to_str().unwrap(), &Credentials::default()).unwrap();
    let outcome = RecordReader::new(location)
        .with_parallelism(4)
        .read::<CatalogRecord>()
        .await
        .unwrap();

    let ids: Vec<_> = outcome
        .records
        .iter()
        .map(|r| r.song_id.clone().unwrap())
        .collect();
    assert_eq!(ids, vec!["S1", "S2"]);
    assert_eq!(outcome.stats.files, 2);
    assert_eq!(outcome.stats.malformed, 0);
}

#[tokio::test]
async fn test_reader_counts_malformed_records() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    std::fs::write(
        root.join("2018-11-01-events.json"),
        "{\"userId\": \"1\", \"page\": \"NextSong\"}\n{broken\n[1, 2]\n{\"userId\": \"2\"}\n",
    )
    .unwrap();

    let location =
        StorageLocation::for_input(root.to_str().unwrap(), &Credentials::default()).unwrap();
    let outcome = RecordReader::new(location)
        .read::<EventRecord>()
        .await
        .unwrap();

    assert_eq!(outcome.records.len(), 2);
    assert_eq!(
        outcome.stats,
        ReadStats {
            files: 1,
            documents: 4,
            records: 2,
            malformed: 2,
        }
    );
}

#[tokio::test]
async fn test_reader_empty_location() {
    let temp_dir = tempfile::tempdir().unwrap();
    let location =
        StorageLocation::for_input(temp_dir.path().to_str().unwrap(), &Credentials::default())
            .unwrap();
    let outcome = RecordReader::new(location)
        .read::<EventRecord>()
        .await
        .unwrap();
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.stats.files, 0);
}
