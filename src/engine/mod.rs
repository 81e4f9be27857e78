//! Execution engine module
//!
//! Sequences extract, transform and load for one full rebuild.
//!
//! # Overview
//!
//! The engine module provides:
//! - `ExecutionContext` - settings and storage handles, created once per run
//! - `transform` - the pure step from source records to a `StarSchema`
//! - `run` - read both sources, transform, write all five tables
//! - `RunReport` - counters from every phase

mod context;
mod types;

pub use context::ExecutionContext;
pub use types::{DimensionReport, LookupStats, PlayStats, RunReport, StarSchema};

use crate::dimension::{build_artists, build_songs, build_time, build_users};
use crate::error::Result;
use crate::fact::{assemble_songplays, select_plays, SongLookup};
use crate::reader::{CatalogRecord, EventRecord};
use tracing::info;

/// Build the whole star schema from source records
///
/// Pure: the same records in the same order always give the same tables.
pub fn transform(catalog: &[CatalogRecord], events: &[EventRecord], play_page: &str) -> StarSchema {
    let selection = select_plays(events, play_page);
    let plays = PlayStats {
        qualifying: selection.plays.len(),
        non_play: selection.non_play,
        incomplete: selection.incomplete,
    };

    let songs = build_songs(catalog);
    let artists = build_artists(catalog);
    let users = build_users(&selection.plays);
    let time = build_time(&selection.plays);

    let song_lookup = SongLookup::build(&songs, &artists);
    let lookup = LookupStats {
        keys: song_lookup.len(),
        ambiguous: song_lookup.ambiguous(),
    };
    let songplays = assemble_songplays(&selection.plays, &song_lookup);

    info!(
        songs = songs.len(),
        artists = artists.len(),
        users = users.len(),
        time = time.len(),
        songplays = songplays.rows.len(),
        unresolved = songplays.stats.unresolved,
        "Built star schema"
    );

    StarSchema {
        songs,
        artists,
        users,
        time,
        songplays,
        plays,
        lookup,
    }
}

/// Run the pipeline end to end
///
/// Any I/O failure aborts the run. When a table write fails, tables
/// written before it keep their new contents.
pub async fn run(ctx: &ExecutionContext) -> Result<RunReport> {
    let catalog_reader = ctx.catalog_reader();
    let activity_reader = ctx.activity_reader();
    let (catalog, activity) = tokio::try_join!(
        catalog_reader.read::<CatalogRecord>(),
        activity_reader.read::<EventRecord>()
    )?;

    let star = transform(
        &catalog.records,
        &activity.records,
        &ctx.settings().transform.play_page,
    );

    let writer = ctx.writer();
    let prepared = vec![
        writer.prepare(&star.songs.rows)?,
        writer.prepare(&star.artists.rows)?,
        writer.prepare(&star.users.rows)?,
        writer.prepare(&star.time.rows)?,
        writer.prepare(&star.songplays.rows)?,
    ];
    let tables = writer.write_all(&prepared).await?;

    let report = RunReport {
        mode: ctx.mode(),
        catalog: catalog.stats,
        activity: activity.stats,
        plays: star.plays,
        lookup: star.lookup,
        dimensions: DimensionReport {
            songs: star.songs.stats,
            artists: star.artists.stats,
            users: star.users.stats,
            time: star.time.stats,
        },
        songplays: star.songplays.stats,
        tables,
        duration_ms: ctx.elapsed().as_millis() as u64,
    };

    info!(
        tables = report.tables.len(),
        malformed = report.malformed(),
        conflicts = report.conflicts(),
        duration_ms = report.duration_ms,
        "Pipeline finished"
    );

    Ok(report)
}
