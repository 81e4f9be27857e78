//! Fact assembler
//!
//! Builds the `songplays` fact table from qualifying play events.
//!
//! # Overview
//!
//! - [`select_plays`] filters the activity log down to qualifying plays.
//! - [`SongLookup`] indexes the songs and artists dimensions on
//!   (title, artist name, duration) for exact-match key resolution.
//! - [`assemble_songplays`] emits one row per qualifying play with a dense
//!   surrogate key starting at 1, assigned in input order.

mod assembler;
mod types;

pub use assembler::{assemble_songplays, select_plays, PlaySelection, SongLookup};
pub use types::{FactStats, FactTable, SongplayRecord};

#[cfg(test)]
mod tests;
