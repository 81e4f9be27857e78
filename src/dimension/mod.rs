//! Dimension builders
//!
//! Derives the four dimension tables of the star schema. Every builder is a
//! pure function over an immutable slice of source records, so builders can
//! run in any order or in parallel.
//!
//! | Table   | Key          | Input                  | Duplicate policy          |
//! |---------|--------------|------------------------|---------------------------|
//! | songs   | `song_id`    | catalog                | last write wins           |
//! | artists | `artist_id`  | catalog                | last write wins           |
//! | users   | `user_id`    | qualifying play events | latest `ts` wins          |
//! | time    | `start_time` | qualifying play events | distinct, derived         |

mod builders;
mod types;

pub use builders::{build_artists, build_songs, build_time, build_users};
pub use types::{
    ArtistRecord, Dimension, DimensionStats, Keyed, SongRecord, TimeRecord, UserRecord,
};

#[cfg(test)]
mod tests;
