//! Record reader module
//!
//! Loads raw JSON documents from the catalog and activity sources into
//! typed records.
//!
//! # Overview
//!
//! - [`Documents`] lazily splits a file body into JSON documents. A body may
//!   hold a single object, an array of objects, or JSON Lines.
//! - [`SourceRecord`] maps one JSON object onto a fixed struct. Absent or
//!   mistyped fields become `None`; only non-object documents are malformed.
//! - [`RecordReader`] walks a [`StorageLocation`](crate::storage::StorageLocation),
//!   fetches every `.json`/`.jsonl` file in sorted key order and collects the
//!   records together with [`ReadStats`].

mod decoders;
mod source;
mod types;

pub use decoders::{decode_records, Documents, MalformedDocument};
pub use source::RecordReader;
pub use types::{CatalogRecord, EventRecord, ReadOutcome, ReadStats, SourceRecord};

#[cfg(test)]
mod tests;
