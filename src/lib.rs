// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # songplay-etl
//!
//! Batch ETL that turns a music-streaming service's song catalog and
//! listening-event log into a star schema of Parquet tables.
//!
//! ## Features
//!
//! - **Tolerant JSON ingestion**: whole-file JSON or JSON Lines, malformed documents skipped and counted
//! - **Star schema**: `songs`, `artists`, `users`, `time` dimensions and a `songplays` fact table
//! - **Deterministic output**: same inputs give byte-identical Parquet files
//! - **Partitioned Parquet**: Hive layout, overwritten on every run
//! - **Cloud storage**: local paths, S3, R2, GCS and Azure through `object_store`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use songplay_etl::config::{load_config, Overrides};
//! use songplay_etl::engine::{self, ExecutionContext};
//!
//! #[tokio::main]
//! async fn main() -> songplay_etl::Result<()> {
//!     let settings = load_config("pipeline.yaml")?.resolve(&Overrides::default())?;
//!     let ctx = ExecutionContext::new(settings)?;
//!     let report = engine::run(&ctx).await?;
//!     println!("{} songplays", report.songplays.rows);
//!     ctx.shutdown();
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      ExecutionContext                        │
//! │        settings   catalog location   activity location       │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌────────────┬────────────────┴──────────┬─────────────────────┐
//! │   Reader   │        Transform          │       Output        │
//! ├────────────┼───────────────────────────┼─────────────────────┤
//! │ JSON       │ songs / artists (catalog) │ Arrow RecordBatch   │
//! │ JSON Lines │ users / time (plays)      │ Parquet             │
//! │ Stats      │ songplays (lookup)        │ Hive partitions     │
//! └────────────┴───────────────────────────┴─────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the pipeline
pub mod error;

/// Common types and type aliases
pub mod types;

/// YAML configuration and profile resolution
pub mod config;

/// Local and cloud storage locations
pub mod storage;

/// Source readers (JSON, JSON Lines)
pub mod reader;

/// Dimension builders
pub mod dimension;

/// Fact table assembly
pub mod fact;

/// Arrow/Parquet output
pub mod output;

/// Pipeline execution engine
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
