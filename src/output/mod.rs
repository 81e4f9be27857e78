//! Output module
//!
//! Persists the star schema as partitioned Parquet datasets.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Fixed Arrow schemas per table and typed-row to RecordBatch conversion
//! - Encoding Parquet files in memory
//! - Hive-style partitioned, overwrite-on-write table output
//! - Reading written tables back as JSON

mod partitioned;
mod read;
mod schema;
mod writer;

pub use partitioned::{
    escape_partition_value, partition_dir, PartitionedWriter, PreparedTable, TableReport,
    DEFAULT_PARTITION,
};
pub use read::read_table;
pub use schema::{arrow_to_json, rows_to_batch, TableRow};
pub use writer::{decode_parquet, encode_parquet, ParquetWriterConfig};
