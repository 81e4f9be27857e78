//! Partitioned table writer
//!
//! Lays each table out Hive-style under the output root:
//!
//! ```text
//! songplays/year=2018/month=11/part-00000.parquet
//! songs/year=1993/artist_id=ARCCROW1187B99BFB1/part-00000.parquet
//! users/part-00000.parquet
//! ```
//!
//! Writing a table first removes everything under its directory, so a rerun
//! replaces prior output instead of appending to it. Tables are independent:
//! when one table fails, tables already written stay in place.

use super::schema::{rows_to_batch, TableRow};
use super::writer::{encode_parquet, ParquetWriterConfig};
use crate::error::{Error, Result};
use crate::storage::StorageLocation;
use crate::types::TableName;
use bytes::Bytes;
use futures::StreamExt;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{error, info};

/// Directory name Hive uses for a null partition value
pub const DEFAULT_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";

const PART_FILE: &str = "part-00000.parquet";

/// A table encoded and ready to be written
#[derive(Debug, Clone)]
pub struct PreparedTable {
    pub table: TableName,
    pub rows: usize,
    /// (path relative to the output root, Parquet bytes), sorted by path
    pub files: Vec<(String, Bytes)>,
}

/// Outcome of writing one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub table: TableName,
    pub location: String,
    pub rows: usize,
    pub files: usize,
    /// Objects removed from the previous run
    pub replaced: usize,
}

/// Escape a partition value for use in a `key=value` path segment
pub fn escape_partition_value(value: Option<&str>) -> String {
    let Some(value) = value else {
        return DEFAULT_PARTITION.to_string();
    };
    if value.is_empty() {
        return DEFAULT_PARTITION.to_string();
    }

    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_control() || matches!(c, '/' | '\\' | '=' | '%' | ':' | '#' | '?' | '*' | '"') {
            for byte in c.to_string().bytes() {
                escaped.push_str(&format!("%{byte:02X}"));
            }
        } else {
            escaped.push(c);
        }
    }
    escaped
}

/// Relative directory of one partition, e.g. `songplays/year=2018/month=11`
pub fn partition_dir(table: TableName, values: &[Option<String>]) -> String {
    let mut dir = table.as_str().to_string();
    for (column, value) in table.partition_columns().iter().zip(values) {
        dir.push('/');
        dir.push_str(column);
        dir.push('=');
        dir.push_str(&escape_partition_value(value.as_deref()));
    }
    dir
}

/// Writes prepared tables to an output root with overwrite semantics
#[derive(Debug, Clone)]
pub struct PartitionedWriter {
    destination: StorageLocation,
    config: ParquetWriterConfig,
    parallelism: usize,
}

impl PartitionedWriter {
    pub fn new(destination: StorageLocation, config: ParquetWriterConfig) -> Self {
        Self {
            destination,
            config,
            parallelism: 1,
        }
    }

    /// Write up to `n` tables concurrently
    #[must_use]
    pub fn with_parallelism(mut self, n: usize) -> Self {
        self.parallelism = n.max(1);
        self
    }

    pub fn destination(&self) -> &StorageLocation {
        &self.destination
    }

    /// Group rows by partition and encode each group as one Parquet file
    ///
    /// Unpartitioned tables always produce one file, even when empty, so the
    /// schema is present in the output. Partitioned tables with no rows
    /// produce no files.
    pub fn prepare<T: TableRow>(&self, rows: &[T]) -> Result<PreparedTable> {
        let table = T::TABLE;
        let mut groups: BTreeMap<String, Vec<&T>> = BTreeMap::new();

        if table.partition_columns().is_empty() {
            groups.insert(table.as_str().to_string(), rows.iter().collect());
        } else {
            for row in rows {
                let dir = partition_dir(table, &row.partition_values());
                groups.entry(dir).or_default().push(row);
            }
        }

        let mut files = Vec::with_capacity(groups.len());
        for (dir, group) in groups {
            let batch = rows_to_batch(&group)?;
            let data = encode_parquet(&batch, &self.config)?;
            files.push((format!("{dir}/{PART_FILE}"), data));
        }

        Ok(PreparedTable {
            table,
            rows: rows.len(),
            files,
        })
    }

    /// Replace one table's output with the prepared files
    pub async fn write(&self, prepared: &PreparedTable) -> Result<TableReport> {
        let table = prepared.table;
        let location = self.destination.display_path(table.as_str());
        let fail = |e: Error| Error::table_write(table.as_str(), &location, e.to_string());

        let replaced = self
            .destination
            .delete_prefix(table.as_str())
            .await
            .map_err(&fail)?;

        for (path, data) in &prepared.files {
            self.destination
                .put(path, data.clone())
                .await
                .map_err(&fail)?;
        }

        info!(
            table = %table,
            location = %location,
            rows = prepared.rows,
            files = prepared.files.len(),
            replaced,
            "Wrote table"
        );

        Ok(TableReport {
            table,
            location,
            rows: prepared.rows,
            files: prepared.files.len(),
            replaced,
        })
    }

    /// Write every table, continuing past failures
    ///
    /// Every failure is logged. The first failure in input order is
    /// returned; tables that succeeded are not rolled back.
    pub async fn write_all(&self, tables: &[PreparedTable]) -> Result<Vec<TableReport>> {
        let mut results: Vec<(usize, Result<TableReport>)> = futures::stream::iter(
            tables.iter().enumerate(),
        )
        .map(|(idx, prepared)| async move { (idx, self.write(prepared).await) })
        .buffer_unordered(self.parallelism)
        .collect()
        .await;
        results.sort_by_key(|(idx, _)| *idx);

        let mut reports = Vec::with_capacity(results.len());
        let mut first_error = None;
        for (_, result) in results {
            match result {
                Ok(report) => reports.push(report),
                Err(e) => {
                    error!(error = %e, "Table write failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(reports),
        }
    }
}
