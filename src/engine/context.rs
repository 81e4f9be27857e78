//! Execution context
//!
//! Created once per process, passed by reference into every phase, torn
//! down once at the end. It owns the resolved settings and the storage
//! handles; no component keeps its own global state.

use crate::config::RunSettings;
use crate::error::{Error, Result};
use crate::output::{ParquetWriterConfig, PartitionedWriter};
use crate::reader::RecordReader;
use crate::storage::StorageLocation;
use crate::types::{ExecutionMode, SourceKind};
use std::time::{Duration, Instant};
use tracing::info;

/// Process-wide execution context
#[derive(Debug)]
pub struct ExecutionContext {
    settings: RunSettings,
    catalog: StorageLocation,
    activity: StorageLocation,
    output: StorageLocation,
    started: Instant,
}

impl ExecutionContext {
    /// Resolve every storage location named by the settings
    pub fn new(settings: RunSettings) -> Result<Self> {
        let open_input = |kind: SourceKind, url: &str| {
            StorageLocation::for_input(url, &settings.credentials)
                .map_err(|e| Error::source_unreadable(kind, url, e.to_string()))
        };
        let catalog = open_input(SourceKind::Catalog, &settings.song_data)?;
        let activity = open_input(SourceKind::Activity, &settings.log_data)?;
        let output = StorageLocation::for_output(&settings.output, &settings.credentials)?;

        info!(
            mode = %settings.mode,
            parallelism = settings.effective_parallelism(),
            catalog = %catalog.url(),
            activity = %activity.url(),
            output = %output.url(),
            "Execution context ready"
        );

        Ok(Self {
            settings,
            catalog,
            activity,
            output,
            started: Instant::now(),
        })
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    pub fn mode(&self) -> ExecutionMode {
        self.settings.mode
    }

    /// Concurrency available to I/O phases
    pub fn parallelism(&self) -> usize {
        self.settings.effective_parallelism()
    }

    pub fn output(&self) -> &StorageLocation {
        &self.output
    }

    /// Reader over the catalog source
    pub fn catalog_reader(&self) -> RecordReader {
        RecordReader::new(self.catalog.clone()).with_parallelism(self.parallelism())
    }

    /// Reader over the activity source
    pub fn activity_reader(&self) -> RecordReader {
        RecordReader::new(self.activity.clone()).with_parallelism(self.parallelism())
    }

    /// Writer for the output root
    pub fn writer(&self) -> PartitionedWriter {
        let config = ParquetWriterConfig::from_settings(&self.settings.parquet);
        PartitionedWriter::new(self.output.clone(), config).with_parallelism(self.parallelism())
    }

    /// Time since the context was created
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Release the context; returns total lifetime
    pub fn shutdown(self) -> Duration {
        let elapsed = self.elapsed();
        info!(elapsed_ms = elapsed.as_millis() as u64, "Execution context shut down");
        elapsed
    }
}
