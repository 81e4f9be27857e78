//! Parquet encoding
//!
//! Encodes Arrow RecordBatches to in-memory Parquet files and back.

use crate::config::{CompressionKind, ParquetSettings};
use crate::error::{Error, Result};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

/// Configuration for Parquet writer
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: Compression,
    row_group_size: usize,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: 1024 * 1024, // 1M rows
        }
    }
}

impl ParquetWriterConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the `parquet` section of the pipeline config
    pub fn from_settings(settings: &ParquetSettings) -> Self {
        let compression = match settings.compression {
            CompressionKind::Snappy => Compression::SNAPPY,
            CompressionKind::Zstd => Compression::ZSTD(parquet::basic::ZstdLevel::default()),
            CompressionKind::Gzip => Compression::GZIP(parquet::basic::GzipLevel::default()),
            CompressionKind::None => Compression::UNCOMPRESSED,
        };
        Self::new()
            .with_compression(compression)
            .with_row_group_size(settings.row_group_size)
    }

    /// Set compression algorithm
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Set row group size
    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size.max(1);
        self
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    pub fn row_group_size(&self) -> usize {
        self.row_group_size
    }

    /// Build writer properties
    fn build_properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build()
    }
}

/// Encode a RecordBatch as a complete Parquet file in memory
pub fn encode_parquet(batch: &RecordBatch, config: &ParquetWriterConfig) -> Result<Bytes> {
    let mut buf = Vec::new();
    let props = config.build_properties();

    let mut writer = ArrowWriter::try_new(&mut buf, batch.schema(), Some(props))
        .map_err(|e| Error::output(format!("Failed to create Parquet writer: {e}")))?;

    writer
        .write(batch)
        .map_err(|e| Error::output(format!("Failed to write batch: {e}")))?;

    writer
        .close()
        .map_err(|e| Error::output(format!("Failed to close Parquet writer: {e}")))?;

    Ok(Bytes::from(buf))
}

/// Decode an in-memory Parquet file into RecordBatches
pub fn decode_parquet(data: Bytes) -> Result<Vec<RecordBatch>> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(data)?.build()?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(batches)
}
