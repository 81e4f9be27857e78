//! Reading a whole source location

use super::decoders::decode_records;
use super::types::{ReadOutcome, ReadStats, SourceRecord};
use crate::error::{Error, Result};
use crate::storage::StorageLocation;
use futures::{StreamExt, TryStreamExt};
use tracing::{debug, info, warn};

/// File extensions treated as record files
const RECORD_EXTENSIONS: [&str; 3] = [".json", ".jsonl", ".ndjson"];

/// Reads every record file under a storage location
#[derive(Debug, Clone)]
pub struct RecordReader {
    location: StorageLocation,
    parallelism: usize,
}

impl RecordReader {
    /// Create a reader over a location
    pub fn new(location: StorageLocation) -> Self {
        Self {
            location,
            parallelism: 1,
        }
    }

    /// Fetch up to `n` files concurrently; record order is unaffected
    #[must_use]
    pub fn with_parallelism(mut self, n: usize) -> Self {
        self.parallelism = n.max(1);
        self
    }

    pub fn location(&self) -> &StorageLocation {
        &self.location
    }

    /// Read all records of type `T`
    ///
    /// Files are processed in sorted key order. Malformed documents are
    /// skipped and counted; an unreadable location or file fails the read.
    pub async fn read<T: SourceRecord>(&self) -> Result<ReadOutcome<T>> {
        let kind = T::KIND;
        let keys: Vec<String> = self
            .location
            .list("")
            .await
            .map_err(|e| Error::source_unreadable(kind, self.location.url(), e.to_string()))?
            .into_iter()
            .filter(|k| RECORD_EXTENSIONS.iter().any(|ext| k.ends_with(ext)))
            .collect();

        if keys.is_empty() {
            warn!(source = %kind, location = %self.location.url(), "No record files found");
        }

        let mut stats = ReadStats::default();
        let mut records = Vec::new();

        let mut bodies = std::pin::pin!(futures::stream::iter(keys)
            .map(|key| async move {
                let body = self.location.get(&key).await.map_err(|e| {
                    Error::source_unreadable(kind, self.location.display_path(&key), e.to_string())
                })?;
                Ok::<_, Error>((key, body))
            })
            .buffered(self.parallelism));

        while let Some((key, body)) = bodies.try_next().await? {
            stats.files += 1;

            let Ok(text) = std::str::from_utf8(&body) else {
                warn!(source = %kind, file = %key, "Skipping file that is not valid UTF-8");
                stats.documents += 1;
                stats.malformed += 1;
                continue;
            };

            let before = records.len();
            for decoded in decode_records::<T>(text) {
                stats.documents += 1;
                match decoded {
                    Ok(record) => records.push(record),
                    Err(bad) => {
                        stats.malformed += 1;
                        warn!(source = %kind, file = %key, reason = %bad.message, "Skipping malformed record");
                    }
                }
            }
            debug!(source = %kind, file = %key, records = records.len() - before, "Decoded file");
        }

        stats.records = records.len();
        info!(
            source = %kind,
            location = %self.location.url(),
            files = stats.files,
            records = stats.records,
            malformed = stats.malformed,
            "Read source"
        );

        Ok(ReadOutcome { records, stats })
    }
}
