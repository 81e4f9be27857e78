//! Reading written tables back

use super::schema::arrow_to_json;
use super::writer::decode_parquet;
use crate::error::Result;
use crate::storage::StorageLocation;
use crate::types::{JsonValue, TableName};

/// Read up to `limit` rows of a written table as JSON objects
///
/// Files are read in sorted path order, so partitions come out in the
/// order the writer laid them down.
pub async fn read_table(
    location: &StorageLocation,
    table: TableName,
    limit: Option<usize>,
) -> Result<Vec<JsonValue>> {
    let limit = limit.unwrap_or(usize::MAX);
    let mut rows = Vec::new();

    for key in location.list(table.as_str()).await? {
        if !key.ends_with(".parquet") {
            continue;
        }
        let data = location.get(&key).await?;
        for batch in decode_parquet(data)? {
            for row in arrow_to_json(&batch)? {
                if rows.len() >= limit {
                    return Ok(rows);
                }
                rows.push(row);
            }
        }
    }

    Ok(rows)
}
