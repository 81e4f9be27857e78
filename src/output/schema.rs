//! Table schemas and row conversion
//!
//! Every output table has a fixed Arrow schema. Rows are serialized to
//! JSON values with serde and then laid out column by column against that
//! schema; Arrow rejects a batch that puts a null in a non-nullable column.

use crate::dimension::{ArtistRecord, SongRecord, TimeRecord, UserRecord};
use crate::error::{Error, Result};
use crate::fact::SongplayRecord;
use crate::types::{JsonValue, TableName};
use arrow::array::{
    Array, ArrayRef, Float64Array, Int32Array, Int64Array, StringArray,
    TimestampMillisecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{SecondsFormat, TimeZone, Utc};
use serde::Serialize;
use std::sync::Arc;

/// A row type that maps onto one output table
pub trait TableRow: Serialize {
    /// Target table
    const TABLE: TableName;

    /// Arrow schema of the table
    fn schema() -> Schema;

    /// Hive partition values, one per `TABLE.partition_columns()` entry
    fn partition_values(&self) -> Vec<Option<String>> {
        Vec::new()
    }
}

fn utc_millis() -> DataType {
    DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into()))
}

impl TableRow for SongRecord {
    const TABLE: TableName = TableName::Songs;

    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("song_id", DataType::Utf8, false),
            Field::new("title", DataType::Utf8, true),
            Field::new("artist_id", DataType::Utf8, true),
            Field::new("year", DataType::Int32, true),
            Field::new("duration", DataType::Float64, true),
        ])
    }

    fn partition_values(&self) -> Vec<Option<String>> {
        vec![self.year.map(|y| y.to_string()), self.artist_id.clone()]
    }
}

impl TableRow for ArtistRecord {
    const TABLE: TableName = TableName::Artists;

    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("artist_id", DataType::Utf8, false),
            Field::new("name", DataType::Utf8, true),
            Field::new("location", DataType::Utf8, true),
            Field::new("latitude", DataType::Float64, true),
            Field::new("longitude", DataType::Float64, true),
        ])
    }
}

impl TableRow for UserRecord {
    const TABLE: TableName = TableName::Users;

    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("user_id", DataType::Utf8, false),
            Field::new("first_name", DataType::Utf8, true),
            Field::new("last_name", DataType::Utf8, true),
            Field::new("gender", DataType::Utf8, false),
            Field::new("level", DataType::Utf8, true),
        ])
    }
}

impl TableRow for TimeRecord {
    const TABLE: TableName = TableName::Time;

    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("start_time", utc_millis(), false),
            Field::new("hour", DataType::Int32, false),
            Field::new("day", DataType::Int32, false),
            Field::new("week", DataType::Int32, false),
            Field::new("month", DataType::Int32, false),
            Field::new("year", DataType::Int32, false),
            Field::new("weekday", DataType::Int32, false),
        ])
    }
}

impl TableRow for SongplayRecord {
    const TABLE: TableName = TableName::Songplays;

    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("songplay_id", DataType::Int64, false),
            Field::new("start_time", utc_millis(), false),
            Field::new("user_id", DataType::Utf8, false),
            Field::new("level", DataType::Utf8, true),
            Field::new("song_id", DataType::Utf8, true),
            Field::new("artist_id", DataType::Utf8, true),
            Field::new("session_id", DataType::Int64, true),
            Field::new("location", DataType::Utf8, true),
            Field::new("user_agent", DataType::Utf8, true),
            Field::new("year", DataType::Int32, false),
            Field::new("month", DataType::Int32, false),
        ])
    }

    fn partition_values(&self) -> Vec<Option<String>> {
        vec![Some(self.year.to_string()), Some(self.month.to_string())]
    }
}

/// Convert typed rows into a RecordBatch with the table's schema
pub fn rows_to_batch<T: TableRow>(rows: &[&T]) -> Result<RecordBatch> {
    let values = rows
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    json_to_arrow(T::TABLE, &values, &T::schema())
}

/// Lay out JSON objects as columns of `schema`
fn json_to_arrow(table: TableName, records: &[JsonValue], schema: &Schema) -> Result<RecordBatch> {
    let schema = Arc::new(schema.clone());
    if records.is_empty() {
        return Ok(RecordBatch::new_empty(schema));
    }

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());
    for field in schema.fields() {
        let values: Vec<Option<&JsonValue>> = records
            .iter()
            .map(|record| record.get(field.name()).filter(|v| !v.is_null()))
            .collect();
        columns.push(build_array(table, field.name(), &values, field.data_type())?);
    }

    RecordBatch::try_new(schema, columns).map_err(|e| Error::schema(table.as_str(), e.to_string()))
}

/// Build an Arrow array from JSON values
fn build_array(
    table: TableName,
    column: &str,
    values: &[Option<&JsonValue>],
    data_type: &DataType,
) -> Result<ArrayRef> {
    match data_type {
        DataType::Int32 => {
            let arr: Int32Array = values
                .iter()
                .map(|v| v.and_then(JsonValue::as_i64).and_then(|i| i32::try_from(i).ok()))
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::Int64 => {
            let arr: Int64Array = values.iter().map(|v| v.and_then(JsonValue::as_i64)).collect();
            Ok(Arc::new(arr))
        }

        DataType::Float64 => {
            let arr: Float64Array = values.iter().map(|v| v.and_then(JsonValue::as_f64)).collect();
            Ok(Arc::new(arr))
        }

        DataType::Utf8 => {
            let arr: StringArray = values
                .iter()
                .map(|v| {
                    v.map(|v| match v {
                        JsonValue::String(s) => s.clone(),
                        _ => v.to_string(),
                    })
                })
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::Timestamp(TimeUnit::Millisecond, tz) => {
            let arr: TimestampMillisecondArray =
                values.iter().map(|v| v.and_then(JsonValue::as_i64)).collect();
            Ok(Arc::new(arr.with_timezone_opt(tz.clone())))
        }

        other => Err(Error::schema(
            table.as_str(),
            format!("Unsupported type {other} for column '{column}'"),
        )),
    }
}

/// Convert an Arrow RecordBatch back to JSON records
///
/// Timestamps come out as RFC 3339 strings in UTC.
pub fn arrow_to_json(batch: &RecordBatch) -> Result<Vec<JsonValue>> {
    let schema = batch.schema();
    let mut records = Vec::with_capacity(batch.num_rows());

    for row in 0..batch.num_rows() {
        let mut record = serde_json::Map::new();
        for (col_idx, field) in schema.fields().iter().enumerate() {
            let value = array_value_to_json(batch.column(col_idx).as_ref(), row)?;
            record.insert(field.name().clone(), value);
        }
        records.push(JsonValue::Object(record));
    }

    Ok(records)
}

fn downcast<'a, A: 'static>(array: &'a dyn Array, name: &str) -> Result<&'a A> {
    array
        .as_any()
        .downcast_ref::<A>()
        .ok_or_else(|| Error::output(format!("Failed to downcast to {name}")))
}

/// Convert a single array element to JSON
fn array_value_to_json(array: &dyn Array, row: usize) -> Result<JsonValue> {
    if array.is_null(row) {
        return Ok(JsonValue::Null);
    }

    match array.data_type() {
        DataType::Int32 => {
            let arr = downcast::<Int32Array>(array, "Int32Array")?;
            Ok(JsonValue::Number(arr.value(row).into()))
        }

        DataType::Int64 => {
            let arr = downcast::<Int64Array>(array, "Int64Array")?;
            Ok(JsonValue::Number(arr.value(row).into()))
        }

        DataType::Float64 => {
            let arr = downcast::<Float64Array>(array, "Float64Array")?;
            Ok(serde_json::Number::from_f64(arr.value(row)).map_or(JsonValue::Null, JsonValue::Number))
        }

        DataType::Utf8 => {
            let arr = downcast::<StringArray>(array, "StringArray")?;
            Ok(JsonValue::String(arr.value(row).to_string()))
        }

        DataType::Timestamp(TimeUnit::Millisecond, _) => {
            let arr = downcast::<TimestampMillisecondArray>(array, "TimestampMillisecondArray")?;
            let millis = arr.value(row);
            Ok(Utc
                .timestamp_millis_opt(millis)
                .single()
                .map_or(JsonValue::Number(millis.into()), |dt| {
                    JsonValue::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
                }))
        }

        other => Ok(JsonValue::String(format!("<unsupported {other}>"))),
    }
}
