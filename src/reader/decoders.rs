//! Document decoding
//!
//! Splits a file body into JSON documents without failing the whole file
//! when one line is broken.

use super::types::SourceRecord;
use crate::types::JsonValue;
use std::str::Lines;

/// A document that could not be turned into a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedDocument {
    /// 1-based line number for JSON Lines bodies
    pub line: Option<usize>,
    pub message: String,
}

impl MalformedDocument {
    fn new(line: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Lazy iterator over the JSON documents in one file body
///
/// Format detection:
/// - the whole body parses as JSON: an array yields its elements, anything
///   else is a single document;
/// - otherwise, if any non-empty line parses on its own, the body is JSON
///   Lines and each non-empty line is one document, so a broken line never
///   hides the lines around it;
/// - otherwise the body is one malformed document.
#[derive(Debug)]
pub enum Documents<'a> {
    Values(std::vec::IntoIter<JsonValue>),
    Lines { lines: Lines<'a>, line_no: usize },
    Malformed(Option<MalformedDocument>),
}

impl<'a> Documents<'a> {
    pub fn new(body: &'a str) -> Self {
        if body.trim().is_empty() {
            return Documents::Values(Vec::new().into_iter());
        }

        match serde_json::from_str::<JsonValue>(body) {
            Ok(JsonValue::Array(items)) => return Documents::Values(items.into_iter()),
            Ok(value) => return Documents::Values(vec![value].into_iter()),
            Err(whole_err) => {
                let any_line_parses = body
                    .lines()
                    .filter(|l| !l.trim().is_empty())
                    .any(|l| serde_json::from_str::<JsonValue>(l).is_ok());
                if !any_line_parses {
                    return Documents::Malformed(Some(MalformedDocument::new(
                        None,
                        format!("Failed to parse JSON: {whole_err}"),
                    )));
                }
            }
        }

        Documents::Lines {
            lines: body.lines(),
            line_no: 0,
        }
    }
}

impl Iterator for Documents<'_> {
    type Item = Result<JsonValue, MalformedDocument>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Documents::Values(values) => values.next().map(Ok),
            Documents::Malformed(doc) => doc.take().map(Err),
            Documents::Lines { lines, line_no } => loop {
                let line = lines.next()?;
                *line_no += 1;
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                return Some(serde_json::from_str(line).map_err(|e| {
                    MalformedDocument::new(
                        Some(*line_no),
                        format!("Failed to parse JSONL at line {line_no}: {e}"),
                    )
                }));
            },
        }
    }
}

/// Lazily decode a body into typed records
///
/// Documents that are not JSON objects are reported as malformed.
pub fn decode_records<T: SourceRecord>(
    body: &str,
) -> impl Iterator<Item = Result<T, MalformedDocument>> + '_ {
    Documents::new(body).map(|doc| match doc? {
        JsonValue::Object(obj) => Ok(T::from_object(&obj)),
        other => Err(MalformedDocument::new(
            None,
            format!("Expected a JSON object, found {}", json_kind(&other)),
        )),
    })
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
