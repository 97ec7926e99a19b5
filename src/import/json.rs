use serde_json::{Map, Value};
use std::path::Path;
use tracing::warn;

use crate::error::{ImportError, Result};
use crate::import::{has_extension, whole_seconds, SessionFormat};
use crate::models::{CompletionTimestamp, SessionRecord};

/// Fields that may carry the completion time of a session document, in
/// order of preference
const TIMESTAMP_FIELDS: &[&str] = &[
    "completedAt",
    "completed_at",
    "completionTimestamp",
    "completion_timestamp",
];

const ID_FIELDS: &[&str] = &["id"];
const NAME_FIELDS: &[&str] = &["workoutName", "workout_name", "name"];
const DURATION_FIELDS: &[&str] = &["durationSeconds", "duration_seconds"];

/// Importer for JSON exports of session documents.
///
/// Accepts either a top-level array of documents or an object with a
/// `sessions` array. A document whose timestamp has an unrecognised shape
/// is kept without a completion time; anything that is not a document at
/// all is skipped.
pub struct JsonImporter;

impl JsonImporter {
    pub fn new() -> Self {
        Self
    }

    /// Parse session documents from JSON text
    pub fn parse_str(&self, content: &str) -> Result<Vec<SessionRecord>> {
        let root: Value = serde_json::from_str(content).map_err(|e| ImportError::ParseError {
            format: "json".to_string(),
            reason: e.to_string(),
        })?;

        let documents = match root {
            Value::Array(documents) => documents,
            Value::Object(mut object) => match object.remove("sessions") {
                Some(Value::Array(documents)) => documents,
                _ => {
                    return Err(ImportError::InvalidStructure {
                        reason: "expected an array of sessions or a `sessions` array".to_string(),
                    }
                    .into())
                }
            },
            _ => {
                return Err(ImportError::InvalidStructure {
                    reason: "expected an array of sessions".to_string(),
                }
                .into())
            }
        };

        let mut sessions = Vec::with_capacity(documents.len());
        for (index, document) in documents.into_iter().enumerate() {
            match Self::parse_document(document) {
                Some(session) => sessions.push(session),
                None => warn!(index, "Skipping unreadable session entry"),
            }
        }

        Ok(sessions)
    }

    /// Build a record field by field, so one odd field never costs the
    /// document its other values
    fn parse_document(document: Value) -> Option<SessionRecord> {
        let Value::Object(object) = document else {
            return None;
        };

        let completed_at = first_present(&object, TIMESTAMP_FIELDS).and_then(|value| {
            let parsed = serde_json::from_value::<CompletionTimestamp>(value.clone()).ok();
            if parsed.is_none() {
                warn!(timestamp = %value, "Unrecognised completion timestamp, keeping session undated");
            }
            parsed
        });

        let id = first_present(&object, ID_FIELDS).and_then(|value| match value {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        });

        let workout_name = first_present(&object, NAME_FIELDS)
            .and_then(Value::as_str)
            .map(str::to_string);

        let duration_seconds = first_present(&object, DURATION_FIELDS).and_then(read_duration);

        Some(SessionRecord {
            id,
            workout_name,
            completed_at,
            duration_seconds,
        })
    }
}

/// First non-null value among `fields`
fn first_present<'a>(object: &'a Map<String, Value>, fields: &[&str]) -> Option<&'a Value> {
    fields
        .iter()
        .filter_map(|field| object.get(*field))
        .find(|value| !value.is_null())
}

fn read_duration(value: &Value) -> Option<u32> {
    match value.as_u64() {
        Some(seconds) => u32::try_from(seconds).ok(),
        None => value.as_f64().and_then(whole_seconds),
    }
}

impl Default for JsonImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionFormat for JsonImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        has_extension(file_path, &["json"])
    }

    fn import_file(&self, file_path: &Path) -> Result<Vec<SessionRecord>> {
        let content = std::fs::read_to_string(file_path)?;
        self.parse_str(&content)
    }

    fn format_name(&self) -> &'static str {
        "JSON"
    }
}
