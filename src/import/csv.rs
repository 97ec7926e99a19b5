use csv::{ReaderBuilder, StringRecord};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::warn;

use crate::error::{ImportError, Result};
use crate::import::{has_extension, whole_seconds, SessionFormat};
use crate::models::{CompletionTimestamp, SessionRecord};

/// CSV importer with flexible column mapping
pub struct CsvImporter {
    column_mapping: HashMap<String, String>,
}

impl CsvImporter {
    pub fn new() -> Self {
        let mut column_mapping = HashMap::new();

        Self::add_mapping(
            &mut column_mapping,
            "completed_at",
            &[
                "completed_at",
                "completedat",
                "completion_timestamp",
                "completiontimestamp",
                "date",
                "timestamp",
                "finished_at",
            ],
        );
        Self::add_mapping(
            &mut column_mapping,
            "workout_name",
            &["workout_name", "workoutname", "name", "workout", "template"],
        );
        Self::add_mapping(&mut column_mapping, "id", &["id", "session_id", "sessionid"]);
        Self::add_mapping(
            &mut column_mapping,
            "duration_seconds",
            &["duration_seconds", "durationseconds", "duration"],
        );

        Self { column_mapping }
    }

    fn add_mapping(mapping: &mut HashMap<String, String>, standard: &str, variations: &[&str]) {
        for variation in variations {
            mapping.insert(variation.to_lowercase(), standard.to_string());
        }
    }

    /// Map header positions to standard column names
    fn map_headers(&self, headers: &StringRecord) -> HashMap<String, usize> {
        let mut positions = HashMap::new();
        for (index, header) in headers.iter().enumerate() {
            let key = header.trim().to_lowercase();
            if let Some(standard) = self.column_mapping.get(&key) {
                positions.entry(standard.clone()).or_insert(index);
            }
        }
        positions
    }

    /// Read session rows from any CSV source
    pub fn read_sessions<R: Read>(&self, reader: R) -> Result<Vec<SessionRecord>> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers().map_err(parse_error)?.clone();
        let positions = self.map_headers(&headers);

        if !positions.contains_key("completed_at") {
            return Err(ImportError::InvalidStructure {
                reason: format!(
                    "no completion time column among headers: {}",
                    headers.iter().collect::<Vec<_>>().join(", ")
                ),
            }
            .into());
        }

        let field = |record: &StringRecord, name: &str| -> Option<String> {
            positions
                .get(name)
                .and_then(|&index| record.get(index))
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let mut sessions = Vec::new();
        for (row, record) in csv_reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    warn!(row = row + 1, error = %e, "Skipping unreadable CSV row");
                    continue;
                }
            };

            sessions.push(SessionRecord {
                id: field(&record, "id"),
                workout_name: field(&record, "workout_name"),
                completed_at: field(&record, "completed_at").map(parse_timestamp_cell),
                duration_seconds: field(&record, "duration_seconds")
                    .and_then(|v| v.parse::<f64>().ok())
                    .and_then(whole_seconds),
            });
        }

        Ok(sessions)
    }
}

/// Numeric cells are epoch milliseconds; anything else is kept as text
fn parse_timestamp_cell(value: String) -> CompletionTimestamp {
    match value.parse::<f64>() {
        Ok(millis) => CompletionTimestamp::Millis(millis),
        Err(_) => CompletionTimestamp::Text(value),
    }
}

fn parse_error(e: csv::Error) -> ImportError {
    ImportError::ParseError {
        format: "csv".to_string(),
        reason: e.to_string(),
    }
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionFormat for CsvImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        has_extension(file_path, &["csv"])
    }

    fn import_file(&self, file_path: &Path) -> Result<Vec<SessionRecord>> {
        let file = std::fs::File::open(file_path)?;
        self.read_sessions(file)
    }

    fn format_name(&self) -> &'static str {
        "CSV"
    }
}
