use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::contract::{MessageRecord, ValidationError};

/// Immutable, load-once handle over the full source dataset.
///
/// Built exactly once during process setup and shared by reference into the
/// sampling operation; a dataset that fails to load is a fatal startup
/// condition, not a per-invocation error.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<MessageRecord>,
}

impl Dataset {
    pub fn from_records(records: Vec<MessageRecord>) -> Result<Self, ValidationError> {
        if records.is_empty() {
            return Err(ValidationError::new("Source dataset cannot be empty"));
        }
        Ok(Self { records })
    }

    pub fn from_csv_reader(reader: impl Read) -> Result<Self, ValidationError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();
        for row in csv_reader.deserialize::<MessageRecord>() {
            let record = row.map_err(|error| {
                ValidationError::new(format!("Malformed dataset row: {error}"))
            })?;
            records.push(record);
        }
        Self::from_records(records)
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, ValidationError> {
        let file = File::open(path).map_err(|error| {
            ValidationError::new(format!(
                "Failed to open dataset file {}: {error}",
                path.display()
            ))
        })?;
        Self::from_csv_reader(file)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[MessageRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATASET_CSV: &str = "\
message_id,message_timestamp,message_content,reply_message_id,trader_id,chat_link,processing_time
11,2026-08-30T09:00:00Z,first message,,trader-1,100,2026-08-30T09:00:05Z
12,2026-08-30T09:01:00Z,second message,11,trader-2,100,2026-08-30T09:01:05Z
";

    #[test]
    fn loads_records_from_csv() {
        let dataset = Dataset::from_csv_reader(DATASET_CSV.as_bytes()).expect("csv should load");

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[0].message_id, 11);
        assert_eq!(dataset.records()[0].reply_message_id, None);
        assert_eq!(dataset.records()[1].reply_message_id, Some(11.0));
    }

    #[test]
    fn rejects_empty_dataset() {
        let header_only =
            "message_id,message_timestamp,message_content,reply_message_id,trader_id,chat_link,processing_time\n";
        let error =
            Dataset::from_csv_reader(header_only.as_bytes()).expect_err("dataset should fail");
        assert_eq!(error.message(), "Source dataset cannot be empty");
    }

    #[test]
    fn rejects_malformed_row() {
        let bad = "\
message_id,message_timestamp,message_content,reply_message_id,trader_id,chat_link,processing_time
not-a-number,2026-08-30T09:00:00Z,text,,trader-1,100,
";
        let error = Dataset::from_csv_reader(bad.as_bytes()).expect_err("row should fail");
        assert!(error.message().starts_with("Malformed dataset row"));
    }
}
