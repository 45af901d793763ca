use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hard ceiling on the serialized queue body for one batch. The messaging
/// channel rejects bodies of 256 KB and above, so a draw must serialize to
/// strictly fewer bytes than this to be publishable.
pub const MAX_QUEUE_MESSAGE_BYTES: usize = 256_000;

pub const MIN_SAMPLE_ROWS: usize = 1;
pub const MAX_SAMPLE_ROWS: usize = 1_000;

/// Widest content the destination table column accepts.
pub const MAX_MESSAGE_CONTENT_CHARS: usize = 5_000;

/// One row of the scraped source dataset.
///
/// `reply_message_id` is semantically an integer but stays a float because
/// the column is nullable in the source data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageRecord {
    pub message_id: i64,
    pub message_timestamp: String,
    pub message_content: String,
    pub reply_message_id: Option<f64>,
    pub trader_id: String,
    pub chat_link: i64,
    #[serde(default)]
    pub processing_time: String,
}

/// An ordered collection of records drawn from the dataset, published as one
/// queue message and consumed exactly once by the loader.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SampleBatch {
    pub records: Vec<MessageRecord>,
}

impl SampleBatch {
    pub fn new(records: Vec<MessageRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serialized form published to the messaging channel. The size ceiling
    /// in [`MAX_QUEUE_MESSAGE_BYTES`] applies to this string.
    pub fn to_queue_json(&self) -> String {
        stable_contract_json(self)
    }

    pub fn from_queue_json(body: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(body)
            .map_err(|error| ValidationError::new(format!("Malformed batch body: {error}")))
    }

    /// One JSON object per line, the layout the warehouse bulk-copy consumes
    /// with `format as json 'auto'`.
    pub fn to_json_lines(&self) -> String {
        let mut lines = String::new();
        for record in &self.records {
            lines.push_str(&stable_contract_json(record));
            lines.push('\n');
        }
        lines
    }

    /// Stable digest of the serialized batch. Staged-object keys embed this
    /// so a redelivered batch restages to the same key instead of
    /// multiplying staged objects.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.to_queue_json());
        format!("{:x}", hasher.finalize())
    }
}

pub fn stable_contract_json(value: impl Serialize) -> String {
    serde_json::to_string(&value).expect("serialization of contract value should not fail")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}
