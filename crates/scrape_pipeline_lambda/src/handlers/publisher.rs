use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::adapters::message_queue::BatchPublisher;
use crate::runtime::dataset::Dataset;
use crate::runtime::sampler::{draw_bounded_sample, SampleLimits};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublishSuccessResponse {
    pub status: String,
    pub rows_published: usize,
    pub serialized_bytes: usize,
    pub attempts: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishHandlerError {
    pub message: String,
}

/// Draw one bounded sample from the dataset and publish exactly one queue
/// message containing it.
pub fn handle_publish_event(
    dataset: &Dataset,
    rng: &mut impl Rng,
    publisher: &impl BatchPublisher,
    limits: &SampleLimits,
) -> Result<PublishSuccessResponse, PublishHandlerError> {
    let sample = draw_bounded_sample(dataset, rng, limits).map_err(|error| PublishHandlerError {
        message: format!("Failed to draw a publishable sample: {error}"),
    })?;

    publisher
        .publish_batch(&sample.serialized)
        .map_err(|error| PublishHandlerError {
            message: format!("Failed to publish sample batch: {error}"),
        })?;

    log_publisher_info(
        "batch_published",
        json!({
            "rows": sample.batch.len(),
            "serialized_bytes": sample.serialized.len(),
            "attempts": sample.attempts,
        }),
    );

    Ok(PublishSuccessResponse {
        status: "ok".to_string(),
        rows_published: sample.batch.len(),
        serialized_bytes: sample.serialized.len(),
        attempts: sample.attempts,
    })
}

fn log_publisher_info(event: &str, details: serde_json::Value) {
    eprintln!(
        "{}",
        json!({
            "component": "publish_handler",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}
