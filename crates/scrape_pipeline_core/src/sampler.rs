use rand::seq::index;
use rand::Rng;

use crate::contract::{
    SampleBatch, MAX_QUEUE_MESSAGE_BYTES, MAX_SAMPLE_ROWS, MIN_SAMPLE_ROWS,
};
use crate::dataset::Dataset;

pub const DEFAULT_MAX_SAMPLE_ATTEMPTS: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleLimits {
    pub min_rows: usize,
    pub max_rows: usize,
    pub max_serialized_bytes: usize,
    pub max_attempts: usize,
}

impl Default for SampleLimits {
    fn default() -> Self {
        Self {
            min_rows: MIN_SAMPLE_ROWS,
            max_rows: MAX_SAMPLE_ROWS,
            max_serialized_bytes: MAX_QUEUE_MESSAGE_BYTES,
            max_attempts: DEFAULT_MAX_SAMPLE_ATTEMPTS,
        }
    }
}

/// An accepted draw together with its serialized queue body.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnSample {
    pub batch: SampleBatch,
    pub serialized: String,
    pub attempts: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleError {
    EmptyDataset,
    InvalidLimits { message: String },
    AttemptsExhausted { attempts: usize, ceiling: usize },
}

impl std::fmt::Display for SampleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDataset => f.write_str("cannot sample from an empty dataset"),
            Self::InvalidLimits { message } => write!(f, "invalid sample limits: {message}"),
            Self::AttemptsExhausted { attempts, ceiling } => write!(
                f,
                "no draw fit under the {ceiling}-byte ceiling after {attempts} attempts"
            ),
        }
    }
}

impl std::error::Error for SampleError {}

/// Draw a random-size sample, without replacement within a draw, and accept
/// it only when the serialized form stays strictly under the byte ceiling.
///
/// Rejected draws are discarded and redrawn whole, never truncated. The
/// attempt cap guarantees termination; typical draws are accepted on the
/// first attempt.
pub fn draw_bounded_sample(
    dataset: &Dataset,
    rng: &mut impl Rng,
    limits: &SampleLimits,
) -> Result<DrawnSample, SampleError> {
    if dataset.is_empty() {
        return Err(SampleError::EmptyDataset);
    }
    validate_limits(limits)?;

    let upper_rows = limits.max_rows.min(dataset.len());
    let lower_rows = limits.min_rows.min(upper_rows);

    for attempt in 1..=limits.max_attempts {
        let size = rng.gen_range(lower_rows..=upper_rows);
        let chosen = index::sample(rng, dataset.len(), size);

        let records = chosen
            .iter()
            .map(|row_index| dataset.records()[row_index].clone())
            .collect();
        let batch = SampleBatch::new(records);

        let serialized = batch.to_queue_json();
        if serialized.len() < limits.max_serialized_bytes {
            return Ok(DrawnSample {
                batch,
                serialized,
                attempts: attempt,
            });
        }
    }

    Err(SampleError::AttemptsExhausted {
        attempts: limits.max_attempts,
        ceiling: limits.max_serialized_bytes,
    })
}

fn validate_limits(limits: &SampleLimits) -> Result<(), SampleError> {
    if limits.min_rows == 0 {
        return Err(SampleError::InvalidLimits {
            message: "min_rows must be a positive integer".to_string(),
        });
    }
    if limits.min_rows > limits.max_rows {
        return Err(SampleError::InvalidLimits {
            message: "min_rows cannot exceed max_rows".to_string(),
        });
    }
    if limits.max_attempts == 0 {
        return Err(SampleError::InvalidLimits {
            message: "max_attempts must be a positive integer".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::contract::MessageRecord;

    fn dataset_with_content(rows: usize, content: &str) -> Dataset {
        let records = (0..rows)
            .map(|row| MessageRecord {
                message_id: row as i64,
                message_timestamp: "2026-08-30T09:00:00Z".to_string(),
                message_content: content.to_string(),
                reply_message_id: None,
                trader_id: format!("trader-{row}"),
                chat_link: 100,
                processing_time: String::new(),
            })
            .collect();
        Dataset::from_records(records).expect("dataset should build")
    }

    #[test]
    fn accepted_draw_stays_under_the_ceiling() {
        let dataset = dataset_with_content(500, "short");
        let mut rng = StdRng::seed_from_u64(7);
        let limits = SampleLimits {
            max_rows: 100,
            ..SampleLimits::default()
        };

        for _ in 0..20 {
            let sample =
                draw_bounded_sample(&dataset, &mut rng, &limits).expect("draw should succeed");
            assert!(sample.serialized.len() < limits.max_serialized_bytes);
            assert!(sample.batch.len() >= 1);
            assert!(sample.batch.len() <= 100);
        }
    }

    #[test]
    fn sample_size_never_exceeds_dataset_rows() {
        let dataset = dataset_with_content(3, "tiny");
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..20 {
            let sample = draw_bounded_sample(&dataset, &mut rng, &SampleLimits::default())
                .expect("draw should succeed");
            assert!(sample.batch.len() <= 3);
        }
    }

    #[test]
    fn draw_has_no_replacement_within_a_batch() {
        let dataset = dataset_with_content(50, "short");
        let mut rng = StdRng::seed_from_u64(3);
        let sample = draw_bounded_sample(&dataset, &mut rng, &SampleLimits::default())
            .expect("draw should succeed");

        let mut seen: Vec<i64> = sample
            .batch
            .records
            .iter()
            .map(|record| record.message_id)
            .collect();
        seen.sort_unstable();
        let before = seen.len();
        seen.dedup();
        assert_eq!(seen.len(), before);
    }

    #[test]
    fn oversized_draws_are_rejected_and_redrawn() {
        // Roughly 550 serialized bytes per record; a 700-byte ceiling only
        // admits single-row draws, so larger draws must be discarded whole.
        let dataset = dataset_with_content(20, &"x".repeat(400));
        let mut rng = StdRng::seed_from_u64(5);
        let limits = SampleLimits {
            max_rows: 10,
            max_serialized_bytes: 700,
            max_attempts: 256,
            ..SampleLimits::default()
        };

        let sample = draw_bounded_sample(&dataset, &mut rng, &limits).expect("draw should succeed");
        assert_eq!(sample.batch.len(), 1);
        assert!(sample.serialized.len() < 700);
    }

    #[test]
    fn exhausts_attempts_when_no_draw_can_fit() {
        let dataset = dataset_with_content(5, &"y".repeat(2_000));
        let mut rng = StdRng::seed_from_u64(13);
        let limits = SampleLimits {
            max_serialized_bytes: 100,
            max_attempts: 4,
            ..SampleLimits::default()
        };

        let error = draw_bounded_sample(&dataset, &mut rng, &limits).expect_err("draw should fail");
        assert_eq!(
            error,
            SampleError::AttemptsExhausted {
                attempts: 4,
                ceiling: 100,
            }
        );
    }

    #[test]
    fn rejects_zero_min_rows() {
        let dataset = dataset_with_content(5, "short");
        let mut rng = StdRng::seed_from_u64(1);
        let limits = SampleLimits {
            min_rows: 0,
            ..SampleLimits::default()
        };

        let error = draw_bounded_sample(&dataset, &mut rng, &limits).expect_err("draw should fail");
        assert!(matches!(error, SampleError::InvalidLimits { .. }));
    }
}
