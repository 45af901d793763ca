use std::path::Path;
use std::sync::Arc;

use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use scrape_pipeline_lambda::adapters::message_queue::BatchPublisher;
use scrape_pipeline_lambda::handlers::publisher::{handle_publish_event, PublishSuccessResponse};
use scrape_pipeline_lambda::runtime::dataset::Dataset;
use scrape_pipeline_lambda::runtime::sampler::SampleLimits;

struct SqsBatchPublisher {
    queue_url: String,
    sqs_client: aws_sdk_sqs::Client,
}

impl BatchPublisher for SqsBatchPublisher {
    fn publish_batch(&self, body: &str) -> Result<(), String> {
        let queue_url = self.queue_url.clone();
        let message_body = body.to_string();
        let client = self.sqs_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .send_message()
                    .queue_url(queue_url)
                    .message_body(message_body)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to send message to queue: {error}"))
            })
        })
    }
}

async fn handle_request(
    event: LambdaEvent<Value>,
    dataset: Arc<Dataset>,
) -> Result<PublishSuccessResponse, Error> {
    // Timer ticks carry no payload the sampler needs.
    let _ = event;

    let queue_url =
        std::env::var("QUEUE_URL").map_err(|_| Error::from("QUEUE_URL must be configured"))?;

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let publisher = SqsBatchPublisher {
        queue_url,
        sqs_client: aws_sdk_sqs::Client::new(&aws_config),
    };

    let mut rng = rand::thread_rng();
    handle_publish_event(&dataset, &mut rng, &publisher, &SampleLimits::default())
        .map_err(|error| Error::from(error.message))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Dataset load happens once, before any invocation can be served, and is
    // fatal on failure.
    let dataset_path = std::env::var("DATASET_PATH")
        .map_err(|_| Error::from("DATASET_PATH must be configured"))?;
    let dataset = Dataset::from_csv_path(Path::new(&dataset_path))
        .map_err(|error| Error::from(format!("failed to load source dataset: {error}")))?;
    let dataset = Arc::new(dataset);

    lambda_runtime::run(service_fn(move |event| {
        let dataset = Arc::clone(&dataset);
        async move { handle_request(event, dataset).await }
    }))
    .await
}
