use std::time::Duration;

use aws_sdk_s3::primitives::ByteStream;
use chrono::Utc;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use scrape_pipeline_lambda::adapters::object_store::StagedObjectStore;
use scrape_pipeline_lambda::adapters::statement_execution::{
    cluster_identifier_from_endpoint, Sleeper, StatementExecution, StatementHandle,
    StatementReport, StatementStatus,
};
use scrape_pipeline_lambda::handlers::loader::{
    handle_load_event, LoadSuccessResponse, LoaderConfig,
};
use scrape_pipeline_lambda::handlers::statement_waiter::WaitOptions;

struct RedshiftDataExecution {
    redshift_data_client: aws_sdk_redshiftdata::Client,
    cluster_identifier: String,
    database: String,
    db_user: String,
}

impl StatementExecution for RedshiftDataExecution {
    fn submit(&self, sql: &str) -> Result<StatementHandle, String> {
        let client = self.redshift_data_client.clone();
        let cluster_identifier = self.cluster_identifier.clone();
        let database = self.database.clone();
        let db_user = self.db_user.clone();
        let statement = sql.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let response = client
                    .execute_statement()
                    .cluster_identifier(cluster_identifier)
                    .database(database)
                    .db_user(db_user)
                    .sql(statement)
                    .send()
                    .await
                    .map_err(|error| format!("failed to submit statement: {error}"))?;

                response
                    .id()
                    .map(|statement_id| StatementHandle {
                        statement_id: statement_id.to_string(),
                    })
                    .ok_or_else(|| "statement submission returned no id".to_string())
            })
        })
    }

    fn poll(&self, handle: &StatementHandle) -> Result<StatementReport, String> {
        let client = self.redshift_data_client.clone();
        let statement_id = handle.statement_id.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let response = client
                    .describe_statement()
                    .id(statement_id)
                    .send()
                    .await
                    .map_err(|error| format!("failed to describe statement: {error}"))?;

                let status = response
                    .status()
                    .map(|status| StatementStatus::from_status_str(status.as_str()))
                    .ok_or_else(|| "statement description carried no status".to_string())?;

                Ok(StatementReport {
                    status,
                    diagnostics: response.error().map(str::to_string),
                })
            })
        })
    }
}

struct S3StagedObjectStore {
    bucket: String,
    s3_client: aws_sdk_s3::Client,
}

impl StagedObjectStore for S3StagedObjectStore {
    fn write_object(&self, key: &str, body: &[u8]) -> Result<(), String> {
        let bucket = self.bucket.clone();
        let object_key = key.to_string();
        let body_bytes = body.to_vec();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_object()
                    .bucket(bucket)
                    .key(object_key)
                    .body(ByteStream::from(body_bytes))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to write object to s3: {error}"))
            })
        })
    }

    fn copy_object(&self, source_key: &str, destination_key: &str) -> Result<(), String> {
        let bucket = self.bucket.clone();
        let copy_source = format!("{}/{source_key}", self.bucket);
        let destination = destination_key.to_string();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .copy_object()
                    .bucket(bucket)
                    .key(destination)
                    .copy_source(copy_source)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to copy object in s3: {error}"))
            })
        })
    }

    fn delete_object(&self, key: &str) -> Result<(), String> {
        let bucket = self.bucket.clone();
        let object_key = key.to_string();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .delete_object()
                    .bucket(bucket)
                    .key(object_key)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to delete object from s3: {error}"))
            })
        })
    }
}

struct BlockingSleeper;

impl Sleeper for BlockingSleeper {
    fn sleep(&self, interval: Duration) {
        std::thread::sleep(interval);
    }
}

fn required_env(name: &'static str) -> Result<String, Error> {
    std::env::var(name).map_err(|_| Error::from(format!("{name} must be configured")))
}

fn loader_config_from_env() -> Result<LoaderConfig, Error> {
    Ok(LoaderConfig {
        bucket: required_env("STAGED_MESSAGES_BUCKET")?,
        unprocessed_prefix: std::env::var("UNPROCESSED_MESSAGES_PREFIX")
            .unwrap_or_else(|_| "scraped-messages/unprocessed".to_string()),
        processed_prefix: std::env::var("PROCESSED_MESSAGES_PREFIX")
            .unwrap_or_else(|_| "scraped-messages/processed".to_string()),
        region: required_env("AWS_REGION")?,
        iam_role_arn: required_env("REDSHIFT_ROLE_ARN")?,
        database: required_env("REDSHIFT_DATABASE_NAME")?,
        schema: required_env("REDSHIFT_SCHEMA_NAME")?,
        table: required_env("REDSHIFT_TABLE_NAME")?,
        run_date: Utc::now().format("%Y-%m-%d").to_string(),
    })
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<LoadSuccessResponse, Error> {
    let config = loader_config_from_env()?;
    let endpoint_address = required_env("REDSHIFT_ENDPOINT_ADDRESS")?;
    let cluster_identifier =
        cluster_identifier_from_endpoint(&endpoint_address).map_err(Error::from)?;
    let db_user = required_env("REDSHIFT_USER")?;

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let execution = RedshiftDataExecution {
        redshift_data_client: aws_sdk_redshiftdata::Client::new(&aws_config),
        cluster_identifier,
        database: config.database.clone(),
        db_user,
    };
    let object_store = S3StagedObjectStore {
        bucket: config.bucket.clone(),
        s3_client: aws_sdk_s3::Client::new(&aws_config),
    };

    handle_load_event(
        event.payload,
        &config,
        &execution,
        &BlockingSleeper,
        &object_store,
        &WaitOptions::default(),
    )
    .map_err(|error| Error::from(error.to_string()))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
