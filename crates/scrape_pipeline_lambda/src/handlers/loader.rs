use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::adapters::object_store::StagedObjectStore;
use crate::adapters::statement_execution::{Sleeper, StatementExecution};
use crate::handlers::statement_waiter::{
    execute_statement_and_wait, StatementWaitError, WaitOptions,
};
use crate::runtime::contract::SampleBatch;
use crate::runtime::{sql, storage_keys};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    pub bucket: String,
    pub unprocessed_prefix: String,
    pub processed_prefix: String,
    pub region: String,
    pub iam_role_arn: String,
    pub database: String,
    pub schema: String,
    pub table: String,
    pub run_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoadSuccessResponse {
    pub status: String,
    pub rows_loaded: usize,
    pub staged_key: String,
    pub processed_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadHandlerError {
    /// Wrong queue batch size. Fatal, not retried with a different shape;
    /// redelivery replays the same single-message batch.
    BatchSize { received: usize },
    MalformedEvent { message: String },
    MalformedBody { message: String },
    Statement(StatementWaitError),
    Storage { message: String },
}

impl std::fmt::Display for LoadHandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BatchSize { received } => {
                write!(f, "queue batch size must be 1, received {received}")
            }
            Self::MalformedEvent { message } => write!(f, "malformed queue event: {message}"),
            Self::MalformedBody { message } => write!(f, "malformed message body: {message}"),
            Self::Statement(error) => write!(f, "{error}"),
            Self::Storage { message } => write!(f, "staged object storage failed: {message}"),
        }
    }
}

impl std::error::Error for LoadHandlerError {}

impl From<StatementWaitError> for LoadHandlerError {
    fn from(error: StatementWaitError) -> Self {
        Self::Statement(error)
    }
}

/// Load one queue-delivered batch into the warehouse table.
///
/// The staged object is written before the bulk copy and relocated after it
/// by copy-then-delete. The relocation is not atomic: a crash between the
/// two calls leaves the object in both namespaces, and a redelivered message
/// replays the whole load. Duplicate rows from such a replay are tolerated.
pub fn handle_load_event(
    event: Value,
    config: &LoaderConfig,
    execution: &dyn StatementExecution,
    sleeper: &dyn Sleeper,
    object_store: &impl StagedObjectStore,
    wait_options: &WaitOptions,
) -> Result<LoadSuccessResponse, LoadHandlerError> {
    let bodies = normalize_queue_event(event)?;
    if bodies.len() != 1 {
        return Err(LoadHandlerError::BatchSize {
            received: bodies.len(),
        });
    }

    let batch = SampleBatch::from_queue_json(&bodies[0]).map_err(|error| {
        LoadHandlerError::MalformedBody {
            message: error.message().to_string(),
        }
    })?;

    let staged_key = storage_keys::staged_object_key(
        &config.unprocessed_prefix,
        &config.run_date,
        &batch.fingerprint(),
    );
    object_store
        .write_object(&staged_key, batch.to_json_lines().as_bytes())
        .map_err(|message| LoadHandlerError::Storage { message })?;

    let statements = [
        sql::create_schema_statement(&config.schema),
        sql::create_table_statement(&config.schema, &config.table),
        sql::copy_from_staged_object_statement(
            &config.database,
            &config.schema,
            &config.table,
            &config.bucket,
            &staged_key,
            &config.region,
            &config.iam_role_arn,
        ),
    ];
    for statement in &statements {
        execute_statement_and_wait(execution, sleeper, statement, wait_options)?;
    }

    let processed_key = relocate_staged_object(config, object_store, &staged_key)?;

    log_loader_info(
        "batch_loaded",
        json!({
            "rows": batch.len(),
            "staged_key": staged_key.clone(),
            "processed_key": processed_key.clone(),
        }),
    );

    Ok(LoadSuccessResponse {
        status: "ok".to_string(),
        rows_loaded: batch.len(),
        staged_key,
        processed_key,
    })
}

/// Copy-then-delete emulation of a move. If the delete fails after the copy
/// succeeded, the object exists at both keys until the next replay.
fn relocate_staged_object(
    config: &LoaderConfig,
    object_store: &impl StagedObjectStore,
    staged_key: &str,
) -> Result<String, LoadHandlerError> {
    let processed_key = storage_keys::relocated_object_key(
        staged_key,
        &config.unprocessed_prefix,
        &config.processed_prefix,
    )
    .map_err(|error| LoadHandlerError::Storage {
        message: error.message().to_string(),
    })?;

    object_store
        .copy_object(staged_key, &processed_key)
        .map_err(|message| LoadHandlerError::Storage { message })?;
    object_store
        .delete_object(staged_key)
        .map_err(|message| LoadHandlerError::Storage { message })?;

    log_loader_info(
        "staged_object_moved",
        json!({
            "from": format!("s3://{}/{staged_key}", config.bucket),
            "to": format!("s3://{}/{processed_key}", config.bucket),
        }),
    );

    Ok(processed_key)
}

fn normalize_queue_event(event: Value) -> Result<Vec<String>, LoadHandlerError> {
    let records = event
        .as_object()
        .and_then(|object| object.get("Records"))
        .and_then(Value::as_array)
        .ok_or_else(|| LoadHandlerError::MalformedEvent {
            message: "event must carry a Records array".to_string(),
        })?;

    records
        .iter()
        .map(|record| {
            record
                .as_object()
                .and_then(|object| object.get("body"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| LoadHandlerError::MalformedEvent {
                    message: "each record must carry a string body".to_string(),
                })
        })
        .collect()
}

fn log_loader_info(event: &str, details: serde_json::Value) {
    eprintln!(
        "{}",
        json!({
            "component": "load_handler",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}
