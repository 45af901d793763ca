use std::time::Duration;

use serde_json::json;

use crate::adapters::statement_execution::{
    Sleeper, StatementExecution, StatementHandle, StatementStatus,
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Fixed-interval polling with this cap stays inside the longest execution
/// window a Lambda invocation can be granted.
pub const DEFAULT_MAX_POLLS: usize = 900;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitOptions {
    pub poll_interval: Duration,
    pub max_polls: usize,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: DEFAULT_MAX_POLLS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementOutcome {
    pub handle: StatementHandle,
    pub polls: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementWaitError {
    Submit { message: String },
    Poll { message: String },
    Failed { diagnostics: String },
    UnexpectedStatus { status: String, diagnostics: String },
    TimedOut { polls: usize },
}

impl std::fmt::Display for StatementWaitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Submit { message } => write!(f, "failed to submit statement: {message}"),
            Self::Poll { message } => write!(f, "failed to poll statement status: {message}"),
            Self::Failed { diagnostics } => {
                write!(f, "statement execution failed: {diagnostics}")
            }
            Self::UnexpectedStatus {
                status,
                diagnostics,
            } => write!(
                f,
                "statement reached unexpected status {status}: {diagnostics}"
            ),
            Self::TimedOut { polls } => {
                write!(f, "statement still in flight after {polls} status polls")
            }
        }
    }
}

impl std::error::Error for StatementWaitError {}

/// Submit a statement and block until it reaches a terminal state.
///
/// Success is returned only for `FINISHED`. `FAILED` and any status outside
/// the known in-flight set surface the warehouse's own diagnostics. The
/// interval is fixed; there is no backoff growth.
pub fn execute_statement_and_wait(
    execution: &dyn StatementExecution,
    sleeper: &dyn Sleeper,
    sql: &str,
    options: &WaitOptions,
) -> Result<StatementOutcome, StatementWaitError> {
    let handle = execution
        .submit(sql)
        .map_err(|message| StatementWaitError::Submit { message })?;

    for polls in 1..=options.max_polls {
        sleeper.sleep(options.poll_interval);
        let report = execution
            .poll(&handle)
            .map_err(|message| StatementWaitError::Poll { message })?;

        match report.status {
            StatementStatus::Finished => {
                log_waiter_info(
                    "statement_finished",
                    json!({
                        "statement_id": handle.statement_id.clone(),
                        "polls": polls,
                        "sql": sql,
                    }),
                );
                return Ok(StatementOutcome { handle, polls });
            }
            status if status.is_in_flight() => {}
            StatementStatus::Failed => {
                return Err(StatementWaitError::Failed {
                    diagnostics: diagnostics_or_marker(report.diagnostics),
                });
            }
            status => {
                return Err(StatementWaitError::UnexpectedStatus {
                    status: status.to_string(),
                    diagnostics: diagnostics_or_marker(report.diagnostics),
                });
            }
        }
    }

    Err(StatementWaitError::TimedOut {
        polls: options.max_polls,
    })
}

fn diagnostics_or_marker(diagnostics: Option<String>) -> String {
    diagnostics.unwrap_or_else(|| "no diagnostics reported by the warehouse".to_string())
}

fn log_waiter_info(event: &str, details: serde_json::Value) {
    eprintln!(
        "{}",
        json!({
            "component": "statement_waiter",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}
