use std::time::Duration;

/// One submitted warehouse statement, owned by the waiter for the duration
/// of a single polling loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementHandle {
    pub statement_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementStatus {
    Submitted,
    Picked,
    Started,
    Finished,
    Failed,
    Aborted,
    Other(String),
}

impl StatementStatus {
    pub fn from_status_str(status: &str) -> Self {
        match status {
            "SUBMITTED" => Self::Submitted,
            "PICKED" => Self::Picked,
            "STARTED" => Self::Started,
            "FINISHED" => Self::Finished,
            "FAILED" => Self::Failed,
            "ABORTED" => Self::Aborted,
            other => Self::Other(other.to_string()),
        }
    }

    /// Statuses the waiter keeps polling through.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Submitted | Self::Picked | Self::Started)
    }
}

impl std::fmt::Display for StatementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Submitted => "SUBMITTED",
            Self::Picked => "PICKED",
            Self::Started => "STARTED",
            Self::Finished => "FINISHED",
            Self::Failed => "FAILED",
            Self::Aborted => "ABORTED",
            Self::Other(other) => other.as_str(),
        };
        f.write_str(label)
    }
}

/// One status observation, carrying whatever diagnostics the warehouse
/// reported alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementReport {
    pub status: StatementStatus,
    pub diagnostics: Option<String>,
}

pub trait StatementExecution {
    fn submit(&self, sql: &str) -> Result<StatementHandle, String>;
    fn poll(&self, handle: &StatementHandle) -> Result<StatementReport, String>;
}

pub trait Sleeper {
    fn sleep(&self, interval: Duration);
}

/// The warehouse endpoint address starts with the cluster identifier as its
/// first dot-separated label.
pub fn cluster_identifier_from_endpoint(endpoint: &str) -> Result<String, String> {
    match endpoint.split('.').next() {
        Some(label) if !label.trim().is_empty() => Ok(label.to_string()),
        _ => Err(format!(
            "cannot derive a cluster identifier from endpoint address '{endpoint}'"
        )),
    }
}
