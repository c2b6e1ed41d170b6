use std::fmt;
use thiserror::Error;

/// The five backend calls the dashboard depends on.
///
/// Each carries the description surfaced to the operator when the call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiOperation {
    ListWorkers,
    CreateWorker,
    UpdateLimit,
    DeleteWorker,
    ListTransferredInvoices,
}

impl ApiOperation {
    pub fn description(&self) -> &'static str {
        match self {
            ApiOperation::ListWorkers => "Failed to load worker list",
            ApiOperation::CreateWorker => "Failed to create worker",
            ApiOperation::UpdateLimit => "Failed to update daily limit",
            ApiOperation::DeleteWorker => "Failed to delete worker",
            ApiOperation::ListTransferredInvoices => "Failed to load transfer history",
        }
    }
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("{operation}: {source}")]
    Transport {
        operation: ApiOperation,
        #[source]
        source: reqwest::Error,
    },
    #[error("{operation} (HTTP {status})")]
    Status { operation: ApiOperation, status: u16 },
    #[error("{operation}: unreadable response: {source}")]
    Decode {
        operation: ApiOperation,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP client setup failed: {0}")]
    ClientSetup(#[source] reqwest::Error),
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Unknown account: {0}")]
    UnknownAccount(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DashboardError {
    /// The backend call this error came from, if any.
    pub fn operation(&self) -> Option<ApiOperation> {
        match self {
            DashboardError::Transport { operation, .. }
            | DashboardError::Status { operation, .. }
            | DashboardError::Decode { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
