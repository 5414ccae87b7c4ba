use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the monitoring core.
///
/// Only `Config` is ever returned to callers of the construction APIs.
/// `TransientCollection` and `Evaluation` are produced inside the periodic
/// loops and logged there; `Calculation` is folded into a zero-score health
/// result by the calculator.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum MonitoringError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Collection source '{source_name}' unavailable: {message}")]
    TransientCollection { source_name: String, message: String },
    #[error("Evaluation error: {0}")]
    Evaluation(String),
    #[error("Health calculation error: {0}")]
    Calculation(String),
}

impl MonitoringError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn transient(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransientCollection {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Whether a periodic loop should log and carry on after this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientCollection { .. } | Self::Evaluation(_))
    }
}

pub type MonitoringResult<T> = Result<T, MonitoringError>;
