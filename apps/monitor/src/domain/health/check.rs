use super::score::HealthStatus;
use serde::{Deserialize, Serialize};

/// Outcome reported by a dependency health check.
///
/// Simple checks answer up/down; richer checks report a status band plus
/// arbitrary details for operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum HealthCheckResult {
    Boolean(bool),
    Detailed {
        status: HealthStatus,
        details: serde_json::Map<String, serde_json::Value>,
    },
}

impl HealthCheckResult {
    pub fn detailed(status: HealthStatus, message: impl Into<String>) -> Self {
        let mut details = serde_json::Map::new();
        details.insert("message".to_string(), serde_json::Value::String(message.into()));
        Self::Detailed { status, details }
    }

    pub fn status(&self) -> HealthStatus {
        match self {
            Self::Boolean(true) => HealthStatus::Healthy,
            Self::Boolean(false) => HealthStatus::Critical,
            Self::Detailed { status, .. } => *status,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status() == HealthStatus::Healthy
    }
}
