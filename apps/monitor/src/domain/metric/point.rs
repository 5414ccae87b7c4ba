use crate::domain::errors::{MonitoringError, MonitoringResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Start of the window of length `window` that ends at `end`. Windows
/// reaching past the earliest representable instant clamp to it.
pub fn window_start(end: DateTime<Utc>, window: std::time::Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(window)
        .ok()
        .and_then(|window| end.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Label set attached to a sample. Ordered so that grouping is deterministic.
pub type Labels = BTreeMap<String, String>;

/// One timestamped numeric observation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    name: String,
    value: f64,
    timestamp: DateTime<Utc>,
    labels: Labels,
}

impl MetricPoint {
    /// Creates a point stamped with the current time.
    pub fn new(name: impl Into<String>, value: f64, labels: Labels) -> MonitoringResult<Self> {
        Self::at(name, value, labels, Utc::now())
    }

    /// Creates a point with an explicit timestamp (backfill, tests).
    pub fn at(
        name: impl Into<String>,
        value: f64,
        labels: Labels,
        timestamp: DateTime<Utc>,
    ) -> MonitoringResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(MonitoringError::config("metric name must not be empty"));
        }

        Ok(Self {
            name,
            value,
            timestamp,
            labels,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}
