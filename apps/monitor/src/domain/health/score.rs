//! Inputs and outputs of the overall health score.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health status bands.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
    Unknown,
}

impl HealthStatus {
    /// Maps a 0-100 score onto a status band.
    ///
    /// A score of exactly zero is reported as `Unknown`: the penalty table can
    /// never drive a present section to zero, so zero only arises from "no
    /// data" or a failed calculation.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            HealthStatus::Healthy
        } else if score >= 60.0 {
            HealthStatus::Warning
        } else if score > 0.0 {
            HealthStatus::Critical
        } else {
            HealthStatus::Unknown
        }
    }
}

/// Host resource readings, all in percent.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct SystemSection {
    pub cpu_percent: Option<f64>,
    pub memory_percent: Option<f64>,
    pub disk_percent: Option<f64>,
}

/// Request-serving performance readings.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct PerformanceSection {
    pub response_time_ms: Option<f64>,
    pub error_rate_percent: Option<f64>,
}

/// Code quality readings reported by CI.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct QualitySection {
    pub coverage_percent: Option<f64>,
    pub test_failure_rate_percent: Option<f64>,
}

/// Metrics grouped by the section they are scored under. Absent sections are
/// left out of the overall mean.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct MetricsBySection {
    pub system: Option<SystemSection>,
    pub performance: Option<PerformanceSection>,
    pub code_quality: Option<QualitySection>,
}

impl MetricsBySection {
    pub fn is_empty(&self) -> bool {
        self.system.is_none() && self.performance.is_none() && self.code_quality.is_none()
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct SectionScores {
    pub system: Option<f64>,
    pub performance: Option<f64>,
    pub code_quality: Option<f64>,
}

/// Result of a health calculation. `error` is set when the calculation failed
/// and the zero-score fallback was returned.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthScore {
    pub score: f64,
    pub status: HealthStatus,
    pub sections: SectionScores,
    pub error: Option<String>,
    pub calculated_at: DateTime<Utc>,
}

impl HealthScore {
    pub fn unknown() -> Self {
        Self {
            score: 0.0,
            status: HealthStatus::Unknown,
            sections: SectionScores::default(),
            error: None,
            calculated_at: Utc::now(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::unknown()
        }
    }
}
