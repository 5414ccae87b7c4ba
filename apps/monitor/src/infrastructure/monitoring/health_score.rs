//! Weighted 0-100 health score over system, performance and quality readings.

use super::config::{HealthThresholds, Threshold};
use crate::domain::errors::{MonitoringError, MonitoringResult};
use crate::domain::health::{
    HealthScore, HealthStatus, MetricsBySection, PerformanceSection, QualitySection, SectionScores, SystemSection,
};
use chrono::Utc;
use tracing::{error, instrument};

const FULL_SCORE: f64 = 100.0;

/// Which side of a threshold is the unhealthy one.
#[derive(Clone, Copy)]
enum Direction {
    HigherIsWorse,
    LowerIsWorse,
}

#[derive(Debug, Clone, Default)]
pub struct HealthScoreCalculator {
    thresholds: HealthThresholds,
}

impl HealthScoreCalculator {
    pub fn new(thresholds: HealthThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &HealthThresholds {
        &self.thresholds
    }

    /// Scores every present section and averages them. With no sections the
    /// result is 0/unknown; a failed calculation yields the same fallback
    /// with `error` set.
    #[instrument(level = "debug", skip(self))]
    pub fn calculate_overall_health(&self, metrics: &MetricsBySection) -> HealthScore {
        match self.try_calculate(metrics) {
            Ok(score) => score,
            Err(e) => {
                error!(error = %e, "Health score calculation failed");
                HealthScore::failed(e.to_string())
            }
        }
    }

    pub fn score_to_status(score: f64) -> HealthStatus {
        HealthStatus::from_score(score)
    }

    fn try_calculate(&self, metrics: &MetricsBySection) -> MonitoringResult<HealthScore> {
        let sections = SectionScores {
            system: metrics.system.as_ref().map(|s| self.system_score(s)).transpose()?,
            performance: metrics.performance.as_ref().map(|s| self.performance_score(s)).transpose()?,
            code_quality: metrics.code_quality.as_ref().map(|s| self.quality_score(s)).transpose()?,
        };

        let present: Vec<f64> = [sections.system, sections.performance, sections.code_quality]
            .into_iter()
            .flatten()
            .collect();

        let score = if present.is_empty() {
            0.0
        } else {
            present.iter().sum::<f64>() / present.len() as f64
        };

        Ok(HealthScore {
            score,
            status: Self::score_to_status(score),
            sections,
            error: None,
            calculated_at: Utc::now(),
        })
    }

    fn system_score(&self, section: &SystemSection) -> MonitoringResult<f64> {
        let t = &self.thresholds;
        self.section_score(&[
            ("cpu_percent", section.cpu_percent, t.cpu_percent, Direction::HigherIsWorse),
            ("memory_percent", section.memory_percent, t.memory_percent, Direction::HigherIsWorse),
            ("disk_percent", section.disk_percent, t.disk_percent, Direction::HigherIsWorse),
        ])
    }

    fn performance_score(&self, section: &PerformanceSection) -> MonitoringResult<f64> {
        let t = &self.thresholds;
        self.section_score(&[
            ("response_time_ms", section.response_time_ms, t.response_time_ms, Direction::HigherIsWorse),
            ("error_rate_percent", section.error_rate_percent, t.error_rate_percent, Direction::HigherIsWorse),
        ])
    }

    fn quality_score(&self, section: &QualitySection) -> MonitoringResult<f64> {
        let t = &self.thresholds;
        self.section_score(&[
            ("coverage_percent", section.coverage_percent, t.coverage_percent, Direction::LowerIsWorse),
            (
                "test_failure_rate_percent",
                section.test_failure_rate_percent,
                t.test_failure_rate_percent,
                Direction::HigherIsWorse,
            ),
        ])
    }

    fn section_score(&self, readings: &[(&str, Option<f64>, Threshold, Direction)]) -> MonitoringResult<f64> {
        let mut score = FULL_SCORE;

        for &(name, value, threshold, direction) in readings {
            let Some(value) = value else { continue };
            if !value.is_finite() {
                return Err(MonitoringError::Calculation(format!("{} is not a finite number", name)));
            }

            let (critical, warning) = match direction {
                Direction::HigherIsWorse => (value > threshold.critical, value > threshold.warning),
                Direction::LowerIsWorse => (value < threshold.critical, value < threshold.warning),
            };
            if critical {
                score -= self.thresholds.critical_penalty;
            } else if warning {
                score -= self.thresholds.warning_penalty;
            }
        }

        Ok(score.max(0.0))
    }
}
