//! Configuration for the monitoring core.

use crate::domain::errors::{MonitoringError, MonitoringResult};
use crate::domain::metric::window_start;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Tunables for collection, retention, alerting and shutdown.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Maximum data points to retain per metric
    pub buffer_capacity: usize,

    /// Maximum age of a point before the cleanup loop drops it
    pub retention_period: Duration,

    /// Tick of the system, database, websocket and runtime collection loops
    pub collection_interval: Duration,

    /// Tick of the retention cleanup loop
    pub cleanup_interval: Duration,

    /// Tick of the alert evaluation loop
    pub alert_evaluation_interval: Duration,

    /// Cooldown applied to the built-in alert rules
    pub alert_cooldown: Duration,

    /// Upper bound on a single call into an external sampling source
    pub io_timeout: Duration,

    /// How long `stop` waits for loops before abandoning them
    pub shutdown_grace_period: Duration,

    /// Resolved alerts kept for summaries before the oldest are dropped
    pub alert_history_limit: usize,

    /// Penalty thresholds used by the health score
    pub health_thresholds: HealthThresholds,
}

impl MonitorConfig {
    /// Rejects settings that would make a loop spin or a buffer unusable.
    pub fn validate(&self) -> MonitoringResult<()> {
        if self.buffer_capacity == 0 {
            return Err(MonitoringError::config("buffer_capacity must be greater than zero"));
        }

        let intervals = [
            ("collection_interval", self.collection_interval),
            ("cleanup_interval", self.cleanup_interval),
            ("alert_evaluation_interval", self.alert_evaluation_interval),
            ("io_timeout", self.io_timeout),
        ];
        for (name, value) in intervals {
            if value.is_zero() {
                return Err(MonitoringError::config(format!("{} must be greater than zero", name)));
            }
        }

        if self.retention_period.is_zero() {
            return Err(MonitoringError::config("retention_period must be greater than zero"));
        }

        Ok(())
    }

    /// Oldest timestamp still inside the retention period as of `now`.
    pub fn retention_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        window_start(now, self.retention_period)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 1000,
            retention_period: Duration::from_secs(3600),
            collection_interval: Duration::from_secs(5),
            cleanup_interval: Duration::from_secs(60),
            alert_evaluation_interval: Duration::from_secs(5),
            alert_cooldown: Duration::from_secs(300),
            io_timeout: Duration::from_secs(10),
            shutdown_grace_period: Duration::from_secs(5),
            alert_history_limit: 1000,
            health_thresholds: HealthThresholds::default(),
        }
    }
}

/// Warning/critical pair for a single reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    pub warning: f64,
    pub critical: f64,
}

impl Threshold {
    pub const fn new(warning: f64, critical: f64) -> Self {
        Self { warning, critical }
    }
}

/// Thresholds consulted by the health score calculator.
///
/// Coverage is a "higher is better" reading: it breaches when it drops
/// below the configured values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthThresholds {
    pub cpu_percent: Threshold,
    pub memory_percent: Threshold,
    pub disk_percent: Threshold,
    pub response_time_ms: Threshold,
    pub error_rate_percent: Threshold,
    pub coverage_percent: Threshold,
    pub test_failure_rate_percent: Threshold,
    pub warning_penalty: f64,
    pub critical_penalty: f64,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            cpu_percent: Threshold::new(70.0, 90.0),
            memory_percent: Threshold::new(80.0, 95.0),
            disk_percent: Threshold::new(80.0, 95.0),
            response_time_ms: Threshold::new(1000.0, 3000.0),
            error_rate_percent: Threshold::new(1.0, 5.0),
            coverage_percent: Threshold::new(80.0, 60.0),
            test_failure_rate_percent: Threshold::new(1.0, 5.0),
            warning_penalty: 15.0,
            critical_penalty: 30.0,
        }
    }
}
