use crate::domain::errors::{MonitoringError, MonitoringResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Tolerance used by [`Comparison::Eq`].
pub const EQ_EPSILON: f64 = 0.001;

/// Alert severity levels, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertSeverity::Info => write!(f, "INFO"),
            AlertSeverity::Warning => write!(f, "WARNING"),
            AlertSeverity::Error => write!(f, "ERROR"),
            AlertSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl FromStr for AlertSeverity {
    type Err = MonitoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            "critical" => Ok(Self::Critical),
            other => Err(MonitoringError::config(format!("unknown alert severity '{}'", other))),
        }
    }
}

/// Comparison applied between the observed value and the rule threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    Gt,
    Lt,
    Gte,
    Lte,
    Eq,
}

impl Comparison {
    pub fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            Comparison::Gt => value > threshold,
            Comparison::Lt => value < threshold,
            Comparison::Gte => value >= threshold,
            Comparison::Lte => value <= threshold,
            Comparison::Eq => (value - threshold).abs() < EQ_EPSILON,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Gt => ">",
            Comparison::Lt => "<",
            Comparison::Gte => ">=",
            Comparison::Lte => "<=",
            Comparison::Eq => "==",
        }
    }
}

impl FromStr for Comparison {
    type Err = MonitoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gt" | ">" => Ok(Self::Gt),
            "lt" | "<" => Ok(Self::Lt),
            "gte" | ">=" => Ok(Self::Gte),
            "lte" | "<=" => Ok(Self::Lte),
            "eq" | "==" => Ok(Self::Eq),
            other => Err(MonitoringError::config(format!("unknown comparison '{}'", other))),
        }
    }
}

/// Threshold rule evaluated against the latest metric values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    rule_id: String,
    description: String,
    metric_pattern: String,
    comparison: Comparison,
    threshold: f64,
    severity: AlertSeverity,
    cooldown_seconds: u64,
}

impl AlertRule {
    pub fn new(
        rule_id: impl Into<String>,
        description: impl Into<String>,
        metric_pattern: impl Into<String>,
        comparison: Comparison,
        threshold: f64,
        severity: AlertSeverity,
        cooldown_seconds: u64,
    ) -> MonitoringResult<Self> {
        let rule_id = rule_id.into();
        let metric_pattern = metric_pattern.into();

        if rule_id.trim().is_empty() {
            return Err(MonitoringError::config("alert rule id must not be empty"));
        }
        if metric_pattern.trim().is_empty() || metric_pattern == "*" {
            return Err(MonitoringError::config(format!(
                "alert rule '{}' needs a concrete metric pattern",
                rule_id
            )));
        }
        if !threshold.is_finite() {
            return Err(MonitoringError::config(format!(
                "alert rule '{}' has a non-finite threshold",
                rule_id
            )));
        }

        Ok(Self {
            rule_id,
            description: description.into(),
            metric_pattern,
            comparison,
            threshold,
            severity,
            cooldown_seconds,
        })
    }

    /// Built-in rules covering the metrics recorded by the collection loops.
    pub fn default_rules(cooldown_seconds: u64) -> Vec<AlertRule> {
        let specs: [(&str, &str, &str, Comparison, f64, AlertSeverity); 6] = [
            ("high_cpu_usage", "High CPU usage", "system.cpu_percent", Comparison::Gt, 80.0, AlertSeverity::Warning),
            ("critical_cpu_usage", "Critical CPU usage", "system.cpu_percent", Comparison::Gt, 90.0, AlertSeverity::Critical),
            ("high_memory_usage", "High memory usage", "system.memory_percent", Comparison::Gt, 85.0, AlertSeverity::Warning),
            ("critical_memory_usage", "Critical memory usage", "system.memory_percent", Comparison::Gt, 95.0, AlertSeverity::Critical),
            (
                "database_pool_saturation",
                "Database connection pool saturation",
                "database.pool_utilization_percent",
                Comparison::Gte,
                90.0,
                AlertSeverity::Error,
            ),
            (
                "database_pool_overflow",
                "Database connection pool overflowing",
                "database.overflow",
                Comparison::Gt,
                0.0,
                AlertSeverity::Warning,
            ),
        ];

        specs
            .into_iter()
            .filter_map(|(id, description, metric, comparison, threshold, severity)| {
                AlertRule::new(id, description, metric, comparison, threshold, severity, cooldown_seconds).ok()
            })
            .collect()
    }

    /// Whether `metric_name` is covered by this rule. A trailing `*` matches any suffix.
    pub fn matches_metric(&self, metric_name: &str) -> bool {
        match self.metric_pattern.strip_suffix('*') {
            Some(prefix) => metric_name.starts_with(prefix),
            None => metric_name == self.metric_pattern,
        }
    }

    pub fn is_breached_by(&self, value: f64) -> bool {
        self.comparison.holds(value, self.threshold)
    }

    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn metric_pattern(&self) -> &str {
        &self.metric_pattern
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn severity(&self) -> AlertSeverity {
        self.severity
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_seconds)
    }

    pub fn cooldown_seconds(&self) -> u64 {
        self.cooldown_seconds
    }
}
