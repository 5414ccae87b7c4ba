use super::rule::{AlertRule, AlertSeverity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A fired alert. Only `resolved_at` changes after creation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Alert {
    pub alert_id: String,
    pub rule_id: String,
    pub metric_name: String,
    pub current_value: f64,
    pub threshold: f64,
    pub severity: AlertSeverity,
    pub message: String,
    pub triggered_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Alert {
    pub fn from_rule(rule: &AlertRule, metric_name: &str, current_value: f64, triggered_at: DateTime<Utc>) -> Self {
        let message = format!(
            "{}: {} is {:.2} (threshold {} {:.2})",
            rule.description(),
            metric_name,
            current_value,
            rule.comparison().symbol(),
            rule.threshold(),
        );

        Self {
            alert_id: Uuid::now_v7().to_string(),
            rule_id: rule.rule_id().to_string(),
            metric_name: metric_name.to_string(),
            current_value,
            threshold: rule.threshold(),
            severity: rule.severity(),
            message,
            triggered_at,
            resolved_at: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }
}

/// Alert counts by severity.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AlertSummary {
    pub total: usize,
    pub critical: usize,
    pub error: usize,
    pub warning: usize,
    pub info: usize,
}

impl AlertSummary {
    pub fn from_alerts<'a>(alerts: impl IntoIterator<Item = &'a Alert>) -> Self {
        alerts.into_iter().fold(Self::default(), |mut summary, alert| {
            summary.total += 1;
            match alert.severity {
                AlertSeverity::Critical => summary.critical += 1,
                AlertSeverity::Error => summary.error += 1,
                AlertSeverity::Warning => summary.warning += 1,
                AlertSeverity::Info => summary.info += 1,
            }
            summary
        })
    }
}
