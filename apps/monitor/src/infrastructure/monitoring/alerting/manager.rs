use crate::domain::alert::{Alert, AlertSeverity, AlertSummary};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, VecDeque};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

#[derive(Default)]
struct AlertStore {
    active: Vec<Alert>,
    resolved: VecDeque<Alert>,
}

/// Holds fired alerts until they are cleared or resolved.
///
/// Alerts are kept in arrival order and never deduplicated: the evaluator's
/// cooldown is what limits repeats. Resolved alerts move to a bounded
/// history; the oldest entries fall off once `history_limit` is reached.
pub struct AlertManager {
    store: RwLock<AlertStore>,
    history_limit: usize,
}

impl AlertManager {
    pub fn new(history_limit: usize) -> Self {
        Self {
            store: RwLock::new(AlertStore::default()),
            history_limit,
        }
    }

    /// Logs the alert at a level matching its severity and stores it.
    pub async fn process_alert(&self, alert: Alert) {
        match alert.severity {
            AlertSeverity::Critical | AlertSeverity::Error => error!(
                alert_id = %alert.alert_id,
                rule_id = %alert.rule_id,
                severity = %alert.severity,
                "{}",
                alert.message
            ),
            AlertSeverity::Warning => warn!(
                alert_id = %alert.alert_id,
                rule_id = %alert.rule_id,
                "{}",
                alert.message
            ),
            AlertSeverity::Info => info!(
                alert_id = %alert.alert_id,
                rule_id = %alert.rule_id,
                "{}",
                alert.message
            ),
        }

        self.store.write().await.active.push(alert);
    }

    /// Removes an alert outright, active or resolved.
    pub async fn clear_alert(&self, alert_id: &str) -> bool {
        let mut store = self.store.write().await;

        if let Some(index) = store.active.iter().position(|a| a.alert_id == alert_id) {
            store.active.remove(index);
            return true;
        }
        if let Some(index) = store.resolved.iter().position(|a| a.alert_id == alert_id) {
            store.resolved.remove(index);
            return true;
        }
        false
    }

    /// Stamps `resolved_at` and moves the alert into the resolved history.
    pub async fn resolve_alert(&self, alert_id: &str) -> bool {
        let mut store = self.store.write().await;

        let Some(index) = store.active.iter().position(|a| a.alert_id == alert_id) else {
            return false;
        };

        let mut alert = store.active.remove(index);
        alert.resolved_at = Some(Utc::now());
        info!(alert_id = %alert.alert_id, rule_id = %alert.rule_id, "Alert resolved");

        store.resolved.push_back(alert);
        while store.resolved.len() > self.history_limit {
            store.resolved.pop_front();
        }
        true
    }

    pub async fn active_alerts(&self) -> Vec<Alert> {
        self.store.read().await.active.clone()
    }

    pub async fn resolved_alerts(&self) -> Vec<Alert> {
        self.store.read().await.resolved.iter().cloned().collect()
    }

    /// Active alerts bucketed by severity, keyed from Info up to Critical.
    pub async fn alerts_by_severity(&self) -> BTreeMap<AlertSeverity, Vec<Alert>> {
        let store = self.store.read().await;
        let mut buckets: BTreeMap<AlertSeverity, Vec<Alert>> = BTreeMap::new();
        for alert in &store.active {
            buckets.entry(alert.severity).or_default().push(alert.clone());
        }
        buckets
    }

    /// Counts of the currently active alerts.
    pub async fn get_alert_summary(&self) -> AlertSummary {
        AlertSummary::from_alerts(self.store.read().await.active.iter())
    }

    /// Drops alerts triggered before `cutoff` from both the active set and the history.
    pub async fn prune_expired(&self, cutoff: DateTime<Utc>) -> usize {
        let mut store = self.store.write().await;
        let before = store.active.len() + store.resolved.len();

        store.active.retain(|a| a.triggered_at >= cutoff);
        store.resolved.retain(|a| a.triggered_at >= cutoff);

        before - store.active.len() - store.resolved.len()
    }
}

impl Default for AlertManager {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::alert::{AlertRule, Comparison};

    fn alert(severity: AlertSeverity, triggered_at: DateTime<Utc>) -> Alert {
        let rule = AlertRule::new("rule", "Rule", "m", Comparison::Gt, 1.0, severity, 0).unwrap();
        Alert::from_rule(&rule, "m", 2.0, triggered_at)
    }

    #[tokio::test]
    async fn summary_counts_by_severity() {
        let manager = AlertManager::default();
        let now = Utc::now();
        manager.process_alert(alert(AlertSeverity::Critical, now)).await;
        manager.process_alert(alert(AlertSeverity::Warning, now)).await;
        manager.process_alert(alert(AlertSeverity::Warning, now)).await;

        let summary = manager.get_alert_summary().await;
        assert_eq!(summary.total, 3);
        assert_eq!(summary.critical, 1);
        assert_eq!(summary.warning, 2);
        assert_eq!(summary.error, 0);
    }

    #[tokio::test]
    async fn clear_unknown_id_returns_false() {
        let manager = AlertManager::default();
        assert!(!manager.clear_alert("nope").await);
        assert!(!manager.resolve_alert("nope").await);
    }

    #[tokio::test]
    async fn clear_removes_alert() {
        let manager = AlertManager::default();
        let a = alert(AlertSeverity::Info, Utc::now());
        let id = a.alert_id.clone();
        manager.process_alert(a).await;

        assert!(manager.clear_alert(&id).await);
        assert!(manager.active_alerts().await.is_empty());
        assert_eq!(manager.get_alert_summary().await.total, 0);
    }

    #[tokio::test]
    async fn resolve_moves_into_bounded_history() {
        let manager = AlertManager::new(2);
        let mut ids = Vec::new();
        for _ in 0..3 {
            let a = alert(AlertSeverity::Error, Utc::now());
            ids.push(a.alert_id.clone());
            manager.process_alert(a).await;
        }

        for id in &ids {
            assert!(manager.resolve_alert(id).await);
        }

        let resolved = manager.resolved_alerts().await;
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].alert_id, ids[1]);
        assert!(resolved.iter().all(Alert::is_resolved));
        assert!(manager.active_alerts().await.is_empty());
    }

    #[tokio::test]
    async fn prune_drops_old_alerts() {
        let manager = AlertManager::default();
        let now = Utc::now();
        manager
            .process_alert(alert(AlertSeverity::Warning, now - chrono::Duration::hours(2)))
            .await;
        manager.process_alert(alert(AlertSeverity::Warning, now)).await;

        assert_eq!(manager.prune_expired(now - chrono::Duration::hours(1)).await, 1);
        assert_eq!(manager.active_alerts().await.len(), 1);
    }

    #[tokio::test]
    async fn buckets_by_severity() {
        let manager = AlertManager::default();
        let now = Utc::now();
        manager.process_alert(alert(AlertSeverity::Critical, now)).await;
        manager.process_alert(alert(AlertSeverity::Info, now)).await;

        let buckets = manager.alerts_by_severity().await;
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[&AlertSeverity::Critical].len(), 1);
        assert_eq!(buckets.keys().next_back(), Some(&AlertSeverity::Critical));
    }
}
