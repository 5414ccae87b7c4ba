use crate::domain::errors::MonitoringResult;
use crate::infrastructure::monitoring::alerting::{AlertEvaluator, AlertManager};
use crate::infrastructure::monitoring::MetricsCollector;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Feeds the latest metric values through the alert rules on every tick.
#[derive(Clone)]
pub struct AlertEvaluationWorker {
    collector: MetricsCollector,
    evaluator: Arc<AlertEvaluator>,
    manager: Arc<AlertManager>,
}

impl AlertEvaluationWorker {
    pub fn new(collector: MetricsCollector, evaluator: Arc<AlertEvaluator>, manager: Arc<AlertManager>) -> Self {
        Self {
            collector,
            evaluator,
            manager,
        }
    }

    /// One pass: evaluate, hand fired alerts to the manager, then expire
    /// alerts older than the metric retention period. Returns how many fired.
    #[instrument(level = "debug", skip(self))]
    pub async fn run_once(&self) -> MonitoringResult<usize> {
        let current = self.collector.current_values().await;
        if current.is_empty() {
            debug!("No metrics recorded yet, skipping alert evaluation");
            return Ok(0);
        }

        let fired = self.evaluator.evaluate_alert_conditions(&current).await;
        let count = fired.len();
        for alert in fired {
            self.manager.process_alert(alert).await;
        }

        let cutoff = self.collector.config().retention_cutoff(Utc::now());
        let expired = self.manager.prune_expired(cutoff).await;
        if expired > 0 {
            debug!(expired, "Expired old alerts");
        }

        Ok(count)
    }
}
