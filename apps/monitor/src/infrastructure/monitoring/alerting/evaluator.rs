use crate::domain::alert::{Alert, AlertRule};
use crate::domain::errors::{MonitoringError, MonitoringResult};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, trace};

#[derive(Default)]
struct EvaluatorState {
    rules: BTreeMap<String, Arc<AlertRule>>,
    last_triggered: HashMap<String, DateTime<Utc>>,
}

/// Evaluates alert rules against the latest metric values.
///
/// Each rule cycles Idle -> Triggered -> Cooldown -> Idle. A rule that fired
/// at `t` stays silent until `t + cooldown`, even if the condition still
/// holds. Rules and cooldown timestamps share one lock, so concurrent
/// evaluation passes cannot both fire the same rule.
#[derive(Default)]
pub struct AlertEvaluator {
    state: Mutex<EvaluatorState>,
}

impl AlertEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluator preloaded with [`AlertRule::default_rules`].
    pub fn with_default_rules(cooldown_seconds: u64) -> Self {
        let rules = AlertRule::default_rules(cooldown_seconds)
            .into_iter()
            .map(|rule| (rule.rule_id().to_string(), Arc::new(rule)))
            .collect();

        Self {
            state: Mutex::new(EvaluatorState {
                rules,
                last_triggered: HashMap::new(),
            }),
        }
    }

    pub async fn register_rule(&self, rule: AlertRule) -> MonitoringResult<()> {
        let mut state = self.state.lock().await;
        if state.rules.contains_key(rule.rule_id()) {
            return Err(MonitoringError::config(format!(
                "alert rule '{}' is already registered",
                rule.rule_id()
            )));
        }

        info!(rule_id = %rule.rule_id(), pattern = %rule.metric_pattern(), "Alert rule registered");
        state.rules.insert(rule.rule_id().to_string(), Arc::new(rule));
        Ok(())
    }

    pub async fn remove_rule(&self, rule_id: &str) -> bool {
        let mut state = self.state.lock().await;
        state.last_triggered.remove(rule_id);
        state.rules.remove(rule_id).is_some()
    }

    /// Registered rules ordered by id.
    pub async fn rules(&self) -> Vec<AlertRule> {
        self.state
            .lock()
            .await
            .rules
            .values()
            .map(|rule| rule.as_ref().clone())
            .collect()
    }

    /// Puts a rule back into the Idle state. Returns false for unknown rules
    /// and rules that were not cooling down.
    pub async fn reset_cooldown(&self, rule_id: &str) -> bool {
        self.state.lock().await.last_triggered.remove(rule_id).is_some()
    }

    /// Finds the first metric (in key order) covered by `rule` whose value
    /// breaches it.
    pub fn evaluate_rule_condition(rule: &AlertRule, current_metrics: &BTreeMap<String, f64>) -> Option<(String, f64)> {
        let mut matched_any = false;

        for (name, &value) in current_metrics.iter().filter(|(name, _)| rule.matches_metric(name)) {
            matched_any = true;
            if rule.is_breached_by(value) {
                return Some((name.clone(), value));
            }
        }

        if !matched_any {
            let e = MonitoringError::Evaluation(format!("no metric matches pattern '{}'", rule.metric_pattern()));
            debug!(rule_id = %rule.rule_id(), error = %e, "Alert rule skipped");
        }
        None
    }

    pub async fn evaluate_alert_conditions(&self, current_metrics: &BTreeMap<String, f64>) -> Vec<Alert> {
        self.evaluate_alert_conditions_at(current_metrics, Utc::now()).await
    }

    /// Evaluates every rule as of `now` and returns the alerts that fired.
    #[instrument(level = "debug", skip(self, current_metrics), fields(metrics = current_metrics.len()))]
    pub async fn evaluate_alert_conditions_at(
        &self,
        current_metrics: &BTreeMap<String, f64>,
        now: DateTime<Utc>,
    ) -> Vec<Alert> {
        let mut state = self.state.lock().await;
        let EvaluatorState { rules, last_triggered } = &mut *state;

        let mut fired = Vec::new();
        for (rule_id, rule) in rules.iter() {
            if let Some(&last) = last_triggered.get(rule_id) {
                let cooldown =
                    chrono::Duration::from_std(rule.cooldown()).unwrap_or_else(|_| chrono::Duration::weeks(52 * 100));
                if now - last < cooldown {
                    trace!(rule_id = %rule_id, "Alert rule in cooldown");
                    continue;
                }
            }

            if let Some((metric_name, value)) = Self::evaluate_rule_condition(rule, current_metrics) {
                last_triggered.insert(rule_id.clone(), now);
                fired.push(Alert::from_rule(rule, &metric_name, value, now));
            }
        }

        fired
    }
}
