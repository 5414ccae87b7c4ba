//! In-process monitoring: metric collection, aggregation, alerting and
//! health scoring.
//!
//! [`MonitoringService`] ties the pieces together. It is built explicitly by
//! the host and handed around as an `Arc`; nothing here is global.

pub mod aggregator;
pub mod alerting;
pub mod collector;
pub mod config;
pub mod health_checks;
pub mod health_score;

pub use aggregator::{AggregatedMetric, AggregationFunction, Aggregator};
pub use alerting::{AlertEvaluator, AlertManager};
pub use collector::MetricsCollector;
pub use config::{HealthThresholds, MonitorConfig, Threshold};
pub use health_checks::{
    CheckOutcome, DatabaseHealthCheck, FnHealthCheck, HealthCheck, OverallHealthStatus, RedisHealthCheck,
};
pub use health_score::HealthScoreCalculator;

use crate::domain::alert::AlertSummary;
use crate::domain::errors::MonitoringResult;
use crate::domain::health::{HealthScore, MetricsBySection, PerformanceSection, QualitySection, SystemSection};
use crate::workers::{AlertEvaluationWorker, LoopSet};
use futures_util::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

/// Central coordinator for every monitoring component.
pub struct MonitoringService {
    collector: MetricsCollector,
    evaluator: Arc<AlertEvaluator>,
    manager: Arc<AlertManager>,
    calculator: HealthScoreCalculator,
    aggregator: Aggregator,

    /// Health check registry for service dependencies
    health_checks: RwLock<Vec<Arc<dyn HealthCheck>>>,

    alert_loop: Mutex<Option<LoopSet>>,
}

impl MonitoringService {
    pub fn new(collector: MetricsCollector, evaluator: AlertEvaluator) -> Self {
        let config = collector.config();
        let manager = AlertManager::new(config.alert_history_limit);
        let calculator = HealthScoreCalculator::new(config.health_thresholds);

        Self {
            collector,
            evaluator: Arc::new(evaluator),
            manager: Arc::new(manager),
            calculator,
            aggregator: Aggregator::new(),
            health_checks: RwLock::new(Vec::new()),
            alert_loop: Mutex::new(None),
        }
    }

    /// Service with no external sources and the built-in alert rules.
    pub fn from_config(config: MonitorConfig) -> MonitoringResult<Self> {
        let cooldown = config.alert_cooldown.as_secs();
        let collector = MetricsCollector::new(config)?;
        Ok(Self::new(collector, AlertEvaluator::with_default_rules(cooldown)))
    }

    pub fn collector(&self) -> &MetricsCollector {
        &self.collector
    }

    pub fn evaluator(&self) -> &AlertEvaluator {
        &self.evaluator
    }

    pub fn alerts(&self) -> &AlertManager {
        &self.manager
    }

    /// Aggregates the samples of `name` recorded within the last `window`.
    pub async fn aggregate_recent(
        &self,
        name: &str,
        window: Duration,
        group_by_labels: &[&str],
        functions: &[AggregationFunction],
    ) -> Vec<AggregatedMetric> {
        let points = self.collector.get_recent_metrics(name, window).await;
        let window_seconds = window.as_secs_f64().ceil() as u64;
        self.aggregator
            .aggregate(&points, window_seconds, group_by_labels, functions)
    }

    /// Registers a health check for a service dependency
    pub async fn register_health_check(&self, check: Arc<dyn HealthCheck>) {
        info!(check = %check.name(), "Health check registered");
        self.health_checks.write().await.push(check);
    }

    /// Runs every registered check concurrently, each under its own timeout.
    pub async fn check_health(&self) -> OverallHealthStatus {
        let checks: Vec<Arc<dyn HealthCheck>> = self.health_checks.read().await.clone();

        let outcomes = join_all(checks.iter().map(|check| health_checks::run_check(check.as_ref()))).await;

        let results: BTreeMap<String, CheckOutcome> = checks
            .iter()
            .zip(outcomes)
            .map(|(check, outcome)| (check.name().to_string(), outcome))
            .collect();

        let overall = OverallHealthStatus::from_outcomes(results);
        if !overall.is_healthy() {
            warn!(status = ?overall.status, "Dependency health degraded");
        }
        overall
    }

    /// Scores the mean of each health reading over the last `window`.
    pub async fn health_report(&self, window: Duration) -> HealthScore {
        let metrics = self.metrics_by_section(window).await;
        self.calculator.calculate_overall_health(&metrics)
    }

    pub async fn alert_summary(&self) -> AlertSummary {
        self.manager.get_alert_summary().await
    }

    /// Starts the collection loops and the alert evaluation loop.
    pub async fn start(&self) {
        self.collector.start().await;

        let mut guard = self.alert_loop.lock().await;
        if guard.is_some() {
            return;
        }

        let config = self.collector.config();
        let worker = AlertEvaluationWorker::new(self.collector.clone(), Arc::clone(&self.evaluator), Arc::clone(&self.manager));

        let mut loops = LoopSet::new();
        loops.spawn("alert_evaluation", config.alert_evaluation_interval, config.io_timeout, move || {
            let worker = worker.clone();
            async move { worker.run_once().await.map(|_| ()) }
        });
        *guard = Some(loops);

        info!("Monitoring service started");
    }

    pub async fn stop(&self) {
        if let Some(loops) = self.alert_loop.lock().await.take() {
            loops.shutdown(self.collector.config().shutdown_grace_period).await;
        }
        self.collector.stop().await;

        info!("Monitoring service stopped");
    }

    pub async fn is_running(&self) -> bool {
        self.alert_loop.lock().await.is_some()
    }

    async fn metrics_by_section(&self, window: Duration) -> MetricsBySection {
        let mean = |name: &'static str| async move {
            self.collector.get_metric_summary(name, window).await.map(|s| s.avg)
        };

        let system = SystemSection {
            cpu_percent: mean("system.cpu_percent").await,
            memory_percent: mean("system.memory_percent").await,
            disk_percent: mean("system.disk_percent").await,
        };
        let performance = PerformanceSection {
            response_time_ms: mean("http.response_time_ms").await,
            error_rate_percent: mean("http.error_rate_percent").await,
        };
        let code_quality = QualitySection {
            coverage_percent: mean("quality.coverage_percent").await,
            test_failure_rate_percent: mean("quality.test_failure_rate_percent").await,
        };

        MetricsBySection {
            system: (system != SystemSection::default()).then_some(system),
            performance: (performance != PerformanceSection::default()).then_some(performance),
            code_quality: (code_quality != QualitySection::default()).then_some(code_quality),
        }
    }
}
