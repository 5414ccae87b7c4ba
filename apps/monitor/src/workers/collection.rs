//! Sampling sources driven by the collector's periodic loops.

use crate::domain::errors::MonitoringResult;
use crate::domain::metric::Labels;
use crate::infrastructure::monitoring::MetricsCollector;
use crate::infrastructure::providers::{ConnectionRegistry, DatabaseStatsProvider, PoolStats, ResourceSampler};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// One independently scheduled sampling source.
#[async_trait]
pub trait CollectionSource: Send + Sync {
    fn name(&self) -> &'static str;

    fn interval(&self) -> Duration;

    /// Samples once and records the readings into `collector`.
    async fn collect(&self, collector: &MetricsCollector) -> MonitoringResult<()>;
}

/// Records host CPU, memory, disk and network readings.
pub struct SystemResourceSource {
    sampler: Arc<dyn ResourceSampler>,
    interval: Duration,
}

impl SystemResourceSource {
    pub fn new(sampler: Arc<dyn ResourceSampler>, interval: Duration) -> Self {
        Self { sampler, interval }
    }
}

#[async_trait]
impl CollectionSource for SystemResourceSource {
    fn name(&self) -> &'static str {
        "system_resources"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn collect(&self, collector: &MetricsCollector) -> MonitoringResult<()> {
        let sample = self.sampler.sample().await?;

        let readings = [
            ("system.cpu_percent", sample.cpu_percent),
            ("system.memory_percent", sample.memory_percent),
            ("system.memory_available_mb", sample.memory_available_mb),
            ("system.disk_percent", sample.disk_percent),
            ("system.disk_io_read_mb", sample.disk_io_read_mb),
            ("system.disk_io_write_mb", sample.disk_io_write_mb),
            ("system.network_bytes_sent", sample.network_bytes_sent as f64),
            ("system.network_bytes_recv", sample.network_bytes_recv as f64),
            ("system.active_connections", sample.active_connections as f64),
        ];
        for (name, value) in readings {
            collector.record_metric(name, value, Labels::new()).await?;
        }

        Ok(())
    }
}

/// Records connection pool usage summed across every pool the provider reports.
pub struct DatabaseStatsSource {
    provider: Arc<dyn DatabaseStatsProvider>,
    interval: Duration,
}

impl DatabaseStatsSource {
    pub fn new(provider: Arc<dyn DatabaseStatsProvider>, interval: Duration) -> Self {
        Self { provider, interval }
    }
}

#[async_trait]
impl CollectionSource for DatabaseStatsSource {
    fn name(&self) -> &'static str {
        "database_stats"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn collect(&self, collector: &MetricsCollector) -> MonitoringResult<()> {
        let combined = match self.provider.pool_stats().await? {
            Some(pools) => pools.into_iter().fold(PoolStats::default(), PoolStats::combine),
            None => {
                debug!("Database pools not initialized, recording zero pool stats");
                PoolStats::default()
            }
        };

        let readings = [
            ("database.pool_size", combined.pool_size as f64),
            ("database.active_connections", combined.active_connections as f64),
            ("database.overflow", combined.overflow as f64),
            ("database.pool_utilization_percent", combined.utilization_percent()),
        ];
        for (name, value) in readings {
            collector.record_metric(name, value, Labels::new()).await?;
        }

        Ok(())
    }
}

/// Records websocket connection counters.
pub struct WebSocketStatsSource {
    registry: Option<Arc<dyn ConnectionRegistry>>,
    interval: Duration,
}

impl WebSocketStatsSource {
    pub fn new(registry: Option<Arc<dyn ConnectionRegistry>>, interval: Duration) -> Self {
        Self { registry, interval }
    }
}

#[async_trait]
impl CollectionSource for WebSocketStatsSource {
    fn name(&self) -> &'static str {
        "websocket_stats"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn collect(&self, collector: &MetricsCollector) -> MonitoringResult<()> {
        let stats = self
            .registry
            .as_ref()
            .and_then(|registry| registry.stats())
            .unwrap_or_default();

        collector
            .record_metric("websocket.active_connections", stats.active_connections as f64, Labels::new())
            .await?;
        collector
            .record_metric("websocket.total_connections", stats.total_connections as f64, Labels::new())
            .await?;

        Ok(())
    }
}

/// Records tokio runtime counters: worker threads, alive tasks and the
/// depth of the global injection queue.
pub struct RuntimeStatsSource {
    interval: Duration,
}

impl RuntimeStatsSource {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

#[async_trait]
impl CollectionSource for RuntimeStatsSource {
    fn name(&self) -> &'static str {
        "runtime_stats"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn collect(&self, collector: &MetricsCollector) -> MonitoringResult<()> {
        let metrics = tokio::runtime::Handle::current().metrics();

        let readings = [
            ("runtime.workers", metrics.num_workers() as f64),
            ("runtime.alive_tasks", metrics.num_alive_tasks() as f64),
            ("runtime.global_queue_depth", metrics.global_queue_depth() as f64),
            ("monitoring.tracked_metrics", collector.metric_names().await.len() as f64),
        ];
        for (name, value) in readings {
            collector.record_metric(name, value, Labels::new()).await?;
        }

        Ok(())
    }
}

/// Drops points older than the retention period from every buffer.
pub struct RetentionCleanupSource {
    interval: Duration,
}

impl RetentionCleanupSource {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

#[async_trait]
impl CollectionSource for RetentionCleanupSource {
    fn name(&self) -> &'static str {
        "retention_cleanup"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn collect(&self, collector: &MetricsCollector) -> MonitoringResult<()> {
        let removed = collector.prune_expired().await;
        if removed > 0 {
            debug!(removed, "Pruned expired metric points");
        }

        Ok(())
    }
}
