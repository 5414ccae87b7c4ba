//! Concurrent metric collection.
//!
//! The collector keeps one bounded buffer per metric name. The name map sits
//! behind a read-mostly lock; each buffer has its own mutex, so writers to
//! different metrics never contend. Collection sources run as independent
//! periodic loops started by [`MetricsCollector::start`].

use super::config::MonitorConfig;
use crate::domain::errors::MonitoringResult;
use crate::domain::metric::{self, BufferStats, Labels, MetricBuffer, MetricPoint, MetricSummary};
use crate::infrastructure::providers::{ConnectionRegistry, DatabaseStatsProvider, ResourceSampler};
use crate::workers::collection::{
    CollectionSource, DatabaseStatsSource, RetentionCleanupSource, RuntimeStatsSource, SystemResourceSource,
    WebSocketStatsSource,
};
use crate::workers::periodic::LoopSet;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, instrument, warn};

type BufferMap = HashMap<String, Arc<Mutex<MetricBuffer>>>;

/// Cheaply cloneable handle to the shared metric store.
#[derive(Clone)]
pub struct MetricsCollector {
    buffers: Arc<RwLock<BufferMap>>,
    config: Arc<MonitorConfig>,
    sources: Vec<Arc<dyn CollectionSource>>,
    loops: Arc<Mutex<Option<LoopSet>>>,
}

impl MetricsCollector {
    /// Creates a collector with only the retention cleanup source registered.
    pub fn new(config: MonitorConfig) -> MonitoringResult<Self> {
        config.validate()?;

        let cleanup: Arc<dyn CollectionSource> = Arc::new(RetentionCleanupSource::new(config.cleanup_interval));

        Ok(Self {
            buffers: Arc::new(RwLock::new(HashMap::new())),
            config: Arc::new(config),
            sources: vec![cleanup],
            loops: Arc::new(Mutex::new(None)),
        })
    }

    pub fn with_source(mut self, source: Arc<dyn CollectionSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Registers the system, database, websocket and runtime sources at the
    /// configured collection interval.
    pub fn with_standard_sources(
        self,
        sampler: Arc<dyn ResourceSampler>,
        database: Arc<dyn DatabaseStatsProvider>,
        registry: Option<Arc<dyn ConnectionRegistry>>,
    ) -> Self {
        let interval = self.config.collection_interval;

        self.with_source(Arc::new(SystemResourceSource::new(sampler, interval)))
            .with_source(Arc::new(DatabaseStatsSource::new(database, interval)))
            .with_source(Arc::new(WebSocketStatsSource::new(registry, interval)))
            .with_source(Arc::new(RuntimeStatsSource::new(interval)))
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Records a sample stamped with the current time.
    #[instrument(level = "trace", skip(self, labels))]
    pub async fn record_metric(&self, name: &str, value: f64, labels: Labels) -> MonitoringResult<()> {
        self.record(MetricPoint::new(name, value, labels)?).await
    }

    /// Records a sample with an explicit timestamp, e.g. when backfilling.
    pub async fn record_metric_at(
        &self,
        name: &str,
        value: f64,
        labels: Labels,
        timestamp: DateTime<Utc>,
    ) -> MonitoringResult<()> {
        self.record(MetricPoint::at(name, value, labels, timestamp)?).await
    }

    pub async fn record(&self, point: MetricPoint) -> MonitoringResult<()> {
        let buffer = self.buffer_for(point.name()).await?;
        buffer.lock().await.append(point);
        Ok(())
    }

    /// Points for `name` recorded within the last `window`, oldest first.
    pub async fn get_recent_metrics(&self, name: &str, window: Duration) -> Vec<MetricPoint> {
        let Some(buffer) = self.existing_buffer(name).await else {
            return Vec::new();
        };

        let since = metric::window_start(Utc::now(), window);
        buffer.lock().await.query(None, Some(since))
    }

    /// Count, min, max, mean and latest value over the last `window`.
    /// `None` when no samples fall inside it.
    pub async fn get_metric_summary(&self, name: &str, window: Duration) -> Option<MetricSummary> {
        let points = self.get_recent_metrics(name, window).await;
        MetricSummary::from_points(&points)
    }

    /// Latest value of every metric that has at least one sample.
    pub async fn current_values(&self) -> BTreeMap<String, f64> {
        let mut values = BTreeMap::new();
        for (name, buffer) in self.snapshot().await {
            if let Some(point) = buffer.lock().await.latest() {
                values.insert(name, point.value());
            }
        }
        values
    }

    pub async fn metric_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.buffers.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn buffer_stats(&self, name: &str) -> Option<BufferStats> {
        let buffer = self.existing_buffer(name).await?;
        let stats = buffer.lock().await.stats();
        Some(stats)
    }

    /// Drops samples older than the retention period.
    pub async fn prune_expired(&self) -> usize {
        self.prune_before(self.config.retention_cutoff(Utc::now())).await
    }

    /// Drops samples older than `cutoff` from every buffer. Emptied buffers
    /// stay registered so their names keep appearing in listings.
    pub async fn prune_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut removed = 0;
        for (_, buffer) in self.snapshot().await {
            removed += buffer.lock().await.prune(cutoff);
        }
        removed
    }

    /// Spawns one loop per registered source. Calling `start` on a running
    /// collector is a no-op.
    pub async fn start(&self) {
        let mut guard = self.loops.lock().await;
        if guard.is_some() {
            warn!("Metrics collector already running");
            return;
        }

        let mut loops = LoopSet::new();
        for source in &self.sources {
            let source = Arc::clone(source);
            let collector = self.clone();
            loops.spawn(source.name(), source.interval(), self.config.io_timeout, move || {
                let source = Arc::clone(&source);
                let collector = collector.clone();
                async move { source.collect(&collector).await }
            });
        }

        info!(sources = loops.len(), "Metrics collection started");
        *guard = Some(loops);
    }

    /// Stops every collection loop, waiting up to the shutdown grace period.
    pub async fn stop(&self) {
        let loops = self.loops.lock().await.take();
        match loops {
            Some(loops) => {
                loops.shutdown(self.config.shutdown_grace_period).await;
                info!("Metrics collection stopped");
            }
            None => warn!("Metrics collector was not running"),
        }
    }

    pub async fn is_running(&self) -> bool {
        self.loops.lock().await.is_some()
    }

    async fn existing_buffer(&self, name: &str) -> Option<Arc<Mutex<MetricBuffer>>> {
        self.buffers.read().await.get(name).cloned()
    }

    async fn buffer_for(&self, name: &str) -> MonitoringResult<Arc<Mutex<MetricBuffer>>> {
        if let Some(buffer) = self.existing_buffer(name).await {
            return Ok(buffer);
        }

        let mut buffers = self.buffers.write().await;
        // Another writer may have created it between the two lock acquisitions.
        if let Some(buffer) = buffers.get(name) {
            return Ok(Arc::clone(buffer));
        }

        let buffer = Arc::new(Mutex::new(MetricBuffer::new(self.config.buffer_capacity)?));
        buffers.insert(name.to_string(), Arc::clone(&buffer));
        Ok(buffer)
    }

    /// Clones the buffer handles so the map lock is released before any
    /// buffer lock is awaited.
    async fn snapshot(&self) -> Vec<(String, Arc<Mutex<MetricBuffer>>)> {
        self.buffers
            .read()
            .await
            .iter()
            .map(|(name, buffer)| (name.clone(), Arc::clone(buffer)))
            .collect()
    }
}
