use async_trait::async_trait;
use monitor::domain::errors::{MonitoringError, MonitoringResult};
use monitor::infrastructure::monitoring::MonitorConfig;
use monitor::infrastructure::providers::{
    ConnectionRegistry, ConnectionStats, DatabaseStatsProvider, PoolStats, ResourceSample, ResourceSampler,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Config with loop ticks short enough for tests to observe several iterations.
pub fn fast_config() -> MonitorConfig {
    MonitorConfig {
        collection_interval: Duration::from_millis(50),
        cleanup_interval: Duration::from_millis(50),
        alert_evaluation_interval: Duration::from_millis(50),
        io_timeout: Duration::from_millis(500),
        shutdown_grace_period: Duration::from_secs(1),
        ..MonitorConfig::default()
    }
}

pub struct FixedSampler {
    pub cpu_percent: f64,
    pub memory_percent: f64,
}

#[async_trait]
impl ResourceSampler for FixedSampler {
    async fn sample(&self) -> MonitoringResult<ResourceSample> {
        Ok(ResourceSample {
            cpu_percent: self.cpu_percent,
            memory_percent: self.memory_percent,
            memory_available_mb: 2048.0,
            ..ResourceSample::default()
        })
    }
}

/// Database provider that fails every call and counts the attempts.
#[derive(Default)]
pub struct FailingDatabase {
    pub calls: Arc<AtomicUsize>,
}

#[async_trait]
impl DatabaseStatsProvider for FailingDatabase {
    async fn pool_stats(&self) -> MonitoringResult<Option<Vec<PoolStats>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(MonitoringError::transient("database", "connection refused"))
    }
}

pub struct HealthyDatabase;

#[async_trait]
impl DatabaseStatsProvider for HealthyDatabase {
    async fn pool_stats(&self) -> MonitoringResult<Option<Vec<PoolStats>>> {
        Ok(Some(vec![PoolStats {
            pool_size: 20,
            active_connections: 19,
            overflow: 0,
        }]))
    }
}

pub struct StaticRegistry(pub ConnectionStats);

impl ConnectionRegistry for StaticRegistry {
    fn stats(&self) -> Option<ConnectionStats> {
        Some(self.0)
    }
}
