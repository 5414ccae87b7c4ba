use crate::domain::errors::MonitoringResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Host resource readings taken at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceSample {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub memory_available_mb: f64,
    pub disk_percent: f64,
    pub disk_io_read_mb: f64,
    pub disk_io_write_mb: f64,
    pub network_bytes_sent: u64,
    pub network_bytes_recv: u64,
    pub active_connections: u64,
}

/// Connection pool usage for one database pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    pub pool_size: u64,
    pub active_connections: u64,
    pub overflow: u64,
}

impl PoolStats {
    /// Adds another pool's numbers to this one.
    pub fn combine(self, other: PoolStats) -> PoolStats {
        PoolStats {
            pool_size: self.pool_size + other.pool_size,
            active_connections: self.active_connections + other.active_connections,
            overflow: self.overflow + other.overflow,
        }
    }

    pub fn utilization_percent(&self) -> f64 {
        if self.pool_size == 0 {
            0.0
        } else {
            self.active_connections as f64 / self.pool_size as f64 * 100.0
        }
    }
}

/// Websocket connection counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStats {
    pub active_connections: u64,
    pub total_connections: u64,
}

/// OS-level resource sampling.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceSampler: Send + Sync {
    async fn sample(&self) -> MonitoringResult<ResourceSample>;
}

/// Database connection pool statistics.
///
/// `Ok(None)` means the pools are not initialized yet; callers record zeros.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DatabaseStatsProvider: Send + Sync {
    async fn pool_stats(&self) -> MonitoringResult<Option<Vec<PoolStats>>>;
}

/// Registry of live websocket connections. `None` when the registry has not
/// been initialized.
#[cfg_attr(test, mockall::automock)]
pub trait ConnectionRegistry: Send + Sync {
    fn stats(&self) -> Option<ConnectionStats>;
}
