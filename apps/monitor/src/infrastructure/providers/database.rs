use super::traits::{DatabaseStatsProvider, PoolStats};
use crate::domain::errors::MonitoringResult;
use async_trait::async_trait;
use sqlx::PgPool;

/// Pool statistics read from one or more sqlx Postgres pools.
///
/// sqlx pools never grow past `max_connections`, so `overflow` is always zero.
pub struct PgPoolStatsProvider {
    pools: Vec<PgPool>,
}

impl PgPoolStatsProvider {
    pub fn new(pools: Vec<PgPool>) -> Self {
        Self { pools }
    }

    fn stats_for(pool: &PgPool) -> PoolStats {
        let open = pool.size() as u64;
        let idle = pool.num_idle() as u64;

        PoolStats {
            pool_size: pool.options().get_max_connections() as u64,
            active_connections: open.saturating_sub(idle),
            overflow: 0,
        }
    }
}

#[async_trait]
impl DatabaseStatsProvider for PgPoolStatsProvider {
    async fn pool_stats(&self) -> MonitoringResult<Option<Vec<PoolStats>>> {
        if self.pools.is_empty() {
            return Ok(None);
        }

        Ok(Some(self.pools.iter().map(Self::stats_for).collect()))
    }
}
