//! Dependency health checks.
//!
//! Implement [`HealthCheck`] for external services (database, Redis) so the
//! monitoring service can poll them on demand. Synchronous checks can be
//! wrapped in [`FnHealthCheck`].

use crate::domain::health::{HealthCheckResult, HealthStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Returns the name of this health check for identification
    fn name(&self) -> &str;

    /// Performs the health check and returns the current status
    async fn check(&self) -> HealthCheckResult;

    /// Upper bound on a single run of this check
    fn timeout(&self) -> Duration {
        DEFAULT_CHECK_TIMEOUT
    }
}

/// Adapts a synchronous closure into a [`HealthCheck`].
pub struct FnHealthCheck<F> {
    name: String,
    check_fn: F,
}

impl<F> FnHealthCheck<F>
where
    F: Fn() -> HealthCheckResult + Send + Sync,
{
    pub fn new(name: impl Into<String>, check_fn: F) -> Self {
        Self {
            name: name.into(),
            check_fn,
        }
    }
}

#[async_trait]
impl<F> HealthCheck for FnHealthCheck<F>
where
    F: Fn() -> HealthCheckResult + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> HealthCheckResult {
        (self.check_fn)()
    }
}

/// Outcome of one check as reported by [`OverallHealthStatus`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub result: HealthCheckResult,
    pub response_time_ms: u64,
}

/// Overall health status for all registered checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallHealthStatus {
    /// Worst status across all checks; healthy when none are registered
    pub status: HealthStatus,
    pub checks: BTreeMap<String, CheckOutcome>,
    pub timestamp: DateTime<Utc>,
}

impl OverallHealthStatus {
    pub fn from_outcomes(checks: BTreeMap<String, CheckOutcome>) -> Self {
        let status = checks
            .values()
            .map(|outcome| outcome.result.status())
            .max_by_key(|status| severity_rank(*status))
            .unwrap_or(HealthStatus::Healthy);

        Self {
            status,
            checks,
            timestamp: Utc::now(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

fn severity_rank(status: HealthStatus) -> u8 {
    match status {
        HealthStatus::Healthy => 0,
        HealthStatus::Unknown => 1,
        HealthStatus::Warning => 2,
        HealthStatus::Critical => 3,
    }
}

/// Runs a check under its own timeout. A timed-out check reports critical.
pub async fn run_check(check: &dyn HealthCheck) -> CheckOutcome {
    let started = Instant::now();
    let timeout = check.timeout();

    let result = match tokio::time::timeout(timeout, check.check()).await {
        Ok(result) => result,
        Err(_) => HealthCheckResult::detailed(
            HealthStatus::Critical,
            format!("Health check timed out after {} ms", timeout.as_millis()),
        ),
    };

    CheckOutcome {
        result,
        response_time_ms: started.elapsed().as_millis() as u64,
    }
}

/// Database health check implementation
pub struct DatabaseHealthCheck {
    pool: sqlx::PgPool,
}

impl DatabaseHealthCheck {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthCheck for DatabaseHealthCheck {
    fn name(&self) -> &str {
        "database"
    }

    async fn check(&self) -> HealthCheckResult {
        match sqlx::query("SELECT 1").fetch_one(&self.pool).await {
            Ok(_) => {
                let mut details = serde_json::Map::new();
                details.insert("pool_size".to_string(), serde_json::Value::from(self.pool.size()));
                details.insert("idle_connections".to_string(), serde_json::Value::from(self.pool.num_idle() as u64));
                HealthCheckResult::Detailed {
                    status: HealthStatus::Healthy,
                    details,
                }
            }
            Err(e) => HealthCheckResult::detailed(HealthStatus::Critical, format!("Database connection failed: {}", e)),
        }
    }
}

/// Redis health check implementation
pub struct RedisHealthCheck {
    client: redis::Client,
}

impl RedisHealthCheck {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HealthCheck for RedisHealthCheck {
    fn name(&self) -> &str {
        "redis"
    }

    async fn check(&self) -> HealthCheckResult {
        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                return HealthCheckResult::detailed(HealthStatus::Critical, format!("Redis connection failed: {}", e));
            }
        };

        match redis::cmd("PING").query_async::<String>(&mut conn).await {
            Ok(response) if response == "PONG" => HealthCheckResult::Boolean(true),
            Ok(response) => {
                HealthCheckResult::detailed(HealthStatus::Warning, format!("Unexpected Redis ping response: {}", response))
            }
            Err(e) => HealthCheckResult::detailed(HealthStatus::Critical, format!("Redis ping failed: {}", e)),
        }
    }
}
