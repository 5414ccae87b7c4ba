use monitor::{
    config::Config,
    infrastructure::{
        database::pool::create_pool,
        monitoring::{AlertEvaluator, DatabaseHealthCheck, MetricsCollector, MonitoringService, RedisHealthCheck},
        providers::{BroadcastConnectionRegistry, ConnectionRegistry, PgPoolStatsProvider, SysinfoResourceSampler},
    },
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Uses RUST_LOG if set, otherwise sensible defaults
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info,monitor=debug"))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Config::from_env()?;
    let monitor_config = config.monitor_config()?;

    let db = match &config.database_url {
        Some(url) => Some(create_pool(url, config.database_max_connections, monitor_config.io_timeout)?),
        None => {
            tracing::warn!("DATABASE_URL not set, database pool stats will read as zero");
            None
        }
    };

    let (tx, _) = broadcast::channel::<String>(100);
    let registry: Arc<dyn ConnectionRegistry> = Arc::new(BroadcastConnectionRegistry::new(Arc::new(tx)));

    let cooldown = monitor_config.alert_cooldown.as_secs();
    let collector = MetricsCollector::new(monitor_config)?.with_standard_sources(
        Arc::new(SysinfoResourceSampler::new()),
        Arc::new(PgPoolStatsProvider::new(db.iter().cloned().collect())),
        Some(registry),
    );

    let service = Arc::new(MonitoringService::new(collector, AlertEvaluator::with_default_rules(cooldown)));

    if let Some(pool) = db {
        service.register_health_check(Arc::new(DatabaseHealthCheck::new(pool))).await;
    }
    if let Some(url) = &config.redis_url {
        let redis = redis::Client::open(url.as_str())?;
        service.register_health_check(Arc::new(RedisHealthCheck::new(redis))).await;
    }

    service.start().await;
    tracing::info!(
        sources = ?service.collector().source_names(),
        "Monitor online"
    );

    let report_interval = config.report_interval();
    let mut ticker = tokio::time::interval(report_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => report(&service, report_interval).await,
            _ = &mut shutdown => break,
        }
    }

    service.stop().await;
    Ok(())
}

async fn report(service: &MonitoringService, window: std::time::Duration) {
    let health = service.health_report(window).await;
    let alerts = service.alert_summary().await;
    let dependencies = service.check_health().await;

    tracing::info!(
        score = health.score,
        status = ?health.status,
        dependencies = ?dependencies.status,
        active_alerts = alerts.total,
        critical_alerts = alerts.critical,
        "Health report"
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("SIGTERM received, initiating graceful shutdown");
        }
    }
}
