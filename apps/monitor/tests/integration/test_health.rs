use async_trait::async_trait;
use monitor::domain::health::{HealthCheckResult, HealthStatus};
use monitor::domain::metric::Labels;
use monitor::infrastructure::monitoring::{FnHealthCheck, HealthCheck, MonitorConfig, MonitoringService};
use std::sync::Arc;
use std::time::{Duration, Instant};

struct HangingCheck;

#[async_trait]
impl HealthCheck for HangingCheck {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn check(&self) -> HealthCheckResult {
        std::future::pending::<()>().await;
        HealthCheckResult::Boolean(true)
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(100)
    }
}

#[tokio::test]
async fn hanging_check_times_out_without_blocking_others() {
    let service = MonitoringService::from_config(MonitorConfig::default()).unwrap();
    service.register_health_check(Arc::new(HangingCheck)).await;
    service
        .register_health_check(Arc::new(FnHealthCheck::new("cache", || HealthCheckResult::Boolean(true))))
        .await;

    let started = Instant::now();
    let overall = service.check_health().await;

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(overall.status, HealthStatus::Critical);
    assert_eq!(overall.checks["hanging"].result.status(), HealthStatus::Critical);
    assert!(overall.checks["cache"].result.is_healthy());
}

#[tokio::test]
async fn health_report_combines_sections() {
    let service = MonitoringService::from_config(MonitorConfig::default()).unwrap();
    let collector = service.collector();

    collector.record_metric("system.cpu_percent", 50.0, Labels::new()).await.unwrap();
    collector.record_metric("http.response_time_ms", 4000.0, Labels::new()).await.unwrap();
    collector.record_metric("quality.coverage_percent", 90.0, Labels::new()).await.unwrap();

    let report = service.health_report(Duration::from_secs(60)).await;

    assert_eq!(report.sections.system, Some(100.0));
    assert_eq!(report.sections.performance, Some(70.0));
    assert_eq!(report.sections.code_quality, Some(100.0));
    assert_eq!(report.score, 90.0);
    assert_eq!(report.status, HealthStatus::Healthy);
}

#[tokio::test]
async fn no_checks_means_healthy() {
    let service = MonitoringService::from_config(MonitorConfig::default()).unwrap();
    assert!(service.check_health().await.is_healthy());
}
