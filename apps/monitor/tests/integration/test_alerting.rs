use crate::helpers::{FixedSampler, HealthyDatabase, StaticRegistry, fast_config};
use monitor::domain::alert::{AlertRule, AlertSeverity, Comparison};
use monitor::infrastructure::monitoring::{AlertEvaluator, MetricsCollector, MonitoringService};
use monitor::infrastructure::providers::ConnectionStats;
use std::sync::Arc;
use std::time::Duration;

fn service(cpu_percent: f64) -> MonitoringService {
    let collector = MetricsCollector::new(fast_config()).unwrap().with_standard_sources(
        Arc::new(FixedSampler {
            cpu_percent,
            memory_percent: 50.0,
        }),
        Arc::new(HealthyDatabase),
        Some(Arc::new(StaticRegistry(ConnectionStats {
            active_connections: 2,
            total_connections: 5,
        }))),
    );
    MonitoringService::new(collector, AlertEvaluator::with_default_rules(300))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sustained_breach_alerts_once_within_cooldown() {
    let service = service(96.0);
    service.start().await;
    tokio::time::sleep(Duration::from_millis(500)).await;
    service.stop().await;

    let summary = service.alert_summary().await;
    // cpu > 80 and > 90, pool at 95% utilization
    assert_eq!(summary.total, 3);
    assert_eq!(summary.critical, 1);
    assert_eq!(summary.warning, 1);
    assert_eq!(summary.error, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn quiet_host_raises_only_pool_alert() {
    let service = service(20.0);
    service.start().await;
    tokio::time::sleep(Duration::from_millis(300)).await;
    service.stop().await;

    let active = service.alerts().active_alerts().await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].rule_id, "database_pool_saturation");
    assert_eq!(active[0].metric_name, "database.pool_utilization_percent");
    assert_eq!(active[0].severity, AlertSeverity::Error);
}

#[tokio::test]
async fn resolved_alerts_leave_the_active_set() {
    let service = service(96.0);
    service
        .evaluator()
        .register_rule(
            AlertRule::new(
                "websocket_busy",
                "Websocket clients connected",
                "websocket.*",
                Comparison::Gte,
                1.0,
                AlertSeverity::Info,
                0,
            )
            .unwrap(),
        )
        .await
        .unwrap();

    service
        .collector()
        .record_metric("websocket.active_connections", 3.0, Default::default())
        .await
        .unwrap();

    let current = service.collector().current_values().await;
    for alert in service.evaluator().evaluate_alert_conditions(&current).await {
        service.alerts().process_alert(alert).await;
    }

    let active = service.alerts().active_alerts().await;
    assert_eq!(active.len(), 1);
    assert!(service.alerts().resolve_alert(&active[0].alert_id).await);
    assert!(service.alerts().active_alerts().await.is_empty());
    assert_eq!(service.alerts().resolved_alerts().await.len(), 1);
    assert_eq!(service.alert_summary().await.total, 0);
}
