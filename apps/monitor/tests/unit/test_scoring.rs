use monitor::domain::health::{HealthCheckResult, HealthStatus, MetricsBySection, SystemSection};
use monitor::infrastructure::monitoring::HealthScoreCalculator;

#[test]
fn cpu_at_95_scores_70_and_warns() {
    let metrics = MetricsBySection {
        system: Some(SystemSection {
            cpu_percent: Some(95.0),
            ..SystemSection::default()
        }),
        ..MetricsBySection::default()
    };

    let health = HealthScoreCalculator::default().calculate_overall_health(&metrics);
    assert_eq!(health.score, 70.0);
    assert_eq!(health.status, HealthStatus::Warning);
}

#[test]
fn status_bands_match_score_ranges() {
    assert_eq!(HealthScoreCalculator::score_to_status(80.0), HealthStatus::Healthy);
    assert_eq!(HealthScoreCalculator::score_to_status(60.0), HealthStatus::Warning);
    assert_eq!(HealthScoreCalculator::score_to_status(1.0), HealthStatus::Critical);
    assert_eq!(HealthScoreCalculator::score_to_status(0.0), HealthStatus::Unknown);
}

#[test]
fn check_result_round_trips_through_json() {
    let result = HealthCheckResult::detailed(HealthStatus::Warning, "replica lag");
    let json = serde_json::to_string(&result).unwrap();
    let back: HealthCheckResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);

    let boolean = serde_json::to_value(HealthCheckResult::Boolean(true)).unwrap();
    assert_eq!(boolean["kind"], "boolean");
    assert_eq!(boolean["value"], true);
}
