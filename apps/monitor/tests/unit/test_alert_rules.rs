use chrono::Utc;
use monitor::domain::alert::{Alert, AlertRule, AlertSeverity, AlertSummary, Comparison};

fn rule(comparison: Comparison, threshold: f64) -> AlertRule {
    AlertRule::new("r", "Rule", "m", comparison, threshold, AlertSeverity::Warning, 60).unwrap()
}

#[test]
fn comparisons_honour_strictness() {
    assert!(rule(Comparison::Gt, 80.0).is_breached_by(80.1));
    assert!(!rule(Comparison::Gt, 80.0).is_breached_by(80.0));
    assert!(rule(Comparison::Gte, 80.0).is_breached_by(80.0));
    assert!(rule(Comparison::Lt, 10.0).is_breached_by(9.9));
    assert!(!rule(Comparison::Lt, 10.0).is_breached_by(10.0));
    assert!(rule(Comparison::Lte, 10.0).is_breached_by(10.0));
}

#[test]
fn equality_is_tolerant() {
    assert!(rule(Comparison::Eq, 1.0).is_breached_by(1.0005));
    assert!(!rule(Comparison::Eq, 1.0).is_breached_by(1.01));
}

#[test]
fn non_finite_threshold_is_rejected() {
    let result = AlertRule::new("r", "Rule", "m", Comparison::Gt, f64::NAN, AlertSeverity::Info, 0);
    assert!(result.is_err());
}

#[test]
fn summary_counts_every_severity() {
    let alerts: Vec<Alert> = [
        AlertSeverity::Critical,
        AlertSeverity::Error,
        AlertSeverity::Warning,
        AlertSeverity::Info,
        AlertSeverity::Info,
    ]
    .into_iter()
    .map(|severity| {
        let rule = AlertRule::new("r", "Rule", "m", Comparison::Gt, 0.0, severity, 0).unwrap();
        Alert::from_rule(&rule, "m", 1.0, Utc::now())
    })
    .collect();

    let summary = AlertSummary::from_alerts(&alerts);
    assert_eq!(summary.total, 5);
    assert_eq!(summary.critical, 1);
    assert_eq!(summary.error, 1);
    assert_eq!(summary.warning, 1);
    assert_eq!(summary.info, 2);
}

#[test]
fn alert_serializes_with_lowercase_severity() {
    let rule = AlertRule::new("r", "Rule", "m", Comparison::Gt, 0.0, AlertSeverity::Critical, 0).unwrap();
    let alert = Alert::from_rule(&rule, "m", 1.0, Utc::now());

    let json = serde_json::to_value(&alert).unwrap();
    assert_eq!(json["severity"], "critical");
    assert!(json["resolved_at"].is_null());
}
