use chrono::{Duration, Utc};
use monitor::domain::metric::{Labels, MetricBuffer, MetricPoint, MetricSummary};

fn point(value: f64, age_secs: i64) -> MetricPoint {
    MetricPoint::at("cpu", value, Labels::new(), Utc::now() - Duration::seconds(age_secs)).unwrap()
}

#[test]
fn buffer_never_exceeds_capacity() {
    let mut buffer = MetricBuffer::new(10).unwrap();
    for i in 0..25 {
        buffer.append(point(i as f64, 0));
        assert!(buffer.len() <= 10);
    }
    assert_eq!(buffer.overflow_count(), 15);
}

#[test]
fn eviction_is_fifo() {
    let mut buffer = MetricBuffer::new(3).unwrap();
    for v in [1.0, 2.0, 3.0, 4.0] {
        buffer.append(point(v, 0));
    }

    let values: Vec<f64> = buffer.query(None, None).iter().map(MetricPoint::value).collect();
    assert_eq!(values, vec![2.0, 3.0, 4.0]);
}

#[test]
fn zero_capacity_is_rejected() {
    assert!(MetricBuffer::new(0).is_err());
}

#[test]
fn summary_of_known_series() {
    let points: Vec<MetricPoint> = [10.0, 20.0, 30.0, 40.0, 50.0].iter().map(|v| point(*v, 0)).collect();
    let summary = MetricSummary::from_points(&points).unwrap();

    assert_eq!(summary.count, 5);
    assert_eq!(summary.min, 10.0);
    assert_eq!(summary.max, 50.0);
    assert_eq!(summary.avg, 30.0);
    assert_eq!(summary.current, 50.0);
}

#[test]
fn summary_of_nothing_is_none() {
    assert!(MetricSummary::from_points(&[]).is_none());
}

#[test]
fn prune_removes_backfilled_stale_points() {
    let mut buffer = MetricBuffer::new(10).unwrap();
    buffer.append(point(1.0, 10));
    buffer.append(point(2.0, 7200));
    buffer.append(point(3.0, 5));

    let removed = buffer.prune(Utc::now() - Duration::hours(1));
    assert_eq!(removed, 1);
    assert_eq!(buffer.len(), 2);
}

#[test]
fn labels_are_preserved() {
    let mut labels = Labels::new();
    labels.insert("endpoint".to_string(), "/health".to_string());
    let point = MetricPoint::new("http.requests", 1.0, labels).unwrap();

    assert_eq!(point.label("endpoint"), Some("/health"));
    assert_eq!(point.label("missing"), None);
}
