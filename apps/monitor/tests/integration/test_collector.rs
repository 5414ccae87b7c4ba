use crate::helpers::{FailingDatabase, FixedSampler, fast_config};
use monitor::domain::metric::Labels;
use monitor::infrastructure::monitoring::{MetricsCollector, MonitorConfig};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

const CAPACITY: usize = 500;
const WRITERS: u64 = 10;

/// Writes per writer for each metric. Totals are 1000, 500, 300 and 700.
const WRITES_PER_WRITER: [(&str, u64); 4] = [("load.a", 100), ("load.b", 50), ("load.c", 30), ("load.d", 70)];

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_appends_respect_capacity() {
    let collector = MetricsCollector::new(MonitorConfig {
        buffer_capacity: CAPACITY,
        ..MonitorConfig::default()
    })
    .unwrap();

    let mut handles = Vec::new();
    for writer in 0..WRITERS {
        let collector = collector.clone();
        handles.push(tokio::spawn(async move {
            let most = WRITES_PER_WRITER.iter().map(|(_, n)| *n).max().unwrap_or(0);
            for i in 0..most {
                for (name, writes) in WRITES_PER_WRITER {
                    if i < writes {
                        collector
                            .record_metric(name, (writer * 1000 + i) as f64, Labels::new())
                            .await
                            .unwrap();
                    }
                }
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(collector.metric_names().await.len(), WRITES_PER_WRITER.len());

    for (name, writes) in WRITES_PER_WRITER {
        let total = WRITERS * writes;
        let stats = collector.buffer_stats(name).await.unwrap();
        assert_eq!(stats.len, (total as usize).min(CAPACITY), "{name}");
        assert_eq!(stats.overflow_count, total.saturating_sub(CAPACITY as u64), "{name}");

        let written: HashSet<u64> = (0..WRITERS)
            .flat_map(|writer| (0..writes).map(move |i| writer * 1000 + i))
            .collect();
        let retained: Vec<u64> = collector
            .get_recent_metrics(name, Duration::from_secs(3600))
            .await
            .iter()
            .map(|p| p.value() as u64)
            .collect();
        let unique: HashSet<u64> = retained.iter().copied().collect();

        assert_eq!(retained.len(), stats.len, "{name}");
        assert_eq!(unique.len(), retained.len(), "{name} has duplicate entries");
        assert!(unique.is_subset(&written), "{name} holds values nobody wrote");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failing_database_does_not_stall_system_sampling() {
    let database = FailingDatabase::default();
    let calls = Arc::clone(&database.calls);

    let collector = MetricsCollector::new(fast_config()).unwrap().with_standard_sources(
        Arc::new(FixedSampler {
            cpu_percent: 35.0,
            memory_percent: 40.0,
        }),
        Arc::new(database),
        None,
    );

    collector.start().await;
    tokio::time::sleep(Duration::from_millis(400)).await;
    collector.stop().await;

    let cpu = collector
        .get_recent_metrics("system.cpu_percent", Duration::from_secs(60))
        .await;
    assert!(cpu.len() >= 3, "system loop ran {} times", cpu.len());
    assert!(calls.load(Ordering::SeqCst) >= 3);
    assert!(collector.buffer_stats("database.pool_size").await.is_none());

    let values = collector.current_values().await;
    assert_eq!(values.get("websocket.active_connections"), Some(&0.0));
    assert!(values.contains_key("runtime.workers"));
}

#[tokio::test]
async fn stopped_collector_records_nothing_more() {
    let collector = MetricsCollector::new(fast_config()).unwrap().with_standard_sources(
        Arc::new(FixedSampler {
            cpu_percent: 10.0,
            memory_percent: 10.0,
        }),
        Arc::new(FailingDatabase::default()),
        None,
    );

    collector.start().await;
    tokio::time::sleep(Duration::from_millis(120)).await;
    collector.stop().await;

    let before = collector.buffer_stats("system.cpu_percent").await.unwrap().len;
    tokio::time::sleep(Duration::from_millis(200)).await;
    let after = collector.buffer_stats("system.cpu_percent").await.unwrap().len;
    assert_eq!(before, after);
}
