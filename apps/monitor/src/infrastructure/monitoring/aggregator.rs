//! Windowed aggregation of raw samples.

use crate::domain::errors::{MonitoringError, MonitoringResult};
use crate::domain::metric::{self, MetricPoint};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Label value used when a point lacks a group-by label.
pub const UNKNOWN_LABEL: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationFunction {
    Sum,
    Mean,
    Min,
    Max,
    Count,
    P95,
    P99,
}

impl AggregationFunction {
    pub fn key(self) -> &'static str {
        match self {
            AggregationFunction::Sum => "sum",
            AggregationFunction::Mean => "mean",
            AggregationFunction::Min => "min",
            AggregationFunction::Max => "max",
            AggregationFunction::Count => "count",
            AggregationFunction::P95 => "p95",
            AggregationFunction::P99 => "p99",
        }
    }

    /// Applies the function to a non-empty slice of values.
    fn apply(self, values: &[f64]) -> f64 {
        match self {
            AggregationFunction::Sum => values.iter().sum(),
            AggregationFunction::Mean => values.iter().sum::<f64>() / values.len() as f64,
            AggregationFunction::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            AggregationFunction::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            AggregationFunction::Count => values.len() as f64,
            AggregationFunction::P95 => percentile(values, 0.95),
            AggregationFunction::P99 => percentile(values, 0.99),
        }
    }
}

impl fmt::Display for AggregationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for AggregationFunction {
    type Err = MonitoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(AggregationFunction::Sum),
            "avg" | "mean" => Ok(AggregationFunction::Mean),
            "min" => Ok(AggregationFunction::Min),
            "max" => Ok(AggregationFunction::Max),
            "count" => Ok(AggregationFunction::Count),
            "p95" => Ok(AggregationFunction::P95),
            "p99" => Ok(AggregationFunction::P99),
            other => Err(MonitoringError::config(format!("unknown aggregation function '{}'", other))),
        }
    }
}

/// Result of one function applied to one group of one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedMetric {
    pub metric_name: String,
    pub function: AggregationFunction,
    pub group: BTreeMap<String, String>,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub sample_count: usize,
    pub aggregations: BTreeMap<String, f64>,
}

impl AggregatedMetric {
    pub fn value(&self) -> Option<f64> {
        self.aggregations.get(self.function.key()).copied()
    }
}

/// Nearest-rank percentile over ascending values, index `floor(q * n)`
/// clamped to the last element.
pub fn percentile(values: &[f64], quantile: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let index = ((quantile * sorted.len() as f64).floor() as usize).min(sorted.len() - 1);
    sorted[index]
}

/// Stateless aggregator. The window ends at the newest input timestamp, so
/// the result depends only on the points passed in.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator;

impl Aggregator {
    pub fn new() -> Self {
        Self
    }

    /// Groups `points` by metric name plus the values of `group_by_labels`
    /// and applies every function to each group. Output is sorted by metric
    /// name, then group, then the order of `functions`.
    pub fn aggregate(
        &self,
        points: &[MetricPoint],
        window_seconds: u64,
        group_by_labels: &[&str],
        functions: &[AggregationFunction],
    ) -> Vec<AggregatedMetric> {
        let Some(window_end) = points.iter().map(MetricPoint::timestamp).max() else {
            return Vec::new();
        };
        let window_start = metric::window_start(window_end, Duration::from_secs(window_seconds));

        let mut groups: BTreeMap<(String, BTreeMap<String, String>), Vec<f64>> = BTreeMap::new();
        for point in points.iter().filter(|p| p.timestamp() >= window_start) {
            let group = group_by_labels
                .iter()
                .map(|label| {
                    let value = point.label(label).unwrap_or(UNKNOWN_LABEL);
                    (label.to_string(), value.to_string())
                })
                .collect();
            groups
                .entry((point.name().to_string(), group))
                .or_default()
                .push(point.value());
        }

        let mut results = Vec::with_capacity(groups.len() * functions.len());
        for ((metric_name, group), values) in groups {
            for &function in functions {
                let mut aggregations = BTreeMap::new();
                aggregations.insert(function.key().to_string(), function.apply(&values));

                results.push(AggregatedMetric {
                    metric_name: metric_name.clone(),
                    function,
                    group: group.clone(),
                    window_start,
                    window_end,
                    sample_count: values.len(),
                    aggregations,
                });
            }
        }
        results
    }

    /// Parses function names before aggregating. Unknown names fail the whole call.
    pub fn aggregate_named(
        &self,
        points: &[MetricPoint],
        window_seconds: u64,
        group_by_labels: &[&str],
        functions: &[&str],
    ) -> MonitoringResult<Vec<AggregatedMetric>> {
        let functions = functions
            .iter()
            .map(|f| f.parse())
            .collect::<MonitoringResult<Vec<AggregationFunction>>>()?;
        Ok(self.aggregate(points, window_seconds, group_by_labels, &functions))
    }
}
