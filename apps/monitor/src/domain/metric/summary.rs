use super::point::MetricPoint;
use serde::{Deserialize, Serialize};

/// Descriptive statistics over a window of samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    /// Value of the most recently appended sample.
    pub current: f64,
}

impl MetricSummary {
    /// Summarizes points in buffer order. `None` when there is nothing to summarize.
    pub fn from_points(points: &[MetricPoint]) -> Option<Self> {
        let current = points.last()?.value();

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for point in points {
            let value = point.value();
            min = min.min(value);
            max = max.max(value);
            sum += value;
        }

        Some(Self {
            count: points.len(),
            min,
            max,
            avg: sum / points.len() as f64,
            current,
        })
    }
}
