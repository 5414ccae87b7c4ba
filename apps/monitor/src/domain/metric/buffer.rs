//! Bounded, time-retained storage for the samples of a single metric.

use super::point::MetricPoint;
use crate::domain::errors::{MonitoringError, MonitoringResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Fixed-capacity ring of samples. Appending to a full buffer evicts the
/// oldest sample and bumps `overflow_count`.
#[derive(Debug, Clone)]
pub struct MetricBuffer {
    capacity: usize,
    points: VecDeque<MetricPoint>,
    overflow_count: u64,
    /// Set once a sample arrives with a timestamp older than the current tail.
    out_of_order: bool,
}

/// Point-in-time size information for a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferStats {
    pub len: usize,
    pub capacity: usize,
    pub overflow_count: u64,
}

impl MetricBuffer {
    pub fn new(capacity: usize) -> MonitoringResult<Self> {
        if capacity == 0 {
            return Err(MonitoringError::config("metric buffer capacity must be greater than zero"));
        }

        Ok(Self {
            capacity,
            points: VecDeque::with_capacity(capacity.min(4096)),
            overflow_count: 0,
            out_of_order: false,
        })
    }

    pub fn append(&mut self, point: MetricPoint) {
        if let Some(tail) = self.points.back() {
            if point.timestamp() < tail.timestamp() {
                self.out_of_order = true;
            }
        }

        if self.points.len() == self.capacity {
            self.points.pop_front();
            self.overflow_count += 1;
        }
        self.points.push_back(point);
    }

    /// Returns a copy of the matching points in buffer order.
    pub fn query(&self, name: Option<&str>, since: Option<DateTime<Utc>>) -> Vec<MetricPoint> {
        self.points
            .iter()
            .filter(|p| name.is_none_or(|n| p.name() == n))
            .filter(|p| since.is_none_or(|s| p.timestamp() >= s))
            .cloned()
            .collect()
    }

    /// Removes points older than `cutoff` and returns how many were dropped.
    ///
    /// Points are expected in roughly ascending timestamp order, so the scan
    /// stops at the first point that is still fresh. Once an out-of-order
    /// append has been observed the whole buffer is scanned instead.
    pub fn prune(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.points.len();

        if self.out_of_order {
            self.points.retain(|p| p.timestamp() >= cutoff);
            self.out_of_order = !self
                .points
                .iter()
                .zip(self.points.iter().skip(1))
                .all(|(a, b)| a.timestamp() <= b.timestamp());
        } else {
            while self.points.front().is_some_and(|p| p.timestamp() < cutoff) {
                self.points.pop_front();
            }
        }

        before - self.points.len()
    }

    pub fn latest(&self) -> Option<&MetricPoint> {
        self.points.back()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn overflow_count(&self) -> u64 {
        self.overflow_count
    }

    pub fn stats(&self) -> BufferStats {
        BufferStats {
            len: self.points.len(),
            capacity: self.capacity,
            overflow_count: self.overflow_count,
        }
    }
}
