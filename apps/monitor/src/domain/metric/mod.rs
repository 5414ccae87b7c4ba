pub mod buffer;
pub mod point;
pub mod summary;

pub use buffer::{BufferStats, MetricBuffer};
pub use point::{Labels, MetricPoint, window_start};
pub use summary::MetricSummary;
