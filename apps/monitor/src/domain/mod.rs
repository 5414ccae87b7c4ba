pub mod alert;
pub mod errors;
pub mod health;
pub mod metric;

pub use errors::{MonitoringError, MonitoringResult};
