pub mod entity;
pub mod rule;

pub use entity::{Alert, AlertSummary};
pub use rule::{AlertRule, AlertSeverity, Comparison, EQ_EPSILON};
