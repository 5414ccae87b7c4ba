pub mod check;
pub mod score;

pub use check::HealthCheckResult;
pub use score::{HealthScore, HealthStatus, MetricsBySection, PerformanceSection, QualitySection, SectionScores, SystemSection};
