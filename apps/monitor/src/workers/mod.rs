pub mod alert_evaluation;
pub mod collection;
pub mod periodic;

pub use alert_evaluation::AlertEvaluationWorker;
pub use collection::CollectionSource;
pub use periodic::LoopSet;
