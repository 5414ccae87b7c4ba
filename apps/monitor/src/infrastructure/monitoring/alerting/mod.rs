//! Rule evaluation and alert bookkeeping.

pub mod evaluator;
pub mod manager;

pub use evaluator::AlertEvaluator;
pub use manager::AlertManager;
