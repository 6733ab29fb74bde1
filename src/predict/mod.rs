//! Cost predictors used to rank task orderings.

mod heuristic;
mod mlp;
mod train;

pub use heuristic::SumOfCompletions;
pub use mlp::Mlp;
pub use train::{train, Trained, TrainingConfig};

/// Predicts the completion cost of running tasks in the given order.
///
/// Predictors are read-only after construction and may be shared by concurrent solves.
pub trait Predictor: Send + Sync {
    /// Returns the predicted cost of the duration sequence. Lower is better.
    fn predict(&self, durations: &[u64]) -> f64;

    /// Returns whether the predictor can score sequences of the given length.
    fn accepts(&self, tasks: usize) -> bool {
        tasks > 0
    }

    /// Returns the name of the predictor.
    fn name(&self) -> &str;
}
