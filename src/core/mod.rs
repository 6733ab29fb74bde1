mod error;
mod graph;
mod problem;
mod solution;
mod validation;

pub use error::*;
pub use graph::*;
pub use problem::*;
pub use solution::*;
pub use validation::*;

/// Schedules the tasks of an instance.
pub trait Scheduler {
    /// Schedules the tasks of the given instance.
    ///
    /// # Errors
    /// - If the instance is structurally invalid or a task window is empty.
    ///   A proven infeasible instance is not an error, it yields an unsolved [`Solution`].
    fn schedule(&mut self, instance: &Instance) -> Result<Solution, ScheduleError>;

    /// Returns the name of the scheduler.
    fn name(&self) -> &'static str;
}
