use crate::core::Scheduler;
use crate::cp::SolverConfig;

mod exact;
mod hybrid;

pub use exact::{solve, Exact};
pub use hybrid::{hybrid_schedule, HybridOutcome, HybridScheduler, MAX_ORDERING_TASKS};

/// Every scheduler of the crate, created from a solver configuration.
#[allow(unsafe_code)]
#[linkme::distributed_slice]
pub static SCHEDULERS: [fn(SolverConfig) -> Box<dyn Scheduler>];
