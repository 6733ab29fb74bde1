//! Constraint model of an instance and the exact solver working on it.
//!
//! The pipeline is: [`start_domains`] computes the start window of every task,
//! [`ModelBuilder`] turns the instance into a [`Model`], [`ExactSolver`] searches
//! for an [`Assignment`] and [`decode`] reads the schedule back.

mod builder;
mod decode;
mod domain;
mod model;
mod problem;
mod propagate;
mod search;
mod solver;

pub use builder::{BuiltModel, ModelBuilder, TaskVars};
pub use decode::decode;
pub use domain::{start_domain, start_domains, StartDomain};
pub use model::{BoolVar, Constraint, Goal, IntVar, IntervalVar, Model, OptionalInterval};
pub use solver::{Assignment, ExactSolver, SearchStats, SolverConfig};
