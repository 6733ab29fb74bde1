#![deny(clippy::all, clippy::cargo, clippy::expect_used, clippy::unwrap_used)]
#![deny(clippy::pedantic, clippy::nursery, unsafe_code)]
#![warn(clippy::unimplemented, clippy::redundant_type_annotations)]

//! Scheduling of tasks with release dates, due dates and successors on identical
//! parallel machines.
//!
//! An [`core::Instance`] is turned into a constraint model and solved exactly by
//! [`algo::solve`]. The [`algo::hybrid_schedule`] layer first fixes a task order picked
//! by a [`predict::Predictor`] and then solves the chained instance exactly.

use anyhow::Result;
use std::io::BufRead;

pub mod algo;
pub mod core;
pub mod cp;
pub mod data;
pub mod predict;

/// Runs the given scheduler on the instance read from reader and writes the solution to stdout.
///
/// # Errors
/// - If the instance could not be read from the reader.
/// - If the scheduler rejects the instance.
/// - If the solution could not be written to stdout.
///
/// # Panics
///  - If the schedule is invalid in debug mode.
pub fn run_reader(scheduler: &mut dyn core::Scheduler, reader: &mut impl BufRead) -> Result<()> {
    let instance: core::Instance = data::deserialize(reader)?;
    let solution = scheduler.schedule(&instance)?;

    debug_assert!(solution.verify(&instance), "Schedule is invalid: {solution:?}");

    println!("{}", data::to_string(&solution)?);

    Ok(())
}

#[cfg(not(target_pointer_width = "64"))]
compile_error!("Must be 64-bit system!");

/// Casts the given value to `u64`.
/// It should never fail on 64-bit systems.
///
/// # Panics
/// - If the value cannot be cast to `u64`.
#[must_use]
pub fn cast_u64(value: usize) -> u64 {
    u64::try_from(value).unwrap_or_else(|_| unreachable!("Must be 64-bit system!"))
}

/// Converts the given value to `f64`. Values above 2^53 lose precision.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub const fn cast_f64(value: u64) -> f64 {
    value as f64
}
