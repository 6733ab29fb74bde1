use crate::core::{
    validate, Instance, Precedence, ScheduleError, Scheduler, Solution, ValidationError,
};
use crate::cp::SolverConfig;
use crate::predict::{Predictor, SumOfCompletions};
use std::sync::Arc;
use tracing::debug;

/// Largest task set ordered by enumerating permutations. 8! = 40320 predictions.
pub const MAX_ORDERING_TASKS: usize = 8;

/// Result of the hybrid scheduler.
#[derive(Clone, Debug, PartialEq)]
pub struct HybridOutcome {
    /// Task ids in the chosen order.
    pub order: Vec<String>,
    /// Predicted cost of the chosen order.
    pub predicted: f64,
    /// Number of orders scored by the predictor.
    pub permutations_evaluated: usize,
    /// Exact schedule with the chosen order fixed as a chain.
    pub solution: Solution,
}

/// Rearranges the slice into the next lexicographic permutation.
/// Returns false and leaves the slice sorted when it was the last one.
fn next_permutation(items: &mut [usize]) -> bool {
    let Some(pivot) = items.windows(2).rposition(|pair| pair[0] < pair[1]) else {
        items.reverse();
        return false;
    };
    let Some(successor) = items.iter().rposition(|&item| item > items[pivot]) else {
        unreachable!("Pivot always has a larger item after it");
    };
    items.swap(pivot, successor);
    items[pivot + 1..].reverse();
    true
}

/// Orders the tasks with a predictor, then solves the instance exactly with that order fixed.
///
/// Every permutation of the tasks that respects the precedences of the instance is scored,
/// the lowest prediction wins (the first one on ties) and becomes a chain of precedences.
/// The reported schedule is optimal for the chosen order, not necessarily overall.
///
/// # Errors
/// - If the instance is invalid or has more than [`MAX_ORDERING_TASKS`] tasks.
/// - If the predictor does not accept the number of tasks.
/// - If the exact solve of the chain fails.
pub fn hybrid_schedule(
    instance: &Instance,
    predictor: &dyn Predictor,
    config: &SolverConfig,
) -> Result<HybridOutcome, ScheduleError> {
    let graph = validate(instance)?;
    let tasks = instance.tasks.len();

    if tasks > MAX_ORDERING_TASKS {
        return Err(ValidationError::TooManyTasksToOrder {
            tasks,
            limit: MAX_ORDERING_TASKS,
        }
        .into());
    }
    if !predictor.accepts(tasks) {
        return Err(ValidationError::PredictorShape {
            predictor: predictor.name().into(),
            tasks,
        }
        .into());
    }

    let durations: Vec<_> = instance.tasks.values().map(|task| task.duration).collect();
    let mut permutation: Vec<usize> = (0..tasks).collect();
    let mut sequence = vec![0; tasks];
    let mut best: Option<(f64, Vec<usize>)> = None;
    let mut evaluated = 0;

    loop {
        if graph.is_linear_extension(&permutation) {
            for (slot, &task) in sequence.iter_mut().zip(&permutation) {
                *slot = durations[task];
            }
            let predicted = predictor.predict(&sequence);
            evaluated += 1;

            if best.as_ref().map_or(true, |(value, _)| predicted < *value) {
                best = Some((predicted, permutation.clone()));
            }
        }
        if !next_permutation(&mut permutation) {
            break;
        }
    }

    let Some((predicted, order)) = best else {
        unreachable!("A valid precedence graph has a linear extension");
    };

    let ids: Vec<_> = instance.task_ids().collect();
    let order: Vec<String> = order.into_iter().map(|task| ids[task].to_owned()).collect();
    debug!(?order, predicted, evaluated, "ordering selected");

    let chained = order
        .windows(2)
        .fold(instance.clone(), |chained, pair| {
            chained.with_precedence(Precedence::new(pair[0].clone(), pair[1].clone()))
        });
    let solution = super::solve(&chained, config)?;

    Ok(HybridOutcome {
        order,
        predicted,
        permutations_evaluated: evaluated,
        solution,
    })
}

/// Hybrid scheduler: a predictor picks the task order, the exact solver does the rest.
#[derive(Clone)]
pub struct HybridScheduler {
    predictor: Arc<dyn Predictor>,
    config: SolverConfig,
}

impl HybridScheduler {
    #[must_use]
    pub fn new(predictor: Arc<dyn Predictor>, config: SolverConfig) -> Self {
        Self { predictor, config }
    }
}

impl std::fmt::Debug for HybridScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridScheduler")
            .field("predictor", &self.predictor.name())
            .field("config", &self.config)
            .finish()
    }
}

impl Scheduler for HybridScheduler {
    fn schedule(&mut self, instance: &Instance) -> Result<Solution, ScheduleError> {
        hybrid_schedule(instance, self.predictor.as_ref(), &self.config).map(|outcome| outcome.solution)
    }

    fn name(&self) -> &'static str {
        "hybrid"
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SCHEDULERS)]
static INSTANCE: fn(SolverConfig) -> Box<dyn Scheduler> =
    |config| Box::new(HybridScheduler::new(Arc::new(SumOfCompletions), config));
