use super::problem::SearchProblem;
use super::propagate::propagate;
use super::search::{Limits, Search};
use super::{BoolVar, IntVar, Model};
use crate::core::{ModelError, Objective, Status};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Configuration of the exact solver.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SolverConfig {
    /// The quantity to minimize.
    pub objective: Objective,
    /// Maximum number of search nodes. `None` means no node limit.
    pub node_limit: Option<u64>,
    /// Maximum wall-clock time in milliseconds. `None` means no time limit.
    pub time_limit_ms: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            objective: Objective::SumOfStarts,
            node_limit: Some(50_000_000),
            time_limit_ms: Some(30_000),
        }
    }
}

impl SolverConfig {
    /// Returns the configuration with another objective.
    #[must_use]
    pub const fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    /// Returns the configuration with another node limit.
    #[must_use]
    pub const fn with_node_limit(mut self, node_limit: Option<u64>) -> Self {
        self.node_limit = node_limit;
        self
    }

    /// Returns the configuration with another time limit.
    #[must_use]
    pub const fn with_time_limit(mut self, time_limit_ms: Option<u64>) -> Self {
        self.time_limit_ms = time_limit_ms;
        self
    }
}

/// Search effort spent on one model.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SearchStats {
    pub nodes: u64,
    pub elapsed: Duration,
}

/// Values chosen by the solver for every variable of a model.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Assignment {
    status: Status,
    objective: Option<u64>,
    int_values: Vec<Option<u64>>,
    bool_values: Vec<bool>,
    stats: SearchStats,
}

impl Assignment {
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Returns the objective value of the assignment, if one was found.
    #[must_use]
    pub const fn objective(&self) -> Option<u64> {
        self.objective
    }

    /// Returns the value of an integer variable, if one was committed.
    #[must_use]
    pub fn value(&self, var: IntVar) -> Option<u64> {
        self.int_values.get(var.index()).copied().flatten()
    }

    /// Returns the value of a boolean variable. Uncommitted literals are false.
    #[must_use]
    pub fn literal(&self, var: BoolVar) -> bool {
        self.bool_values.get(var.index()).copied().unwrap_or_default()
    }

    #[must_use]
    pub const fn stats(&self) -> SearchStats {
        self.stats
    }

    fn empty(status: Status, problem: &SearchProblem, stats: SearchStats) -> Self {
        Self {
            status,
            objective: None,
            int_values: vec![None; problem.int_vars],
            bool_values: vec![false; problem.bool_vars],
            stats,
        }
    }
}

/// Exact solver: root propagation followed by depth first branch and bound.
#[derive(Clone, Debug, Default)]
pub struct ExactSolver {
    config: SolverConfig,
}

impl ExactSolver {
    #[must_use]
    pub const fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Searches for an assignment minimizing the model goal within the configured budget.
    ///
    /// # Errors
    /// - If the model does not have the structure of a machine scheduling model.
    /// - If the best objective value does not fit in `u64`.
    pub fn solve(&self, model: &Model) -> Result<Assignment, ModelError> {
        let started = Instant::now();
        let problem = SearchProblem::from_model(model)?;

        let Some(bounds) = propagate(&problem) else {
            debug!(model = model.name(), "propagation emptied a start domain");
            let stats = SearchStats {
                nodes: 0,
                elapsed: started.elapsed(),
            };
            return Ok(Assignment::empty(Status::Infeasible, &problem, stats));
        };

        let limits = Limits {
            nodes: self.config.node_limit,
            deadline: self
                .config
                .time_limit_ms
                .map(|ms| started + Duration::from_millis(ms)),
        };
        let outcome = Search::new(&problem, &bounds, limits).run();

        let stats = SearchStats {
            nodes: outcome.nodes,
            elapsed: started.elapsed(),
        };
        let status = match (&outcome.best, outcome.exhausted) {
            (Some(_), false) => Status::Optimal,
            (Some(_), true) => Status::Feasible,
            (None, false) => Status::Infeasible,
            (None, true) => Status::Unknown,
        };

        if outcome.exhausted {
            warn!(nodes = stats.nodes, %status, "search budget exhausted");
        }
        debug!(
            model = model.name(),
            nodes = stats.nodes,
            elapsed_ms = stats.elapsed.as_millis(),
            %status,
            "search finished"
        );

        let Some((objective, placements)) = outcome.best else {
            return Ok(Assignment::empty(status, &problem, stats));
        };

        let objective = u64::try_from(objective).map_err(|_| ModelError::ObjectiveOverflow(objective))?;
        let mut assignment = Assignment::empty(status, &problem, stats);
        assignment.objective = Some(objective);
        for (job, placement) in problem.jobs.iter().zip(placements) {
            assignment.int_values[job.start.index()] = Some(placement.start);
            for &(resource, literal) in &job.options {
                assignment.bool_values[literal.index()] = resource == placement.resource;
            }
        }

        Ok(assignment)
    }
}
