use super::Instance;
use ahash::{HashMap, HashMapExt};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Terminal outcome of a solve call.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Minimality is proven.
    Optimal,
    /// A valid assignment was found, but the budget ran out before proving minimality.
    Feasible,
    /// No valid assignment exists.
    Infeasible,
    /// The budget ran out before finding an assignment or proving there is none.
    Unknown,
}

impl Status {
    /// Returns whether the status carries a schedule.
    #[must_use]
    pub const fn is_solved(self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Optimal => "OPTIMAL",
            Self::Feasible => "FEASIBLE",
            Self::Infeasible => "INFEASIBLE",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// The quantity minimized by the exact solver.
///
/// The sum of start times rewards starting every task as early as possible,
/// which is not the same as finishing the last task early. Both are offered.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Objective {
    #[default]
    SumOfStarts,
    Makespan,
}

/// Placement of one task in a solved schedule.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ScheduledTask {
    pub task_id: String,
    pub start: u64,
    pub end: u64,
    pub machine_id: String,
    pub slack: u64,
}

/// Result of one solve call. It's created fresh for every call and never changed afterwards.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Solution {
    pub status: Status,
    pub objective_kind: Objective,
    pub objective: Option<u64>,
    pub makespan: Option<u64>,
    pub tasks: Vec<ScheduledTask>,
}

impl Solution {
    /// Creates a solution without schedule.
    #[must_use]
    pub const fn unsolved(status: Status, objective_kind: Objective) -> Self {
        Self {
            status,
            objective_kind,
            objective: None,
            makespan: None,
            tasks: Vec::new(),
        }
    }

    /// Creates a solved schedule. Objective and makespan are computed from the tasks.
    /// A sum of starts past `u64::MAX` saturates.
    #[must_use]
    pub fn solved(status: Status, objective_kind: Objective, tasks: Vec<ScheduledTask>) -> Self {
        let makespan = tasks.iter().map(|task| task.end).max().unwrap_or_default();
        let objective = match objective_kind {
            Objective::SumOfStarts => tasks.iter().map(|task| task.start).fold(0, u64::saturating_add),
            Objective::Makespan => makespan,
        };

        Self {
            status,
            objective_kind,
            objective: Some(objective),
            makespan: Some(makespan),
            tasks,
        }
    }

    /// Returns whether the solution carries a schedule.
    #[must_use]
    pub const fn is_solved(&self) -> bool {
        self.status.is_solved()
    }

    /// Returns the placement of a task.
    #[must_use]
    pub fn task(&self, id: &str) -> Option<&ScheduledTask> {
        self.tasks.iter().find(|task| task.task_id == id)
    }

    /// Lists every way the schedule breaks the rules of the instance.
    /// An unsolved solution has no violations.
    #[must_use]
    pub fn violations(&self, instance: &Instance) -> Vec<String> {
        let mut violations = Vec::new();

        if !self.is_solved() {
            return violations;
        }

        let mut placed: HashMap<&str, &ScheduledTask> = HashMap::with_capacity(self.tasks.len());
        for task in &self.tasks {
            if placed.insert(task.task_id.as_str(), task).is_some() {
                violations.push(format!("task `{}` is scheduled twice", task.task_id));
            }
        }

        for (id, info) in &instance.tasks {
            let Some(task) = placed.get(id.as_str()) else {
                violations.push(format!("task `{id}` is not scheduled"));
                continue;
            };

            if !instance.machines.contains(&task.machine_id) {
                violations.push(format!("task `{id}` runs on unknown machine `{}`", task.machine_id));
            }
            if task.start.checked_add(info.duration) != Some(task.end) {
                violations.push(format!("task `{id}` does not run for its duration"));
            }
            if task.start < info.release_date {
                violations.push(format!("task `{id}` starts before its release date"));
            }
            if task.end > info.due_date {
                violations.push(format!("task `{id}` ends after its due date"));
            }
            if task.slack != info.due_date.saturating_sub(task.end) {
                violations.push(format!("task `{id}` reports a wrong slack"));
            }

            let successors = info.successor.iter().map(|s| (id.as_str(), s.as_str()));
            let extra = instance.precedences.iter().filter(|p| &p.before == id);
            for (before, after) in successors.chain(extra.map(|p| (p.before.as_str(), p.after.as_str()))) {
                if let Some(next) = placed.get(after) {
                    if task.end > next.start {
                        violations.push(format!("task `{before}` ends after `{after}` starts"));
                    }
                }
            }
        }

        for (i, first) in self.tasks.iter().enumerate() {
            for second in &self.tasks[i + 1..] {
                if first.machine_id == second.machine_id
                    && first.start < second.end
                    && second.start < first.end
                {
                    violations.push(format!(
                        "tasks `{}` and `{}` overlap on `{}`",
                        first.task_id, second.task_id, first.machine_id
                    ));
                }
            }
        }

        if placed.len() != instance.tasks.len() {
            violations.push("schedule contains unknown tasks".into());
        }

        violations
    }

    /// Returns whether the schedule respects every rule of the instance.
    #[must_use]
    pub fn verify(&self, instance: &Instance) -> bool {
        self.violations(instance).is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::TaskInfo;

    fn placed(id: &str, start: u64, end: u64, machine: &str, slack: u64) -> ScheduledTask {
        ScheduledTask {
            task_id: id.into(),
            start,
            end,
            machine_id: machine.into(),
            slack,
        }
    }

    fn instance() -> Instance {
        Instance::new(["m_1", "m_2"])
            .with_task("a", TaskInfo::new(3, 0, 10).with_successor("b"))
            .with_task("b", TaskInfo::new(2, 0, 10))
    }

    #[test]
    fn solved_computes_aggregates() {
        let tasks = vec![placed("a", 0, 3, "m_1", 7), placed("b", 3, 5, "m_2", 5)];

        let sum = Solution::solved(Status::Optimal, Objective::SumOfStarts, tasks.clone());
        assert_eq!(sum.objective, Some(3));
        assert_eq!(sum.makespan, Some(5));

        let makespan = Solution::solved(Status::Feasible, Objective::Makespan, tasks);
        assert_eq!(makespan.objective, Some(5));
    }

    #[test]
    fn valid_schedule_has_no_violations() {
        let tasks = vec![placed("a", 0, 3, "m_1", 7), placed("b", 3, 5, "m_1", 5)];
        let solution = Solution::solved(Status::Optimal, Objective::SumOfStarts, tasks);
        assert!(solution.verify(&instance()), "{:?}", solution.violations(&instance()));
    }

    #[test]
    fn broken_schedule_reports_violations() {
        let tasks = vec![placed("a", 1, 4, "m_1", 6), placed("b", 2, 5, "m_1", 5)];
        let solution = Solution::solved(Status::Optimal, Objective::SumOfStarts, tasks);
        let violations = solution.violations(&instance());

        assert!(violations.iter().any(|v| v.contains("overlap")));
        assert!(violations.iter().any(|v| v.contains("ends after `b` starts")));
        assert!(violations.iter().any(|v| v.contains("duration")));
    }

    #[test]
    fn end_past_the_time_range_is_a_violation() {
        let instance = Instance::new(["m_1"]).with_task("a", TaskInfo::new(3, 0, u64::MAX));
        let tasks = vec![placed("a", u64::MAX - 1, 1, "m_1", u64::MAX - 1)];
        let solution = Solution::solved(Status::Optimal, Objective::SumOfStarts, tasks);

        let violations = solution.violations(&instance);
        assert!(violations.iter().any(|v| v.contains("duration")));
    }

    #[test]
    fn status_uses_upper_case_names() -> anyhow::Result<()> {
        assert_eq!(serde_json::to_string(&Status::Infeasible)?, "\"INFEASIBLE\"");
        assert_eq!(Status::Unknown.to_string(), "UNKNOWN");
        assert!(!Status::Unknown.is_solved());
        Ok(())
    }
}
