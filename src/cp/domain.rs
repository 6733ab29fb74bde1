use crate::core::{Instance, ScheduleError, TaskInfo, WindowViolation};
use serde::{Deserialize, Serialize};

/// Closed interval of feasible start times.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct StartDomain {
    pub min: u64,
    pub max: u64,
}

/// Computes the feasible start interval `[release_date, due_date - duration]` of a task.
///
/// # Errors
/// - If the window is shorter than the duration.
pub fn start_domain(id: &str, task: &TaskInfo) -> Result<StartDomain, WindowViolation> {
    task.due_date
        .checked_sub(task.duration)
        .filter(|&max| max >= task.release_date)
        .map(|max| StartDomain {
            min: task.release_date,
            max,
        })
        .ok_or_else(|| WindowViolation {
            task: id.to_owned(),
            duration: task.duration,
            release_date: task.release_date,
            due_date: task.due_date,
        })
}

/// Computes the start domain of every task, in task index order.
///
/// # Errors
/// - If any task has an empty domain. Every offending task is reported.
pub fn start_domains(instance: &Instance) -> Result<Vec<StartDomain>, ScheduleError> {
    let mut domains = Vec::with_capacity(instance.tasks.len());
    let mut violations = Vec::new();

    for (id, task) in &instance.tasks {
        match start_domain(id, task) {
            Ok(domain) => domains.push(domain),
            Err(violation) => violations.push(violation),
        }
    }

    if violations.is_empty() {
        Ok(domains)
    } else {
        Err(ScheduleError::InfeasibleWindow(violations))
    }
}
