use super::{Assignment, BuiltModel};
use crate::core::{DecodeError, ScheduledTask, Solution};

/// Reads the schedule out of a solver assignment.
///
/// An assignment without schedule (infeasible or unknown) decodes to a solution
/// that only carries its status. Tasks are listed in task index order.
///
/// # Errors
/// - If a task has no start, is not present on exactly one machine or misses its due date.
///   None of these can happen for an assignment produced from the same model.
/// - If a task would end past `u64::MAX`.
pub fn decode(built: &BuiltModel<'_>, assignment: &Assignment) -> Result<Solution, DecodeError> {
    let status = assignment.status();
    if !status.is_solved() {
        return Ok(Solution::unsolved(status, built.objective));
    }

    let machines = &built.instance.machines;
    let tasks = built
        .instance
        .tasks
        .iter()
        .zip(&built.tasks)
        .map(|((id, info), vars)| {
            let start = assignment
                .value(vars.start)
                .ok_or_else(|| DecodeError::MissingStart(id.clone()))?;
            let end = start
                .checked_add(info.duration)
                .ok_or_else(|| DecodeError::EndOverflow(id.clone()))?;

            let mut present = vars
                .presence
                .iter()
                .enumerate()
                .filter(|&(_, literal)| assignment.literal(*literal));
            let machine = match (present.next(), present.count()) {
                (Some((machine, _)), 0) => machine,
                (first, rest) => {
                    return Err(DecodeError::Presence {
                        task: id.clone(),
                        count: usize::from(first.is_some()) + rest,
                    })
                }
            };

            let slack = info.due_date.checked_sub(end).ok_or_else(|| DecodeError::DeadlineMissed {
                task: id.clone(),
                end,
                due_date: info.due_date,
            })?;

            Ok(ScheduledTask {
                task_id: id.clone(),
                start,
                end,
                machine_id: machines[machine].clone(),
                slack,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Solution::solved(status, built.objective, tasks))
}
