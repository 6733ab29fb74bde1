use super::problem::SearchProblem;
use std::collections::VecDeque;

/// Start bounds of every job after precedence propagation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) struct Bounds {
    /// Earliest start per job.
    pub earliest: Vec<u64>,
    /// Latest start per job.
    pub latest: Vec<u64>,
    /// Jobs in topological order of the precedence arcs.
    pub order: Vec<usize>,
}

/// Tightens start domains along precedence arcs: heads forward from release dates,
/// tails backward from due dates.
/// Returns `None` when some domain becomes empty or the arcs form a cycle.
/// A head pushed past `u64::MAX` empties its domain.
pub(super) fn propagate(problem: &SearchProblem) -> Option<Bounds> {
    let jobs = &problem.jobs;

    if jobs.iter().any(|job| job.options.is_empty()) {
        return None;
    }

    let order = topological_order(problem)?;

    let mut earliest: Vec<_> = jobs.iter().map(|job| job.domain.min).collect();
    for &job in &order {
        for &(next, delay) in &problem.successors[job] {
            earliest[next] = earliest[next].max(earliest[job].checked_add(delay)?);
        }
    }

    let mut latest: Vec<_> = jobs.iter().map(|job| job.domain.max).collect();
    for &job in order.iter().rev() {
        for &(previous, delay) in &problem.predecessors[job] {
            let bound = latest[job].checked_sub(delay)?;
            latest[previous] = latest[previous].min(bound);
        }
    }

    if earliest.iter().zip(&latest).any(|(e, l)| e > l) {
        return None;
    }

    Some(Bounds {
        earliest,
        latest,
        order,
    })
}

fn topological_order(problem: &SearchProblem) -> Option<Vec<usize>> {
    let mut in_degree: Vec<_> = problem.predecessors.iter().map(Vec::len).collect();
    let mut queue: VecDeque<_> = (0..in_degree.len()).filter(|&j| in_degree[j] == 0).collect();
    let mut order = Vec::with_capacity(in_degree.len());

    while let Some(job) = queue.pop_front() {
        order.push(job);
        for &(next, _) in &problem.successors[job] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    (order.len() == in_degree.len()).then_some(order)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cp::{Goal, Model, StartDomain};

    fn chain(first: StartDomain, second: StartDomain) -> anyhow::Result<SearchProblem> {
        let mut model = Model::new("chain");
        let x1 = model.new_int_var("x1", first);
        let x2 = model.new_int_var("x2", second);
        let p1 = model.new_bool_var("p1");
        let p2 = model.new_bool_var("p2");
        let i1 = model.new_optional_interval("i1", x1, 20, p1);
        let i2 = model.new_optional_interval("i2", x2, 20, p2);
        model.add_exactly_one(vec![p1]);
        model.add_exactly_one(vec![p2]);
        model.add_no_overlap(vec![i1, i2]);
        model.add_precedence(x1, x2, 20);
        model.minimize(Goal::MinimizeSum(vec![x1, x2]));
        Ok(SearchProblem::from_model(&model)?)
    }

    #[test]
    fn bounds_follow_the_chain() -> anyhow::Result<()> {
        let problem = chain(StartDomain { min: 0, max: 80 }, StartDomain { min: 0, max: 80 })?;
        let bounds = propagate(&problem).ok_or_else(|| anyhow::anyhow!("Chain is feasible"))?;

        assert_eq!(bounds.earliest, [0, 20]);
        assert_eq!(bounds.latest, [60, 80]);
        assert_eq!(bounds.order, [0, 1]);
        Ok(())
    }

    #[test]
    fn head_past_the_time_range_is_infeasible() -> anyhow::Result<()> {
        let mut model = Model::new("far");
        let x1 = model.new_int_var("x1", StartDomain { min: 5, max: 5 });
        let p1 = model.new_bool_var("p1");
        let i1 = model.new_optional_interval("i1", x1, 1, p1);
        let x2 = model.new_int_var("x2", StartDomain { min: 0, max: 10 });
        let p2 = model.new_bool_var("p2");
        let i2 = model.new_optional_interval("i2", x2, 1, p2);
        model.add_exactly_one(vec![p1]);
        model.add_exactly_one(vec![p2]);
        model.add_no_overlap(vec![i1, i2]);
        model.add_precedence(x1, x2, u64::MAX);
        assert_eq!(propagate(&SearchProblem::from_model(&model)?), None);
        Ok(())
    }

    #[test]
    fn conflicting_windows_are_detected() -> anyhow::Result<()> {
        let problem = chain(StartDomain { min: 0, max: 10 }, StartDomain { min: 0, max: 15 })?;
        assert_eq!(propagate(&problem), None);
        Ok(())
    }
}
