use super::problem::{GoalKind, SearchProblem};
use super::propagate::Bounds;
use crate::cast_u64;
use std::time::Instant;

/// Start time and resource chosen for a job.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) struct Placement {
    pub start: u64,
    pub resource: usize,
}

/// Search limits. A node is counted each time the search enters a partial schedule.
#[derive(Clone, Copy, Debug)]
pub(super) struct Limits {
    pub nodes: Option<u64>,
    pub deadline: Option<Instant>,
}

/// Result of a depth first search. Objective values are kept wide, so a sum of starts
/// never wraps.
#[derive(Clone, Debug)]
pub(super) struct Outcome {
    pub best: Option<(u128, Vec<Placement>)>,
    pub exhausted: bool,
    pub nodes: u64,
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    job: usize,
    resource: usize,
    start: u64,
}

/// Branch and bound over semi-active schedules.
///
/// Jobs are appended one at a time in non-decreasing start order, each at the earliest
/// start allowed by its resource, its predecessors and its propagated head. Every
/// schedule for a regular objective can be left-shifted into one built this way, so the
/// enumeration is complete.
pub(super) struct Search<'a> {
    problem: &'a SearchProblem,
    bounds: &'a Bounds,
    limits: Limits,
    nodes: u64,
    exhausted: bool,
    placed: Vec<Option<Placement>>,
    free: Vec<u64>,
    waiting: Vec<usize>,
    depth: usize,
    last_start: u64,
    sum: u128,
    max_end: u64,
    lower: Vec<u64>,
    best: Option<(u128, Vec<Placement>)>,
}

impl<'a> Search<'a> {
    pub fn new(problem: &'a SearchProblem, bounds: &'a Bounds, limits: Limits) -> Self {
        Self {
            problem,
            bounds,
            limits,
            nodes: 0,
            exhausted: false,
            placed: vec![None; problem.jobs.len()],
            free: vec![0; problem.resources],
            waiting: problem.predecessors.iter().map(Vec::len).collect(),
            depth: 0,
            last_start: 0,
            sum: 0,
            max_end: 0,
            lower: vec![0; problem.jobs.len()],
            best: None,
        }
    }

    pub fn run(mut self) -> Outcome {
        self.dfs();
        Outcome {
            best: self.best,
            exhausted: self.exhausted,
            nodes: self.nodes,
        }
    }

    fn dfs(&mut self) {
        self.nodes += 1;
        if self.out_of_budget() {
            self.exhausted = true;
            return;
        }

        if self.depth == self.problem.jobs.len() {
            self.record();
            return;
        }

        let Some(bound) = self.lower_bound() else {
            return;
        };
        if self.best.as_ref().is_some_and(|(value, _)| bound >= *value) {
            return;
        }

        for candidate in self.candidates() {
            let saved = self.place(candidate);
            self.dfs();
            self.unplace(candidate, saved);

            if self.exhausted || (self.problem.goal == GoalKind::Satisfy && self.best.is_some()) {
                return;
            }
        }
    }

    fn out_of_budget(&self) -> bool {
        if self.limits.nodes.is_some_and(|limit| self.nodes > limit) {
            return true;
        }
        self.nodes % 256 == 0 && self.limits.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    fn value(&self) -> u128 {
        match self.problem.goal {
            GoalKind::Satisfy => 0,
            GoalKind::SumOfStarts => self.sum,
            GoalKind::MaxEnd => u128::from(self.max_end),
        }
    }

    fn record(&mut self) {
        let value = self.value();
        if self.best.as_ref().map_or(true, |(best, _)| value < *best) {
            let placements = self.placed.iter().flatten().copied().collect();
            self.best = Some((value, placements));
        }
    }

    /// Bounds the objective of every completion of the partial schedule.
    /// Returns `None` when some unplaced job can no longer meet its latest start.
    fn lower_bound(&mut self) -> Option<u128> {
        let jobs = &self.problem.jobs;
        let min_free = self.free.iter().copied().min().unwrap_or_default();
        let floor = self.last_start.max(min_free);

        let mut sum = self.sum;
        let mut max_end = self.max_end;
        let mut work = 0u128;

        for &job in &self.bounds.order {
            if let Some(placement) = self.placed[job] {
                self.lower[job] = placement.start;
                continue;
            }

            let mut start = self.bounds.earliest[job].max(floor);
            for &(previous, delay) in &self.problem.predecessors[job] {
                start = start.max(self.lower[previous].checked_add(delay)?);
            }
            if start > self.bounds.latest[job] {
                return None;
            }

            self.lower[job] = start;
            sum += u128::from(start);
            max_end = max_end.max(start + jobs[job].size);
            work += u128::from(jobs[job].size);
        }

        Some(match self.problem.goal {
            GoalKind::Satisfy => 0,
            GoalKind::SumOfStarts => sum,
            GoalKind::MaxEnd => {
                let load = self.free.iter().copied().map(u128::from).sum::<u128>() + work;
                let resources = u128::from(cast_u64(self.problem.resources));
                u128::from(max_end).max(load.div_ceil(resources))
            }
        })
    }

    /// Earliest start allowed by the placed predecessors. `None` past `u64::MAX`.
    fn ready_time(&self, job: usize) -> Option<u64> {
        self.problem.predecessors[job]
            .iter()
            .filter_map(|&(previous, delay)| self.placed[previous].map(|p| p.start.checked_add(delay)))
            .try_fold(self.bounds.earliest[job], |ready, at| Some(ready.max(at?)))
    }

    /// Lists the placements to branch on, most promising first.
    fn candidates(&self) -> Vec<Candidate> {
        let problem = self.problem;
        let mut candidates = Vec::new();

        for (job, data) in problem.jobs.iter().enumerate() {
            if self.placed[job].is_some() || self.waiting[job] > 0 {
                continue;
            }

            let Some(ready) = self.ready_time(job) else {
                continue;
            };
            let mut options: Vec<_> = data
                .options
                .iter()
                .map(|&(resource, _)| (ready.max(self.free[resource]), self.free[resource], resource))
                .filter(|&(start, _, _)| start >= self.last_start && start <= self.bounds.latest[job])
                .collect();

            if problem.symmetric {
                // Resources with the same free time are interchangeable.
                options.sort_unstable_by_key(|&(_, free, resource)| (free, resource));
                options.dedup_by_key(|&mut (_, free, _)| free);
            }

            candidates.extend(options.into_iter().map(|(start, _, resource)| Candidate {
                job,
                resource,
                start,
            }));
        }

        candidates.sort_unstable_by_key(|c| {
            let size = problem.jobs[c.job].size;
            (c.start, c.start + size, self.bounds.latest[c.job], c.job, c.resource)
        });
        candidates
    }

    fn place(&mut self, candidate: Candidate) -> (u64, u64, u64) {
        let size = self.problem.jobs[candidate.job].size;
        let saved = (self.free[candidate.resource], self.last_start, self.max_end);

        self.placed[candidate.job] = Some(Placement {
            start: candidate.start,
            resource: candidate.resource,
        });
        self.free[candidate.resource] = candidate.start + size;
        self.last_start = candidate.start;
        self.sum += u128::from(candidate.start);
        self.max_end = self.max_end.max(candidate.start + size);
        self.depth += 1;

        for &(next, _) in &self.problem.successors[candidate.job] {
            self.waiting[next] -= 1;
        }

        saved
    }

    fn unplace(&mut self, candidate: Candidate, (free, last_start, max_end): (u64, u64, u64)) {
        for &(next, _) in &self.problem.successors[candidate.job] {
            self.waiting[next] += 1;
        }

        self.depth -= 1;
        self.max_end = max_end;
        self.sum -= u128::from(candidate.start);
        self.last_start = last_start;
        self.free[candidate.resource] = free;
        self.placed[candidate.job] = None;
    }
}
