use super::{BoolVar, Constraint, Goal, IntVar, Model, StartDomain};
use crate::core::ModelError;
use ahash::{HashMap, HashMapExt};

/// A start variable with its intervals, seen as one job to place.
#[derive(Clone, Debug)]
pub(super) struct Job {
    pub start: IntVar,
    pub size: u64,
    pub domain: StartDomain,
    /// Resources the job may run on, with the literal that selects each.
    pub options: Vec<(usize, BoolVar)>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum GoalKind {
    Satisfy,
    SumOfStarts,
    MaxEnd,
}

/// The model rearranged for search: jobs, resources, precedence arcs and goal.
#[derive(Clone, Debug)]
pub(super) struct SearchProblem {
    pub jobs: Vec<Job>,
    pub resources: usize,
    /// Incoming arcs `(job, delay)` per job.
    pub predecessors: Vec<Vec<(usize, u64)>>,
    /// Outgoing arcs `(job, delay)` per job.
    pub successors: Vec<Vec<(usize, u64)>>,
    pub goal: GoalKind,
    /// Every job can run on every resource, so resources with equal state are interchangeable.
    pub symmetric: bool,
    pub int_vars: usize,
    pub bool_vars: usize,
}

impl SearchProblem {
    /// Extracts jobs and resources from the model.
    ///
    /// Every interval must belong to exactly one no-overlap constraint (its resource),
    /// intervals sharing a start must share a size, and the presence literals of a job
    /// must form an exactly-one constraint.
    pub fn from_model(model: &Model) -> Result<Self, ModelError> {
        let mut jobs: Vec<Job> = Vec::new();
        let mut job_of: HashMap<IntVar, usize> = HashMap::new();

        let mut resource_of = vec![None; model.interval_count()];
        let mut resources = 0;
        for constraint in model.constraints() {
            if let Constraint::NoOverlap(intervals) = constraint {
                for interval in intervals {
                    if resource_of[interval.index()].replace(resources).is_some() {
                        let name = &model.interval(*interval).name;
                        return Err(ModelError::SharedInterval(name.clone()));
                    }
                }
                resources += 1;
            }
        }

        for (var, interval) in model.intervals() {
            let resource = resource_of[var.index()]
                .ok_or_else(|| ModelError::UnboundInterval(interval.name.clone()))?;

            let job = *job_of.entry(interval.start).or_insert_with(|| {
                jobs.push(Job {
                    start: interval.start,
                    size: interval.size,
                    domain: model.domain(interval.start),
                    options: Vec::new(),
                });
                jobs.len() - 1
            });

            if jobs[job].size != interval.size {
                return Err(ModelError::MixedSizes(model.int_var_name(interval.start).into()));
            }
            jobs[job].options.push((resource, interval.presence));
        }

        for job in &mut jobs {
            // Intervals must end within the time range.
            job.domain.max = job.domain.max.min(u64::MAX - job.size);
        }

        let groups: Vec<_> = model
            .constraints()
            .iter()
            .filter_map(|constraint| match constraint {
                Constraint::ExactlyOne(literals) => {
                    let mut literals = literals.clone();
                    literals.sort_unstable();
                    Some(literals)
                }
                _ => None,
            })
            .collect();

        for job in &jobs {
            let mut literals: Vec<_> = job.options.iter().map(|&(_, literal)| literal).collect();
            literals.sort_unstable();
            if !groups.contains(&literals) {
                return Err(ModelError::MissingExactlyOne(model.int_var_name(job.start).into()));
            }
        }

        let lookup = |var: &IntVar| {
            job_of
                .get(var)
                .copied()
                .ok_or_else(|| ModelError::UnknownStart(model.int_var_name(*var).into()))
        };

        let mut predecessors = vec![Vec::new(); jobs.len()];
        let mut successors = vec![Vec::new(); jobs.len()];
        for constraint in model.constraints() {
            if let Constraint::Precedence {
                before,
                after,
                delay,
            } = constraint
            {
                let (before, after) = (lookup(before)?, lookup(after)?);
                predecessors[after].push((before, *delay));
                successors[before].push((after, *delay));
            }
        }

        let goal = match model.goal() {
            Goal::Satisfy => GoalKind::Satisfy,
            Goal::MinimizeSum(vars) => {
                covers_all(&jobs, vars.iter().map(lookup))?;
                GoalKind::SumOfStarts
            }
            Goal::MinimizeMaxEnd(ends) => {
                for &(var, offset) in ends {
                    if jobs[lookup(&var)?].size != offset {
                        return Err(ModelError::PartialObjective);
                    }
                }
                covers_all(&jobs, ends.iter().map(|(var, _)| lookup(var)))?;
                GoalKind::MaxEnd
            }
        };

        let symmetric = jobs.iter().all(|job| job.options.len() == resources);

        Ok(Self {
            jobs,
            resources,
            predecessors,
            successors,
            goal,
            symmetric,
            int_vars: model.int_var_count(),
            bool_vars: model.bool_var_count(),
        })
    }
}

fn covers_all(
    jobs: &[Job],
    indices: impl Iterator<Item = Result<usize, ModelError>>,
) -> Result<(), ModelError> {
    let mut covered = vec![false; jobs.len()];
    for index in indices {
        covered[index?] = true;
    }
    if covered.into_iter().all(|c| c) {
        Ok(())
    } else {
        Err(ModelError::PartialObjective)
    }
}
