use super::{BoolVar, Goal, IntVar, IntervalVar, Model, StartDomain};
use crate::core::{Instance, Objective, PrecedenceGraph};

/// Variables created for one task.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TaskVars {
    pub start: IntVar,
    /// One presence literal per machine, in machine order.
    pub presence: Vec<BoolVar>,
    /// One optional interval per machine, in machine order.
    pub intervals: Vec<IntervalVar>,
}

/// A model together with the mapping from tasks to their variables.
#[derive(Clone, Debug)]
pub struct BuiltModel<'a> {
    pub instance: &'a Instance,
    pub objective: Objective,
    pub model: Model,
    pub tasks: Vec<TaskVars>,
}

/// Builds the constraint model of an instance.
///
/// Creates:
/// - a start variable per task restricted to its start domain,
/// - a presence literal and an optional interval per task and machine,
/// - an exactly-one constraint over the presence literals of each task,
/// - a no-overlap constraint per machine,
/// - a precedence constraint per edge of the precedence graph,
/// - the selected objective.
#[derive(Clone, Debug)]
pub struct ModelBuilder<'a> {
    instance: &'a Instance,
    domains: &'a [StartDomain],
    precedences: &'a PrecedenceGraph,
    objective: Objective,
}

impl<'a> ModelBuilder<'a> {
    /// Creates a builder. Domains and graph vertices are expected in task index order,
    /// as returned by [`start_domains`](super::start_domains) and
    /// [`validate`](crate::core::validate).
    #[must_use]
    pub fn new(instance: &'a Instance, domains: &'a [StartDomain], precedences: &'a PrecedenceGraph) -> Self {
        Self {
            instance,
            domains,
            precedences,
            objective: Objective::default(),
        }
    }

    /// Selects the objective.
    #[must_use]
    pub const fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    /// Builds the model.
    #[must_use]
    pub fn build(self) -> BuiltModel<'a> {
        debug_assert_eq!(self.domains.len(), self.instance.tasks.len());
        debug_assert_eq!(self.precedences.len(), self.instance.tasks.len());

        let mut model = Model::new("parallel_machines");
        let machines = &self.instance.machines;

        let tasks: Vec<_> = self
            .instance
            .tasks
            .iter()
            .zip(self.domains)
            .map(|((id, task), &domain)| {
                let start = model.new_int_var(format!("start_{id}"), domain);
                let presence: Vec<_> = machines
                    .iter()
                    .map(|machine| model.new_bool_var(format!("{id}_on_{machine}")))
                    .collect();
                let intervals = machines
                    .iter()
                    .zip(&presence)
                    .map(|(machine, &literal)| {
                        let name = format!("interval_{id}_on_{machine}");
                        model.new_optional_interval(name, start, task.duration, literal)
                    })
                    .collect();
                TaskVars {
                    start,
                    presence,
                    intervals,
                }
            })
            .collect();

        for vars in &tasks {
            model.add_exactly_one(vars.presence.clone());
        }

        for machine in 0..machines.len() {
            model.add_no_overlap(tasks.iter().map(|vars| vars.intervals[machine]).collect());
        }

        let durations: Vec<_> = self.instance.tasks.values().map(|task| task.duration).collect();
        for (before, after) in self.precedences.edges() {
            model.add_precedence(tasks[before].start, tasks[after].start, durations[before]);
        }

        let goal = match self.objective {
            Objective::SumOfStarts => Goal::MinimizeSum(tasks.iter().map(|vars| vars.start).collect()),
            Objective::Makespan => Goal::MinimizeMaxEnd(
                tasks
                    .iter()
                    .zip(self.instance.tasks.values())
                    .map(|(vars, task)| (vars.start, task.duration))
                    .collect(),
            ),
        };
        model.minimize(goal);

        BuiltModel {
            instance: self.instance,
            objective: self.objective,
            model,
            tasks,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::{validate, TaskInfo};
    use crate::cp::{start_domains, Constraint};

    fn instance() -> Instance {
        Instance::new(["m_1", "m_2"])
            .with_task("a", TaskInfo::new(3, 0, 20).with_successor("b"))
            .with_task("b", TaskInfo::new(5, 2, 20))
            .with_task("c", TaskInfo::new(2, 0, 20))
    }

    #[test]
    fn model_has_a_variable_set_per_task_and_machine() -> anyhow::Result<()> {
        let instance = instance();
        let graph = validate(&instance)?;
        let domains = start_domains(&instance)?;
        let built = ModelBuilder::new(&instance, &domains, &graph).build();
        let model = &built.model;

        assert_eq!(model.int_var_count(), 3);
        assert_eq!(model.bool_var_count(), 6);
        assert_eq!(model.interval_count(), 6);
        assert_eq!(model.domain(built.tasks[1].start), StartDomain { min: 2, max: 15 });
        assert_eq!(model.int_var_name(built.tasks[0].start), "start_a");

        let count = |f: fn(&Constraint) -> bool| model.constraints().iter().filter(|c| f(c)).count();
        assert_eq!(count(|c| matches!(c, Constraint::ExactlyOne(_))), 3);
        assert_eq!(count(|c| matches!(c, Constraint::NoOverlap(v) if v.len() == 3)), 2);
        assert_eq!(count(|c| matches!(c, Constraint::Precedence { delay: 3, .. })), 1);
        assert!(matches!(model.goal(), Goal::MinimizeSum(vars) if vars.len() == 3));
        Ok(())
    }

    #[test]
    fn intervals_share_task_start() -> anyhow::Result<()> {
        let instance = instance();
        let graph = validate(&instance)?;
        let domains = start_domains(&instance)?;
        let built = ModelBuilder::new(&instance, &domains, &graph)
            .with_objective(Objective::Makespan)
            .build();

        for vars in &built.tasks {
            for (&interval, &presence) in vars.intervals.iter().zip(&vars.presence) {
                let interval = built.model.interval(interval);
                assert_eq!(interval.start, vars.start);
                assert_eq!(interval.presence, presence);
            }
        }
        assert!(matches!(built.model.goal(), Goal::MinimizeMaxEnd(ends) if ends[1].1 == 5));
        Ok(())
    }

    #[test]
    fn every_successor_becomes_a_precedence() -> anyhow::Result<()> {
        let instance = instance()
            .with_task("c", TaskInfo::new(2, 0, 20).with_successor("a"))
            .with_precedence(crate::core::Precedence::new("c", "b"));
        let graph = validate(&instance)?;
        let domains = start_domains(&instance)?;
        let built = ModelBuilder::new(&instance, &domains, &graph).build();

        let mut precedences: Vec<_> = built
            .model
            .constraints()
            .iter()
            .filter_map(|constraint| match constraint {
                Constraint::Precedence { before, after, delay } => Some((*before, *after, *delay)),
                _ => None,
            })
            .collect();
        precedences.sort_unstable_by_key(|&(before, after, _)| (before.index(), after.index()));

        let [a, b, c] = [0, 1, 2].map(|task| built.tasks[task].start);
        assert_eq!(precedences, [(a, b, 3), (c, a, 2), (c, b, 2)]);
        Ok(())
    }
}
