use crate::core::{validate, Instance, ScheduleError, Scheduler, Solution};
use crate::cp::{decode, start_domains, ExactSolver, ModelBuilder, SolverConfig};
use tracing::info;

/// Solves the instance exactly: validation, start windows, model, search and decoding.
///
/// # Errors
/// - If the instance is structurally invalid.
/// - If some task window cannot hold its duration. Every such task is reported.
pub fn solve(instance: &Instance, config: &SolverConfig) -> Result<Solution, ScheduleError> {
    let graph = validate(instance)?;
    let domains = start_domains(instance)?;

    let built = ModelBuilder::new(instance, &domains, &graph)
        .with_objective(config.objective)
        .build();

    let assignment = ExactSolver::new(*config).solve(&built.model)?;
    let solution = decode(&built, &assignment)?;

    info!(
        tasks = instance.tasks.len(),
        machines = instance.machines.len(),
        status = %solution.status,
        objective = solution.objective,
        makespan = solution.makespan,
        nodes = assignment.stats().nodes,
        "solved"
    );

    Ok(solution)
}

/// Exact scheduler: lets the solver choose ordering and machine assignment jointly.
#[derive(Clone, Debug, Default)]
pub struct Exact {
    config: SolverConfig,
}

impl Exact {
    #[must_use]
    pub const fn new(config: SolverConfig) -> Self {
        Self { config }
    }
}

impl Scheduler for Exact {
    fn schedule(&mut self, instance: &Instance) -> Result<Solution, ScheduleError> {
        solve(instance, &self.config)
    }

    fn name(&self) -> &'static str {
        "exact"
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SCHEDULERS)]
static INSTANCE: fn(SolverConfig) -> Box<dyn Scheduler> = |config| Box::new(Exact::new(config));

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::{ModelError, Objective, Status, TaskInfo, ValidationError};

    fn three_tasks(machines: &[&str]) -> Instance {
        Instance::new(machines.iter().copied())
            .with_task("A", TaskInfo::new(3, 0, 100))
            .with_task("B", TaskInfo::new(5, 0, 100))
            .with_task("C", TaskInfo::new(2, 0, 100))
    }

    fn chain(due_date: u64) -> Instance {
        Instance::new(["m_1"])
            .with_task("X1", TaskInfo::new(20, 0, due_date).with_successor("X2"))
            .with_task("X2", TaskInfo::new(20, 0, due_date))
    }

    #[test]
    fn one_machine_runs_tasks_back_to_back() -> anyhow::Result<()> {
        let instance = three_tasks(&["m_1"]);
        let solution = solve(&instance, &SolverConfig::default())?;

        assert_eq!(solution.status, Status::Optimal);
        assert_eq!(solution.makespan, Some(10));
        // Shortest task first minimizes the sum of starts: 0 + 2 + 5.
        assert_eq!(solution.objective, Some(7));
        assert!(solution.verify(&instance));
        Ok(())
    }

    #[test]
    fn successor_starts_after_predecessor_ends() -> anyhow::Result<()> {
        let instance = chain(100);
        let solution = solve(&instance, &SolverConfig::default())?;

        let x1 = solution.task("X1").ok_or_else(|| anyhow::anyhow!("X1 is scheduled"))?;
        let x2 = solution.task("X2").ok_or_else(|| anyhow::anyhow!("X2 is scheduled"))?;
        assert_eq!(solution.status, Status::Optimal);
        assert!(x2.start >= x1.end);
        assert_eq!((x1.start, x2.start), (0, 20));
        assert_eq!(x2.slack, 60);
        Ok(())
    }

    #[test]
    fn short_window_is_reported_before_search() {
        let result = solve(&chain(15), &SolverConfig::default());

        let Err(error) = result else {
            panic!("Window of 15 cannot hold a task of 20");
        };
        assert_eq!(error.window_tasks(), ["X1", "X2"]);
    }

    #[test]
    fn chain_too_long_for_windows_is_infeasible() -> anyhow::Result<()> {
        let instance = Instance::new(["m_1"])
            .with_task("X1", TaskInfo::new(20, 0, 30).with_successor("X2"))
            .with_task("X2", TaskInfo::new(20, 0, 35));
        let solution = solve(&instance, &SolverConfig::default())?;

        assert_eq!(solution.status, Status::Infeasible);
        assert_eq!(solution.objective, None);
        assert!(solution.tasks.is_empty());
        Ok(())
    }

    #[test]
    fn no_machines_is_rejected() {
        let instance = Instance::new(Vec::<String>::new()).with_task("A", TaskInfo::new(3, 0, 100));
        let result = solve(&instance, &SolverConfig::default());

        assert_eq!(result, Err(ScheduleError::Validation(ValidationError::NoMachines)));
    }

    #[test]
    fn two_machines_share_the_load() -> anyhow::Result<()> {
        let instance = three_tasks(&["m_1", "m_2"]);
        let config = SolverConfig::default().with_objective(Objective::Makespan);
        let solution = solve(&instance, &config)?;

        assert_eq!(solution.status, Status::Optimal);
        assert_eq!(solution.objective, Some(5));
        assert_eq!(solution.makespan, Some(5));
        assert!(solution.verify(&instance));
        Ok(())
    }

    #[test]
    fn release_dates_delay_starts() -> anyhow::Result<()> {
        let instance = Instance::new(["m_1", "m_2"])
            .with_task("late", TaskInfo::new(4, 10, 20))
            .with_task("early", TaskInfo::new(4, 0, 20));
        let solution = solve(&instance, &SolverConfig::default())?;

        let late = solution.task("late").ok_or_else(|| anyhow::anyhow!("late is scheduled"))?;
        assert_eq!(late.start, 10);
        assert_eq!(solution.objective, Some(10));
        Ok(())
    }

    #[test]
    fn repeated_solves_agree() -> anyhow::Result<()> {
        let instance = three_tasks(&["m_1", "m_2", "m_3"]);
        let mut scheduler = Exact::default();

        let first = scheduler.schedule(&instance)?;
        let second = scheduler.schedule(&instance)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn exhausted_budget_without_schedule_is_unknown() -> anyhow::Result<()> {
        let config = SolverConfig::default().with_node_limit(Some(1));
        let solution = solve(&three_tasks(&["m_1"]), &config)?;

        assert_eq!(solution.status, Status::Unknown);
        assert_eq!(solution.makespan, None);
        Ok(())
    }

    #[test]
    fn dates_at_the_end_of_the_time_range() -> anyhow::Result<()> {
        let instance = Instance::new(["m_1"])
            .with_task("A", TaskInfo::new(10, u64::MAX - 30, u64::MAX))
            .with_task("B", TaskInfo::new(10, u64::MAX - 30, u64::MAX))
            .with_task("C", TaskInfo::new(5, 0, u64::MAX));

        let config = SolverConfig::default().with_objective(Objective::Makespan);
        let solution = solve(&instance, &config)?;
        assert_eq!(solution.status, Status::Optimal);
        assert_eq!(solution.makespan, Some(u64::MAX - 10));
        assert!(solution.verify(&instance));

        let result = solve(&instance, &SolverConfig::default());
        let expected = 2 * u128::from(u64::MAX) - 50;
        assert_eq!(
            result,
            Err(ScheduleError::Model(ModelError::ObjectiveOverflow(expected)))
        );
        Ok(())
    }

    #[test]
    fn registry_contains_exact() {
        let names: Vec<_> = super::super::SCHEDULERS
            .iter()
            .map(|init| init(SolverConfig::default()).name().to_owned())
            .collect();
        assert!(names.iter().any(|name| name == "exact"));
    }
}
