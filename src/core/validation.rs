use super::{Instance, PrecedenceGraph, ValidationError};
use ahash::{HashMap, HashSet, HashSetExt};

/// Checks the structure of an instance and builds its precedence graph.
/// Successor fields and extra precedences both become edges of the graph.
///
/// # Errors
/// - If the instance has no tasks or no machines.
/// - If a machine is listed twice.
/// - If a task has a zero duration.
/// - If a successor or precedence references an unknown task or the task itself.
/// - If the precedences contain a cycle.
pub fn validate(instance: &Instance) -> Result<PrecedenceGraph, ValidationError> {
    if instance.tasks.is_empty() {
        return Err(ValidationError::NoTasks);
    }

    if instance.machines.is_empty() {
        return Err(ValidationError::NoMachines);
    }

    let mut machines = HashSet::with_capacity(instance.machines.len());
    for machine in &instance.machines {
        if !machines.insert(machine.as_str()) {
            return Err(ValidationError::DuplicateMachine(machine.clone()));
        }
    }

    let index: HashMap<&str, usize> = instance.task_ids().enumerate().map(|(i, id)| (id, i)).collect();
    let mut graph = PrecedenceGraph::new(instance.tasks.len());

    let mut link = |before: &str, after: &str| -> Result<(), ValidationError> {
        let lookup = |reference: &str| {
            index.get(reference).copied().ok_or_else(|| ValidationError::DanglingReference {
                task: before.to_owned(),
                reference: reference.to_owned(),
            })
        };
        let (from, to) = (lookup(before)?, lookup(after)?);
        if from == to {
            return Err(ValidationError::SelfPrecedence(before.to_owned()));
        }
        graph.add_edge(from, to);
        Ok(())
    };

    for (id, task) in &instance.tasks {
        if task.duration == 0 {
            return Err(ValidationError::ZeroDuration(id.clone()));
        }
        if let Some(successor) = &task.successor {
            link(id, successor)?;
        }
    }

    for precedence in &instance.precedences {
        link(&precedence.before, &precedence.after)?;
    }

    if let Err(cycle) = graph.topological_order() {
        let ids: Vec<_> = instance.task_ids().collect();
        let cycle = cycle.into_iter().map(|task| ids[task].to_owned()).collect();
        return Err(ValidationError::Cycle(cycle));
    }

    Ok(graph)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::{Precedence, TaskInfo};

    fn chain() -> Instance {
        Instance::new(["m_1"])
            .with_task("x1", TaskInfo::new(20, 0, 100).with_successor("x2"))
            .with_task("x2", TaskInfo::new(20, 0, 100))
    }

    #[test]
    fn valid_instance_builds_graph() -> anyhow::Result<()> {
        let graph = validate(&chain())?;
        assert_eq!(graph.edges().collect::<Vec<_>>(), [(0, 1)]);
        Ok(())
    }

    #[test]
    fn empty_instance_is_rejected() {
        assert_eq!(validate(&Instance::new(["m"])), Err(ValidationError::NoTasks));
    }

    #[test]
    fn zero_machines_are_rejected() {
        let mut instance = chain();
        instance.machines.clear();
        assert_eq!(validate(&instance), Err(ValidationError::NoMachines));
    }

    #[test]
    fn duplicate_machines_are_rejected() {
        let mut instance = chain();
        instance.machines.push("m_1".into());
        assert_eq!(
            validate(&instance),
            Err(ValidationError::DuplicateMachine("m_1".into()))
        );
    }

    #[test]
    fn zero_duration_is_rejected() {
        let instance = chain().with_task("x3", TaskInfo::new(0, 0, 10));
        assert_eq!(
            validate(&instance),
            Err(ValidationError::ZeroDuration("x3".into()))
        );
    }

    #[test]
    fn dangling_successor_is_rejected() {
        let instance = chain().with_task("x3", TaskInfo::new(1, 0, 10).with_successor("x9"));
        assert_eq!(
            validate(&instance),
            Err(ValidationError::DanglingReference {
                task: "x3".into(),
                reference: "x9".into()
            })
        );
    }

    #[test]
    fn self_successor_is_rejected() {
        let instance = chain().with_task("x3", TaskInfo::new(1, 0, 10).with_successor("x3"));
        assert_eq!(
            validate(&instance),
            Err(ValidationError::SelfPrecedence("x3".into()))
        );
    }

    #[test]
    fn cycle_is_rejected() {
        let instance = chain().with_precedence(Precedence::new("x2", "x1"));
        let Err(ValidationError::Cycle(mut cycle)) = validate(&instance) else {
            panic!("Cycle must be rejected");
        };
        cycle.sort();
        assert_eq!(cycle, ["x1", "x2"]);
    }
}
