//! Seeded generator of two-task project instances.

use crate::core::{Instance, TaskInfo};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Difficulty presets. Harder instances leave less slack in the due dates.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Shape of generated instances.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GeneratorConfig {
    /// Number of projects, each made of two chained tasks.
    pub pairs: usize,
    pub machines: usize,
    pub min_duration: u64,
    pub max_duration: u64,
    /// Share of a project's total duration added to its due dates.
    pub slack_factor: f64,
    /// Due dates are clipped to the horizon.
    pub horizon: u64,
}

impl GeneratorConfig {
    #[must_use]
    pub const fn preset(difficulty: Difficulty) -> Self {
        let (pairs, machines, min_duration, max_duration, slack_factor) = match difficulty {
            Difficulty::Easy => (3, 4, 20, 80, 0.6),
            Difficulty::Medium => (5, 3, 30, 100, 0.3),
            Difficulty::Hard => (8, 10, 40, 120, 0.05),
        };
        Self {
            pairs,
            machines,
            min_duration,
            max_duration,
            slack_factor,
            horizon: 1000,
        }
    }
}

impl From<Difficulty> for GeneratorConfig {
    fn from(difficulty: Difficulty) -> Self {
        Self::preset(difficulty)
    }
}

/// Truncated share of the total duration.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn slack(total: u64, factor: f64) -> u64 {
    (crate::cast_f64(total) * factor.max(0.0)) as u64
}

/// Names a project like a spreadsheet column: `a`..`z`, `aa`, `ab`, ...
fn project_name(mut index: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'a' + u8::try_from(index % 26).unwrap_or_else(|_| unreachable!("Below 26")));
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.iter().rev().map(|&c| char::from(c)).collect()
}

/// Generates an instance of `pairs` projects `task_<p>_1 -> task_<p>_2`.
///
/// The first task is released in `[0, horizon / 4]`, the second when the first can end
/// at the earliest. Both share one due date, leaving `slack_factor` of the project
/// duration as margin.
pub fn generate(config: &GeneratorConfig, rng: &mut impl Rng) -> Instance {
    let machines = (1..=config.machines).map(|i| format!("m_{i}"));
    let mut instance = Instance::new(machines);

    for project in (0..config.pairs).map(project_name) {
        let first = rng.gen_range(config.min_duration..=config.max_duration);
        let second = rng.gen_range(config.min_duration..=config.max_duration);
        let release = rng.gen_range(0..=config.horizon / 4);
        let margin = slack(first + second, config.slack_factor);

        let first_id = format!("task_{project}_1");
        let second_id = format!("task_{project}_2");
        let due = (release + first + second + margin).min(config.horizon);

        instance = instance
            .with_task(
                first_id,
                TaskInfo::new(first, release, due).with_successor(second_id.clone()),
            )
            .with_task(second_id, TaskInfo::new(second, release + first, due));
    }

    instance
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::validate;
    use crate::cp::start_domains;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn presets_match_their_shape() {
        let config = GeneratorConfig::from(Difficulty::Medium);
        let instance = generate(&config, &mut StdRng::seed_from_u64(0));

        assert_eq!(instance.tasks.len(), 10);
        assert_eq!(instance.machines.len(), 3);
        assert_eq!(instance.machines[2], "m_3");
        assert!(instance.tasks.contains_key("task_e_2"));
        assert_eq!(instance.tasks["task_a_1"].successor.as_deref(), Some("task_a_2"));
    }

    #[test]
    fn generated_projects_fit_their_windows() -> anyhow::Result<()> {
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            let config = GeneratorConfig::preset(difficulty);
            let instance = generate(&config, &mut StdRng::seed_from_u64(42));
            validate(&instance)?;
            start_domains(&instance)?;

            for (id, task) in &instance.tasks {
                assert!((config.min_duration..=config.max_duration).contains(&task.duration), "{id}");
                assert!(task.due_date <= config.horizon, "{id}");
            }
        }
        Ok(())
    }

    #[test]
    fn second_task_is_released_when_first_can_end() {
        let instance = generate(&GeneratorConfig::preset(Difficulty::Hard), &mut StdRng::seed_from_u64(5));
        let first = &instance.tasks["task_c_1"];
        let second = &instance.tasks["task_c_2"];

        assert_eq!(second.release_date, first.release_date + first.duration);
        assert_eq!(first.due_date, second.due_date);
    }

    #[test]
    fn same_seed_gives_same_instance() {
        let config = GeneratorConfig::preset(Difficulty::Easy);
        let first = generate(&config, &mut StdRng::seed_from_u64(9));
        let second = generate(&config, &mut StdRng::seed_from_u64(9));
        assert_eq!(first, second);
    }

    #[test]
    fn project_names_continue_after_z() {
        assert_eq!(project_name(0), "a");
        assert_eq!(project_name(25), "z");
        assert_eq!(project_name(26), "aa");
        assert_eq!(project_name(27), "ab");
    }
}
