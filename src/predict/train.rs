use super::Mlp;
use crate::algo;
use crate::core::{Instance, Objective, TaskInfo};
use crate::cp::SolverConfig;
use crate::{cast_f64, cast_u64};
use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const BETA1: f64 = 0.9;
const BETA2: f64 = 0.999;
const EPSILON: f64 = 1e-8;

/// Offline training parameters of the learned predictor.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Length of the duration sequences.
    pub tasks: usize,
    pub samples: usize,
    /// Durations are drawn uniformly from `1..=max_duration`.
    pub max_duration: u64,
    pub epochs: usize,
    pub learning_rate: f64,
    pub hidden: usize,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            tasks: 3,
            samples: 100,
            max_duration: 9,
            epochs: 100,
            learning_rate: 0.01,
            hidden: 16,
            seed: 0,
        }
    }
}

/// A trained network with the loss of every epoch, measured before the update.
#[derive(Clone, Debug)]
pub struct Trained {
    pub model: Mlp,
    pub losses: Vec<f64>,
}

/// Builds a single machine instance running the durations as one chain.
fn chain_instance(durations: &[u64]) -> Instance {
    let horizon = durations.iter().sum();
    let ids: Vec<_> = (0..durations.len()).map(|i| format!("t_{i}")).collect();

    let mut instance = Instance::new(["m_1"]);
    for (i, &duration) in durations.iter().enumerate() {
        let mut task = TaskInfo::new(duration, 0, horizon);
        if let Some(next) = ids.get(i + 1) {
            task = task.with_successor(next.clone());
        }
        instance = instance.with_task(ids[i].clone(), task);
    }
    instance
}

/// Draws duration sequences and labels each with the exact completion time of its chain.
fn samples(config: &TrainingConfig, rng: &mut impl Rng) -> Result<(Vec<Vec<f64>>, Vec<f64>)> {
    let solver = SolverConfig::default().with_objective(Objective::Makespan);
    let mut inputs = Vec::with_capacity(config.samples);
    let mut targets = Vec::with_capacity(config.samples);

    for _ in 0..config.samples {
        let durations: Vec<u64> = (0..config.tasks)
            .map(|_| rng.gen_range(1..=config.max_duration))
            .collect();
        let solution = algo::solve(&chain_instance(&durations), &solver)?;
        let makespan = solution
            .makespan
            .ok_or_else(|| anyhow!("chain {durations:?} was not solved: {}", solution.status))?;

        inputs.push(durations.into_iter().map(cast_f64).collect());
        targets.push(cast_f64(makespan));
    }

    Ok((inputs, targets))
}

/// Trains the learned predictor with full-batch Adam on the mean squared error.
///
/// # Errors
/// - If the configuration describes an empty network or data set.
/// - If a training chain cannot be solved.
pub fn train(config: &TrainingConfig) -> Result<Trained> {
    if config.tasks == 0 || config.hidden == 0 || config.samples == 0 || config.max_duration == 0 {
        return Err(anyhow!("training needs tasks, hidden units, samples and durations"));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let (inputs, targets) = samples(config, &mut rng)?;
    let mut model = Mlp::new(config.tasks, config.hidden, &mut rng);

    let count = model.weights_mut().len();
    let (mut m, mut v) = (vec![0.0; count], vec![0.0; count]);
    let mut losses = Vec::with_capacity(config.epochs);

    for epoch in 0..config.epochs {
        let (loss, gradient) = model.loss_gradient(&inputs, &targets);
        losses.push(loss);

        let step = i32::try_from(epoch + 1).unwrap_or(i32::MAX);
        let correction1 = 1.0 - BETA1.powi(step);
        let correction2 = 1.0 - BETA2.powi(step);

        for (k, weight) in model.weights_mut().iter_mut().enumerate() {
            m[k] = BETA1 * m[k] + (1.0 - BETA1) * gradient[k];
            v[k] = BETA2 * v[k] + (1.0 - BETA2) * gradient[k] * gradient[k];
            let m_hat = m[k] / correction1;
            let v_hat = v[k] / correction2;
            *weight -= config.learning_rate * m_hat / (v_hat.sqrt() + EPSILON);
        }

        if epoch % 10 == 0 {
            debug!(epoch, loss, "training");
        }
    }

    info!(
        samples = cast_u64(inputs.len()),
        epochs = config.epochs,
        loss = losses.last().copied(),
        "predictor trained"
    );

    Ok(Trained { model, losses })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::predict::Predictor;

    #[test]
    fn chain_instance_links_tasks_in_order() {
        let instance = chain_instance(&[3, 5, 2]);

        assert_eq!(instance.tasks.len(), 3);
        assert_eq!(instance.tasks["t_0"].successor.as_deref(), Some("t_1"));
        assert_eq!(instance.tasks["t_1"].successor.as_deref(), Some("t_2"));
        assert_eq!(instance.tasks["t_2"].successor, None);
        assert_eq!(instance.tasks["t_2"].due_date, 10);
    }

    #[test]
    fn labels_are_chain_completion_times() -> anyhow::Result<()> {
        let config = TrainingConfig {
            samples: 5,
            ..TrainingConfig::default()
        };
        let (inputs, targets) = samples(&config, &mut StdRng::seed_from_u64(11))?;

        for (x, target) in inputs.iter().zip(targets) {
            assert!((x.iter().sum::<f64>() - target).abs() < f64::EPSILON);
            assert!(x.iter().all(|&d| (1.0..=9.0).contains(&d)));
        }
        Ok(())
    }

    #[test]
    fn training_reduces_the_loss() -> anyhow::Result<()> {
        let trained = train(&TrainingConfig::default())?;

        assert_eq!(trained.losses.len(), 100);
        let (first, last) = (trained.losses[0], trained.losses[99]);
        assert!(last < first / 2.0, "loss went from {first} to {last}");
        assert!(trained.model.accepts(3));
        Ok(())
    }

    #[test]
    fn training_is_seeded() -> anyhow::Result<()> {
        let config = TrainingConfig {
            samples: 10,
            epochs: 5,
            ..TrainingConfig::default()
        };
        assert_eq!(train(&config)?.model, train(&config)?.model);
        Ok(())
    }

    #[test]
    fn empty_network_is_rejected() {
        let config = TrainingConfig {
            hidden: 0,
            ..TrainingConfig::default()
        };
        assert!(train(&config).is_err());
    }
}
