use clap::{Args, Parser, ValueEnum};
use parallel_machine_scheduling::core::{Objective, Scheduler};
use parallel_machine_scheduling::cp::SolverConfig;
use parallel_machine_scheduling::data::gen::{generate, Difficulty, GeneratorConfig};
use parallel_machine_scheduling::predict::{train, Mlp, TrainingConfig};
use parallel_machine_scheduling::{algo, data, run_reader};
use rand::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, Debug)]
struct Algorithm(usize, &'static str);

impl Algorithm {
    fn create(self, config: SolverConfig) -> Box<dyn Scheduler> {
        algo::SCHEDULERS[self.0](config)
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.1)
    }
}

impl ValueEnum for Algorithm {
    fn value_variants<'a>() -> &'a [Self] {
        static ALGORITHMS: std::sync::LazyLock<Vec<Algorithm>> = std::sync::LazyLock::new(|| {
            let iter = algo::SCHEDULERS.iter().enumerate();
            iter.map(|(i, init)| Algorithm(i, init(SolverConfig::default()).name())).collect()
        });

        ALGORITHMS.as_slice()
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.1))
    }
}

/// Exact solver settings shared by the solving commands.
#[derive(Args, Clone, Debug)]
struct SolverArgs {
    /// The quantity to minimize.
    #[clap(long, value_enum, default_value_t = Objective::SumOfStarts)]
    objective: Objective,
    /// Maximum number of search nodes.
    #[clap(long)]
    node_limit: Option<u64>,
    /// Maximum search time in milliseconds.
    #[clap(long)]
    time_limit: Option<u64>,
    /// Trained predictor used by the hybrid scheduler instead of the list heuristic.
    #[clap(long)]
    model: Option<PathBuf>,
}

impl SolverArgs {
    fn config(&self) -> SolverConfig {
        let defaults = SolverConfig::default();
        defaults
            .with_objective(self.objective)
            .with_node_limit(self.node_limit.or(defaults.node_limit))
            .with_time_limit(self.time_limit.or(defaults.time_limit_ms))
    }

    fn scheduler(&self, algorithm: Algorithm) -> anyhow::Result<Box<dyn Scheduler>> {
        let config = self.config();
        match (&self.model, algorithm.1) {
            (Some(path), "hybrid") => {
                let model: Mlp = data::read_file(path)?;
                info!(path = %path.display(), inputs = model.inputs(), "predictor loaded");
                Ok(Box::new(algo::HybridScheduler::new(Arc::new(model), config)))
            }
            _ => Ok(algorithm.create(config)),
        }
    }
}

/// Application scheduling tasks with time windows and successors on parallel machines.
#[derive(Debug, Parser)]
enum Application {
    /// Solve the instance read from stdin with one of the implemented algorithms.
    Run {
        algorithm: Algorithm,
        #[clap(flatten)]
        solver: SolverArgs,
    },
    /// Run benchmarks on a directory of instances.
    Bench {
        /// The input directory.
        input: PathBuf,
        /// Exclude scheduling algorithms.
        #[clap(short, long, value_delimiter = ',')]
        exclude: Vec<Algorithm>,
        #[clap(flatten)]
        solver: SolverArgs,
    },
    /// Generate instances made of two-task projects.
    Gen {
        /// The difficulty preset.
        #[clap(value_enum)]
        difficulty: Difficulty,
        /// Seed of the first instance. Following instances use the next seeds.
        #[clap(short, long, default_value = "0")]
        seed: u64,
        /// Number of instances to generate.
        #[clap(short, long, default_value = "1")]
        amount: u64,
        /// Path to output the generated instances. If the directory does not exist, it will be created.
        #[clap(short, long, default_value = "output")]
        output: PathBuf,
    },
    /// Train the learned ordering predictor.
    Train {
        /// Path of the trained predictor.
        #[clap(default_value = "model.json")]
        output: PathBuf,
        /// Seed of the training data and the initial weights.
        #[clap(short, long, default_value = "0")]
        seed: u64,
        /// Number of training samples.
        #[clap(long, default_value = "100")]
        samples: usize,
        /// Number of training epochs.
        #[clap(long, default_value = "100")]
        epochs: usize,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match Application::parse() {
        Application::Run { algorithm, solver } => {
            let mut scheduler = solver.scheduler(algorithm)?;
            run_reader(scheduler.as_mut(), &mut std::io::stdin().lock())
        }
        Application::Bench {
            input,
            exclude,
            solver,
        } => {
            for &algorithm in Algorithm::value_variants() {
                if exclude.iter().any(|excluded| excluded.1 == algorithm.1) {
                    continue;
                }
                let mut scheduler = solver.scheduler(algorithm)?;
                println!("{}", data::run(&input, scheduler.as_mut())?);
            }
            Ok(())
        }
        Application::Gen {
            difficulty,
            seed,
            amount,
            output,
        } => {
            let config = GeneratorConfig::preset(difficulty);
            for i in 0..amount {
                let seed = seed + i;
                let instance = generate(&config, &mut StdRng::seed_from_u64(seed));
                let path = output.join(format!("{difficulty:?}_{seed}.json").to_lowercase());
                data::write_file(&path, &instance)?;
                info!(path = %path.display(), tasks = instance.tasks.len(), "instance generated");
            }
            Ok(())
        }
        Application::Train {
            output,
            seed,
            samples,
            epochs,
        } => {
            let config = TrainingConfig {
                seed,
                samples,
                epochs,
                ..TrainingConfig::default()
            };
            let trained = train(&config)?;
            data::write_file(&output, &trained.model)?;
            info!(path = %output.display(), "predictor saved");
            Ok(())
        }
    }
}
