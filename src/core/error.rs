use thiserror::Error;

/// Structural problems of an instance. They are reported before any model is built.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ValidationError {
    #[error("instance has no tasks")]
    NoTasks,

    #[error("instance has no machines")]
    NoMachines,

    #[error("machine `{0}` is listed more than once")]
    DuplicateMachine(String),

    #[error("task `{0}` has a non-positive duration")]
    ZeroDuration(String),

    #[error("task `{task}` references unknown task `{reference}`")]
    DanglingReference { task: String, reference: String },

    #[error("task `{0}` precedes itself")]
    SelfPrecedence(String),

    #[error("precedence cycle through tasks {0:?}")]
    Cycle(Vec<String>),

    #[error("ordering by permutation supports at most {limit} tasks, got {tasks}")]
    TooManyTasksToOrder { tasks: usize, limit: usize },

    #[error("predictor `{predictor}` does not accept {tasks} durations")]
    PredictorShape { predictor: String, tasks: usize },
}

/// A task whose time window cannot hold its duration.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("task `{task}`: due date {due_date} - duration {duration} is before release date {release_date}")]
pub struct WindowViolation {
    pub task: String,
    pub duration: u64,
    pub release_date: u64,
    pub due_date: u64,
}

/// A constraint model the exact solver cannot interpret.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ModelError {
    #[error("interval `{0}` is not part of any no-overlap constraint")]
    UnboundInterval(String),

    #[error("interval `{0}` is part of more than one no-overlap constraint")]
    SharedInterval(String),

    #[error("intervals of `{0}` have different sizes")]
    MixedSizes(String),

    #[error("presence literals of `{0}` are not covered by an exactly-one constraint")]
    MissingExactlyOne(String),

    #[error("variable `{0}` is not the start of an interval")]
    UnknownStart(String),

    #[error("objective does not cover every interval start")]
    PartialObjective,

    #[error("best objective value {0} does not fit in 64 bits")]
    ObjectiveOverflow(u128),
}

/// A solver assignment that breaks a guarantee of the model it was read from.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum DecodeError {
    #[error("task `{0}` has no committed start")]
    MissingStart(String),

    #[error("task `{task}` is present on {count} machines")]
    Presence { task: String, count: usize },

    #[error("task `{task}` ends at {end} after its due date {due_date}")]
    DeadlineMissed { task: String, end: u64, due_date: u64 },

    #[error("task `{0}` ends past the largest representable time")]
    EndOverflow(String),
}

/// Errors of a solve call. Infeasibility proven by search is not an error,
/// it's reported through [`super::Status`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ScheduleError {
    #[error("invalid instance: {0}")]
    Validation(#[from] ValidationError),

    #[error("empty start window: {}", display_windows(.0))]
    InfeasibleWindow(Vec<WindowViolation>),

    #[error("malformed model: {0}")]
    Model(#[from] ModelError),

    #[error("cannot decode assignment: {0}")]
    Decode(#[from] DecodeError),
}

impl ScheduleError {
    /// Returns the ids of the tasks with an empty start window.
    #[must_use]
    pub fn window_tasks(&self) -> Vec<&str> {
        match self {
            Self::InfeasibleWindow(violations) => {
                violations.iter().map(|v| v.task.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}

fn display_windows(violations: &[WindowViolation]) -> String {
    let parts: Vec<_> = violations.iter().map(ToString::to_string).collect();
    parts.join("; ")
}
