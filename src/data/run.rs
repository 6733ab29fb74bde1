use crate::core::{Instance, Scheduler, Status};
use crate::data::read_file;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result};
use std::path::Path;
use tracing::{info, warn};

/// Report of running a directory of instances.
#[derive(Debug, Deserialize, Serialize)]
pub struct Report {
    scheduler: String,
    entries: Vec<ReportEntry>,
}

impl Report {
    /// Create a new report.
    fn new(scheduler: String) -> Self {
        let entries = Vec::new();
        Self { scheduler, entries }
    }

    /// Get the scheduler name.
    #[must_use]
    pub fn scheduler_name(&self) -> &str {
        &self.scheduler
    }

    /// Get the entries.
    #[must_use]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "Scheduler: {}", self.scheduler)?;
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        writeln!(f, "-------------------")
    }
}

/// Report of solving a single instance.
/// An instance refused by the scheduler has no status and names the reason instead.
#[non_exhaustive]
#[derive(Debug, Deserialize, Serialize)]
pub struct ReportEntry {
    pub name: String,
    pub status: Option<Status>,
    pub objective: Option<u64>,
    pub makespan: Option<u64>,
    pub time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refused: Option<String>,
}

impl Display for ReportEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let (Some(status), None) = (self.status, &self.refused) else {
            let reason = self.refused.as_deref().unwrap_or_default();
            return write!(f, "{}: REFUSED {reason}", self.name);
        };
        let value = |v: Option<u64>| v.map_or_else(|| "-".into(), |v| v.to_string());
        write!(
            f,
            "{}: {} objective {} makespan {} in {:.2} sec",
            self.name,
            status,
            value(self.objective),
            value(self.makespan),
            self.time
        )
    }
}

/// Solve every `*.json` instance in the `dir` directory, in file name order.
/// Instances the scheduler rejects are kept in the report as refused entries.
///
/// # Arguments
/// - `dir` is the directory holding the instances.
/// - `solver` is the scheduler to run.
///
/// # Errors
/// - If a file cannot be read or parsed.
/// - If a solved schedule breaks a rule of its instance.
pub fn run(dir: impl AsRef<Path>, solver: &mut dyn Scheduler) -> anyhow::Result<Report> {
    let mut report = Report::new(solver.name().into());

    let mut files = Vec::new();
    for file in std::fs::read_dir(dir)? {
        let path = file?.path();
        if path.extension().is_some_and(|extension| extension == "json") {
            files.push(path);
        }
    }
    files.sort();

    for path in files {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow!("Cannot read filename {}", path.display()))?
            .to_owned();
        let instance: Instance = read_file(&path)?;

        let time = std::time::Instant::now();
        let result = solver.schedule(&instance);
        let time = time.elapsed().as_secs_f64();

        let solution = match result {
            Ok(solution) => solution,
            Err(error) => {
                warn!(file = %name, %error, "instance refused");
                report.entries.push(ReportEntry {
                    name,
                    status: None,
                    objective: None,
                    makespan: None,
                    time,
                    refused: Some(error.to_string()),
                });
                continue;
            }
        };

        let violations = solution.violations(&instance);
        if !violations.is_empty() {
            return Err(anyhow!("{name}: invalid schedule: {}", violations.join("; ")));
        }

        info!(file = %name, status = %solution.status, time, "instance solved");
        report.entries.push(ReportEntry {
            name,
            status: Some(solution.status),
            objective: solution.objective,
            makespan: solution.makespan,
            time,
            refused: None,
        });
    }

    Ok(report)
}
