use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A task record. Contains the processing time, the optional successor and the time window.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Serialize, PartialEq)]
pub struct TaskInfo {
    pub duration: u64,
    #[serde(default, with = "successor")]
    pub successor: Option<String>,
    pub release_date: u64,
    pub due_date: u64,
}

impl TaskInfo {
    /// Creates a new task without successor.
    #[must_use]
    pub const fn new(duration: u64, release_date: u64, due_date: u64) -> Self {
        Self {
            duration,
            successor: None,
            release_date,
            due_date,
        }
    }

    /// Sets the task that must start after this one ends.
    #[must_use]
    pub fn with_successor(mut self, successor: impl Into<String>) -> Self {
        self.successor = Some(successor.into());
        self
    }
}

/// An additional precedence link between two tasks, described by their ids.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Serialize, PartialEq)]
pub struct Precedence {
    pub before: String,
    pub after: String,
}

impl Precedence {
    /// Creates a new precedence: `before` must end before `after` starts.
    #[must_use]
    pub fn new(before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
        }
    }
}

/// An instance of the scheduling problem.
/// Tasks are kept ordered by id, so task indices are stable for a given instance.
#[non_exhaustive]
#[derive(Clone, Debug, Default, Deserialize, Eq, Serialize, PartialEq)]
pub struct Instance {
    pub tasks: BTreeMap<String, TaskInfo>,
    pub machines: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub precedences: Vec<Precedence>,
}

impl Instance {
    /// Creates a new instance without tasks on the given machines.
    #[must_use]
    pub fn new<I, S>(machines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tasks: BTreeMap::new(),
            machines: machines.into_iter().map(Into::into).collect(),
            precedences: Vec::new(),
        }
    }

    /// Adds a task to the instance, replacing a previous task with the same id.
    #[must_use]
    pub fn with_task(mut self, id: impl Into<String>, task: TaskInfo) -> Self {
        self.tasks.insert(id.into(), task);
        self
    }

    /// Adds a precedence link that is not expressed by a successor field.
    #[must_use]
    pub fn with_precedence(mut self, precedence: Precedence) -> Self {
        self.precedences.push(precedence);
        self
    }

    /// Returns the task ids in index order.
    pub fn task_ids(&self) -> impl ExactSizeIterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }
}

/// Serializes a missing successor as the literal `"none"`.
mod successor {
    use serde::{Deserialize, Deserializer, Serializer};

    const NONE: &str = "none";

    pub fn serialize<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_deref().unwrap_or(NONE))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.filter(|id| !id.is_empty() && id != NONE))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn instance_should_serialize() -> anyhow::Result<()> {
        let instance = Instance::new(["m_1", "m_2"])
            .with_task("a", TaskInfo::new(3, 0, 20).with_successor("b"))
            .with_task("b", TaskInfo::new(5, 0, 20))
            .with_precedence(Precedence::new("a", "b"));

        let serialized = crate::data::to_string(&instance)?;
        assert!(serialized.contains("\"none\""));

        let mut reader = std::io::Cursor::new(serialized);
        let deserialized: Instance = crate::data::deserialize(&mut reader)?;

        assert_eq!(instance, deserialized);
        Ok(())
    }

    #[test]
    fn successor_none_should_parse_as_missing() -> anyhow::Result<()> {
        let json = r#"{
            "tasks": {
                "x1": {"duration": 20, "successor": "x2", "release_date": 0, "due_date": 100},
                "x2": {"duration": 20, "successor": "none", "release_date": 0, "due_date": 100}
            },
            "machines": ["m_1"]
        }"#;
        let instance: Instance = crate::data::deserialize(&mut json.as_bytes())?;

        assert_eq!(instance.tasks["x1"].successor.as_deref(), Some("x2"));
        assert_eq!(instance.tasks["x2"].successor, None);
        assert!(instance.precedences.is_empty());
        Ok(())
    }

    #[test]
    fn task_ids_follow_id_order() {
        let instance = Instance::new(["m"])
            .with_task("c", TaskInfo::new(2, 0, 10))
            .with_task("a", TaskInfo::new(3, 0, 10))
            .with_task("b", TaskInfo::new(5, 0, 10));

        assert_eq!(instance.task_ids().collect::<Vec<_>>(), ["a", "b", "c"]);
        assert_eq!(instance.task_ids().len(), 3);
    }
}
