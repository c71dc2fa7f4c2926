use std::collections::BTreeMap;

pub mod dump;
pub mod runner;

pub use dump::parse_dump;
pub use runner::{RunnerSpec, DEFAULT_RUNNER};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("task runner `{binary}` not found on PATH")]
    MissingRunner { binary: String },
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with status {status}: {stderr}")]
    NonZeroExit {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("invalid task dump json: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown parameter kind `{kind}` for `{task}.{parameter}`")]
    UnknownParameterKind {
        task: String,
        parameter: String,
        kind: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Singular,
    /// One or more whitespace-separated values.
    Plus,
    /// Zero or more whitespace-separated values.
    Star,
}

impl ParameterKind {
    pub fn is_variadic(self) -> bool {
        matches!(self, ParameterKind::Plus | ParameterKind::Star)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ParameterKind::Singular => "singular",
            ParameterKind::Plus => "plus",
            ParameterKind::Star => "star",
        }
    }
}

impl TryFrom<&str> for ParameterKind {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "singular" => Ok(Self::Singular),
            "plus" => Ok(Self::Plus),
            "star" => Ok(Self::Star),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub default: Option<String>,
    pub kind: ParameterKind,
}

impl Parameter {
    pub fn singular(name: &str, default: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            default: default.map(str::to_string),
            kind: ParameterKind::Singular,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub name: String,
    pub description: Option<String>,
    pub dependencies: Vec<String>,
    pub parameters: Vec<Parameter>,
}

/// All tasks of the project, keyed by name. Built once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    tasks: BTreeMap<String, Task>,
}

/// One row of the task list: a real task or the pinned AI entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEntry {
    Task {
        name: String,
        description: Option<String>,
    },
    Generate,
}

impl DisplayEntry {
    pub fn task_name(&self) -> Option<&str> {
        match self {
            DisplayEntry::Task { name, .. } => Some(name),
            DisplayEntry::Generate => None,
        }
    }
}

impl Catalog {
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            tasks: tasks
                .into_iter()
                .map(|task| (task.name.clone(), task))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks sorted by name, followed by the AI entry.
    pub fn display_entries(&self) -> Vec<DisplayEntry> {
        self.tasks
            .values()
            .map(|task| DisplayEntry::Task {
                name: task.name.clone(),
                description: task.description.clone(),
            })
            .chain(std::iter::once(DisplayEntry::Generate))
            .collect()
    }
}
