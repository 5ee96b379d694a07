//! Frontend Models
//!
//! Data structures exchanged with the dashboard server.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::BoardError;

/// Opaque server-assigned identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EntityRef(String);

/// Task reference, as carried by `data-task` attributes
pub type TaskRef = EntityRef;
/// Project reference, as used in progress element ids
pub type ProjectRef = EntityRef;

impl EntityRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// The push channel sends integer ids, the DOM carries strings
impl<'de> Deserialize<'de> for EntityRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(i64),
            Str(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Num(n) => EntityRef(n.to_string()),
            Raw::Str(s) => EntityRef(s),
        })
    }
}

/// Kanban column state (matches backend)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Backlog,
    Ready,
    InProgress,
    Blocked,
    Review,
    Done,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Backlog => "backlog",
            TaskState::Ready => "ready",
            TaskState::InProgress => "in_progress",
            TaskState::Blocked => "blocked",
            TaskState::Review => "review",
            TaskState::Done => "done",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskState {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "backlog" => Ok(TaskState::Backlog),
            "ready" => Ok(TaskState::Ready),
            "in_progress" => Ok(TaskState::InProgress),
            "blocked" => Ok(TaskState::Blocked),
            "review" => Ok(TaskState::Review),
            "done" => Ok(TaskState::Done),
            other => Err(BoardError::UnknownState(other.to_string())),
        }
    }
}

/// Per-project completion counters from `/dashboard/progress.json`.
/// `pct` is computed by the server and trusted as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub id: ProjectRef,
    pub done: u32,
    pub total: u32,
    pub pct: u32,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl ProgressRecord {
    /// Text shown next to a progress bar
    pub fn label(&self) -> String {
        format!("{}/{} ({}%)", self.done, self.total, self.pct)
    }
}

/// Partial task update for `PATCH /tasks/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<TaskState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl TaskPatch {
    pub fn state(state: TaskState) -> Self {
        Self {
            state: Some(state),
            ..Default::default()
        }
    }
}

/// `task_updated` push payload. The server only sends changed fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskUpdated {
    pub id: TaskRef,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub priority: Option<i32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}
