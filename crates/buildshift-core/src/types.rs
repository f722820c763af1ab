//! Shared type definitions used across BuildShift crates.
//!
//! This module provides common types that are used by multiple dashboard
//! components, ensuring consistent representation across the codebase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp type used throughout the dashboard.
pub type Timestamp = DateTime<Utc>;

/// Get the current UTC timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Lifecycle status of a machine's task.
///
/// `kill` is an action, not a state: killing a task clears it and the
/// machine reports idle again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// No task is running on the machine
    #[default]
    Idle,
    /// Task is actively running
    Running,
    /// Task is paused and can be resumed
    Paused,
}

impl TaskStatus {
    /// Returns true if the machine can be removed in this state.
    ///
    /// Removal is only allowed while idle; an active or paused task must be
    /// killed first.
    pub fn allows_removal(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns the status indicator for TUI display.
    pub fn indicator(&self) -> &'static str {
        match self {
            Self::Idle => "○",
            Self::Running => "●",
            Self::Paused => "◐",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Paused => write!(f, "paused"),
        }
    }
}

/// A unit of work attached to a machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Task display name
    #[serde(rename = "taskName")]
    pub name: String,
    /// Free-form operator notes
    #[serde(default)]
    pub notes: String,
    /// Current lifecycle status
    #[serde(default)]
    pub status: TaskStatus,
}

impl Task {
    /// Create a new running task.
    pub fn running(name: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            notes: notes.into(),
            status: TaskStatus::Running,
        }
    }

    /// Returns true if the task has non-blank notes worth expanding.
    pub fn has_notes(&self) -> bool {
        !self.notes.trim().is_empty()
    }
}

/// A managed machine tracked by the BuildShift backend.
///
/// Machines are identified by IP; the alias is display-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    /// Device IP, the machine identifier
    pub ip: String,
    /// Human-readable name
    #[serde(default)]
    pub alias: String,
    /// Task currently attached to the machine, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<Task>,
    /// Nested JSON payload sent to the device on wakeup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wakeup_payload: Option<serde_json::Value>,
}

impl Machine {
    /// Create a machine with no task.
    pub fn new(ip: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            alias: alias.into(),
            task: None,
            wakeup_payload: None,
        }
    }

    /// The effective task status; machines without a task report idle.
    pub fn task_status(&self) -> TaskStatus {
        self.task.as_ref().map(|t| t.status).unwrap_or_default()
    }

    /// Display name, falling back to the IP for unnamed machines.
    pub fn display_name(&self) -> &str {
        if self.alias.is_empty() {
            &self.ip
        } else {
            &self.alias
        }
    }
}

/// A person referenced by a Notion task assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Notion user id, if present
    pub id: Option<String>,
    /// Display name ("Unknown" when Notion omits it)
    pub name: String,
    /// Avatar URL, if present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// A task parsed from the Notion task board database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotionTask {
    /// Notion page id
    pub id: Option<String>,
    /// Task title ("Untitled" fallback)
    pub title: String,
    /// First sprint relation id, if any
    pub sprint: Option<String>,
    /// Status select name, or joined multi-select names ("No Status" fallback)
    pub status: String,
    /// Due date start value, if any
    pub due_date: Option<String>,
    /// Assigned people
    pub assigned_to: Vec<Person>,
    /// Short description rich text, joined
    pub short_description: String,
    /// Combined body text for the expanded view
    pub description: String,
    /// Completion flag
    pub completed: bool,
    /// Highlight flag
    pub highlighted: bool,
}

/// An entry parsed from the Notion leaderboard database.
///
/// `duration_secs` is already sanity-clamped: values outside `[0, 365 days)`
/// collapse to 0 during parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Notion page id
    pub id: Option<String>,
    /// User title ("Unknown" fallback)
    pub user: String,
    /// Units counted over the session
    pub count: f64,
    /// Session duration in seconds
    pub duration_secs: f64,
    /// Session start (falls back to page created time)
    pub start: Option<Timestamp>,
    /// Session end (falls back to page last-edited time)
    pub end: Option<Timestamp>,
    /// Free-form notes
    pub notes: String,
}

/// One row of aggregated counter-session analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSample {
    /// Grouping key (user name under the default grouping)
    #[serde(rename = "User")]
    pub user: String,
    /// Aggregated count
    #[serde(rename = "Count")]
    pub count: f64,
    /// Aggregated duration in seconds
    #[serde(rename = "Duration")]
    pub duration_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_removal_guard() {
        assert!(TaskStatus::Idle.allows_removal());
        assert!(!TaskStatus::Running.allows_removal());
        assert!(!TaskStatus::Paused.allows_removal());
    }

    #[test]
    fn test_machine_task_status_defaults_idle() {
        let machine = Machine::new("10.0.0.12", "counter-a");
        assert_eq!(machine.task_status(), TaskStatus::Idle);

        let mut busy = machine.clone();
        busy.task = Some(Task::running("batch-7", ""));
        assert_eq!(busy.task_status(), TaskStatus::Running);
    }

    #[test]
    fn test_machine_display_name_falls_back_to_ip() {
        let unnamed = Machine::new("10.0.0.9", "");
        assert_eq!(unnamed.display_name(), "10.0.0.9");
        let named = Machine::new("10.0.0.9", "mixer");
        assert_eq!(named.display_name(), "mixer");
    }

    #[test]
    fn test_task_wire_format() {
        let json = r#"{"taskName":"batch-7","notes":"","status":"paused"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.name, "batch-7");
        assert_eq!(task.status, TaskStatus::Paused);
    }

    #[test]
    fn test_session_sample_wire_format() {
        let json = r#"{"User":"alice","Count":42.0,"Duration":90.0}"#;
        let sample: SessionSample = serde_json::from_str(json).unwrap();
        assert_eq!(sample.user, "alice");
        assert_eq!(sample.duration_secs, 90.0);
    }
}
