//! Task lifecycle state machine.
//!
//! Machines carry at most one task, stepping through
//! `idle -> running <-> paused`, with kill returning to idle from either
//! active state. Transitions are applied optimistically to local state and
//! then mirrored to the backend as a [`TaskUpdate`]; the remote call is
//! advisory logging, so local state is never rolled back on failure.

use serde::{Deserialize, Serialize};

use buildshift_core::error::{BuildShiftError, Result};
use buildshift_core::types::{Machine, Task, TaskStatus, Timestamp, now};

/// User-triggered task transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
    /// Begin a new task on an idle machine
    Start { name: String, notes: String },
    /// Pause a running task
    Pause,
    /// Resume a paused task
    Resume,
    /// Kill a running or paused task, returning the machine to idle
    Kill,
}

impl TaskAction {
    /// The status string carried by the backend notification.
    ///
    /// `kill` is an action on the wire, not a state; everything else mirrors
    /// the post-transition status.
    pub fn wire_status(&self) -> &'static str {
        match self {
            Self::Start { .. } | Self::Resume => "running",
            Self::Pause => "paused",
            Self::Kill => "kill",
        }
    }

    /// Whether this action is legal from the given status.
    pub fn is_legal_from(&self, status: TaskStatus) -> bool {
        match self {
            Self::Start { .. } => status == TaskStatus::Idle,
            Self::Pause => status == TaskStatus::Running,
            Self::Resume => status == TaskStatus::Paused,
            Self::Kill => matches!(status, TaskStatus::Running | TaskStatus::Paused),
        }
    }
}

/// Best-effort notification mirrored to the backend after a transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub ip: String,
    pub alias: String,
    #[serde(rename = "taskName")]
    pub task_name: String,
    pub notes: String,
    pub status: String,
    pub timestamp: Timestamp,
}

/// Apply a transition to the machine's local state.
///
/// On success the machine reflects the new state and the returned
/// [`TaskUpdate`] is ready to post. Illegal transitions and invalid payloads
/// leave the machine untouched.
pub fn apply(machine: &mut Machine, action: TaskAction) -> Result<TaskUpdate> {
    let status = machine.task_status();
    if !action.is_legal_from(status) {
        return Err(BuildShiftError::IllegalTransition {
            ip: machine.ip.clone(),
            from: status.to_string(),
            to: action.wire_status().to_string(),
        });
    }

    // Non-kill updates need a task name and a machine alias on the wire
    if !matches!(action, TaskAction::Kill) && machine.alias.is_empty() {
        return Err(BuildShiftError::TaskInvalid {
            message: format!("machine {} has no alias", machine.ip),
        });
    }

    let wire_status = action.wire_status().to_string();
    let (task_name, notes) = match action {
        TaskAction::Start { name, notes } => {
            if name.trim().is_empty() {
                return Err(BuildShiftError::TaskInvalid {
                    message: "task name must not be empty".into(),
                });
            }
            machine.task = Some(Task::running(name.clone(), notes.clone()));
            (name, notes)
        }
        TaskAction::Pause => {
            // Legality check guarantees a task is present
            let task = machine.task.as_mut().ok_or_else(|| {
                BuildShiftError::internal("pause on machine without task")
            })?;
            task.status = TaskStatus::Paused;
            (task.name.clone(), task.notes.clone())
        }
        TaskAction::Resume => {
            let task = machine.task.as_mut().ok_or_else(|| {
                BuildShiftError::internal("resume on machine without task")
            })?;
            task.status = TaskStatus::Running;
            (task.name.clone(), task.notes.clone())
        }
        TaskAction::Kill => {
            let task = machine.task.take().ok_or_else(|| {
                BuildShiftError::internal("kill on machine without task")
            })?;
            (task.name, task.notes)
        }
    };

    Ok(TaskUpdate {
        ip: machine.ip.clone(),
        alias: machine.alias.clone(),
        task_name,
        notes,
        status: wire_status,
        timestamp: now(),
    })
}

/// Reject machine removal while a task is active or paused.
pub fn ensure_removable(machine: &Machine) -> Result<()> {
    let status = machine.task_status();
    if status.allows_removal() {
        Ok(())
    } else {
        Err(BuildShiftError::MachineBusy {
            ip: machine.ip.clone(),
            status: status.to_string(),
        })
    }
}

/// Validate a machine payload before posting it.
///
/// The backend requires both an alias and an IP.
pub fn validate_machine(machine: &Machine) -> Result<()> {
    if machine.ip.trim().is_empty() || machine.alias.trim().is_empty() {
        return Err(BuildShiftError::MachineInvalid {
            message: "machine needs both an alias and an IP".into(),
        });
    }
    Ok(())
}
