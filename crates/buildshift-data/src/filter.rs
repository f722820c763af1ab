//! Task board filtering and sorting.
//!
//! Filtering and sorting always run over the full fetched set; the caller
//! feeds the result back into a [`crate::window::PageWindow`], which resets
//! the visible window to the first page.

use buildshift_core::types::NotionTask;

/// Multi-field filter over the task board.
///
/// Empty fields match everything; set fields are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Exact status match, case-insensitive
    pub status: Option<String>,
    /// Assignee name substring, case-insensitive
    pub assignee: Option<String>,
    /// Title/description substring, case-insensitive
    pub search: String,
    /// Hide completed tasks
    pub hide_completed: bool,
}

impl TaskFilter {
    /// Returns true when no field constrains the set.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.assignee.is_none()
            && self.search.trim().is_empty()
            && !self.hide_completed
    }

    /// Whether a task passes every set field.
    pub fn matches(&self, task: &NotionTask) -> bool {
        if self.hide_completed && task.completed {
            return false;
        }

        if let Some(status) = &self.status {
            if !task.status.eq_ignore_ascii_case(status) {
                return false;
            }
        }

        if let Some(assignee) = &self.assignee {
            let needle = assignee.to_lowercase();
            let assigned = task
                .assigned_to
                .iter()
                .any(|p| p.name.to_lowercase().contains(&needle));
            if !assigned {
                return false;
            }
        }

        let search = self.search.trim().to_lowercase();
        if !search.is_empty() {
            let haystack = format!("{} {}", task.title, task.description).to_lowercase();
            if !haystack.contains(&search) {
                return false;
            }
        }

        true
    }
}

/// Ordering of the task board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Due date ascending, undated tasks last (the default)
    #[default]
    DueDate,
    /// Title, case-insensitive
    Title,
    /// Status name, grouping like statuses together
    Status,
}

impl SortMode {
    /// Cycle to the next mode.
    pub fn next(self) -> Self {
        match self {
            Self::DueDate => Self::Title,
            Self::Title => Self::Status,
            Self::Status => Self::DueDate,
        }
    }

    /// Display label for the status line.
    pub fn label(&self) -> &'static str {
        match self {
            Self::DueDate => "due date",
            Self::Title => "title",
            Self::Status => "status",
        }
    }
}

/// Filter and sort the full task set.
///
/// Sorting is stable, so backend order breaks ties.
pub fn apply(tasks: &[NotionTask], filter: &TaskFilter, sort: SortMode) -> Vec<NotionTask> {
    let mut out: Vec<NotionTask> = tasks.iter().filter(|t| filter.matches(t)).cloned().collect();

    match sort {
        SortMode::DueDate => {
            // ISO date strings compare correctly lexicographically; None sorts last
            out.sort_by(|a, b| match (&a.due_date, &b.due_date) {
                (Some(a), Some(b)) => a.cmp(b),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
        }
        SortMode::Title => {
            out.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        }
        SortMode::Status => {
            out.sort_by(|a, b| a.status.cmp(&b.status));
        }
    }

    out
}
