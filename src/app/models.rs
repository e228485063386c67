use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Lifecycle state of a task. Serialized lowercase on the wire
/// (`pending`, `inprogress`, `completed`); comparisons are exact and
/// case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    /// The next status in display order, wrapping around. Used by the
    /// form dialog to cycle the status field.
    pub fn next(self) -> TaskStatus {
        match self {
            TaskStatus::Pending => TaskStatus::InProgress,
            TaskStatus::InProgress => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In progress",
            TaskStatus::Completed => "Completed",
        };
        f.write_str(label)
    }
}

/// A task as persisted by the remote service. The `id` is assigned by the
/// server and never changes; drafts that have not been persisted yet are
/// represented by [`TaskDraft`], which carries no id at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    /// ISO-8601 date string. Kept as a string on purpose: ISO dates order
    /// lexicographically the same as chronologically, so the sort in the
    /// view pipeline compares these directly.
    pub due_date: String,
}

/// The mutable fields of a task, used as the body of create and update
/// requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub due_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("All fields are required.")]
    MissingFields,
    #[error("Due date must be a valid YYYY-MM-DD date")]
    BadDueDate,
}

impl TaskDraft {
    /// Checks the draft before it is allowed anywhere near the network.
    /// Title, description and due date must all be non-empty, and the due
    /// date must parse as a calendar date.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty()
            || self.description.trim().is_empty()
            || self.due_date.trim().is_empty()
        {
            return Err(ValidationError::MissingFields);
        }
        if NaiveDate::parse_from_str(&self.due_date, "%Y-%m-%d").is_err() {
            return Err(ValidationError::BadDueDate);
        }
        Ok(())
    }
}

/// Status filter applied by the dashboard; `All` keeps every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl StatusFilter {
    pub const TABS: [StatusFilter; 4] = [
        StatusFilter::All,
        StatusFilter::Only(TaskStatus::Pending),
        StatusFilter::Only(TaskStatus::InProgress),
        StatusFilter::Only(TaskStatus::Completed),
    ];

    pub fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => task.status == status,
        }
    }

    /// The next filter tab, wrapping around.
    pub fn next(self) -> StatusFilter {
        let idx = Self::TABS.iter().position(|f| *f == self).unwrap_or(0);
        Self::TABS[(idx + 1) % Self::TABS.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Only(TaskStatus::Pending) => "Pending",
            StatusFilter::Only(TaskStatus::InProgress) => "In progress",
            StatusFilter::Only(TaskStatus::Completed) => "Completed",
        }
    }
}
