use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{date, null_as_default, nullable, StageId, Subtask, TaskId};

/// A card within a stage.
///
/// Tasks can move between stages; `stage_id` is reassigned and the task is
/// appended to the end of its new column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(default)]
    pub stage_id: Option<StageId>,
    pub content: String,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default, deserialize_with = "date::deserialize")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "date::deserialize")]
    pub end_date: Option<NaiveDate>,
    /// Fractional sort key among the stage's tasks.
    #[serde(default)]
    pub order: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subtasks: Vec<Subtask>,
}

impl Task {
    pub fn completed_subtasks(&self) -> usize {
        self.subtasks.iter().filter(|s| s.completed).count()
    }
}

/// Input for creating a new task within a stage.
///
/// Blank optional fields are sent as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTaskInput {
    pub content: String,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Input for updating a task. All fields are optional for partial updates.
///
/// Nullable fields use `Option<Option<_>>`: `None` leaves the field alone,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTaskInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "nullable"
    )]
    pub assignee: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "nullable"
    )]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "nullable"
    )]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_id: Option<StageId>,
}
