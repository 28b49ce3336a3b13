use serde::{Deserialize, Serialize};

use super::{SubtaskId, TaskId};

/// A checklist item within a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: SubtaskId,
    #[serde(default)]
    pub task_id: Option<TaskId>,
    pub content: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub order: f64,
}

/// Input for creating a subtask. New subtasks start out not completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubtaskInput {
    pub content: String,
    pub completed: bool,
}

/// Input for updating a subtask. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSubtaskInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
}
