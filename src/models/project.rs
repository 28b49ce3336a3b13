use serde::{Deserialize, Serialize};

use super::{null_as_default, ProjectId, Stage, StageId, Subtask, SubtaskId, Task, TaskId};

/// A project containing a board of stages.
///
/// Projects are the top-level organizational unit. The list endpoint returns
/// them without stages; see [`ProjectBoard`] for the nested form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Input for creating a new project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A project with its full stage/task/subtask tree, as returned by
/// `GET /projects/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectBoard {
    #[serde(flatten)]
    pub project: Project,
    /// Missing or `null` stages mean an empty board.
    #[serde(default, deserialize_with = "null_as_default")]
    pub stages: Vec<Stage>,
}

impl ProjectBoard {
    pub fn stage(&self, id: StageId) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == id)
    }

    /// Position of a stage among its siblings.
    pub fn stage_index(&self, id: StageId) -> Option<usize> {
        self.stages.iter().position(|s| s.id == id)
    }

    /// Find a task anywhere on the board along with the stage holding it.
    pub fn find_task(&self, id: TaskId) -> Option<(&Stage, &Task)> {
        self.stages
            .iter()
            .find_map(|stage| stage.tasks.iter().find(|t| t.id == id).map(|t| (stage, t)))
    }

    pub fn find_subtask(&self, id: SubtaskId) -> Option<&Subtask> {
        self.stages
            .iter()
            .flat_map(|stage| stage.tasks.iter())
            .flat_map(|task| task.subtasks.iter())
            .find(|s| s.id == id)
    }

    /// Iterate every task on the board in display order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.stages.iter().flat_map(|stage| stage.tasks.iter())
    }
}
