use serde::{Deserialize, Serialize};

use super::{null_as_default, ProjectId, StageId, Task};

/// A named column within a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    /// Omitted by some backends when the stage is nested in its project.
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    pub name: String,
    /// Fractional sort key among the project's stages.
    #[serde(default)]
    pub order: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tasks: Vec<Task>,
}

/// Input for creating a new stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStageInput {
    pub name: String,
}

/// Input for updating an existing stage. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStageInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
}
