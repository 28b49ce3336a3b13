use chrono::NaiveDate;

use crate::models::{parse_date, CreateTaskInput, StageId, Task, TaskId, UpdateTaskInput};

/// A validated task ready to be saved.
///
/// Blank optional fields are already `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    /// Set when editing an existing task.
    pub id: Option<TaskId>,
    pub stage_id: StageId,
    pub content: String,
    pub assignee: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl TaskDraft {
    pub fn to_create_input(&self) -> CreateTaskInput {
        CreateTaskInput {
            content: self.content.clone(),
            assignee: self.assignee.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    /// Every editable field is sent so cleared values reach the backend as `null`.
    pub fn to_update_input(&self) -> UpdateTaskInput {
        UpdateTaskInput {
            content: Some(self.content.clone()),
            assignee: Some(self.assignee.clone()),
            start_date: Some(self.start_date),
            end_date: Some(self.end_date),
            stage_id: Some(self.stage_id),
            ..Default::default()
        }
    }
}

/// The create/edit task form.
///
/// Fields hold raw user input. [`submit`](Self::submit) validates it and
/// produces a [`TaskDraft`]; the form itself never talks to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskForm {
    task_id: Option<TaskId>,
    stage_id: StageId,
    pub content: String,
    pub assignee: String,
    /// `YYYY-MM-DD` or blank.
    pub start_date: String,
    /// `YYYY-MM-DD` or blank.
    pub end_date: String,
    error: Option<String>,
}

impl TaskForm {
    /// An empty form for a new task in `stage_id`.
    pub fn create(stage_id: StageId) -> Self {
        Self {
            task_id: None,
            stage_id,
            content: String::new(),
            assignee: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            error: None,
        }
    }

    /// A form pre-filled from an existing task.
    pub fn edit(task: &Task, stage_id: StageId) -> Self {
        Self {
            task_id: Some(task.id),
            stage_id: task.stage_id.unwrap_or(stage_id),
            content: task.content.clone(),
            assignee: task.assignee.clone().unwrap_or_default(),
            start_date: format_date(task.start_date),
            end_date: format_date(task.end_date),
            error: None,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.task_id.is_some()
    }

    pub fn task_id(&self) -> Option<TaskId> {
        self.task_id
    }

    pub fn stage_id(&self) -> StageId {
        self.stage_id
    }

    pub fn title(&self) -> &'static str {
        if self.is_edit() {
            "Edit Task"
        } else {
            "Create New Task"
        }
    }

    /// Local validation error from the last submit.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Validate the form. On failure the error is kept on the form and `None`
    /// is returned.
    pub fn submit(&mut self) -> Option<TaskDraft> {
        match self.validate() {
            Ok(draft) => {
                self.error = None;
                Some(draft)
            }
            Err(msg) => {
                self.error = Some(msg.to_string());
                None
            }
        }
    }

    fn validate(&self) -> Result<TaskDraft, &'static str> {
        if self.content.trim().is_empty() {
            return Err("Task content cannot be empty.");
        }
        let start_date =
            optional_date(&self.start_date).ok_or("Start date must be YYYY-MM-DD.")?;
        let end_date = optional_date(&self.end_date).ok_or("End date must be YYYY-MM-DD.")?;

        Ok(TaskDraft {
            id: self.task_id,
            stage_id: self.stage_id,
            content: self.content.clone(),
            assignee: non_blank(&self.assignee),
            start_date,
            end_date,
        })
    }
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// `Some(None)` for a blank field, `None` when it does not parse.
fn optional_date(s: &str) -> Option<Option<NaiveDate>> {
    if s.trim().is_empty() {
        Some(None)
    } else {
        parse_date(s).map(Some)
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
