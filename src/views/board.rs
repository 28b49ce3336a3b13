use std::collections::HashMap;
use std::future::Future;

use crate::client::{ApiClient, ClientError};
use crate::error::ViewError;
use crate::models::*;
use crate::ordering::{self, Direction};

use super::{Confirm, InlineEdit, InlineEvent, Outcome, TaskDraft, TaskForm};

/// Where the board is in its load cycle. Derived from the view's flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardStatus {
    /// First fetch in flight, nothing to show.
    Loading,
    /// Data present. Later failures show next to it.
    Ready,
    /// First fetch failed; there is no data.
    Failed,
    /// Fetch finished with neither data nor error.
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageMove {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskMove {
    Up,
    Down,
    /// Reassign to another stage, appended after its last task.
    ToStage(StageId),
}

/// Local UI state for one task card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskViewState {
    /// Whether the subtask list is shown.
    pub expanded: bool,
    /// Pending content for a new subtask.
    pub subtask_draft: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadMode {
    Initial,
    Updating,
}

/// One order rewrite planned by [`BoardView::renormalize`].
#[derive(Debug, Clone, Copy)]
enum Rewrite {
    Stage(StageId, f64),
    Task(TaskId, f64),
    Subtask(SubtaskId, f64),
}

/// The board screen for one project.
///
/// Every mutation handler sets `updating`, issues one request and, on
/// success, re-fetches the whole project tree. On failure the error is kept
/// and the board on screen is left as it was. While `updating` is set,
/// handlers do nothing and return [`Outcome::Unchanged`].
#[derive(Debug)]
pub struct BoardView {
    client: ApiClient,
    project_id: ProjectId,
    board: Option<ProjectBoard>,
    loading: bool,
    updating: bool,
    error: Option<String>,
    /// Pending name for a new stage.
    pub new_stage_name: String,
    stage_edit: Option<InlineEdit<StageId>>,
    subtask_edit: Option<InlineEdit<SubtaskId>>,
    task_form: Option<TaskForm>,
    task_states: HashMap<TaskId, TaskViewState>,
}

impl BoardView {
    pub fn new(client: ApiClient, project_id: ProjectId) -> Self {
        Self {
            client,
            project_id,
            board: None,
            loading: true,
            updating: false,
            error: None,
            new_stage_name: String::new(),
            stage_edit: None,
            subtask_edit: None,
            task_form: None,
            task_states: HashMap::new(),
        }
    }

    /// Build the view and fetch the project tree.
    pub async fn open(client: ApiClient, project_id: ProjectId) -> Self {
        let mut view = Self::new(client, project_id);
        view.load(LoadMode::Initial).await;
        view
    }

    // ============================================================
    // State
    // ============================================================

    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub fn board(&self) -> Option<&ProjectBoard> {
        self.board.as_ref()
    }

    pub fn status(&self) -> BoardStatus {
        if self.loading {
            BoardStatus::Loading
        } else if self.board.is_some() {
            BoardStatus::Ready
        } else if self.error.is_some() {
            BoardStatus::Failed
        } else {
            BoardStatus::NotFound
        }
    }

    pub fn is_updating(&self) -> bool {
        self.updating
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn stage_edit(&self) -> Option<&InlineEdit<StageId>> {
        self.stage_edit.as_ref()
    }

    pub fn subtask_edit(&self) -> Option<&InlineEdit<SubtaskId>> {
        self.subtask_edit.as_ref()
    }

    pub fn task_form(&self) -> Option<&TaskForm> {
        self.task_form.as_ref()
    }

    pub fn task_form_mut(&mut self) -> Option<&mut TaskForm> {
        self.task_form.as_mut()
    }

    pub fn task_state(&self, task_id: TaskId) -> Option<&TaskViewState> {
        self.task_states.get(&task_id)
    }

    pub fn is_expanded(&self, task_id: TaskId) -> bool {
        self.task_state(task_id).is_some_and(|s| s.expanded)
    }

    fn is_busy(&self) -> bool {
        self.loading || self.updating
    }

    fn loaded(&self) -> Result<&ProjectBoard, ViewError> {
        self.board
            .as_ref()
            .ok_or_else(|| ViewError::missing("Project board is not loaded."))
    }

    // ============================================================
    // Loading
    // ============================================================

    /// Re-fetch the project tree, keeping the current board on screen.
    pub async fn reload(&mut self) {
        self.load(LoadMode::Updating).await;
    }

    async fn load(&mut self, mode: LoadMode) {
        match mode {
            LoadMode::Initial => self.loading = true,
            LoadMode::Updating => self.updating = true,
        }
        self.error = None;

        match self.client.get_project(self.project_id).await {
            Ok(mut board) => {
                ordering::sort_board(&mut board);
                if ordering::board_is_crowded(&board) {
                    tracing::warn!(
                        "Project {} has sibling orders closer than {}; consider renormalizing",
                        self.project_id,
                        ordering::CROWDED_GAP
                    );
                }
                tracing::debug!(
                    "Loaded project {} with {} stages",
                    self.project_id,
                    board.stages.len()
                );
                self.board = Some(board);
            }
            Err(e) => {
                self.error = Some(e.to_string());
            }
        }

        match mode {
            LoadMode::Initial => self.loading = false,
            LoadMode::Updating => self.updating = false,
        }
    }

    /// Run one request, then reload on success.
    async fn commit<T>(
        &mut self,
        request: impl Future<Output = Result<T, ClientError>>,
    ) -> Result<Outcome, ViewError> {
        self.updating = true;
        self.error = None;
        match request.await {
            Ok(_) => {
                self.load(LoadMode::Updating).await;
                Ok(Outcome::Applied)
            }
            Err(e) => {
                self.updating = false;
                Err(e.into())
            }
        }
    }

    /// Record a handler failure for display.
    fn settle(&mut self, result: Result<Outcome, ViewError>) -> Outcome {
        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                self.error = Some(e.to_string());
                Outcome::Rejected
            }
        }
    }

    // ============================================================
    // Stages
    // ============================================================

    /// Create a stage named [`new_stage_name`](Self::new_stage_name).
    pub async fn create_stage(&mut self) -> Outcome {
        let result = self.try_create_stage().await;
        self.settle(result)
    }

    async fn try_create_stage(&mut self) -> Result<Outcome, ViewError> {
        if self.is_busy() {
            return Ok(Outcome::Unchanged);
        }
        if self.new_stage_name.trim().is_empty() {
            return Err(ViewError::validation("Stage name cannot be empty."));
        }
        let client = self.client.clone();
        let project_id = self.project_id;
        let input = CreateStageInput {
            name: self.new_stage_name.clone(),
        };
        let outcome = self.commit(client.create_stage(project_id, &input)).await?;
        self.new_stage_name.clear();
        Ok(outcome)
    }

    /// Start renaming a stage inline. Returns false if the stage is unknown
    /// or the board is busy.
    pub fn begin_stage_rename(&mut self, stage_id: StageId) -> bool {
        if self.is_busy() {
            return false;
        }
        let Some(stage) = self.board.as_ref().and_then(|b| b.stage(stage_id)) else {
            return false;
        };
        self.stage_edit = Some(InlineEdit {
            id: stage_id,
            text: stage.name.clone(),
        });
        true
    }

    pub fn set_stage_rename_text(&mut self, text: impl Into<String>) {
        if let Some(edit) = self.stage_edit.as_mut() {
            edit.text = text.into();
        }
    }

    /// Blur and Enter commit the rename. Escape is ignored.
    pub async fn stage_rename_event(&mut self, event: InlineEvent) -> Outcome {
        match event {
            InlineEvent::Blur | InlineEvent::Enter => self.commit_stage_rename().await,
            InlineEvent::Escape => Outcome::Unchanged,
        }
    }

    pub async fn commit_stage_rename(&mut self) -> Outcome {
        let result = self.try_commit_stage_rename().await;
        self.settle(result)
    }

    async fn try_commit_stage_rename(&mut self) -> Result<Outcome, ViewError> {
        if self.is_busy() {
            return Ok(Outcome::Unchanged);
        }
        let Some(edit) = self.stage_edit.clone() else {
            return Ok(Outcome::Unchanged);
        };
        if edit.text.trim().is_empty() {
            return Err(ViewError::validation("Stage name cannot be empty."));
        }
        let client = self.client.clone();
        let input = UpdateStageInput {
            name: Some(edit.text),
            ..Default::default()
        };
        let outcome = self.commit(client.update_stage(edit.id, &input)).await?;
        self.stage_edit = None;
        Ok(outcome)
    }

    pub async fn delete_stage(&mut self, stage_id: StageId, confirm: &impl Confirm) -> Outcome {
        if self.is_busy() {
            return Outcome::Unchanged;
        }
        if !confirm.confirm("Delete this stage? This cannot be undone.") {
            return Outcome::Cancelled;
        }
        let client = self.client.clone();
        let result = self.commit(client.delete_stage(stage_id)).await;
        self.settle(result)
    }

    /// Move a stage one column left or right. A no-op at either edge.
    pub async fn move_stage(&mut self, stage_id: StageId, direction: StageMove) -> Outcome {
        let result = self.try_move_stage(stage_id, direction).await;
        self.settle(result)
    }

    async fn try_move_stage(
        &mut self,
        stage_id: StageId,
        direction: StageMove,
    ) -> Result<Outcome, ViewError> {
        if self.is_busy() {
            return Ok(Outcome::Unchanged);
        }
        let target = {
            let board = self.loaded()?;
            let index = ordering::index_of(&board.stages, stage_id)
                .ok_or_else(|| ViewError::missing(format!("Stage {} not found.", stage_id)))?;
            let direction = match direction {
                StageMove::Left => Direction::Earlier,
                StageMove::Right => Direction::Later,
            };
            ordering::shifted_order(&board.stages, index, direction)
        };
        let Some(order) = target else {
            return Ok(Outcome::Unchanged);
        };

        let client = self.client.clone();
        let input = UpdateStageInput {
            order: Some(order),
            ..Default::default()
        };
        self.commit(client.update_stage(stage_id, &input)).await
    }

    // ============================================================
    // Tasks
    // ============================================================

    /// Open the task form: empty for a new task in `stage_id`, or pre-filled
    /// when `task_id` is given. Returns false if the board is busy or the
    /// task is unknown.
    pub fn open_task_form(&mut self, stage_id: StageId, task_id: Option<TaskId>) -> bool {
        if self.is_busy() {
            return false;
        }
        let form = match task_id {
            Some(id) => match self.board.as_ref().and_then(|b| b.find_task(id)) {
                Some((_, task)) => TaskForm::edit(task, stage_id),
                None => return false,
            },
            None => TaskForm::create(stage_id),
        };
        self.task_form = Some(form);
        self.error = None;
        true
    }

    pub fn close_task_form(&mut self) {
        self.task_form = None;
    }

    /// Validate and save the open task form.
    ///
    /// A validation failure stays on the form and issues no request. A
    /// failed save keeps the form open so it can be retried.
    pub async fn submit_task_form(&mut self) -> Outcome {
        if self.is_busy() {
            return Outcome::Unchanged;
        }
        let Some(form) = self.task_form.as_mut() else {
            return self.settle(Err(ViewError::missing("No task form is open.")));
        };
        match form.submit() {
            Some(draft) => self.save_task(draft).await,
            None => Outcome::Rejected,
        }
    }

    /// Create or update a task from a validated draft, then close the form.
    pub async fn save_task(&mut self, draft: TaskDraft) -> Outcome {
        let result = self.try_save_task(draft).await;
        self.settle(result)
    }

    async fn try_save_task(&mut self, draft: TaskDraft) -> Result<Outcome, ViewError> {
        if self.is_busy() {
            return Ok(Outcome::Unchanged);
        }
        let client = self.client.clone();
        let outcome = match draft.id {
            Some(id) => {
                let input = draft.to_update_input();
                self.commit(client.update_task(id, &input)).await?
            }
            None => {
                let input = draft.to_create_input();
                self.commit(client.create_task(draft.stage_id, &input)).await?
            }
        };
        self.close_task_form();
        Ok(outcome)
    }

    pub async fn delete_task(&mut self, task_id: TaskId, confirm: &impl Confirm) -> Outcome {
        if self.is_busy() {
            return Outcome::Unchanged;
        }
        if !confirm.confirm("Delete this task? This cannot be undone.") {
            return Outcome::Cancelled;
        }
        let client = self.client.clone();
        let result = self.commit(client.delete_task(task_id)).await;
        self.settle(result)
    }

    /// Reorder a task within its stage or send it to the end of another stage.
    pub async fn move_task(&mut self, task_id: TaskId, movement: TaskMove) -> Outcome {
        let result = self.try_move_task(task_id, movement).await;
        self.settle(result)
    }

    async fn try_move_task(
        &mut self,
        task_id: TaskId,
        movement: TaskMove,
    ) -> Result<Outcome, ViewError> {
        if self.is_busy() {
            return Ok(Outcome::Unchanged);
        }
        let input = {
            let board = self.loaded()?;
            let (source, _) = board.find_task(task_id).ok_or_else(|| {
                ViewError::missing(format!("Task {} is not in any stage.", task_id))
            })?;

            match movement {
                TaskMove::ToStage(target) if target == source.id => None,
                TaskMove::ToStage(target) => {
                    let destination = board.stage(target).ok_or_else(|| {
                        ViewError::missing(format!("Destination stage {} not found.", target))
                    })?;
                    Some(UpdateTaskInput {
                        stage_id: Some(target),
                        order: Some(ordering::append_order(&destination.tasks)),
                        ..Default::default()
                    })
                }
                TaskMove::Up | TaskMove::Down => {
                    let direction = if movement == TaskMove::Up {
                        Direction::Earlier
                    } else {
                        Direction::Later
                    };
                    let index = ordering::index_of(&source.tasks, task_id).ok_or_else(|| {
                        ViewError::missing(format!("Task {} not found.", task_id))
                    })?;
                    ordering::shifted_order(&source.tasks, index, direction).map(|order| {
                        UpdateTaskInput {
                            order: Some(order),
                            ..Default::default()
                        }
                    })
                }
            }
        };
        let Some(input) = input else {
            return Ok(Outcome::Unchanged);
        };

        let client = self.client.clone();
        self.commit(client.update_task(task_id, &input)).await
    }

    // ============================================================
    // Subtasks
    // ============================================================

    /// Show or hide a task's subtasks. Purely local.
    pub fn toggle_subtasks(&mut self, task_id: TaskId) {
        let state = self.task_states.entry(task_id).or_default();
        state.expanded = !state.expanded;
    }

    /// Show the subtasks of every task on the board.
    pub fn expand_all(&mut self) {
        let ids: Vec<TaskId> = self
            .board
            .iter()
            .flat_map(|b| b.tasks().map(|t| t.id))
            .collect();
        for id in ids {
            self.task_states.entry(id).or_default().expanded = true;
        }
    }

    pub fn set_subtask_draft(&mut self, task_id: TaskId, content: impl Into<String>) {
        self.task_states.entry(task_id).or_default().subtask_draft = content.into();
    }

    pub fn subtask_draft(&self, task_id: TaskId) -> &str {
        self.task_state(task_id)
            .map(|s| s.subtask_draft.as_str())
            .unwrap_or_default()
    }

    /// Add a subtask to `task_id` from its pending draft.
    pub async fn create_subtask(&mut self, task_id: TaskId) -> Outcome {
        let result = self.try_create_subtask(task_id).await;
        self.settle(result)
    }

    async fn try_create_subtask(&mut self, task_id: TaskId) -> Result<Outcome, ViewError> {
        if self.is_busy() {
            return Ok(Outcome::Unchanged);
        }
        let content = self.subtask_draft(task_id).to_string();
        if content.trim().is_empty() {
            return Err(ViewError::validation(format!(
                "Subtask content for task {} cannot be empty.",
                task_id
            )));
        }
        let client = self.client.clone();
        let input = CreateSubtaskInput {
            content,
            completed: false,
        };
        let outcome = self.commit(client.create_subtask(task_id, &input)).await?;
        if let Some(state) = self.task_states.get_mut(&task_id) {
            state.subtask_draft.clear();
        }
        Ok(outcome)
    }

    pub async fn toggle_subtask(&mut self, subtask_id: SubtaskId) -> Outcome {
        let result = self.try_toggle_subtask(subtask_id).await;
        self.settle(result)
    }

    async fn try_toggle_subtask(&mut self, subtask_id: SubtaskId) -> Result<Outcome, ViewError> {
        if self.is_busy() {
            return Ok(Outcome::Unchanged);
        }
        let completed = self
            .loaded()?
            .find_subtask(subtask_id)
            .map(|s| s.completed)
            .ok_or_else(|| ViewError::missing(format!("Subtask {} not found.", subtask_id)))?;

        let client = self.client.clone();
        let input = UpdateSubtaskInput {
            completed: Some(!completed),
            ..Default::default()
        };
        self.commit(client.update_subtask(subtask_id, &input)).await
    }

    /// Start editing a subtask inline. Returns false if it is unknown or the
    /// board is busy.
    pub fn begin_subtask_edit(&mut self, subtask_id: SubtaskId) -> bool {
        if self.is_busy() {
            return false;
        }
        let Some(subtask) = self.board.as_ref().and_then(|b| b.find_subtask(subtask_id)) else {
            return false;
        };
        self.subtask_edit = Some(InlineEdit {
            id: subtask_id,
            text: subtask.content.clone(),
        });
        self.error = None;
        true
    }

    pub fn set_subtask_edit_text(&mut self, text: impl Into<String>) {
        if let Some(edit) = self.subtask_edit.as_mut() {
            edit.text = text.into();
        }
    }

    pub fn cancel_subtask_edit(&mut self) {
        self.subtask_edit = None;
    }

    /// Blur and Enter commit the edit; Escape drops it without saving.
    pub async fn subtask_edit_event(&mut self, event: InlineEvent) -> Outcome {
        match event {
            InlineEvent::Blur | InlineEvent::Enter => self.commit_subtask_edit().await,
            InlineEvent::Escape => {
                self.cancel_subtask_edit();
                Outcome::Unchanged
            }
        }
    }

    pub async fn commit_subtask_edit(&mut self) -> Outcome {
        let result = self.try_commit_subtask_edit().await;
        self.settle(result)
    }

    async fn try_commit_subtask_edit(&mut self) -> Result<Outcome, ViewError> {
        if self.is_busy() {
            return Ok(Outcome::Unchanged);
        }
        let Some(edit) = self.subtask_edit.clone() else {
            return Ok(Outcome::Unchanged);
        };
        if edit.text.trim().is_empty() {
            return Err(ViewError::validation("Subtask content cannot be empty."));
        }
        let client = self.client.clone();
        let input = UpdateSubtaskInput {
            content: Some(edit.text),
            ..Default::default()
        };
        let outcome = self.commit(client.update_subtask(edit.id, &input)).await?;
        self.subtask_edit = None;
        Ok(outcome)
    }

    pub async fn delete_subtask(&mut self, subtask_id: SubtaskId, confirm: &impl Confirm) -> Outcome {
        if self.is_busy() {
            return Outcome::Unchanged;
        }
        if !confirm.confirm("Delete this subtask? This cannot be undone.") {
            return Outcome::Cancelled;
        }
        let client = self.client.clone();
        let result = self.commit(client.delete_subtask(subtask_id)).await;
        self.settle(result)
    }

    // ============================================================
    // Maintenance
    // ============================================================

    /// Rewrite every sibling list on the board to orders `0, 1, 2, ...`.
    ///
    /// Only entries whose order changes are sent, one request at a time. The
    /// first failure stops the run without reloading.
    pub async fn renormalize(&mut self) -> Outcome {
        let result = self.try_renormalize().await;
        self.settle(result)
    }

    async fn try_renormalize(&mut self) -> Result<Outcome, ViewError> {
        if self.is_busy() {
            return Ok(Outcome::Unchanged);
        }
        let plan = renormalize_plan(self.loaded()?);
        if plan.is_empty() {
            return Ok(Outcome::Unchanged);
        }
        tracing::info!(
            "Renormalizing {} orders on project {}",
            plan.len(),
            self.project_id
        );

        self.updating = true;
        self.error = None;
        for rewrite in plan {
            let result = match rewrite {
                Rewrite::Stage(id, order) => {
                    let input = UpdateStageInput {
                        order: Some(order),
                        ..Default::default()
                    };
                    self.client.update_stage(id, &input).await.map(drop)
                }
                Rewrite::Task(id, order) => {
                    let input = UpdateTaskInput {
                        order: Some(order),
                        ..Default::default()
                    };
                    self.client.update_task(id, &input).await.map(drop)
                }
                Rewrite::Subtask(id, order) => {
                    let input = UpdateSubtaskInput {
                        order: Some(order),
                        ..Default::default()
                    };
                    self.client.update_subtask(id, &input).await.map(drop)
                }
            };
            if let Err(e) = result {
                self.updating = false;
                return Err(e.into());
            }
        }

        self.load(LoadMode::Updating).await;
        Ok(Outcome::Applied)
    }
}

fn renormalize_plan(board: &ProjectBoard) -> Vec<Rewrite> {
    let mut plan: Vec<Rewrite> = ordering::renormalized(&board.stages)
        .into_iter()
        .map(|(id, order)| Rewrite::Stage(id, order))
        .collect();
    for stage in &board.stages {
        plan.extend(
            ordering::renormalized(&stage.tasks)
                .into_iter()
                .map(|(id, order)| Rewrite::Task(id, order)),
        );
        for task in &stage.tasks {
            plan.extend(
                ordering::renormalized(&task.subtasks)
                    .into_iter()
                    .map(|(id, order)| Rewrite::Subtask(id, order)),
            );
        }
    }
    plan
}
