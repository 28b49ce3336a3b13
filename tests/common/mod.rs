//! In-process fake of the board backend for integration specs.
//!
//! Serves the REST contract from memory, records every request as
//! `"METHOD /path"`, and can be told to fail the next request.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;

use stageboard::client::ApiClient;
use stageboard::config::Config;
use stageboard::models::*;

type Shared = Arc<Mutex<Store>>;

pub struct Store {
    next_id: i64,
    projects: Vec<Project>,
    stages: Vec<Stage>,
    tasks: Vec<Task>,
    subtasks: Vec<Subtask>,
    requests: Vec<String>,
    fail_next: Option<(StatusCode, String)>,
    reply_next: Option<(StatusCode, String)>,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            next_id: 1000,
            projects: Vec::new(),
            stages: Vec::new(),
            tasks: Vec::new(),
            subtasks: Vec::new(),
            requests: Vec::new(),
            fail_next: None,
            reply_next: None,
        }
    }
}

impl Store {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn board(&self, project_id: ProjectId) -> Option<ProjectBoard> {
        let project = self.projects.iter().find(|p| p.id == project_id)?.clone();
        let stages = self
            .stages
            .iter()
            .filter(|s| s.project_id == Some(project_id))
            .map(|stage| Stage {
                tasks: self
                    .tasks
                    .iter()
                    .filter(|t| t.stage_id == Some(stage.id))
                    .map(|task| Task {
                        subtasks: self
                            .subtasks
                            .iter()
                            .filter(|s| s.task_id == Some(task.id))
                            .cloned()
                            .collect(),
                        ..task.clone()
                    })
                    .collect(),
                ..stage.clone()
            })
            .collect();
        Some(ProjectBoard { project, stages })
    }
}

/// A running fake backend.
pub struct Backend {
    store: Shared,
    pub base_url: String,
}

impl Backend {
    pub async fn spawn() -> Self {
        let store: Shared = Arc::new(Mutex::new(Store::default()));
        let app = router(store.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("No local address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Fake backend crashed");
        });
        Self {
            store,
            base_url: format!("http://{}", addr),
        }
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&Config::default().with_base_url(&self.base_url))
            .expect("Failed to build client")
    }

    fn store(&self) -> std::sync::MutexGuard<'_, Store> {
        self.store.lock().expect("store lock poisoned")
    }

    /// Requests seen so far, as `"METHOD /path"`.
    pub fn requests(&self) -> Vec<String> {
        self.store().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.store().requests.clear();
    }

    /// Make the next request fail with `status` and a raw `body`.
    pub fn fail_next(&self, status: StatusCode, body: &str) {
        self.store().fail_next = Some((status, body.to_string()));
    }

    /// Handle the next request normally, but answer a successful one with
    /// `status` and a raw `body` instead of the handler's response.
    pub fn reply_next(&self, status: StatusCode, body: &str) {
        self.store().reply_next = Some((status, body.to_string()));
    }

    pub fn insert_project(&self, id: ProjectId, name: &str) {
        self.store().projects.push(Project {
            id,
            name: name.to_string(),
            description: None,
        });
    }

    pub fn insert_stage(&self, id: StageId, project_id: ProjectId, name: &str, order: f64) {
        self.store().stages.push(Stage {
            id,
            project_id: Some(project_id),
            name: name.to_string(),
            order,
            tasks: vec![],
        });
    }

    pub fn insert_task(&self, id: TaskId, stage_id: StageId, content: &str, order: f64) {
        self.store().tasks.push(Task {
            id,
            stage_id: Some(stage_id),
            content: content.to_string(),
            assignee: None,
            start_date: None,
            end_date: None,
            order,
            subtasks: vec![],
        });
    }

    pub fn insert_subtask(&self, id: SubtaskId, task_id: TaskId, content: &str, order: f64) {
        self.store().subtasks.push(Subtask {
            id,
            task_id: Some(task_id),
            content: content.to_string(),
            completed: false,
            order,
        });
    }

    pub fn project_names(&self) -> Vec<String> {
        self.store().projects.iter().map(|p| p.name.clone()).collect()
    }

    pub fn stage(&self, id: StageId) -> Option<Stage> {
        self.store().stages.iter().find(|s| s.id == id).cloned()
    }

    pub fn task(&self, id: TaskId) -> Option<Task> {
        self.store().tasks.iter().find(|t| t.id == id).cloned()
    }

    pub fn subtask(&self, id: SubtaskId) -> Option<Subtask> {
        self.store().subtasks.iter().find(|s| s.id == id).cloned()
    }
}

fn router(store: Shared) -> Router {
    let api = Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/{id}", get(get_project).delete(delete_project))
        .route("/projects/{id}/stages", post(create_stage))
        .route("/stages/{id}", put(update_stage).delete(delete_stage))
        .route("/stages/{id}/tasks", post(create_task))
        .route("/tasks/{id}", put(update_task).delete(delete_task))
        .route("/tasks/{id}/subtasks", post(create_subtask))
        .route("/subtasks/{id}", put(update_subtask).delete(delete_subtask));

    Router::new()
        .nest("/api", api)
        .route("/hello", get(hello))
        .layer(middleware::from_fn_with_state(store.clone(), record_and_inject))
        .with_state(store)
}

/// Log the request and apply any pending injected failure or reply.
async fn record_and_inject(State(store): State<Shared>, request: Request, next: Next) -> Response {
    let (injected, reply) = {
        let mut store = store.lock().expect("store lock poisoned");
        store
            .requests
            .push(format!("{} {}", request.method(), request.uri().path()));
        (store.fail_next.take(), store.reply_next.take())
    };
    if let Some((status, body)) = injected {
        return (status, body).into_response();
    }
    let response = next.run(request).await;
    match reply {
        Some((status, body)) if response.status().is_success() => (status, body).into_response(),
        _ => response,
    }
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": format!("{} not found", what) })),
    )
        .into_response()
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
}

async fn hello() -> &'static str {
    "Hello from the board backend!"
}

// ============================================================
// Projects
// ============================================================

async fn list_projects(State(store): State<Shared>) -> Json<Vec<Project>> {
    let projects = store.lock().unwrap().projects.clone();
    Json(projects)
}

async fn create_project(
    State(store): State<Shared>,
    Json(input): Json<CreateProjectInput>,
) -> Result<(StatusCode, Json<Project>), Response> {
    if input.name.trim().is_empty() {
        return Err(bad_request("Project name is required"));
    }
    let mut store = store.lock().unwrap();
    let project = Project {
        id: store.allocate_id(),
        name: input.name,
        description: input.description,
    };
    store.projects.push(project.clone());
    Ok((StatusCode::CREATED, Json(project)))
}

async fn get_project(
    State(store): State<Shared>,
    Path(id): Path<ProjectId>,
) -> Result<Json<ProjectBoard>, Response> {
    let board = store.lock().unwrap().board(id);
    board.map(Json).ok_or_else(|| not_found("Project"))
}

async fn delete_project(State(store): State<Shared>, Path(id): Path<ProjectId>) -> Response {
    let mut store = store.lock().unwrap();
    let before = store.projects.len();
    store.projects.retain(|p| p.id != id);
    if store.projects.len() == before {
        return not_found("Project");
    }
    store.stages.retain(|s| s.project_id != Some(id));
    StatusCode::NO_CONTENT.into_response()
}

// ============================================================
// Stages
// ============================================================

async fn create_stage(
    State(store): State<Shared>,
    Path(project_id): Path<ProjectId>,
    Json(input): Json<CreateStageInput>,
) -> Result<(StatusCode, Json<Stage>), Response> {
    let mut store = store.lock().unwrap();
    if !store.projects.iter().any(|p| p.id == project_id) {
        return Err(not_found("Project"));
    }
    let order = store
        .stages
        .iter()
        .filter(|s| s.project_id == Some(project_id))
        .map(|s| s.order)
        .fold(0.0, f64::max)
        + 1.0;
    let stage = Stage {
        id: store.allocate_id(),
        project_id: Some(project_id),
        name: input.name,
        order,
        tasks: vec![],
    };
    store.stages.push(stage.clone());
    Ok((StatusCode::CREATED, Json(stage)))
}

async fn update_stage(
    State(store): State<Shared>,
    Path(id): Path<StageId>,
    Json(input): Json<UpdateStageInput>,
) -> Result<Json<Stage>, Response> {
    let mut store = store.lock().unwrap();
    let stage = store
        .stages
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or_else(|| not_found("Stage"))?;
    if let Some(name) = input.name {
        stage.name = name;
    }
    if let Some(order) = input.order {
        stage.order = order;
    }
    Ok(Json(stage.clone()))
}

async fn delete_stage(State(store): State<Shared>, Path(id): Path<StageId>) -> Response {
    let mut store = store.lock().unwrap();
    let before = store.stages.len();
    store.stages.retain(|s| s.id != id);
    if store.stages.len() == before {
        return not_found("Stage");
    }
    store.tasks.retain(|t| t.stage_id != Some(id));
    StatusCode::NO_CONTENT.into_response()
}

// ============================================================
// Tasks
// ============================================================

async fn create_task(
    State(store): State<Shared>,
    Path(stage_id): Path<StageId>,
    Json(input): Json<CreateTaskInput>,
) -> Result<(StatusCode, Json<Task>), Response> {
    let mut store = store.lock().unwrap();
    if !store.stages.iter().any(|s| s.id == stage_id) {
        return Err(not_found("Stage"));
    }
    let order = store
        .tasks
        .iter()
        .filter(|t| t.stage_id == Some(stage_id))
        .map(|t| t.order)
        .fold(-1.0, f64::max)
        + 1.0;
    let task = Task {
        id: store.allocate_id(),
        stage_id: Some(stage_id),
        content: input.content,
        assignee: input.assignee,
        start_date: input.start_date,
        end_date: input.end_date,
        order,
        subtasks: vec![],
    };
    store.tasks.push(task.clone());
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task(
    State(store): State<Shared>,
    Path(id): Path<TaskId>,
    Json(input): Json<UpdateTaskInput>,
) -> Result<Json<Task>, Response> {
    let mut store = store.lock().unwrap();
    if let Some(stage_id) = input.stage_id {
        if !store.stages.iter().any(|s| s.id == stage_id) {
            return Err(bad_request("Unknown stage"));
        }
    }
    let task = store
        .tasks
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| not_found("Task"))?;
    if let Some(content) = input.content {
        task.content = content;
    }
    if let Some(assignee) = input.assignee {
        task.assignee = assignee;
    }
    if let Some(start_date) = input.start_date {
        task.start_date = start_date;
    }
    if let Some(end_date) = input.end_date {
        task.end_date = end_date;
    }
    if let Some(order) = input.order {
        task.order = order;
    }
    if let Some(stage_id) = input.stage_id {
        task.stage_id = Some(stage_id);
    }
    Ok(Json(task.clone()))
}

async fn delete_task(State(store): State<Shared>, Path(id): Path<TaskId>) -> Response {
    let mut store = store.lock().unwrap();
    let before = store.tasks.len();
    store.tasks.retain(|t| t.id != id);
    if store.tasks.len() == before {
        return not_found("Task");
    }
    store.subtasks.retain(|s| s.task_id != Some(id));
    StatusCode::NO_CONTENT.into_response()
}

// ============================================================
// Subtasks
// ============================================================

async fn create_subtask(
    State(store): State<Shared>,
    Path(task_id): Path<TaskId>,
    Json(input): Json<CreateSubtaskInput>,
) -> Result<(StatusCode, Json<Subtask>), Response> {
    let mut store = store.lock().unwrap();
    if !store.tasks.iter().any(|t| t.id == task_id) {
        return Err(not_found("Task"));
    }
    let order = store
        .subtasks
        .iter()
        .filter(|s| s.task_id == Some(task_id))
        .map(|s| s.order)
        .fold(-1.0, f64::max)
        + 1.0;
    let subtask = Subtask {
        id: store.allocate_id(),
        task_id: Some(task_id),
        content: input.content,
        completed: input.completed,
        order,
    };
    store.subtasks.push(subtask.clone());
    Ok((StatusCode::CREATED, Json(subtask)))
}

async fn update_subtask(
    State(store): State<Shared>,
    Path(id): Path<SubtaskId>,
    Json(input): Json<UpdateSubtaskInput>,
) -> Result<Json<Subtask>, Response> {
    let mut store = store.lock().unwrap();
    let subtask = store
        .subtasks
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or_else(|| not_found("Subtask"))?;
    if let Some(content) = input.content {
        subtask.content = content;
    }
    if let Some(completed) = input.completed {
        subtask.completed = completed;
    }
    if let Some(order) = input.order {
        subtask.order = order;
    }
    Ok(Json(subtask.clone()))
}

async fn delete_subtask(State(store): State<Shared>, Path(id): Path<SubtaskId>) -> Response {
    let mut store = store.lock().unwrap();
    let before = store.subtasks.len();
    store.subtasks.retain(|s| s.id != id);
    if store.subtasks.len() == before {
        return not_found("Subtask");
    }
    StatusCode::NO_CONTENT.into_response()
}
