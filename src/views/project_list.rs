use crate::client::ApiClient;
use crate::error::ViewError;
use crate::models::{CreateProjectInput, Project, ProjectId};

use super::Outcome;

/// Pending input for a new project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectForm {
    pub name: String,
    pub description: String,
}

/// The project list screen.
///
/// Failures set [`error`](Self::error) and leave the displayed projects alone.
#[derive(Debug)]
pub struct ProjectListView {
    client: ApiClient,
    projects: Vec<Project>,
    pub form: ProjectForm,
    loading: bool,
    error: Option<String>,
}

impl ProjectListView {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            projects: Vec::new(),
            form: ProjectForm::default(),
            loading: false,
            error: None,
        }
    }

    /// Build the view and fetch the projects.
    pub async fn open(client: ApiClient) -> Self {
        let mut view = Self::new(client);
        view.load().await;
        view
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Loading with nothing to show yet.
    pub fn is_initial_loading(&self) -> bool {
        self.loading && self.projects.is_empty()
    }

    /// Loading while projects stay on screen.
    pub fn is_updating(&self) -> bool {
        self.loading && !self.projects.is_empty()
    }

    pub async fn load(&mut self) -> Outcome {
        self.loading = true;
        self.error = None;
        let outcome = match self.client.list_projects().await {
            Ok(projects) => {
                self.projects = projects;
                Outcome::Applied
            }
            Err(e) => self.fail(e.into()),
        };
        self.loading = false;
        outcome
    }

    /// Create a project from [`form`](Self::form). The name must not be blank.
    pub async fn create(&mut self) -> Outcome {
        if self.form.name.trim().is_empty() {
            return self.fail(ViewError::validation("Project name is required."));
        }
        let description = self.form.description.trim();
        let input = CreateProjectInput {
            name: self.form.name.clone(),
            description: (!description.is_empty()).then(|| description.to_string()),
        };

        self.loading = true;
        self.error = None;
        let outcome = match self.client.create_project(&input).await {
            Ok(saved) => {
                match saved {
                    Some(project) => {
                        tracing::info!("Created project {} ({})", project.name, project.id)
                    }
                    None => tracing::info!("Created project {}", input.name),
                }
                self.form = ProjectForm::default();
                self.load().await
            }
            Err(e) => self.fail(e.into()),
        };
        self.loading = false;
        outcome
    }

    /// Delete a project. No confirmation is asked on this screen.
    pub async fn delete(&mut self, id: ProjectId) -> Outcome {
        self.loading = true;
        let outcome = match self.client.delete_project(id).await {
            Ok(()) => {
                tracing::info!("Deleted project {}", id);
                self.load().await
            }
            Err(e) => self.fail(e.into()),
        };
        self.loading = false;
        outcome
    }

    fn fail(&mut self, err: ViewError) -> Outcome {
        self.error = Some(err.to_string());
        Outcome::Rejected
    }
}
