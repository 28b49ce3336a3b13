//! App shell: routing between the project list and a board, plus the
//! backend health check.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::client::ApiClient;
use crate::models::ProjectId;
use crate::views::{BoardView, ProjectListView};

/// A screen address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `/`
    Projects,
    /// `/projects/{id}`
    Board(ProjectId),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("No route matches {0:?}")]
pub struct UnknownRoute(pub String);

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.split('/').filter(|seg| !seg.is_empty()).collect();
        match segments.as_slice() {
            [] => Ok(Self::Projects),
            ["projects", id] => id
                .parse()
                .map(Self::Board)
                .map_err(|_| UnknownRoute(s.to_string())),
            _ => Err(UnknownRoute(s.to_string())),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Projects => write!(f, "/"),
            Self::Board(id) => write!(f, "/projects/{}", id),
        }
    }
}

/// The view currently on screen.
#[derive(Debug)]
pub enum Screen {
    Projects(ProjectListView),
    Board(BoardView),
}

/// Result of the last health check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthCheck {
    pub message: Option<String>,
    pub error: Option<String>,
}

pub struct App {
    client: ApiClient,
    route: Route,
    screen: Option<Screen>,
    health: HealthCheck,
}

impl App {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            route: Route::Projects,
            screen: None,
            health: HealthCheck::default(),
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn screen(&self) -> Option<&Screen> {
        self.screen.as_ref()
    }

    pub fn screen_mut(&mut self) -> Option<&mut Screen> {
        self.screen.as_mut()
    }

    pub fn health(&self) -> &HealthCheck {
        &self.health
    }

    /// Switch screens. The previous view and its snapshot are dropped before
    /// the new one loads.
    pub async fn navigate(&mut self, route: Route) -> &mut Screen {
        tracing::debug!("Navigating to {}", route);
        self.route = route;
        self.screen = None;
        let screen = match route {
            Route::Projects => Screen::Projects(ProjectListView::open(self.client.clone()).await),
            Route::Board(id) => Screen::Board(BoardView::open(self.client.clone(), id).await),
        };
        self.screen.insert(screen)
    }

    /// Ping the backend's `/hello` endpoint.
    pub async fn check_health(&mut self) -> &HealthCheck {
        self.health = HealthCheck::default();
        match self.client.hello().await {
            Ok(message) => self.health.message = Some(message),
            Err(e) => self.health.error = Some(e.to_string()),
        }
        &self.health
    }
}
