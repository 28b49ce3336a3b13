//! Kanban board client: projects hold ordered stages, stages hold ordered
//! tasks, tasks hold ordered subtasks. The backend owns all data; this crate
//! fetches it, renders it, and drives edits through the REST API.

pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod ordering;
pub mod render;
pub mod views;
