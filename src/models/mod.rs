//! Domain models for stageboard.
//!
//! # Core Concepts
//!
//! - [`Project`]: Top-level container. Its board is a list of stages.
//! - [`Stage`]: A named column within a project.
//! - [`Task`]: A card within a stage, with optional assignee and date range.
//! - [`Subtask`]: A checklist item within a task.
//!
//! Siblings are sequenced by a fractional `order` key. The backend owns every
//! entity; the client only holds snapshots fetched through [`crate::client`].

mod date;
mod project;
mod stage;
mod subtask;
mod task;

pub use date::parse_date;
pub use project::*;
pub use stage::*;
pub use subtask::*;
pub use task::*;

use serde::{Deserialize, Deserializer};

pub type ProjectId = i64;
pub type StageId = i64;
pub type TaskId = i64;
pub type SubtaskId = i64;

/// Treat a missing or `null` collection as its default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Distinguish an explicit `null` from a missing field in partial updates.
///
/// Pair with `#[serde(default)]` so a missing field stays `None` while
/// `null` becomes `Some(None)`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
