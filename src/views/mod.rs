//! View models for the two screens and the task form.
//!
//! A view owns a snapshot fetched from the backend plus its local UI state.
//! Handlers never patch the snapshot; after every successful write the view
//! re-fetches from the backend.

mod board;
mod project_list;
mod task_form;

pub use board::*;
pub use project_list::*;
pub use task_form::*;

/// What a handler did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A request succeeded and the view was refreshed.
    Applied,
    /// Nothing to do: a boundary move, or the view is busy.
    Unchanged,
    /// The user declined the confirmation prompt.
    Cancelled,
    /// Validation or the request failed; see the view's `error()`.
    Rejected,
}

impl Outcome {
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }
}

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Events that end an inline edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineEvent {
    Blur,
    Enter,
    Escape,
}

/// An inline text edit in progress on one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineEdit<Id> {
    pub id: Id,
    pub text: String,
}
