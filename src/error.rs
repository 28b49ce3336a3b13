//! Errors surfaced by the view models.

use thiserror::Error;

use crate::client::ClientError;

/// Anything that stops a view handler. Views display it as a single message.
#[derive(Debug, Error)]
pub enum ViewError {
    /// A required field was blank or malformed. Caught before any request.
    #[error("{0}")]
    Validation(String),

    /// Something the handler needed is not on the loaded board.
    #[error("{0}")]
    Missing(String),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl ViewError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn missing(msg: impl Into<String>) -> Self {
        Self::Missing(msg.into())
    }
}
