//! Error types for cart resolution.
//!
//! Policy outcomes (cart not found, wrong site, owned by someone else) are
//! never errors; resolution degrades to creating a new cart. `CartError` only
//! carries faults raised by collaborators, unchanged.

use thiserror::Error;

use crate::db::RepositoryError;

/// Error raised while resolving or remembering the current cart.
#[derive(Debug, Error)]
pub enum CartError {
    /// Cart repository operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(String),

    /// Customer directory or currency catalog lookup failed.
    #[error("Directory error: {0}")]
    Directory(String),

    /// Cart evaluation failed.
    #[error("Evaluation error: {0}")]
    Evaluation(String),
}

impl From<tower_sessions::session::Error> for CartError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Session(err.to_string())
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
