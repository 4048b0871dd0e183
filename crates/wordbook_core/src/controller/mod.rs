//! Screen-scoped state holders between the repository and presentation.
//!
//! # Responsibility
//! - Hold UI-visible state as read-only `watch` receivers.
//! - Turn every command outcome into at most one `WordEvent`.
//!
//! # Invariants
//! - No error crosses into presentation; failures become `WordEvent::Error`.
//! - UI-visible state changes only after the store confirmed an outcome.

use crate::model::word::{WordId, WordValidationError};
use crate::repo::word_store::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod create;
pub mod edit;
pub mod events;
pub mod list;
pub mod sort;

/// Failure of a controller command, rendered into a user-visible message.
#[derive(Debug)]
pub enum WordError {
    /// A required field was blank. Raised before any persistence attempt.
    Validation(WordValidationError),
    NotFound(WordId),
    /// The store rejected or failed the operation.
    Persistence(String),
    /// Another save for this screen is still in flight.
    Busy,
    /// The command needs a loaded word and none is loaded.
    NothingLoaded,
}

impl Display for WordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(_) => write!(f, "item not found"),
            Self::Persistence(message) => write!(f, "storage error: {message}"),
            Self::Busy => write!(f, "a save is already in progress"),
            Self::NothingLoaded => write!(f, "no word loaded"),
        }
    }
}

impl Error for WordError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<WordValidationError> for WordError {
    fn from(value: WordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for WordError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Persistence(other.to_string()),
        }
    }
}

impl WordError {
    /// Stable short code for log lines.
    pub(crate) fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Persistence(_) => "persistence",
            Self::Busy => "busy",
            Self::NothingLoaded => "nothing_loaded",
        }
    }
}
