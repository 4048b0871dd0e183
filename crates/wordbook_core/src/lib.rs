//! Core logic for the Wordbook vocabulary app.
//! This crate is the single source of truth for word invariants.

pub mod app;
pub mod config;
pub mod controller;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use app::WordApp;
pub use config::AppConfig;
pub use controller::create::CreateWordController;
pub use controller::edit::{EditState, EditWordController};
pub use controller::events::{EventReceiver, ManageSignal, WordEvent, MANAGE_WORD_SIGNAL};
pub use controller::list::WordListController;
pub use controller::sort::{SortConfig, SortDirection, SortField};
pub use controller::WordError;
pub use logging::{default_log_level, init_logging, init_logging_from, logging_status};
pub use model::word::{validate_word_fields, Word, WordField, WordId, WordValidationError};
pub use repo::memory_store::MemoryWordStore;
pub use repo::word_store::{RepoError, RepoResult, SqliteWordStore, WordScope, WordStore};
pub use service::words_repo::{WordsRepo, WordsStream};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
