//! Root composition point.
//!
//! # Responsibility
//! - Own the single repository and change signal of one running app.
//! - Hand out controllers already wired to both.
//!
//! # Invariants
//! - There is no global repository; every controller receives its
//!   dependencies from a `WordApp` value.

use crate::config::AppConfig;
use crate::controller::create::CreateWordController;
use crate::controller::edit::EditWordController;
use crate::controller::events::ManageSignal;
use crate::controller::list::WordListController;
use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::repo::word_store::{SqliteWordStore, WordScope, WordStore};
use crate::service::words_repo::WordsRepo;
use log::info;

pub struct WordApp {
    repo: WordsRepo,
    signal: ManageSignal,
}

impl WordApp {
    /// Opens the database named by `config`. Its directory must exist.
    pub fn open(config: &AppConfig) -> DbResult<Self> {
        let conn = open_db(config.db_path())?;
        info!("event=app_open module=app status=ok mode=file");
        Ok(Self::with_store(SqliteWordStore::new(conn)))
    }

    /// Opens a throwaway in-memory database.
    pub fn in_memory() -> DbResult<Self> {
        let conn = open_db_in_memory()?;
        Ok(Self::with_store(SqliteWordStore::new(conn)))
    }

    pub fn with_store(store: impl WordStore + 'static) -> Self {
        Self {
            repo: WordsRepo::new(store),
            signal: ManageSignal::new(),
        }
    }

    pub fn repo(&self) -> &WordsRepo {
        &self.repo
    }

    pub fn signal(&self) -> &ManageSignal {
        &self.signal
    }

    /// Home screen: words not yet learned.
    pub fn unlearned_list(&self) -> WordListController {
        self.list(WordScope::Unlearned)
    }

    pub fn completed_list(&self) -> WordListController {
        self.list(WordScope::Completed)
    }

    pub fn all_list(&self) -> WordListController {
        self.list(WordScope::All)
    }

    pub fn create_controller(&self) -> CreateWordController {
        CreateWordController::new(self.repo.clone()).with_signal(self.signal.clone())
    }

    pub fn edit_controller(&self) -> EditWordController {
        EditWordController::new(self.repo.clone()).with_signal(self.signal.clone())
    }

    fn list(&self, scope: WordScope) -> WordListController {
        WordListController::new(self.repo.clone(), scope).with_signal(self.signal.clone())
    }
}
