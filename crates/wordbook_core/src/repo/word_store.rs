//! Word store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide blocking CRUD and scoped list queries over the `words` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Word::validate()` before SQL mutations.
//! - Read paths reject malformed rows instead of masking them.
//! - `list_words` returns rows in ascending id order.

use crate::db::DbError;
use crate::model::word::{Word, WordId, WordValidationError};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard};

const WORD_SELECT_SQL: &str = "SELECT
    id,
    title,
    definition,
    synonym,
    details,
    is_completed,
    created_at
FROM words";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for word persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(WordValidationError),
    Db(DbError),
    NotFound(WordId),
    InvalidData(String),
    /// The background worker running a store call failed.
    Worker(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "word not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted word data: {message}"),
            Self::Worker(message) => write!(f, "store worker failed: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::Worker(_) => None,
        }
    }
}

impl From<WordValidationError> for RepoError {
    fn from(value: WordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Completion-status partition used by list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WordScope {
    #[default]
    All,
    Completed,
    Unlearned,
}

impl WordScope {
    /// Whether `word` belongs to this scope.
    pub fn contains(self, word: &Word) -> bool {
        match self {
            Self::All => true,
            Self::Completed => word.is_completed,
            Self::Unlearned => !word.is_completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Completed => "completed",
            Self::Unlearned => "unlearned",
        }
    }
}

/// Blocking persistence contract for words.
///
/// Implementations must be shareable across threads: the repository runs
/// every call on a background worker.
pub trait WordStore: Send + Sync {
    /// Inserts `word` and returns its id. A `None` id is assigned by the store.
    fn insert_word(&self, word: &Word) -> RepoResult<WordId>;
    /// Replaces the stored row with the same id.
    fn update_word(&self, word: &Word) -> RepoResult<()>;
    fn get_word(&self, id: WordId) -> RepoResult<Option<Word>>;
    fn list_words(&self, scope: WordScope) -> RepoResult<Vec<Word>>;
    /// Removes the word. Returns `false` when no row matched.
    fn delete_word(&self, id: WordId) -> RepoResult<bool>;
}

/// SQLite-backed word store.
///
/// Owns its connection behind a mutex so calls can run on any worker thread.
pub struct SqliteWordStore {
    conn: Mutex<Connection>,
}

impl SqliteWordStore {
    /// Wraps a connection returned by `open_db` / `open_db_in_memory`.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| RepoError::Worker("word store connection lock poisoned".to_string()))
    }
}

impl WordStore for SqliteWordStore {
    fn insert_word(&self, word: &Word) -> RepoResult<WordId> {
        word.validate()?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO words (
                id,
                title,
                definition,
                synonym,
                details,
                is_completed,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                word.id,
                word.title.as_str(),
                word.definition.as_str(),
                word.synonym.as_str(),
                word.details.as_str(),
                bool_to_int(word.is_completed),
                word.created_at,
            ],
        )?;

        Ok(word.id.unwrap_or_else(|| conn.last_insert_rowid()))
    }

    fn update_word(&self, word: &Word) -> RepoResult<()> {
        word.validate()?;
        let Some(id) = word.id else {
            return Err(RepoError::InvalidData(
                "cannot update a word that has no id".to_string(),
            ));
        };

        let changed = self.conn()?.execute(
            "UPDATE words
             SET
                title = ?1,
                definition = ?2,
                synonym = ?3,
                details = ?4,
                is_completed = ?5
             WHERE id = ?6;",
            params![
                word.title.as_str(),
                word.definition.as_str(),
                word.synonym.as_str(),
                word.details.as_str(),
                bool_to_int(word.is_completed),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get_word(&self, id: WordId) -> RepoResult<Option<Word>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{WORD_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_word_row(row)?));
        }

        Ok(None)
    }

    fn list_words(&self, scope: WordScope) -> RepoResult<Vec<Word>> {
        let filter = match scope {
            WordScope::All => "",
            WordScope::Completed => " WHERE is_completed = 1",
            WordScope::Unlearned => " WHERE is_completed = 0",
        };

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{WORD_SELECT_SQL}{filter} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut words = Vec::new();

        while let Some(row) = rows.next()? {
            words.push(parse_word_row(row)?);
        }

        Ok(words)
    }

    fn delete_word(&self, id: WordId) -> RepoResult<bool> {
        let changed = self
            .conn()?
            .execute("DELETE FROM words WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }
}

fn parse_word_row(row: &Row<'_>) -> RepoResult<Word> {
    let is_completed = match row.get::<_, i64>("is_completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_completed value `{other}` in words.is_completed"
            )));
        }
    };

    let word = Word {
        id: Some(row.get("id")?),
        title: row.get("title")?,
        definition: row.get("definition")?,
        synonym: row.get("synonym")?,
        details: row.get("details")?,
        is_completed,
        created_at: row.get("created_at")?,
    };
    word.validate()?;
    Ok(word)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
