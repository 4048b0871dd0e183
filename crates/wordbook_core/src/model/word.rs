//! Word domain model.
//!
//! # Responsibility
//! - Define the single vocabulary record managed by the app.
//! - Own the required-field validation shared by create and edit flows.
//!
//! # Invariants
//! - `id` is `None` until the store assigns one, and never changes after.
//! - `title` and `definition` are never persisted blank.
//! - `created_at` is set once at creation and is not touched by edits.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static SYNONYM_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*,\s*").expect("valid synonym separator regex"));

static LAST_CREATED_AT_MS: AtomicI64 = AtomicI64::new(0);

/// Store-assigned integer identifier.
pub type WordId = i64;

/// Required text field of a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordField {
    Title,
    Definition,
}

impl WordField {
    fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Definition => "definition",
        }
    }
}

/// Required fields were blank.
///
/// Carries every blank field so the message can name all of them at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordValidationError {
    blank: Vec<WordField>,
}

impl WordValidationError {
    /// Fields that failed the non-blank check, in declaration order.
    pub fn blank_fields(&self) -> &[WordField] {
        &self.blank
    }
}

impl Display for WordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let names = self
            .blank
            .iter()
            .map(|field| field.as_str())
            .collect::<Vec<_>>()
            .join(" and ");
        write!(f, "{names} cannot be blank")
    }
}

impl Error for WordValidationError {}

/// Checks that `title` and `definition` both contain non-whitespace text.
pub fn validate_word_fields(title: &str, definition: &str) -> Result<(), WordValidationError> {
    let mut blank = Vec::new();
    if title.trim().is_empty() {
        blank.push(WordField::Title);
    }
    if definition.trim().is_empty() {
        blank.push(WordField::Definition);
    }

    if blank.is_empty() {
        Ok(())
    } else {
        Err(WordValidationError { blank })
    }
}

/// Returns a creation timestamp in epoch milliseconds.
///
/// Values are strictly increasing within one process, so two words created
/// in the same millisecond still have a defined date order.
pub fn next_created_at_ms() -> i64 {
    let wall = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0);

    let mut last = LAST_CREATED_AT_MS.load(Ordering::Relaxed);
    loop {
        let next = wall.max(last.saturating_add(1));
        match LAST_CREATED_AT_MS.compare_exchange_weak(
            last,
            next,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return next,
            Err(observed) => last = observed,
        }
    }
}

/// Makes every later `next_created_at_ms` value greater than `floor_ms`.
///
/// Called with the newest stored timestamp when a database is opened, so
/// date order survives restarts and backward clock adjustments.
pub(crate) fn advance_created_at_clock(floor_ms: i64) {
    LAST_CREATED_AT_MS.fetch_max(floor_ms, Ordering::Relaxed);
}

/// A vocabulary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// Assigned by the store on insert.
    pub id: Option<WordId>,
    pub title: String,
    pub definition: String,
    /// Comma-separated related terms, display-only.
    pub synonym: String,
    pub details: String,
    /// Serialized as `is_completed`; `true` once the word is learned.
    pub is_completed: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Word {
    /// Creates an unsaved, unlearned word stamped with the current time.
    pub fn new(
        title: impl Into<String>,
        definition: impl Into<String>,
        synonym: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            definition: definition.into(),
            synonym: synonym.into(),
            details: details.into(),
            is_completed: false,
            created_at: next_created_at_ms(),
        }
    }

    /// Returns a copy with the four editable fields replaced.
    ///
    /// `id`, `created_at` and `is_completed` are carried over unchanged.
    pub fn with_edits(
        &self,
        title: impl Into<String>,
        definition: impl Into<String>,
        synonym: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            definition: definition.into(),
            synonym: synonym.into(),
            details: details.into(),
            ..self.clone()
        }
    }

    /// Returns a copy with the completion flag flipped.
    pub fn toggled(&self) -> Self {
        Self {
            is_completed: !self.is_completed,
            ..self.clone()
        }
    }

    /// Validates required fields.
    pub fn validate(&self) -> Result<(), WordValidationError> {
        validate_word_fields(&self.title, &self.definition)
    }

    /// Splits `synonym` into trimmed, non-empty terms.
    pub fn synonyms(&self) -> Vec<&str> {
        SYNONYM_SEPARATOR_RE
            .split(self.synonym.trim())
            .filter(|term| !term.is_empty())
            .collect()
    }
}
