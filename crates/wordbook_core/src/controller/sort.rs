//! Sorting and title search over loaded word lists.
//!
//! Both routines are pure and operate on already-loaded snapshots; neither
//! touches the store.

use crate::model::word::Word;
use std::cmp::Ordering;

/// Key used to order a word list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    /// Case-sensitive lexicographic order of `title`.
    Title,
    /// Chronological order of `created_at`.
    #[default]
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Sort field and direction of one list screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortConfig {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

/// Stable in-place sort. Equal keys keep their current relative order in
/// both directions.
pub fn sort_words(words: &mut [Word], config: SortConfig) {
    let compare_keys = |a: &Word, b: &Word| -> Ordering {
        match config.field {
            SortField::Title => a.title.cmp(&b.title),
            SortField::Date => a.created_at.cmp(&b.created_at),
        }
    };

    match config.direction {
        SortDirection::Ascending => words.sort_by(compare_keys),
        SortDirection::Descending => words.sort_by(|a, b| compare_keys(b, a)),
    }
}

/// Returns the words whose title contains `query`, ignoring case.
///
/// A blank query matches everything.
pub fn search_titles(words: &[Word], query: &str) -> Vec<Word> {
    if query.trim().is_empty() {
        return words.to_vec();
    }

    let needle = query.to_lowercase();
    words
        .iter()
        .filter(|word| word.title.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
