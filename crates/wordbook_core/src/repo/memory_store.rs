//! In-memory word store.
//!
//! Map-backed store with a running id counter. Useful for tests and for
//! running controllers without a database file.

use crate::model::word::{Word, WordId};
use crate::repo::word_store::{RepoError, RepoResult, WordScope, WordStore};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct MemoryState {
    words: BTreeMap<WordId, Word>,
    last_id: WordId,
}

/// Word store that keeps everything in process memory.
#[derive(Default)]
pub struct MemoryWordStore {
    state: Mutex<MemoryState>,
}

impl MemoryWordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> RepoResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| RepoError::Worker("memory store lock poisoned".to_string()))
    }
}

impl WordStore for MemoryWordStore {
    fn insert_word(&self, word: &Word) -> RepoResult<WordId> {
        word.validate()?;

        let mut state = self.state()?;
        let id = match word.id {
            Some(id) if state.words.contains_key(&id) => {
                return Err(RepoError::InvalidData(format!(
                    "word id {id} is already in use"
                )));
            }
            Some(id) => id,
            None => state.last_id.checked_add(1).ok_or_else(|| {
                RepoError::InvalidData("word id space is exhausted".to_string())
            })?,
        };
        state.last_id = state.last_id.max(id);
        state.words.insert(
            id,
            Word {
                id: Some(id),
                ..word.clone()
            },
        );
        Ok(id)
    }

    fn update_word(&self, word: &Word) -> RepoResult<()> {
        word.validate()?;
        let Some(id) = word.id else {
            return Err(RepoError::InvalidData(
                "cannot update a word that has no id".to_string(),
            ));
        };

        let mut state = self.state()?;
        let stored = state.words.get_mut(&id).ok_or(RepoError::NotFound(id))?;
        *stored = Word {
            created_at: stored.created_at,
            ..word.clone()
        };
        Ok(())
    }

    fn get_word(&self, id: WordId) -> RepoResult<Option<Word>> {
        Ok(self.state()?.words.get(&id).cloned())
    }

    fn list_words(&self, scope: WordScope) -> RepoResult<Vec<Word>> {
        Ok(self
            .state()?
            .words
            .values()
            .filter(|word| scope.contains(word))
            .cloned()
            .collect())
    }

    fn delete_word(&self, id: WordId) -> RepoResult<bool> {
        Ok(self.state()?.words.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryWordStore;
    use crate::model::word::Word;
    use crate::repo::word_store::{RepoError, WordScope, WordStore};

    #[test]
    fn ids_are_not_reused_after_delete() {
        let store = MemoryWordStore::new();
        let first = store.insert_word(&Word::new("a", "b", "", "")).unwrap();
        assert!(store.delete_word(first).unwrap());

        let second = store.insert_word(&Word::new("c", "d", "", "")).unwrap();
        assert!(second > first);
    }

    #[test]
    fn exhausted_id_space_is_an_error_and_store_stays_usable() {
        let store = MemoryWordStore::new();
        let mut pinned = Word::new("last", "d", "", "");
        pinned.id = Some(i64::MAX);
        assert_eq!(store.insert_word(&pinned).unwrap(), i64::MAX);

        let err = store.insert_word(&Word::new("next", "d", "", "")).unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(_)));

        let listed = store.list_words(WordScope::All).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, Some(i64::MAX));
    }

    #[test]
    fn update_keeps_created_at_and_rejects_unknown_ids() {
        let store = MemoryWordStore::new();
        let word = Word::new("a", "b", "", "");
        let id = store.insert_word(&word).unwrap();

        let mut changed = store.get_word(id).unwrap().unwrap();
        changed.title = "renamed".to_string();
        changed.created_at = 0;
        store.update_word(&changed).unwrap();

        let stored = store.get_word(id).unwrap().unwrap();
        assert_eq!(stored.title, "renamed");
        assert_eq!(stored.created_at, word.created_at);

        changed.id = Some(id + 100);
        let err = store.update_word(&changed).unwrap_err();
        assert!(matches!(err, RepoError::NotFound(missing) if missing == id + 100));
    }

    #[test]
    fn list_filters_by_scope_in_id_order() {
        let store = MemoryWordStore::new();
        let mut learned = Word::new("learned", "d", "", "");
        learned.is_completed = true;
        let a = store.insert_word(&Word::new("a", "d", "", "")).unwrap();
        let b = store.insert_word(&learned).unwrap();
        let c = store.insert_word(&Word::new("c", "d", "", "")).unwrap();

        let ids = |scope| {
            store
                .list_words(scope)
                .unwrap()
                .into_iter()
                .filter_map(|word| word.id)
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(WordScope::All), vec![a, b, c]);
        assert_eq!(ids(WordScope::Completed), vec![b]);
        assert_eq!(ids(WordScope::Unlearned), vec![a, c]);
    }
}
