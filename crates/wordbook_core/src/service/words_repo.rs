//! Words repository: async façade over a `WordStore`.
//!
//! # Responsibility
//! - Expose semantic word queries and mutations to controllers.
//! - Run every store call on Tokio's blocking worker pool.
//! - Publish a change revision so observers re-read after each mutation.
//!
//! # Invariants
//! - No business rules live here; calls delegate to the store unchanged.
//! - The revision only moves after a mutation the store confirmed, and it
//!   moves even when the caller stops waiting for the result.
//! - Observers never see a snapshot taken before their subscription started.

use crate::model::word::{Word, WordId};
use crate::repo::word_store::{RepoError, RepoResult, WordScope, WordStore};
use log::{debug, warn};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Cheaply cloneable handle shared by every controller of one app.
#[derive(Clone)]
pub struct WordsRepo {
    store: Arc<dyn WordStore>,
    revision: Arc<watch::Sender<u64>>,
}

impl WordsRepo {
    /// Creates a repository that owns `store`.
    pub fn new(store: impl WordStore + 'static) -> Self {
        Self::from_shared(Arc::new(store))
    }

    /// Creates a repository over an already shared store.
    pub fn from_shared(store: Arc<dyn WordStore>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            store,
            revision: Arc::new(revision),
        }
    }

    /// Streams every word, re-emitting after each mutation.
    pub fn observe_all(&self) -> WordsStream {
        self.observe(WordScope::All)
    }

    /// Streams words marked as learned.
    pub fn observe_completed(&self) -> WordsStream {
        self.observe(WordScope::Completed)
    }

    /// Streams words not yet learned.
    pub fn observe_unlearned(&self) -> WordsStream {
        self.observe(WordScope::Unlearned)
    }

    pub fn observe(&self, scope: WordScope) -> WordsStream {
        WordsStream {
            repo: self.clone(),
            scope,
            changes: self.revision.subscribe(),
            primed: false,
        }
    }

    /// Reads one snapshot of `scope`.
    pub async fn list(&self, scope: WordScope) -> RepoResult<Vec<Word>> {
        self.run("word_list", move |store| store.list_words(scope))
            .await
    }

    /// Looks up one word. A missing id is `Ok(None)`, not an error.
    pub async fn get_by_id(&self, id: WordId) -> RepoResult<Option<Word>> {
        self.run("word_get", move |store| store.get_word(id)).await
    }

    /// Persists a new word and returns the id the store assigned.
    pub async fn add(&self, word: Word) -> RepoResult<WordId> {
        self.mutate("word_add", move |store| store.insert_word(&word), |_| true)
            .await
    }

    /// Replaces the stored word with the same id.
    ///
    /// # Errors
    /// - `RepoError::NotFound` when the id is not in the store.
    pub async fn update(&self, word: Word) -> RepoResult<()> {
        self.mutate("word_update", move |store| store.update_word(&word), |_| true)
            .await
    }

    /// Deletes a word. Returns `false` for an unknown id, which is a no-op.
    pub async fn delete(&self, id: WordId) -> RepoResult<bool> {
        self.mutate("word_delete", move |store| store.delete_word(id), |removed| *removed)
            .await
    }

    /// Runs a write and moves the revision on the worker once it succeeds.
    ///
    /// The bump still happens when the caller's future is dropped mid-write.
    async fn mutate<T, F>(
        &self,
        event: &'static str,
        op: F,
        changed: fn(&T) -> bool,
    ) -> RepoResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn WordStore) -> RepoResult<T> + Send + 'static,
    {
        let revision = Arc::clone(&self.revision);
        self.run(event, move |store| {
            let result = op(store);
            if result.as_ref().is_ok_and(changed) {
                revision.send_modify(|revision| *revision += 1);
            }
            result
        })
        .await
    }

    async fn run<T, F>(&self, event: &'static str, op: F) -> RepoResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn WordStore) -> RepoResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let started_at = Instant::now();
        let result = tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|err| RepoError::Worker(err.to_string()))
            .and_then(|result| result);

        match &result {
            Ok(_) => debug!(
                "event={event} module=repo status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event={event} module=repo status=error duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            ),
        }
        result
    }
}

/// Live view of one scope of the store.
///
/// The first `next()` yields the current snapshot immediately; each later
/// call waits for a mutation and yields a fresh snapshot. Several mutations
/// between two calls collapse into one snapshot.
pub struct WordsStream {
    repo: WordsRepo,
    scope: WordScope,
    changes: watch::Receiver<u64>,
    primed: bool,
}

impl WordsStream {
    pub fn scope(&self) -> WordScope {
        self.scope
    }

    /// Waits for the next snapshot.
    ///
    /// Returns `None` only once the repository can no longer change.
    pub async fn next(&mut self) -> Option<RepoResult<Vec<Word>>> {
        if self.primed {
            self.changes.changed().await.ok()?;
        } else {
            self.primed = true;
        }
        self.changes.borrow_and_update();
        Some(self.repo.list(self.scope).await)
    }
}

#[cfg(test)]
mod tests {
    use super::WordsRepo;
    use crate::model::word::Word;
    use crate::repo::memory_store::MemoryWordStore;
    use std::time::Duration;

    #[tokio::test]
    async fn stream_yields_snapshot_then_waits_for_mutation() {
        let repo = WordsRepo::new(MemoryWordStore::new());
        repo.add(Word::new("first", "d", "", "")).await.unwrap();

        let mut stream = repo.observe_all();
        let initial = stream.next().await.unwrap().unwrap();
        assert_eq!(initial.len(), 1);

        let pending = tokio::time::timeout(Duration::from_millis(50), stream.next()).await;
        assert!(pending.is_err(), "no mutation happened, stream must wait");

        repo.add(Word::new("second", "d", "", "")).await.unwrap();
        let updated = stream.next().await.unwrap().unwrap();
        assert_eq!(updated.len(), 2);
    }

    #[tokio::test]
    async fn deleting_unknown_id_does_not_wake_observers() {
        let repo = WordsRepo::new(MemoryWordStore::new());
        let mut stream = repo.observe_all();
        stream.next().await.unwrap().unwrap();

        assert!(!repo.delete(42).await.unwrap());

        let pending = tokio::time::timeout(Duration::from_millis(50), stream.next()).await;
        assert!(pending.is_err());
    }
}
