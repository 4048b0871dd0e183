//! List view-state controller.
//!
//! # Responsibility
//! - Keep one screen's word list in sync with the store while visible.
//! - Own the sort configuration and the title search over the loaded list.
//!
//! # Invariants
//! - `items` is always sorted by the current `SortConfig`.
//! - `search_results` is always the subsequence of `items` matching the
//!   last query (all of `items` when the query is blank).
//! - Sorting and searching never re-query the store.
//! - The live subscription ends when the controller is hidden or dropped.

use crate::controller::events::{EventChannel, EventReceiver, ManageSignal};
use crate::controller::sort::{search_titles, sort_words, SortConfig, SortDirection, SortField};
use crate::controller::WordError;
use crate::model::word::{Word, WordId};
use crate::repo::word_store::{RepoResult, WordScope};
use crate::service::words_repo::{WordsRepo, WordsStream};
use log::{debug, error, info, warn};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Default)]
struct ListState {
    sort: SortConfig,
    query: String,
    items: Vec<Word>,
}

struct ListShared {
    scope: WordScope,
    state: Mutex<ListState>,
    items: watch::Sender<Vec<Word>>,
    search_results: watch::Sender<Vec<Word>>,
    sort: watch::Sender<SortConfig>,
    events: EventChannel,
}

impl ListShared {
    fn state(&self) -> MutexGuard<'_, ListState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn replace_items(&self, mut words: Vec<Word>) {
        let mut state = self.state();
        sort_words(&mut words, state.sort);
        state.items = words;
        self.publish(&state);
    }

    fn apply_sort(&self, config: SortConfig) {
        let mut state = self.state();
        state.sort = config;
        sort_words(&mut state.items, config);
        self.sort.send_replace(config);
        self.publish(&state);
    }

    fn apply_search(&self, query: &str) {
        let mut state = self.state();
        state.query = query.to_string();
        self.search_results
            .send_replace(search_titles(&state.items, &state.query));
    }

    fn publish(&self, state: &ListState) {
        self.items.send_replace(state.items.clone());
        self.search_results
            .send_replace(search_titles(&state.items, &state.query));
    }

    fn apply_snapshot(&self, result: RepoResult<Vec<Word>>) {
        match result {
            Ok(words) => {
                debug!(
                    "event=list_snapshot module=controller status=ok scope={} count={}",
                    self.scope.as_str(),
                    words.len()
                );
                self.replace_items(words);
            }
            Err(err) => {
                warn!(
                    "event=list_snapshot module=controller status=error scope={} error={err}",
                    self.scope.as_str()
                );
                self.events.error(WordError::from(err).to_string());
            }
        }
    }
}

/// State holder for one list screen ("unlearned", "completed" or "all").
pub struct WordListController {
    repo: WordsRepo,
    shared: Arc<ListShared>,
    signal: Option<ManageSignal>,
    subscription: Mutex<Option<JoinHandle<()>>>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl WordListController {
    /// Creates the controller and starts following `scope` immediately.
    ///
    /// Must be called from within a Tokio runtime for the live subscription
    /// to start; otherwise the list stays empty until `refresh()` is called
    /// from one.
    pub fn new(repo: WordsRepo, scope: WordScope) -> Self {
        let controller = Self {
            repo,
            shared: Arc::new(ListShared {
                scope,
                state: Mutex::new(ListState::default()),
                items: watch::channel(Vec::new()).0,
                search_results: watch::channel(Vec::new()).0,
                sort: watch::channel(SortConfig::default()).0,
                events: EventChannel::new(),
            }),
            signal: None,
            subscription: Mutex::new(None),
            listener: Mutex::new(None),
        };
        controller.refresh();
        controller
    }

    /// Broadcasts `signal` after deletes made from this screen.
    pub fn with_signal(mut self, signal: ManageSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    pub fn scope(&self) -> WordScope {
        self.shared.scope
    }

    /// Current sorted list.
    pub fn items(&self) -> watch::Receiver<Vec<Word>> {
        self.shared.items.subscribe()
    }

    /// Items matching the last search query.
    pub fn search_results(&self) -> watch::Receiver<Vec<Word>> {
        self.shared.search_results.subscribe()
    }

    pub fn sort_config(&self) -> watch::Receiver<SortConfig> {
        self.shared.sort.subscribe()
    }

    /// Takes the event receiver. Returns `None` after the first call.
    pub fn take_events(&self) -> Option<EventReceiver> {
        self.shared.events.take()
    }

    /// (Re)starts the live subscription for this screen's scope.
    ///
    /// Call whenever the screen becomes visible. Any previous subscription
    /// is cancelled first, so the first snapshot after this call is fresh.
    pub fn refresh(&self) {
        let stream = self.repo.observe(self.shared.scope);
        let shared = Arc::clone(&self.shared);
        let handle = spawn_task("list_refresh", follow(stream, shared));

        let mut slot = lock_slot(&self.subscription);
        if let Some(previous) = slot.take() {
            previous.abort();
        }
        *slot = handle;
        info!(
            "event=list_refresh module=controller status={} scope={}",
            if slot.is_some() { "ok" } else { "error" },
            self.shared.scope.as_str()
        );
    }

    /// Alias of `refresh` for screen lifecycle wiring.
    pub fn on_visible(&self) {
        self.refresh();
    }

    /// Stops the live subscription; the last list stays visible.
    pub fn on_hidden(&self) {
        if let Some(handle) = lock_slot(&self.subscription).take() {
            handle.abort();
        }
    }

    /// Whether a live subscription is currently running.
    pub fn is_live(&self) -> bool {
        lock_slot(&self.subscription)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Re-reads this screen's scope every time `signal` fires.
    ///
    /// Needed only when the store can change behind this app's repository.
    pub fn listen(&self, signal: &ManageSignal) {
        let mut rx = signal.subscribe();
        let repo = self.repo.clone();
        let shared = Arc::clone(&self.shared);
        let handle = spawn_task("list_listen", async move {
            loop {
                match rx.recv().await {
                    Ok(()) | Err(RecvError::Lagged(_)) => {
                        shared.apply_snapshot(repo.list(shared.scope).await);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        let mut slot = lock_slot(&self.listener);
        if let Some(previous) = slot.take() {
            previous.abort();
        }
        *slot = handle;
    }

    /// Changes sort order and re-sorts the loaded list in place.
    pub fn set_sort(&self, field: SortField, direction: SortDirection) {
        self.shared.apply_sort(SortConfig::new(field, direction));
    }

    /// Filters the loaded list by title. Does not modify `items`.
    pub fn search(&self, query: &str) {
        self.shared.apply_search(query);
    }

    /// Deletes a word. Unknown ids are ignored and broadcast nothing.
    pub async fn delete(&self, id: WordId) {
        match self.repo.delete(id).await {
            Ok(true) => {
                info!("event=word_delete module=controller status=ok word_id={id}");
                if let Some(signal) = &self.signal {
                    signal.notify();
                }
            }
            Ok(false) => {
                debug!("event=word_delete module=controller status=noop word_id={id}");
            }
            Err(err) => {
                let err = WordError::from(err);
                warn!(
                    "event=word_delete module=controller status=error word_id={id} error_code={}",
                    err.code()
                );
                self.shared.events.error(err.to_string());
            }
        }
    }
}

impl Drop for WordListController {
    fn drop(&mut self) {
        for slot in [&self.subscription, &self.listener] {
            if let Some(handle) = lock_slot(slot).take() {
                handle.abort();
            }
        }
    }
}

async fn follow(mut stream: WordsStream, shared: Arc<ListShared>) {
    while let Some(result) = stream.next().await {
        shared.apply_snapshot(result);
    }
}

fn spawn_task(
    event: &'static str,
    task: impl Future<Output = ()> + Send + 'static,
) -> Option<JoinHandle<()>> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => Some(handle.spawn(task)),
        Err(err) => {
            error!(
                "event={event} module=controller status=error error_code=no_runtime error={err}"
            );
            None
        }
    }
}

fn lock_slot(slot: &Mutex<Option<JoinHandle<()>>>) -> MutexGuard<'_, Option<JoinHandle<()>>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}
