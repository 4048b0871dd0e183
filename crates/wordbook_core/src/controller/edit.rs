//! Item edit controller.
//!
//! # Responsibility
//! - Load one word as editable state and persist edits to it.
//! - Flip the completion flag and delete the loaded word.
//!
//! # Invariants
//! - Only one save (submit, toggle or delete) runs at a time.
//! - A load issued while a save is in flight is rejected.
//! - Of several overlapping loads, the last one issued owns the state.
//! - A failed save returns the state to `Loaded` with the pre-save word.

use crate::controller::events::{EventChannel, EventReceiver, ManageSignal};
use crate::controller::WordError;
use crate::model::word::{validate_word_fields, Word, WordId};
use crate::service::words_repo::WordsRepo;
use log::{debug, info, warn};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// Observable state of the edit screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditState {
    /// Nothing requested yet, or the loaded word was deleted.
    #[default]
    Idle,
    Loading,
    Loaded(Word),
    /// A save is in flight; carries the word as it was before the save.
    Submitting(Word),
    /// Last submit was persisted; carries the stored word.
    Success(Word),
    /// Loading failed with a user-visible message.
    Failed(String),
}

impl EditState {
    /// The editable word, when one is loaded and no save is running.
    pub fn word(&self) -> Option<&Word> {
        match self {
            Self::Loaded(word) | Self::Success(word) => Some(word),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Control {
    generation: u64,
    saving: bool,
}

/// Releases the save slot, and restores `Loaded` if the save never settled.
struct SaveGuard<'a> {
    control: &'a Mutex<Control>,
    state: &'a watch::Sender<EditState>,
}

impl Drop for SaveGuard<'_> {
    fn drop(&mut self) {
        lock_control(self.control).saving = false;
        self.state.send_if_modified(|state| {
            if let EditState::Submitting(word) = state {
                let restored = word.clone();
                *state = EditState::Loaded(restored);
                true
            } else {
                false
            }
        });
    }
}

/// State holder for the detail/edit screen of one word.
pub struct EditWordController {
    repo: WordsRepo,
    signal: Option<ManageSignal>,
    state: watch::Sender<EditState>,
    control: Mutex<Control>,
    events: EventChannel,
}

impl EditWordController {
    pub fn new(repo: WordsRepo) -> Self {
        Self {
            repo,
            signal: None,
            state: watch::channel(EditState::Idle).0,
            control: Mutex::new(Control::default()),
            events: EventChannel::new(),
        }
    }

    /// Broadcasts `signal` after every persisted change.
    pub fn with_signal(mut self, signal: ManageSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    pub fn state(&self) -> watch::Receiver<EditState> {
        self.state.subscribe()
    }

    /// Takes the event receiver. Returns `None` after the first call.
    pub fn take_events(&self) -> Option<EventReceiver> {
        self.events.take()
    }

    /// Loads `id` into editable state.
    ///
    /// A missing id moves to `Failed("item not found")` and emits an error.
    pub async fn load(&self, id: WordId) {
        let generation = {
            let mut control = lock_control(&self.control);
            if control.saving {
                drop(control);
                self.report("word_load", WordError::Busy);
                return;
            }
            control.generation += 1;
            self.state.send_replace(EditState::Loading);
            control.generation
        };

        let result = self.repo.get_by_id(id).await;

        let control = lock_control(&self.control);
        if control.generation != generation {
            debug!("event=word_load module=controller status=superseded word_id={id}");
            return;
        }
        let err = match result {
            Ok(Some(word)) => {
                self.state.send_replace(EditState::Loaded(word));
                info!("event=word_load module=controller status=ok word_id={id}");
                return;
            }
            Ok(None) => WordError::NotFound(id),
            Err(err) => WordError::from(err),
        };
        self.state.send_replace(EditState::Failed(err.to_string()));
        drop(control);
        self.report("word_load", err);
    }

    /// Validates and persists edits to the loaded word.
    ///
    /// `id`, `created_at` and `is_completed` are kept from the loaded word.
    /// Emits exactly one `Finished` or `Error` event.
    pub async fn submit(&self, title: &str, definition: &str, synonym: &str, details: &str) {
        let result = self
            .try_submit(title, definition, synonym, details)
            .await;
        match result {
            Ok(word) => {
                info!(
                    "event=word_update module=controller status=ok word_id={}",
                    word.id.unwrap_or_default()
                );
                self.events.finished();
                self.notify_changed();
            }
            Err(err) => self.report("word_update", err),
        }
    }

    /// Flips `is_completed` on the loaded word and persists it at once.
    ///
    /// Skips field validation and emits no `Finished` event on success.
    pub async fn toggle_completed(&self) {
        match self.persist(EditState::Loaded, Word::toggled).await {
            Ok(word) => {
                info!(
                    "event=word_toggle module=controller status=ok word_id={} is_completed={}",
                    word.id.unwrap_or_default(),
                    word.is_completed
                );
                self.notify_changed();
            }
            Err(err) => self.report("word_toggle", err),
        }
    }

    /// Deletes the loaded word and returns to `Idle`.
    pub async fn delete(&self) {
        match self.try_delete().await {
            Ok((id, removed)) => {
                info!(
                    "event=word_delete module=controller status=ok word_id={id} removed={removed}"
                );
                self.events.finished();
                if removed {
                    self.notify_changed();
                }
            }
            Err(err) => self.report("word_delete", err),
        }
    }

    async fn try_submit(
        &self,
        title: &str,
        definition: &str,
        synonym: &str,
        details: &str,
    ) -> Result<Word, WordError> {
        if self.state.borrow().word().is_none() {
            return Err(WordError::NothingLoaded);
        }
        validate_word_fields(title, definition)?;

        self.persist(EditState::Success, |current| {
            current.with_edits(title, definition, synonym, details)
        })
        .await
    }

    /// Returns the deleted id and whether the store still held it.
    async fn try_delete(&self) -> Result<(WordId, bool), WordError> {
        let (guard, current) = self.begin_save()?;
        let id = current.id.ok_or(WordError::NothingLoaded)?;
        let removed = self.repo.delete(id).await?;

        lock_control(&self.control).generation += 1;
        self.state.send_replace(EditState::Idle);
        drop(guard);
        Ok((id, removed))
    }

    async fn persist(
        &self,
        settle: fn(Word) -> EditState,
        build: impl FnOnce(&Word) -> Word,
    ) -> Result<Word, WordError> {
        let (guard, current) = self.begin_save()?;
        let updated = build(&current);
        self.repo.update(updated.clone()).await?;

        self.state.send_replace(settle(updated.clone()));
        drop(guard);
        Ok(updated)
    }

    fn begin_save(&self) -> Result<(SaveGuard<'_>, Word), WordError> {
        let mut control = lock_control(&self.control);
        if control.saving {
            return Err(WordError::Busy);
        }
        let current = self
            .state
            .borrow()
            .word()
            .cloned()
            .ok_or(WordError::NothingLoaded)?;

        control.saving = true;
        self.state
            .send_replace(EditState::Submitting(current.clone()));
        Ok((
            SaveGuard {
                control: &self.control,
                state: &self.state,
            },
            current,
        ))
    }

    fn notify_changed(&self) {
        if let Some(signal) = &self.signal {
            signal.notify();
        }
    }

    fn report(&self, event: &'static str, err: WordError) {
        warn!(
            "event={event} module=controller status=error error_code={}",
            err.code()
        );
        self.events.error(err.to_string());
    }
}

fn lock_control(control: &Mutex<Control>) -> MutexGuard<'_, Control> {
    control.lock().unwrap_or_else(PoisonError::into_inner)
}
