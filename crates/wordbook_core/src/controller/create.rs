//! Item create controller.
//!
//! # Invariants
//! - Validation runs before any store call; a rejected word is never
//!   partially persisted.
//! - Each `submit` emits exactly one `Finished` or `Error` event.

use crate::controller::events::{EventChannel, EventReceiver, ManageSignal};
use crate::controller::WordError;
use crate::model::word::{validate_word_fields, Word, WordId};
use crate::service::words_repo::WordsRepo;
use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};

struct SavingFlag<'a>(&'a AtomicBool);

impl Drop for SavingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// State holder for the "add word" screen.
pub struct CreateWordController {
    repo: WordsRepo,
    signal: Option<ManageSignal>,
    saving: AtomicBool,
    events: EventChannel,
}

impl CreateWordController {
    pub fn new(repo: WordsRepo) -> Self {
        Self {
            repo,
            signal: None,
            saving: AtomicBool::new(false),
            events: EventChannel::new(),
        }
    }

    /// Broadcasts `signal` after every added word.
    pub fn with_signal(mut self, signal: ManageSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Takes the event receiver. Returns `None` after the first call.
    pub fn take_events(&self) -> Option<EventReceiver> {
        self.events.take()
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::Acquire)
    }

    /// Validates input and adds a new unlearned word stamped with now.
    pub async fn submit(&self, title: &str, definition: &str, synonym: &str, details: &str) {
        match self.try_submit(title, definition, synonym, details).await {
            Ok(id) => {
                info!("event=word_add module=controller status=ok word_id={id}");
                self.events.finished();
                if let Some(signal) = &self.signal {
                    signal.notify();
                }
            }
            Err(err) => {
                warn!(
                    "event=word_add module=controller status=error error_code={}",
                    err.code()
                );
                self.events.error(err.to_string());
            }
        }
    }

    async fn try_submit(
        &self,
        title: &str,
        definition: &str,
        synonym: &str,
        details: &str,
    ) -> Result<WordId, WordError> {
        validate_word_fields(title, definition)?;

        if self.saving.swap(true, Ordering::AcqRel) {
            return Err(WordError::Busy);
        }
        let _saving = SavingFlag(&self.saving);

        let word = Word::new(title, definition, synonym, details);
        Ok(self.repo.add(word).await?)
    }
}
