//! One-shot controller events and the cross-screen change signal.
//!
//! # Invariants
//! - Each user command produces at most one `WordEvent`.
//! - The event receiver can be taken once; events are consumed once.

use log::debug;
use std::sync::Mutex;
use tokio::sync::{broadcast, mpsc};

/// Name of the broadcast that tells list screens the data changed.
pub const MANAGE_WORD_SIGNAL: &str = "manage_word";

const SIGNAL_CAPACITY: usize = 16;

/// Outcome of a user-initiated command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordEvent {
    /// The command finished; the screen may navigate back.
    Finished,
    /// The command failed with a user-visible message.
    Error(String),
}

pub type EventReceiver = mpsc::UnboundedReceiver<WordEvent>;

/// Per-controller event outlet.
pub(crate) struct EventChannel {
    tx: mpsc::UnboundedSender<WordEvent>,
    rx: Mutex<Option<EventReceiver>>,
}

impl EventChannel {
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
        }
    }

    pub(crate) fn take(&self) -> Option<EventReceiver> {
        self.rx.lock().ok().and_then(|mut slot| slot.take())
    }

    pub(crate) fn finished(&self) {
        self.emit(WordEvent::Finished);
    }

    pub(crate) fn error(&self, message: impl Into<String>) {
        self.emit(WordEvent::Error(message.into()));
    }

    fn emit(&self, event: WordEvent) {
        // A closed receiver means the screen is gone; nothing is listening.
        if self.tx.send(event).is_err() {
            debug!("event=controller_event module=controller status=dropped reason=receiver_closed");
        }
    }
}

/// Parameterless broadcast telling list screens to re-read the store.
#[derive(Clone)]
pub struct ManageSignal {
    tx: broadcast::Sender<()>,
}

impl Default for ManageSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ManageSignal {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(SIGNAL_CAPACITY);
        Self { tx }
    }

    pub fn name(&self) -> &'static str {
        MANAGE_WORD_SIGNAL
    }

    /// Announces that words were added, changed or removed.
    pub fn notify(&self) {
        let listeners = self.tx.send(()).unwrap_or(0);
        debug!(
            "event=signal_notify module=controller signal={MANAGE_WORD_SIGNAL} listeners={listeners}"
        );
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::{EventChannel, ManageSignal, WordEvent};

    #[test]
    fn receiver_can_only_be_taken_once() {
        let channel = EventChannel::new();
        let mut rx = channel.take().unwrap();
        assert!(channel.take().is_none());

        channel.error("boom");
        channel.finished();
        assert_eq!(rx.try_recv().unwrap(), WordEvent::Error("boom".to_string()));
        assert_eq!(rx.try_recv().unwrap(), WordEvent::Finished);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn signal_reaches_every_subscriber() {
        let signal = ManageSignal::new();
        let mut first = signal.subscribe();
        let mut second = signal.subscribe();

        signal.notify();
        assert!(first.try_recv().is_ok());
        assert!(second.try_recv().is_ok());
        assert_eq!(signal.name(), "manage_word");
    }
}
