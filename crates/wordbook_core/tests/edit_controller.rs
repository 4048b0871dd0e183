use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use wordbook_core::{
    EditState, EditWordController, ManageSignal, MemoryWordStore, RepoError, RepoResult, Word,
    WordEvent, WordId, WordScope, WordStore, WordsRepo,
};

/// Memory store whose updates can be switched to fail.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryWordStore,
    fail_updates: AtomicBool,
}

impl WordStore for FlakyStore {
    fn insert_word(&self, word: &Word) -> RepoResult<WordId> {
        self.inner.insert_word(word)
    }
    fn update_word(&self, word: &Word) -> RepoResult<()> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(RepoError::InvalidData("disk full".to_string()));
        }
        self.inner.update_word(word)
    }
    fn get_word(&self, id: WordId) -> RepoResult<Option<Word>> {
        self.inner.get_word(id)
    }
    fn list_words(&self, scope: WordScope) -> RepoResult<Vec<Word>> {
        self.inner.list_words(scope)
    }
    fn delete_word(&self, id: WordId) -> RepoResult<bool> {
        self.inner.delete_word(id)
    }
}

/// Memory store whose updates block until the test opens the gate.
struct GatedStore {
    inner: MemoryWordStore,
    gate: Mutex<mpsc::Receiver<()>>,
}

impl WordStore for GatedStore {
    fn insert_word(&self, word: &Word) -> RepoResult<WordId> {
        self.inner.insert_word(word)
    }
    fn update_word(&self, word: &Word) -> RepoResult<()> {
        self.gate.lock().unwrap().recv().unwrap();
        self.inner.update_word(word)
    }
    fn get_word(&self, id: WordId) -> RepoResult<Option<Word>> {
        self.inner.get_word(id)
    }
    fn list_words(&self, scope: WordScope) -> RepoResult<Vec<Word>> {
        self.inner.list_words(scope)
    }
    fn delete_word(&self, id: WordId) -> RepoResult<bool> {
        self.inner.delete_word(id)
    }
}

async fn seeded_repo() -> (WordsRepo, WordId) {
    let repo = WordsRepo::new(MemoryWordStore::new());
    let id = repo
        .add(Word::new("ephemeral", "short-lived", "brief", "adj."))
        .await
        .unwrap();
    (repo, id)
}

fn loaded_word(controller: &EditWordController) -> Word {
    match &*controller.state().borrow() {
        EditState::Loaded(word) => word.clone(),
        other => panic!("expected loaded state, got {other:?}"),
    }
}

#[tokio::test]
async fn load_existing_word_populates_state() {
    let (repo, id) = seeded_repo().await;
    let controller = EditWordController::new(repo);

    controller.load(id).await;

    let word = loaded_word(&controller);
    assert_eq!(word.id, Some(id));
    assert_eq!(word.title, "ephemeral");
}

#[tokio::test]
async fn load_missing_word_fails_with_message() {
    let (repo, _) = seeded_repo().await;
    let controller = EditWordController::new(repo);
    let mut events = controller.take_events().unwrap();

    controller.load(404).await;

    assert_eq!(
        *controller.state().borrow(),
        EditState::Failed("item not found".to_string())
    );
    assert_eq!(
        events.try_recv().unwrap(),
        WordEvent::Error("item not found".to_string())
    );
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn submit_persists_edits_and_keeps_identity() {
    let (repo, id) = seeded_repo().await;
    let signal = ManageSignal::new();
    let mut changes = signal.subscribe();
    let controller = EditWordController::new(repo.clone()).with_signal(signal);
    let mut events = controller.take_events().unwrap();
    controller.load(id).await;
    let before = loaded_word(&controller);

    controller
        .submit("fleeting", "passing quickly", "transient", "")
        .await;

    assert_eq!(events.try_recv().unwrap(), WordEvent::Finished);
    assert!(events.try_recv().is_err());
    assert!(changes.try_recv().is_ok());

    let stored = repo.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.title, "fleeting");
    assert_eq!(stored.definition, "passing quickly");
    assert_eq!(stored.synonym, "transient");
    assert_eq!(stored.details, "");
    assert_eq!(stored.created_at, before.created_at);
    assert_eq!(stored.is_completed, before.is_completed);
    assert_eq!(*controller.state().borrow(), EditState::Success(stored));
}

#[tokio::test]
async fn blank_fields_are_rejected_without_touching_the_store() {
    let (repo, id) = seeded_repo().await;
    let controller = EditWordController::new(repo.clone());
    let mut events = controller.take_events().unwrap();
    controller.load(id).await;

    controller.submit("", " ", "", "").await;

    assert_eq!(
        events.try_recv().unwrap(),
        WordEvent::Error("title and definition cannot be blank".to_string())
    );
    assert!(events.try_recv().is_err());
    assert_eq!(loaded_word(&controller).title, "ephemeral");
    assert_eq!(repo.get_by_id(id).await.unwrap().unwrap().title, "ephemeral");
}

#[tokio::test]
async fn submit_without_loaded_word_is_rejected() {
    let (repo, _) = seeded_repo().await;
    let controller = EditWordController::new(repo);
    let mut events = controller.take_events().unwrap();

    controller.submit("t", "d", "", "").await;

    assert_eq!(
        events.try_recv().unwrap(),
        WordEvent::Error("no word loaded".to_string())
    );
    assert_eq!(*controller.state().borrow(), EditState::Idle);
}

#[tokio::test]
async fn persistence_failure_keeps_loaded_state_for_retry() {
    let store = Arc::new(FlakyStore::default());
    let repo = WordsRepo::from_shared(store.clone());
    let id = repo.add(Word::new("draft", "d", "", "")).await.unwrap();
    let controller = EditWordController::new(repo.clone());
    let mut events = controller.take_events().unwrap();
    controller.load(id).await;

    store.fail_updates.store(true, Ordering::SeqCst);
    controller.submit("final", "d", "", "").await;

    assert_eq!(
        events.try_recv().unwrap(),
        WordEvent::Error("storage error: invalid persisted word data: disk full".to_string())
    );
    assert!(events.try_recv().is_err());
    assert_eq!(loaded_word(&controller).title, "draft");

    store.fail_updates.store(false, Ordering::SeqCst);
    controller.submit("final", "d", "", "").await;

    assert_eq!(events.try_recv().unwrap(), WordEvent::Finished);
    assert_eq!(repo.get_by_id(id).await.unwrap().unwrap().title, "final");
}

#[tokio::test]
async fn toggling_twice_restores_completion_flag() {
    let (repo, id) = seeded_repo().await;
    let controller = EditWordController::new(repo.clone());
    let mut events = controller.take_events().unwrap();
    controller.load(id).await;

    controller.toggle_completed().await;
    assert!(loaded_word(&controller).is_completed);
    assert!(repo.get_by_id(id).await.unwrap().unwrap().is_completed);

    controller.toggle_completed().await;
    assert!(!loaded_word(&controller).is_completed);
    assert!(!repo.get_by_id(id).await.unwrap().unwrap().is_completed);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn delete_removes_word_and_finishes() {
    let (repo, id) = seeded_repo().await;
    let controller = EditWordController::new(repo.clone());
    let mut events = controller.take_events().unwrap();
    controller.load(id).await;

    controller.delete().await;

    assert_eq!(events.try_recv().unwrap(), WordEvent::Finished);
    assert_eq!(*controller.state().borrow(), EditState::Idle);
    assert!(repo.get_by_id(id).await.unwrap().is_none());
}

#[tokio::test]
async fn last_issued_load_wins() {
    let repo = WordsRepo::new(MemoryWordStore::new());
    let first = repo.add(Word::new("first", "d", "", "")).await.unwrap();
    let second = repo.add(Word::new("second", "d", "", "")).await.unwrap();
    let controller = EditWordController::new(repo);

    tokio::join!(controller.load(first), controller.load(second));

    assert_eq!(loaded_word(&controller).id, Some(second));
}

#[tokio::test]
async fn load_during_in_flight_save_is_rejected() {
    let (gate_tx, gate_rx) = mpsc::channel();
    let repo = WordsRepo::new(GatedStore {
        inner: MemoryWordStore::new(),
        gate: Mutex::new(gate_rx),
    });
    let id = repo.add(Word::new("draft", "d", "", "")).await.unwrap();
    let other = repo.add(Word::new("other", "d", "", "")).await.unwrap();
    let controller = EditWordController::new(repo);
    let mut events = controller.take_events().unwrap();
    controller.load(id).await;

    tokio::join!(controller.submit("final", "d", "", ""), async {
        assert!(matches!(
            *controller.state().borrow(),
            EditState::Submitting(_)
        ));
        controller.load(other).await;
        gate_tx.send(()).unwrap();
    });

    assert_eq!(
        events.try_recv().unwrap(),
        WordEvent::Error("a save is already in progress".to_string())
    );
    assert_eq!(events.try_recv().unwrap(), WordEvent::Finished);
    match &*controller.state().borrow() {
        EditState::Success(word) => assert_eq!(word.id, Some(id)),
        other => panic!("expected success state, got {other:?}"),
    }
}
