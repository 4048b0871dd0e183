use std::time::Duration;
use tokio::sync::watch;
use wordbook_core::{AppConfig, Word, WordApp, WordEvent, WordScope};

async fn wait_for_len(rx: &mut watch::Receiver<Vec<Word>>, len: usize) {
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|words| words.len() == len))
        .await
        .expect("list did not reach expected length")
        .unwrap();
}

#[tokio::test]
async fn screens_share_one_repository() {
    let app = WordApp::in_memory().unwrap();
    let home = app.unlearned_list();
    let completed = app.completed_list();
    let all = app.all_list();
    assert_eq!(home.scope(), WordScope::Unlearned);
    assert_eq!(completed.scope(), WordScope::Completed);

    let create = app.create_controller();
    create.submit("quixotic", "idealistic", "", "").await;

    let mut home_items = home.items();
    wait_for_len(&mut home_items, 1).await;
    let id = home_items.borrow()[0].id.unwrap();

    let edit = app.edit_controller();
    let mut events = edit.take_events().unwrap();
    edit.load(id).await;
    edit.toggle_completed().await;

    wait_for_len(&mut home_items, 0).await;
    wait_for_len(&mut completed.items(), 1).await;
    wait_for_len(&mut all.items(), 1).await;

    edit.delete().await;
    assert_eq!(events.try_recv().unwrap(), WordEvent::Finished);
    wait_for_len(&mut all.items(), 0).await;
}

#[tokio::test]
async fn file_backed_app_keeps_words_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::new(dir.path());

    {
        let app = WordApp::open(&config).unwrap();
        app.create_controller()
            .submit("persistent", "lasting", "", "")
            .await;
    }

    let reopened = WordApp::open(&config).unwrap();
    let words = reopened.repo().list(WordScope::All).await.unwrap();
    assert_eq!(words.len(), 1);
    assert_eq!(words[0].title, "persistent");
}
