use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use serde_json::Value;

use super::*;
use crate::ChangeNotifier;
use crate::JsonFileStore;
use crate::PollConfig;
use crate::TalkError;

async fn setup_service(path: &Path) -> TalkService {
    let talks = Arc::new(TalkStore::open(JsonFileStore::new(path)).await.unwrap());
    let notifier = Arc::new(ChangeNotifier::new(Arc::clone(&talks), PollConfig::default()));
    TalkService::new(talks, notifier)
}

fn talk_body() -> Value {
    json!({"presenter": "Anon", "summary": "Lorem ipsum"})
}

#[tokio::test]
async fn test_submit_then_list_returns_the_talk() {
    let dir = tempfile::tempdir().unwrap();
    let service = setup_service(&dir.path().join("talks.json")).await;

    let version = service.submit("Foobar", &talk_body()).await.unwrap();

    assert_eq!(version.get(), 1);
    assert_eq!(
        service.list_all(),
        vec![Talk {
            title: "Foobar".into(),
            presenter: "Anon".into(),
            summary: "Lorem ipsum".into(),
            comments: vec![],
        }]
    );
}

#[tokio::test]
async fn test_every_mutation_advances_version_once() {
    let dir = tempfile::tempdir().unwrap();
    let service = setup_service(&dir.path().join("talks.json")).await;

    service.submit("Foobar", &talk_body()).await.unwrap();
    service
        .add_comment("Foobar", &json!({"author": "Bob", "message": "Nice"}))
        .await
        .unwrap();
    service
        .add_comment("Foobar", &json!({"author": "Eve", "message": "Agreed"}))
        .await
        .unwrap();
    let version = service.delete("Foobar").await.unwrap();

    assert_eq!(version.get(), 4);
    assert_eq!(service.notifier().version().get(), 4);
    assert!(service.list_all().is_empty());
}

#[tokio::test]
async fn test_delete_of_unknown_talk_still_advances_version() {
    let dir = tempfile::tempdir().unwrap();
    let service = setup_service(&dir.path().join("talks.json")).await;

    service.submit("Foobar", &talk_body()).await.unwrap();
    let version = service.delete("Nope").await.unwrap();

    assert_eq!(version.get(), 2);
    assert_eq!(service.list_all().len(), 1);
}

#[tokio::test]
async fn test_comment_on_unknown_talk_is_not_found_and_keeps_version() {
    let dir = tempfile::tempdir().unwrap();
    let service = setup_service(&dir.path().join("talks.json")).await;

    let result = service
        .add_comment("Nope", &json!({"author": "Bob", "message": "Hi"}))
        .await;

    assert!(matches!(result, Err(TalkError::NotFound(title)) if title == "Nope"));
    assert_eq!(service.notifier().version().get(), 0);
}

#[tokio::test]
async fn test_invalid_bodies_are_rejected_without_mutation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("talks.json");
    let service = setup_service(&path).await;

    let bad_talk = service.submit("Foobar", &json!({"presenter": "Anon"})).await;
    assert!(matches!(bad_talk, Err(TalkError::BadTalkData)));

    service.submit("Foobar", &talk_body()).await.unwrap();
    let bad_comment = service.add_comment("Foobar", &json!({"author": 1})).await;
    assert!(matches!(bad_comment, Err(TalkError::BadCommentData)));

    assert_eq!(service.notifier().version().get(), 1);
    assert!(service.list_all()[0].comments.is_empty());
}

#[tokio::test]
async fn test_resubmitting_replaces_talk_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let service = setup_service(&dir.path().join("talks.json")).await;

    service.submit("First", &talk_body()).await.unwrap();
    service.submit("Second", &talk_body()).await.unwrap();
    service
        .add_comment("First", &json!({"author": "Bob", "message": "Hi"}))
        .await
        .unwrap();
    service
        .submit("First", &json!({"presenter": "Someone", "summary": "Redone"}))
        .await
        .unwrap();

    let talks = service.list_all();
    let titles: Vec<_> = talks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second"]);
    assert_eq!(talks[0].presenter, "Someone");
    assert!(talks[0].comments.is_empty());
}

#[tokio::test]
async fn test_mutations_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("talks.json");
    {
        let service = setup_service(&path).await;
        service.submit("Foobar", &talk_body()).await.unwrap();
        service
            .add_comment("Foobar", &json!({"author": "Bob", "message": "Nice"}))
            .await
            .unwrap();
    }

    let reopened = setup_service(&path).await;
    let talks = reopened.list_all();
    assert_eq!(talks.len(), 1);
    assert_eq!(talks[0].comments.len(), 1);
    // Versions are process-lifetime state and restart at zero
    assert_eq!(reopened.notifier().version().get(), 0);
}

#[tokio::test]
async fn test_failed_write_does_not_bump_version_or_change_state() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("data");
    let service = setup_service(&blocker.join("talks.json")).await;

    // The store's parent directory is now a regular file, so the rewrite fails.
    std::fs::write(&blocker, b"not a directory").unwrap();

    let result = service.submit("Foobar", &talk_body()).await;

    assert!(matches!(result, Err(TalkError::Storage(_))));
    assert_eq!(service.notifier().version().get(), 0);
    assert!(service.list_all().is_empty());
}
