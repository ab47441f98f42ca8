use serde_json::json;

use super::*;
use crate::TalkError;

#[test]
fn test_talk_submission_accepts_string_fields() {
    let body = json!({"presenter": "Anon", "summary": "Lorem ipsum", "extra": 1});

    let submission = TalkSubmission::from_json(&body).unwrap();
    let talk = submission.into_talk("Foobar");

    assert_eq!(
        talk,
        Talk {
            title: "Foobar".into(),
            presenter: "Anon".into(),
            summary: "Lorem ipsum".into(),
            comments: vec![],
        }
    );
}

#[test]
fn test_talk_submission_rejects_missing_or_mistyped_fields() {
    for body in [
        json!({"presenter": "Anon"}),
        json!({"summary": "Lorem ipsum"}),
        json!({"presenter": 42, "summary": "Lorem ipsum"}),
        json!({"presenter": "Anon", "summary": null}),
        json!(["Anon", "Lorem ipsum"]),
        json!("Anon"),
    ] {
        assert!(
            matches!(TalkSubmission::from_json(&body), Err(TalkError::BadTalkData)),
            "accepted {body}"
        );
    }
}

#[test]
fn test_comment_submission_validation() {
    let ok = CommentSubmission::from_json(&json!({"author": "Bob", "message": "Nice"})).unwrap();
    assert_eq!(
        Comment::from(ok),
        Comment {
            author: "Bob".into(),
            message: "Nice".into()
        }
    );

    let err = CommentSubmission::from_json(&json!({"author": "Bob", "message": false}));
    assert!(matches!(err, Err(TalkError::BadCommentData)));
}

#[test]
fn test_talk_serializes_with_empty_comment_list() {
    let talk = TalkSubmission {
        presenter: "Anon".into(),
        summary: "Lorem ipsum".into(),
    }
    .into_talk("Foobar");

    assert_eq!(
        serde_json::to_value(&talk).unwrap(),
        json!({"title": "Foobar", "presenter": "Anon", "summary": "Lorem ipsum", "comments": []})
    );
}

#[test]
fn test_error_messages_match_http_bodies() {
    assert_eq!(TalkError::BadTalkData.to_string(), "Bad talk data");
    assert_eq!(TalkError::BadCommentData.to_string(), "Bad comment data");
    assert_eq!(
        TalkError::NotFound("Foobar".into()).to_string(),
        "No talk 'Foobar' found"
    );
}
