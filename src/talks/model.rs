use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::TalkError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Talk {
    pub title: String,
    pub presenter: String,
    pub summary: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// Body of `PUT /api/talks/:title`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TalkSubmission {
    pub presenter: String,
    pub summary: String,
}

impl TalkSubmission {
    /// Accepts only a JSON object whose `presenter` and `summary` are strings.
    pub fn from_json(body: &Value) -> Result<Self, TalkError> {
        match (string_field(body, "presenter"), string_field(body, "summary")) {
            (Some(presenter), Some(summary)) => Ok(Self { presenter, summary }),
            _ => Err(TalkError::BadTalkData),
        }
    }

    pub fn into_talk(
        self,
        title: &str,
    ) -> Talk {
        Talk {
            title: title.to_string(),
            presenter: self.presenter,
            summary: self.summary,
            comments: Vec::new(),
        }
    }
}

/// Body of `POST /api/talks/:title/comments`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentSubmission {
    pub author: String,
    pub message: String,
}

impl CommentSubmission {
    pub fn from_json(body: &Value) -> Result<Self, TalkError> {
        match (string_field(body, "author"), string_field(body, "message")) {
            (Some(author), Some(message)) => Ok(Self { author, message }),
            _ => Err(TalkError::BadCommentData),
        }
    }
}

impl From<CommentSubmission> for Comment {
    fn from(c: CommentSubmission) -> Self {
        Comment {
            author: c.author,
            message: c.message,
        }
    }
}

fn string_field(
    body: &Value,
    name: &str,
) -> Option<String> {
    body.get(name).and_then(Value::as_str).map(str::to_string)
}
