use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use percent_encoding::percent_decode_str;
use serde_json::Value;
use tokio_stream::wrappers::WatchStream;
use tracing::error;
use tracing::warn;
use warp::http::header::CACHE_CONTROL;
use warp::http::header::ETAG;
use warp::http::StatusCode;
use warp::reject::LengthRequired;
use warp::reject::MethodNotAllowed;
use warp::reject::PayloadTooLarge;
use warp::sse::Event;
use warp::Rejection;
use warp::Reply;

use crate::parse_if_none_match;
use crate::parse_prefer_wait;
use crate::PollResponse;
use crate::Talk;
use crate::TalkError;
use crate::TalkService;

pub type BoxedReply = Box<dyn Reply>;

/// `GET /api/talks`
pub async fn poll_talks(
    if_none_match: Option<String>,
    prefer: Option<String>,
    service: Arc<TalkService>,
) -> Result<BoxedReply, Rejection> {
    let tag = if_none_match.as_deref().and_then(parse_if_none_match);
    let wait = prefer.as_deref().and_then(parse_prefer_wait);

    let response = service.notifier().poll(tag.as_deref(), wait).await;
    Ok(poll_reply(response))
}

pub(crate) fn poll_reply(response: PollResponse<Talk>) -> BoxedReply {
    match response {
        PollResponse::Fresh(snapshot) => {
            let reply = warp::reply::json(&snapshot.documents);
            let reply = warp::reply::with_header(reply, ETAG, snapshot.version.etag());
            Box::new(warp::reply::with_header(reply, CACHE_CONTROL, "no-store"))
        }
        PollResponse::NotModified => Box::new(StatusCode::NOT_MODIFIED),
    }
}

/// `GET /api/talks/events`: the latest talk list as a server-sent event stream.
///
/// The stream ends when the notifier is closed, so shutdown is not held up by
/// connected browsers.
pub async fn talk_events(service: Arc<TalkService>) -> Result<BoxedReply, Rejection> {
    let notifier = service.notifier();
    let stream = WatchStream::new(notifier.subscribe())
        .take_until(notifier.closed())
        .map(|snapshot| {
            Event::default()
                .event("talks")
                .id(snapshot.version.to_string())
                .json_data(&snapshot.documents)
        });
    Ok(Box::new(warp::sse::reply(warp::sse::keep_alive().stream(stream))))
}

/// `PUT /api/talks/:title`
pub async fn put_talk(
    title: String,
    body: Bytes,
    service: Arc<TalkService>,
) -> Result<BoxedReply, Rejection> {
    let result = service.submit(&title, &parse_body(&body)).await;
    Ok(mutation_reply(result.map(|_| ())))
}

/// `DELETE /api/talks/:title`
pub async fn delete_talk(
    title: String,
    service: Arc<TalkService>,
) -> Result<BoxedReply, Rejection> {
    let result = service.delete(&title).await;
    Ok(mutation_reply(result.map(|_| ())))
}

/// `POST /api/talks/:title/comments`
pub async fn post_comment(
    title: String,
    body: Bytes,
    service: Arc<TalkService>,
) -> Result<BoxedReply, Rejection> {
    let result = service.add_comment(&title, &parse_body(&body)).await;
    Ok(mutation_reply(result.map(|_| ())))
}

/// Decodes a `%`-escaped title path segment.
pub async fn decode_title(raw: String) -> Result<String, Rejection> {
    percent_decode_str(&raw)
        .decode_utf8()
        .map(|title| title.into_owned())
        .map_err(|_| warp::reject::not_found())
}

/// Unparseable JSON is handled like a body with the wrong fields.
fn parse_body(body: &Bytes) -> Value {
    serde_json::from_slice(body).unwrap_or(Value::Null)
}

fn mutation_reply(result: Result<(), TalkError>) -> BoxedReply {
    match result {
        Ok(()) => Box::new(StatusCode::NO_CONTENT),
        Err(e) => {
            let status = match &e {
                TalkError::BadTalkData | TalkError::BadCommentData => StatusCode::BAD_REQUEST,
                TalkError::NotFound(_) => StatusCode::NOT_FOUND,
                TalkError::Storage(storage) => {
                    error!("Talk mutation failed: {}", storage);
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            Box::new(warp::reply::with_status(e.to_string(), status))
        }
    }
}

pub async fn handle_rejection(err: Rejection) -> Result<BoxedReply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found")
    } else if err.find::<PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Payload too large")
    } else if err.find::<LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "Length required")
    } else if err.find::<MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    } else {
        warn!("Unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    };
    Ok(Box::new(warp::reply::with_status(message, status)))
}
