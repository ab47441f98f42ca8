//! warp routes exposing the talk board over HTTP.
//!
//! | Verb   | Path                         | Handler        |
//! |--------|------------------------------|----------------|
//! | GET    | `/api/talks`                 | long poll      |
//! | GET    | `/api/talks/events`          | SSE stream     |
//! | PUT    | `/api/talks/:title`          | submit         |
//! | DELETE | `/api/talks/:title`          | delete         |
//! | POST   | `/api/talks/:title/comments` | comment        |
//! | GET    | `/health`                    | liveness       |
//!
//! Anything else falls through to the static front end when a public
//! directory is configured.

mod handlers;


use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use handlers::*;
use tokio::sync::watch;
use tracing::info;
use warp::filters::BoxedFilter;
use warp::Filter;
use warp::Rejection;
use warp::Reply;

use crate::Error;
use crate::Result;
use crate::TalkService;

/// Largest accepted request body
const MAX_BODY_BYTES: u64 = 64 * 1024;

pub fn routes(
    service: Arc<TalkService>,
    public_dir: Option<PathBuf>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone + Send + Sync + 'static {
    let api = list_talks_route(service.clone())
        .or(talk_events_route(service.clone()))
        .unify()
        .or(put_talk_route(service.clone()))
        .unify()
        .or(delete_talk_route(service.clone()))
        .unify()
        .or(post_comment_route(service))
        .unify()
        .or(health_route())
        .unify()
        .boxed();

    let app: BoxedFilter<(BoxedReply,)> = match public_dir {
        Some(dir) => api
            .or(warp::get()
                .and(warp::fs::dir(dir))
                .map(|file| Box::new(file) as BoxedReply))
            .unify()
            .boxed(),
        None => api,
    };

    app.recover(handle_rejection)
        .unify()
        .with(warp::trace::request())
}

/// Serves the talk board on `addr` until `shutdown_signal` fires.
pub async fn start_server(
    addr: SocketAddr,
    service: Arc<TalkService>,
    public_dir: Option<PathBuf>,
    shutdown_signal: watch::Receiver<()>,
) -> Result<()> {
    let (bound, server) = bind_server(addr, service, public_dir, shutdown_signal)?;

    info!("Talk board listening on http://{}", bound);
    server.await;
    info!("Talk board server stopped");
    Ok(())
}

/// Binds the listener and returns the bound address with the server future.
///
/// On shutdown the notifier is closed first: parked polls answer 304 and event
/// streams end, so graceful shutdown does not wait on them.
pub fn bind_server(
    addr: SocketAddr,
    service: Arc<TalkService>,
    public_dir: Option<PathBuf>,
    mut shutdown_signal: watch::Receiver<()>,
) -> Result<(SocketAddr, impl Future<Output = ()> + 'static)> {
    let notifier = Arc::clone(service.notifier());
    warp::serve(routes(service, public_dir))
        .try_bind_with_graceful_shutdown(addr, async move {
            let _ = shutdown_signal.changed().await;
            notifier.close();
        })
        .map_err(|e| Error::Fatal(format!("Failed to bind {addr}: {e}")))
}

fn with_service(
    service: Arc<TalkService>
) -> impl Filter<Extract = (Arc<TalkService>,), Error = Infallible> + Clone {
    warp::any().map(move || service.clone())
}

fn title_segment() -> impl Filter<Extract = (String,), Error = Rejection> + Clone {
    warp::path::param::<String>().and_then(decode_title)
}

fn list_talks_route(
    service: Arc<TalkService>
) -> impl Filter<Extract = (BoxedReply,), Error = Rejection> + Clone {
    warp::path!("api" / "talks")
        .and(warp::get())
        .and(warp::header::optional::<String>("if-none-match"))
        .and(warp::header::optional::<String>("prefer"))
        .and(with_service(service))
        .and_then(poll_talks)
}

fn talk_events_route(
    service: Arc<TalkService>
) -> impl Filter<Extract = (BoxedReply,), Error = Rejection> + Clone {
    warp::path!("api" / "talks" / "events")
        .and(warp::get())
        .and(with_service(service))
        .and_then(handlers::talk_events)
}

fn put_talk_route(
    service: Arc<TalkService>
) -> impl Filter<Extract = (BoxedReply,), Error = Rejection> + Clone {
    warp::path("api")
        .and(warp::path("talks"))
        .and(title_segment())
        .and(warp::path::end())
        .and(warp::put())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .and(with_service(service))
        .and_then(handlers::put_talk)
}

fn delete_talk_route(
    service: Arc<TalkService>
) -> impl Filter<Extract = (BoxedReply,), Error = Rejection> + Clone {
    warp::path("api")
        .and(warp::path("talks"))
        .and(title_segment())
        .and(warp::path::end())
        .and(warp::delete())
        .and(with_service(service))
        .and_then(handlers::delete_talk)
}

fn post_comment_route(
    service: Arc<TalkService>
) -> impl Filter<Extract = (BoxedReply,), Error = Rejection> + Clone {
    warp::path("api")
        .and(warp::path("talks"))
        .and(title_segment())
        .and(warp::path("comments"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .and(with_service(service))
        .and_then(handlers::post_comment)
}

fn health_route() -> impl Filter<Extract = (BoxedReply,), Error = Rejection> + Clone {
    warp::path!("health")
        .and(warp::get())
        .map(|| Box::new("ok") as BoxedReply)
}
