//! Prometheus metrics for the talk board and the warp server that exports them.

use std::sync::Once;

use lazy_static::lazy_static;
use prometheus::IntCounterVec;
use prometheus::IntGauge;
use prometheus::Opts;
use prometheus::Registry;
use tokio::sync::watch;
use tracing::error;
use tracing::info;
use warp::Filter;
use warp::Rejection;
use warp::Reply;


lazy_static! {
    pub static ref COLLECTION_VERSION_METRIC: IntGauge =
        IntGauge::new("talk_collection_version", "Current version of the talk collection")
            .expect("metric can not be created");

    pub static ref POLL_WAITERS_METRIC: IntGauge =
        IntGauge::new("talk_poll_waiters", "Long-poll requests currently parked")
            .expect("metric can not be created");

    pub static ref MUTATIONS_METRIC: IntCounterVec = IntCounterVec::new(
        Opts::new("talk_mutations_total", "Successful talk mutations by kind"),
        &["kind"]
    )
    .expect("metric can not be created");

    pub static ref POLL_RESPONSES_METRIC: IntCounterVec = IntCounterVec::new(
        Opts::new("talk_poll_responses_total", "Answers to GET /api/talks by outcome"),
        &["outcome"]
    )
    .expect("metric can not be created");

    pub static ref REGISTRY: Registry = Registry::new();
}

static REGISTER: Once = Once::new();

pub(crate) fn register_custom_metrics(registry: &Registry) {
    registry
        .register(Box::new(COLLECTION_VERSION_METRIC.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(POLL_WAITERS_METRIC.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(MUTATIONS_METRIC.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(POLL_RESPONSES_METRIC.clone()))
        .expect("collector can be registered");
}

/// Registers the board's collectors with the global [`REGISTRY`] once per process.
pub fn init_metrics() {
    REGISTER.call_once(|| register_custom_metrics(&REGISTRY));
}

pub async fn start_server(
    port: u16,
    mut shutdown_signal: watch::Receiver<()>,
) {
    init_metrics();

    let metrics_route = warp::path!("metrics")
        .and(warp::get())
        .map(|| REGISTRY.clone())
        .and_then(metrics_handler);

    let (addr, server) =
        warp::serve(metrics_route).bind_with_graceful_shutdown(([0, 0, 0, 0], port), async move {
            let _ = shutdown_signal.changed().await;
        });
    info!("Metrics server listening on {}", addr);
    server.await;
}

async fn metrics_handler(registry: Registry) -> Result<impl Reply, Rejection> {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        error!("could not encode custom metrics: {}", e);
    };
    let body = String::from_utf8(buffer).unwrap_or_else(|e| {
        error!("custom metrics could not be from_utf8'd: {}", e);
        String::default()
    });
    Ok(body)
}
