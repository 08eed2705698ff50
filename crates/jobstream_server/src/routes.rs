use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use bytes::Bytes;
use serde::Deserialize;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;

use jobstream_engine::{
    FetchSettings, Pipeline, PipelineSettings, RobustFetcher, SelectorListExtractor,
    UnboundedFrameSink,
};

/// Shared handler state: the pipeline serving every request. Each request
/// gets its own stream and its own pipeline invocation; nothing here is
/// mutable.
pub struct JobStreamService {
    pipeline: Pipeline,
}

impl JobStreamService {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    /// Production wiring: robust fetcher, LinkedIn selectors, heartbeat on.
    pub fn with_defaults() -> Self {
        Self::new(Pipeline::new(
            Arc::new(RobustFetcher::new(FetchSettings::default())),
            Arc::new(SelectorListExtractor::job_description()),
            PipelineSettings::default(),
        ))
    }
}

pub fn router(service: Arc<JobStreamService>) -> Router {
    Router::new()
        .route("/api/job-description", get(job_description))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
struct JobQuery {
    #[serde(rename = "jobUrl")]
    job_url: Option<String>,
}

/// One long-lived, one-directional progress stream per request.
///
/// The response body is fed from a channel whose sender side is the
/// pipeline's frame sink. The pipeline task owns every write; the stream
/// closes exactly once, structurally, when the last sender drops at the end
/// of that task. A disconnected peer surfaces as a failed channel send and
/// is never an error here.
async fn job_description(
    State(service): State<Arc<JobStreamService>>,
    Query(query): Query<JobQuery>,
) -> Response {
    let Some(job_url) = query.job_url else {
        return (StatusCode::BAD_REQUEST, "Missing job URL").into_response();
    };
    log::info!("job-description stream opened for {job_url}");

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let sink = Arc::new(UnboundedFrameSink::new(tx.clone()));
    tokio::spawn(async move {
        // A closed receiver means the peer is gone; stop the pipeline rather
        // than let a retry budget run against a stream nobody reads. Dropping
        // the run future also tears down its heartbeat task.
        tokio::select! {
            _ = service.pipeline.run(&job_url, sink) => {}
            _ = tx.closed() => {
                log::info!("job-description stream abandoned by the peer: {job_url}");
            }
        }
    });

    let body = Body::from_stream(
        UnboundedReceiverStream::new(rx)
            .map(|frame| Ok::<Bytes, Infallible>(Bytes::from(frame.encode()))),
    );
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        body,
    )
        .into_response()
}
