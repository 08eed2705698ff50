use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use jobstream_core::{extract_job_url, is_valid_job_url, Frame};

use crate::{decode_html, Extractor, Fetcher};

/// Outbound side of the progress stream. Writes are best-effort: `false`
/// means the peer is gone, and the caller must stop emitting keep-alives.
pub trait FrameSink: Send + Sync {
    fn send(&self, frame: Frame) -> bool;
}

/// Sink backed by an unbounded channel; the receiver side typically feeds an
/// HTTP response body. `send` only fails once the receiver is dropped.
pub struct UnboundedFrameSink {
    tx: tokio::sync::mpsc::UnboundedSender<Frame>,
}

impl UnboundedFrameSink {
    pub fn new(tx: tokio::sync::mpsc::UnboundedSender<Frame>) -> Self {
        Self { tx }
    }
}

impl FrameSink for UnboundedFrameSink {
    fn send(&self, frame: Frame) -> bool {
        self.tx.send(frame).is_ok()
    }
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Keep-alive interval while a fetch is outstanding; `None` disables
    /// the heartbeat.
    pub heartbeat: Option<Duration>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            heartbeat: Some(Duration::from_secs(2)),
        }
    }
}

/// The retrieval-and-extraction pipeline behind one progress stream.
///
/// Runs validate → fetch → decode → extract, emitting a `STATUS:` frame at
/// each phase transition and exactly one terminal frame (`DESCRIPTION:` or
/// `ERROR:`) per invocation. Every internal failure is converted to an
/// `ERROR:` frame here; nothing escapes to the caller.
pub struct Pipeline {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn Extractor>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            settings,
        }
    }

    pub async fn run(&self, raw_url: &str, sink: Arc<dyn FrameSink>) {
        sink.send(Frame::status("Trying to fetch job description..."));

        if !is_valid_job_url(raw_url) {
            log::info!("rejected job url before fetch: {raw_url}");
            sink.send(Frame::error("Invalid job URL"));
            return;
        }
        let job_url = extract_job_url(raw_url).to_string();

        sink.send(Frame::status("Extracting job details..."));

        // The heartbeat shares a cancellation scope with the fetch: the drop
        // guard trips the token on every exit path, so the timer can never
        // outlive the fetch it is paired with. Joining the task afterwards
        // guarantees no keep-alive frame lands after the fetch settles.
        let token = CancellationToken::new();
        let heartbeat = self
            .settings
            .heartbeat
            .map(|interval| spawn_heartbeat(interval, token.clone(), sink.clone()));
        let fetched = {
            let _guard = token.drop_guard();
            self.fetcher.fetch(&job_url).await
        };
        if let Some(handle) = heartbeat {
            let _ = handle.await;
        }

        let output = match fetched {
            Ok(output) => output,
            Err(exhausted) => {
                log::warn!(
                    "fetch exhausted after {} attempts for {job_url}",
                    exhausted.attempts
                );
                sink.send(Frame::error(exhausted.to_string()));
                return;
            }
        };
        log::info!(
            "fetched {} ({} bytes, {} attempts)",
            output.final_url,
            output.bytes.len(),
            output.attempts
        );

        let html = match decode_html(&output.bytes, output.content_type.as_deref()) {
            Ok(html) => html,
            Err(err) => {
                sink.send(Frame::error(err.to_string()));
                return;
            }
        };

        sink.send(Frame::status("Processing job description..."));

        match self.extractor.extract(&html) {
            Some(description) => {
                sink.send(Frame::status("Job description successfully retrieved..."));
                sink.send(Frame::description(description));
            }
            None => {
                // A miss is surfaced explicitly instead of forwarding an
                // absent description downstream.
                log::info!("no description locator matched for {}", output.final_url);
                sink.send(Frame::error("No job description found in the page"));
            }
        }
    }
}

fn spawn_heartbeat(
    interval: Duration,
    token: CancellationToken,
    sink: Arc<dyn FrameSink>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(interval) => {
                    if !sink.send(Frame::status("Still processing...")) {
                        // Peer disconnected; stop keep-alives silently.
                        log::debug!("heartbeat stopped: stream receiver dropped");
                        break;
                    }
                }
            }
        }
    })
}
