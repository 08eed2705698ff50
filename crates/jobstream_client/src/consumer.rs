use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use jobstream_core::{update, Effect, FrameDecoder, Msg, StreamState};

/// Client for the job-description progress stream.
///
/// Opens one streaming request per submission and incrementally decodes the
/// `\n`-delimited frames into a [`StreamState`], reporting every transition
/// through an observer callback. The read loop suspends between chunks and
/// checks cancellation there; an abort that races an in-flight read ends the
/// stream silently rather than as a user-visible error.
pub struct JobStreamClient {
    http: reqwest::Client,
    endpoint: String,
}

impl JobStreamClient {
    /// `endpoint` is the server base, e.g. `http://127.0.0.1:3000`.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            endpoint: endpoint.into(),
        })
    }

    /// Submit `job_url` and consume the stream to its end, an abort, or a
    /// transport failure. Invalid URLs are rejected locally without any
    /// network call. Never retries.
    pub async fn stream_job_description<F>(
        &self,
        job_url: &str,
        cancel: &CancellationToken,
        mut observe: F,
    ) -> StreamState
    where
        F: FnMut(&StreamState),
    {
        let mut state = StreamState::new();
        let mut apply = |state: &mut StreamState, msg: Msg| -> Vec<Effect> {
            let (next, effects) = update(std::mem::take(state), msg);
            *state = next;
            observe(state);
            effects
        };

        let effects = apply(&mut state, Msg::UrlSubmitted(job_url.to_string()));
        let opened = effects.into_iter().find_map(|effect| match effect {
            Effect::OpenStream { url } => Some(url),
            Effect::AbortStream => None,
        });
        let Some(url) = opened else {
            // Gated before the network: the error slot already explains why.
            return state;
        };

        let request = self
            .http
            .get(format!("{}/api/job-description", self.endpoint))
            .query(&[("jobUrl", url.as_str())]);
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                apply(&mut state, Msg::StreamFailed(err.to_string()));
                return state;
            }
        };
        if let Err(err) = response.error_for_status_ref() {
            apply(&mut state, Msg::StreamFailed(err.to_string()));
            return state;
        }

        let mut decoder = FrameDecoder::new();
        let mut chunks = response.bytes_stream();
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    log::debug!("stream abandoned by caller");
                    apply(&mut state, Msg::StreamAborted);
                    break;
                }
                chunk = chunks.next() => match chunk {
                    Some(Ok(bytes)) => {
                        for frame in decoder.push(&bytes) {
                            apply(&mut state, Msg::FrameReceived(frame));
                        }
                    }
                    Some(Err(err)) => {
                        // A cancellation racing the read is not an error.
                        if cancel.is_cancelled() {
                            apply(&mut state, Msg::StreamAborted);
                        } else {
                            apply(&mut state, Msg::StreamFailed(err.to_string()));
                        }
                        break;
                    }
                    None => {
                        if let Some(frame) = decoder.finish() {
                            apply(&mut state, Msg::FrameReceived(frame));
                        }
                        apply(&mut state, Msg::StreamClosed);
                        break;
                    }
                }
            }
        }

        state
    }
}
