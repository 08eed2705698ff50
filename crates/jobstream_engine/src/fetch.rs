use std::time::Duration;

use futures_util::StreamExt;
use rand::seq::IndexedRandom;
use rand::Rng;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, PRAGMA, REFERER, USER_AGENT};
use reqwest::StatusCode;

use crate::{FailureKind, FetchExhausted, FetchFailure, FetchOutput};

const ACCEPT_VALUE: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.9";
const REFERER_VALUE: &str = "https://www.google.com/";

/// Browser identities rotated across attempts. Ordinary desktop browsers;
/// one is picked uniformly at random per attempt.
pub fn default_identities() -> Vec<String> {
    [
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0.3 Safari/605.1.15",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Total attempt budget, counting the first attempt.
    pub max_attempts: usize,
    /// Unit for the exponential backoff and its jitter.
    pub base_delay: Duration,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
    /// User-Agent pool; one entry is chosen per attempt.
    pub identities: Vec<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            base_delay: Duration::from_millis(1000),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 5 * 1024 * 1024,
            identities: default_identities(),
        }
    }
}

/// Backoff before the attempt following 0-indexed attempt `n`:
/// `2^n * base` plus uniform jitter in `[0, base)`.
pub fn backoff_delay(attempt: usize, base: Duration) -> Duration {
    let shift = u32::try_from(attempt).unwrap_or(u32::MAX).min(16);
    let exponential = base.saturating_mul(1u32 << shift);
    let base_ms = base.as_millis() as u64;
    let jitter = if base_ms == 0 {
        Duration::ZERO
    } else {
        Duration::from_millis(rand::rng().random_range(0..base_ms))
    };
    exponential + jitter
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchExhausted>;
}

/// Fetcher for rate-limiting, bot-hostile origins: rotates a spoofed browser
/// identity per attempt and retries transient failures with exponential
/// backoff plus jitter, bounded by `max_attempts`. Each call is independent;
/// there is no cross-call budget or circuit breaker.
#[derive(Debug, Clone)]
pub struct RobustFetcher {
    settings: FetchSettings,
}

impl RobustFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, FetchFailure> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| FetchFailure::new(FailureKind::Network, err.to_string()))
    }

    async fn attempt(
        &self,
        client: &reqwest::Client,
        url: &str,
    ) -> Result<FetchOutput, FetchFailure> {
        let mut request = client
            .get(url)
            .header(ACCEPT, ACCEPT_VALUE)
            .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_VALUE)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .header(REFERER, REFERER_VALUE);
        if let Some(identity) = self.settings.identities.choose(&mut rand::rng()) {
            request = request.header(USER_AGENT, identity.as_str());
        }

        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchFailure::new(FailureKind::RateLimited, "http status 429"));
        }
        if !status.is_success() {
            return Err(FetchFailure::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(FetchFailure::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(FetchFailure::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(FetchOutput {
            bytes,
            final_url,
            content_type,
            attempts: 0,
        })
    }
}

#[async_trait::async_trait]
impl Fetcher for RobustFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchExhausted> {
        let max_attempts = self.settings.max_attempts.max(1);
        let mut last_error: Option<FetchFailure> = None;

        let client = match self.build_client() {
            Ok(client) => client,
            Err(failure) => {
                return Err(FetchExhausted {
                    attempts: 0,
                    last: Some(failure),
                })
            }
        };

        for attempt in 0..max_attempts {
            match self.attempt(&client, url).await {
                Ok(mut output) => {
                    output.attempts = attempt + 1;
                    log::debug!("fetch succeeded on attempt {}", attempt + 1);
                    return Ok(output);
                }
                Err(failure) => {
                    log::warn!(
                        "fetch attempt {} of {} failed: {}",
                        attempt + 1,
                        max_attempts,
                        failure.kind
                    );
                    // A 429 never becomes the recorded error: the origin is
                    // throttling, not failing.
                    if failure.kind != FailureKind::RateLimited {
                        last_error = Some(failure);
                    }
                    if attempt + 1 < max_attempts {
                        tokio::time::sleep(backoff_delay(attempt, self.settings.base_delay)).await;
                    }
                }
            }
        }

        Err(FetchExhausted {
            attempts: max_attempts,
            last: last_error,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchFailure {
    if err.is_timeout() {
        return FetchFailure::new(FailureKind::Timeout, err.to_string());
    }
    FetchFailure::new(FailureKind::Network, err.to_string())
}
