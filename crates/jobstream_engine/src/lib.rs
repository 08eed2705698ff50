//! Jobstream engine: resilient fetch, extraction, and the streaming pipeline.
mod decode;
mod extract;
mod fetch;
mod pipeline;
mod types;

pub use decode::{decode_html, DecodeError};
pub use extract::{Extractor, SelectorListExtractor, JOB_DESCRIPTION_SELECTORS};
pub use fetch::{backoff_delay, default_identities, FetchSettings, Fetcher, RobustFetcher};
pub use pipeline::{FrameSink, Pipeline, PipelineSettings, UnboundedFrameSink};
pub use types::{FailureKind, FetchExhausted, FetchFailure, FetchOutput};
