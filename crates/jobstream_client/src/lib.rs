//! Jobstream client: consumes one progress stream into observable state.
mod consumer;

pub use consumer::JobStreamClient;
