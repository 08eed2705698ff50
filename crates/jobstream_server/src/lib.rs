//! HTTP surface for the jobstream pipeline.
mod routes;

pub use routes::{router, JobStreamService};
