use std::net::SocketAddr;
use std::sync::Arc;

use jobstream_server::{router, JobStreamService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stream_logging::initialize(stream_logging::LogDestination::Terminal);

    let addr: SocketAddr = std::env::var("JOBSTREAM_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
        .parse()?;
    let service = Arc::new(JobStreamService::with_defaults());
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("jobstream server listening on {addr}");
    axum::serve(listener, router(service)).await?;
    Ok(())
}
