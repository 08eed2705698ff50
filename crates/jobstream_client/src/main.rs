use anyhow::Context;
use tokio_util::sync::CancellationToken;

use jobstream_client::JobStreamClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stream_logging::initialize(stream_logging::LogDestination::Terminal);

    let mut args = std::env::args().skip(1);
    let job_url = args
        .next()
        .context("usage: jobstream_client <job-url> [server-base-url]")?;
    let endpoint = args
        .next()
        .unwrap_or_else(|| "http://127.0.0.1:3000".to_string());

    let client = JobStreamClient::new(endpoint)?;
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let mut printed = 0;
    let state = client
        .stream_job_description(&job_url, &cancel, |state| {
            for line in &state.status_log()[printed..] {
                eprintln!("[status] {line}");
            }
            printed = state.status_log().len();
        })
        .await;

    println!("{}", serde_json::to_string_pretty(&state.view())?);
    Ok(())
}
