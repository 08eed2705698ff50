use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use jobstream_core::Frame;
use jobstream_engine::{
    FetchExhausted, FetchFailure, FetchOutput, Fetcher, FrameSink, Pipeline, PipelineSettings,
    SelectorListExtractor, UnboundedFrameSink,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(stream_logging::initialize_for_tests);
}

const JOB_URL: &str = "https://www.linkedin.com/jobs/view/123";

struct StubFetcher {
    result: Result<Vec<u8>, FetchExhausted>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    seen_urls: Mutex<Vec<String>>,
}

impl StubFetcher {
    fn with_html(html: &str) -> Self {
        Self {
            result: Ok(html.as_bytes().to_vec()),
            delay: None,
            calls: AtomicUsize::new(0),
            seen_urls: Mutex::new(Vec::new()),
        }
    }

    fn failing(exhausted: FetchExhausted) -> Self {
        Self {
            result: Err(exhausted),
            delay: None,
            calls: AtomicUsize::new(0),
            seen_urls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchExhausted> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_urls.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.result {
            Ok(bytes) => Ok(FetchOutput {
                bytes: bytes.clone(),
                final_url: url.to_string(),
                content_type: Some("text/html; charset=utf-8".to_string()),
                attempts: 1,
            }),
            Err(exhausted) => Err(exhausted.clone()),
        }
    }
}

#[derive(Default)]
struct CollectSink {
    frames: Mutex<Vec<Frame>>,
}

impl CollectSink {
    fn take(&self) -> Vec<Frame> {
        self.frames.lock().unwrap().clone()
    }
}

impl FrameSink for CollectSink {
    fn send(&self, frame: Frame) -> bool {
        self.frames.lock().unwrap().push(frame);
        true
    }
}

fn pipeline(fetcher: Arc<StubFetcher>, heartbeat: Option<Duration>) -> Pipeline {
    Pipeline::new(
        fetcher,
        Arc::new(SelectorListExtractor::job_description()),
        PipelineSettings { heartbeat },
    )
}

fn assert_single_terminal_frame_last(frames: &[Frame]) {
    let terminals = frames.iter().filter(|frame| frame.is_terminal()).count();
    assert_eq!(terminals, 1, "expected one terminal frame in {frames:?}");
    assert!(
        frames.last().is_some_and(Frame::is_terminal),
        "terminal frame must end the stream: {frames:?}"
    );
}

#[tokio::test]
async fn invalid_url_short_circuits_before_any_fetch() {
    init_logging();
    let fetcher = Arc::new(StubFetcher::with_html("<html></html>"));
    let sink = Arc::new(CollectSink::default());

    pipeline(fetcher.clone(), None)
        .run("https://example.com/not-a-job", sink.clone())
        .await;

    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    let frames = sink.take();
    assert_eq!(
        frames,
        vec![
            Frame::status("Trying to fetch job description..."),
            Frame::error("Invalid job URL"),
        ]
    );
    assert_single_terminal_frame_last(&frames);
}

#[tokio::test]
async fn success_emits_phase_statuses_then_one_description() {
    init_logging();
    let html = r#"<div class="description__text">Build things</div>"#;
    let fetcher = Arc::new(StubFetcher::with_html(html));
    let sink = Arc::new(CollectSink::default());

    pipeline(fetcher, None).run(JOB_URL, sink.clone()).await;

    let frames = sink.take();
    assert_eq!(
        frames,
        vec![
            Frame::status("Trying to fetch job description..."),
            Frame::status("Extracting job details..."),
            Frame::status("Processing job description..."),
            Frame::status("Job description successfully retrieved..."),
            Frame::description("Build things"),
        ]
    );
    assert_single_terminal_frame_last(&frames);
}

#[tokio::test]
async fn canonical_url_is_what_the_fetcher_sees() {
    init_logging();
    let html = r#"<div class="description__text">Build things</div>"#;
    let fetcher = Arc::new(StubFetcher::with_html(html));
    let sink = Arc::new(CollectSink::default());

    pipeline(fetcher.clone(), None)
        .run(
            "https://www.linkedin.com/jobs/view/123?refId=abc&trk=xyz",
            sink,
        )
        .await;

    assert_eq!(
        fetcher.seen_urls.lock().unwrap().as_slice(),
        ["https://www.linkedin.com/jobs/view/123"]
    );
}

#[tokio::test]
async fn fetch_exhaustion_becomes_a_terminal_error_frame() {
    init_logging();
    let fetcher = Arc::new(StubFetcher::failing(FetchExhausted {
        attempts: 8,
        last: Some(FetchFailure {
            kind: jobstream_engine::FailureKind::HttpStatus(403),
            message: "403 Forbidden".to_string(),
        }),
    }));
    let sink = Arc::new(CollectSink::default());

    pipeline(fetcher, None).run(JOB_URL, sink.clone()).await;

    let frames = sink.take();
    assert_eq!(frames.last(), Some(&Frame::error("403 Forbidden")));
    assert_single_terminal_frame_last(&frames);
}

#[tokio::test]
async fn extraction_miss_becomes_a_terminal_error_frame() {
    init_logging();
    let fetcher = Arc::new(StubFetcher::with_html(
        "<html><body><p>nothing relevant</p></body></html>",
    ));
    let sink = Arc::new(CollectSink::default());

    pipeline(fetcher, None).run(JOB_URL, sink.clone()).await;

    let frames = sink.take();
    assert_eq!(
        frames.last(),
        Some(&Frame::error("No job description found in the page"))
    );
    assert_single_terminal_frame_last(&frames);
}

#[tokio::test]
async fn heartbeat_runs_while_the_fetch_is_outstanding_and_never_after() {
    init_logging();
    let html = r#"<div class="description__text">Build things</div>"#;
    let mut fetcher = StubFetcher::with_html(html);
    fetcher.delay = Some(Duration::from_millis(120));
    let sink = Arc::new(CollectSink::default());

    pipeline(Arc::new(fetcher), Some(Duration::from_millis(20)))
        .run(JOB_URL, sink.clone())
        .await;

    // Give a leaked heartbeat every chance to misfire.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let frames = sink.take();
    let heartbeats = frames
        .iter()
        .filter(|frame| **frame == Frame::status("Still processing..."))
        .count();
    assert!(heartbeats >= 2, "expected keep-alives, got {frames:?}");
    assert_single_terminal_frame_last(&frames);
}

#[tokio::test]
async fn dropped_receiver_stops_keepalives_and_the_run_settles() {
    init_logging();
    let html = r#"<div class="description__text">Build things</div>"#;
    let mut fetcher = StubFetcher::with_html(html);
    fetcher.delay = Some(Duration::from_millis(120));

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let sink = Arc::new(UnboundedFrameSink::new(tx));
    let dropper = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(40)).await;
        drop(rx);
    });

    // With the peer gone mid-fetch, the run must still settle: the heartbeat
    // stops on its first failed send and every later write is swallowed.
    let pipeline = pipeline(Arc::new(fetcher), Some(Duration::from_millis(10)));
    tokio::time::timeout(Duration::from_secs(2), pipeline.run(JOB_URL, sink.clone()))
        .await
        .expect("run settles after the receiver is gone");
    dropper.await.expect("dropper task");

    assert!(!sink.send(Frame::status("late")));
}

#[tokio::test]
async fn disabled_heartbeat_emits_no_keepalives() {
    init_logging();
    let html = r#"<div class="description__text">Build things</div>"#;
    let mut fetcher = StubFetcher::with_html(html);
    fetcher.delay = Some(Duration::from_millis(60));

    let sink = Arc::new(CollectSink::default());
    pipeline(Arc::new(fetcher), None)
        .run(JOB_URL, sink.clone())
        .await;

    assert!(sink
        .take()
        .iter()
        .all(|frame| *frame != Frame::status("Still processing...")));
}
