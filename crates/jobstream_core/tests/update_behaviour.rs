use std::sync::Once;

use jobstream_core::{update, Effect, Frame, Msg, StreamState};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(stream_logging::initialize_for_tests);
}

const JOB_URL: &str = "https://www.linkedin.com/jobs/view/123";

fn submitted(url: &str) -> (StreamState, Vec<Effect>) {
    update(StreamState::new(), Msg::UrlSubmitted(url.to_string()))
}

#[test]
fn valid_submission_resets_state_and_opens_stream() {
    init_logging();
    let (state, effects) = submitted(JOB_URL);

    assert!(state.is_loading());
    assert_eq!(state.status_log(), &[] as &[String]);
    assert_eq!(state.description(), "");
    assert_eq!(state.error(), None);
    assert_eq!(
        effects,
        vec![Effect::OpenStream {
            url: JOB_URL.to_string()
        }]
    );
}

#[test]
fn invalid_submission_sets_error_without_any_effect() {
    init_logging();
    let (state, effects) = submitted("https://example.com/jobs/view/123");

    assert!(!state.is_loading());
    assert!(state.error().is_some_and(|e| e.contains("Invalid job URL")));
    assert!(effects.is_empty());
}

#[test]
fn status_frames_append_in_order() {
    init_logging();
    let (state, _) = submitted(JOB_URL);
    let (state, _) = update(state, Msg::FrameReceived(Frame::status("a")));
    let (state, _) = update(state, Msg::FrameReceived(Frame::status("b")));

    assert_eq!(state.status_log(), ["a", "b"]);
    assert!(state.is_loading());
}

#[test]
fn description_then_close_reaches_terminal_state() {
    init_logging();
    let (state, _) = submitted(JOB_URL);
    let (state, _) = update(state, Msg::FrameReceived(Frame::status("a")));
    let (state, _) = update(state, Msg::FrameReceived(Frame::description("c")));
    let (state, _) = update(state, Msg::StreamClosed);

    assert_eq!(state.status_log(), ["a"]);
    assert_eq!(state.description(), "c");
    assert_eq!(state.error(), None);
    assert!(!state.is_loading());
}

#[test]
fn error_frame_fills_the_error_slot() {
    init_logging();
    let (state, _) = submitted(JOB_URL);
    let (state, _) = update(state, Msg::FrameReceived(Frame::error("boom")));
    let (state, _) = update(state, Msg::StreamClosed);

    assert_eq!(state.error(), Some("boom"));
    assert!(!state.is_loading());
}

#[test]
fn transport_failure_maps_to_the_error_slot() {
    init_logging();
    let (state, _) = submitted(JOB_URL);
    let (state, _) = update(state, Msg::StreamFailed("connection reset".to_string()));

    assert_eq!(state.error(), Some("connection reset"));
    assert!(!state.is_loading());
}

#[test]
fn abort_is_terminal_but_not_an_error() {
    init_logging();
    let (state, _) = submitted(JOB_URL);
    let (state, _) = update(state, Msg::FrameReceived(Frame::status("a")));
    let (state, _) = update(state, Msg::StreamAborted);

    assert_eq!(state.error(), None);
    assert!(!state.is_loading());
    // History survives the abort; only a new submission clears it.
    assert_eq!(state.status_log(), ["a"]);
}

#[test]
fn resubmission_aborts_the_stream_in_flight_and_resets() {
    init_logging();
    let (state, _) = submitted(JOB_URL);
    let (state, _) = update(state, Msg::FrameReceived(Frame::status("a")));

    let next_url = "https://www.linkedin.com/jobs/view/456";
    let (state, effects) = update(state, Msg::UrlSubmitted(next_url.to_string()));

    assert_eq!(
        effects,
        vec![
            Effect::AbortStream,
            Effect::OpenStream {
                url: next_url.to_string()
            },
        ]
    );
    assert_eq!(state.status_log(), &[] as &[String]);
    assert!(state.is_loading());
}

#[test]
fn invalid_resubmission_still_aborts_the_stream_in_flight() {
    init_logging();
    let (state, _) = submitted(JOB_URL);
    let (state, _) = update(state, Msg::FrameReceived(Frame::status("a")));

    let (state, effects) = update(
        state,
        Msg::UrlSubmitted("https://example.com/jobs/view/456".to_string()),
    );

    // The rejected submission must not leave the previous stream running
    // behind a state that claims to be terminal.
    assert_eq!(effects, vec![Effect::AbortStream]);
    assert!(!state.is_loading());
    assert!(state.error().is_some_and(|e| e.contains("Invalid job URL")));
}

#[test]
fn view_snapshot_serializes() {
    init_logging();
    let (state, _) = submitted(JOB_URL);
    let (state, _) = update(state, Msg::FrameReceived(Frame::description("c")));
    let (state, _) = update(state, Msg::StreamClosed);

    let json = serde_json::to_value(state.view()).expect("serializable view");
    assert_eq!(json["description"], "c");
    assert_eq!(json["loading"], false);
}
