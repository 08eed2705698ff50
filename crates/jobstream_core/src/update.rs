use crate::{is_valid_job_url, Effect, Msg, StreamState};

/// Message shown when a submission fails validation before any network call.
pub(crate) const INVALID_URL_MESSAGE: &str =
    "Invalid job URL: expected a link like https://www.linkedin.com/jobs/view/<id>";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: StreamState, msg: Msg) -> (StreamState, Vec<Effect>) {
    let effects = match msg {
        Msg::UrlSubmitted(raw) => {
            if !is_valid_job_url(&raw) {
                // Gate before the network: invalid input never opens a stream.
                // A stream already in flight is still torn down, matching the
                // terminal state the rejection leaves behind.
                let mut effects = Vec::new();
                if state.is_loading() {
                    effects.push(Effect::AbortStream);
                }
                state.set_error(INVALID_URL_MESSAGE);
                state.finish();
                effects
            } else {
                let mut effects = Vec::new();
                if state.is_loading() {
                    effects.push(Effect::AbortStream);
                }
                state.reset_for_new_stream();
                effects.push(Effect::OpenStream { url: raw });
                effects
            }
        }
        Msg::FrameReceived(frame) => {
            state.apply_frame(frame);
            Vec::new()
        }
        Msg::StreamClosed => {
            state.finish();
            Vec::new()
        }
        Msg::StreamFailed(message) => {
            state.set_error(message);
            state.finish();
            Vec::new()
        }
        Msg::StreamAborted => {
            // Intentional cancellation is terminal but never user-visible
            // as an error.
            state.finish();
            Vec::new()
        }
    };

    (state, effects)
}
