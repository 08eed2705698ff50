use serde::Serialize;

use crate::Frame;

/// Observable state of one progress stream, as a UI would render it.
///
/// The status history is append-only for the lifetime of a stream; the
/// description and error slots are last-write-wins. A new valid submission
/// resets everything.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamState {
    status_log: Vec<String>,
    description: String,
    error: Option<String>,
    loading: bool,
}

/// Serializable snapshot of [`StreamState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamView {
    pub status_log: Vec<String>,
    pub description: String,
    pub error: Option<String>,
    pub loading: bool,
}

impl StreamState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status_log(&self) -> &[String] {
        &self.status_log
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn view(&self) -> StreamView {
        StreamView {
            status_log: self.status_log.clone(),
            description: self.description.clone(),
            error: self.error.clone(),
            loading: self.loading,
        }
    }

    pub(crate) fn reset_for_new_stream(&mut self) {
        self.status_log.clear();
        self.description.clear();
        self.error = None;
        self.loading = true;
    }

    pub(crate) fn apply_frame(&mut self, frame: Frame) {
        match frame {
            Frame::Status(text) => self.status_log.push(text),
            Frame::Description(text) => self.description = text,
            Frame::Error(text) => self.error = Some(text),
        }
    }

    pub(crate) fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub(crate) fn finish(&mut self) {
        self.loading = false;
    }
}
