use crate::Frame;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted a job-posting URL for retrieval.
    UrlSubmitted(String),
    /// One decoded frame arrived on the stream.
    FrameReceived(Frame),
    /// The stream ended normally (peer closed after the terminal frame).
    StreamClosed,
    /// The transport failed before the stream ended.
    StreamFailed(String),
    /// The user abandoned interest; not an error.
    StreamAborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open the progress stream for this URL.
    OpenStream { url: String },
    /// Cancel the stream currently in flight.
    AbortStream,
}
