use std::fmt;

const STATUS_PREFIX: &str = "STATUS: ";
const DESCRIPTION_PREFIX: &str = "DESCRIPTION: ";
const ERROR_PREFIX: &str = "ERROR: ";

/// One event on the progress stream.
///
/// The wire format is one frame per line: `TAG: <text>\n`. A stream carries
/// any number of `Status` frames followed by exactly one terminal frame
/// (`Description` or `Error`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Status(String),
    Description(String),
    Error(String),
}

impl Frame {
    pub fn status(text: impl Into<String>) -> Self {
        Frame::Status(text.into())
    }

    pub fn description(text: impl Into<String>) -> Self {
        Frame::Description(text.into())
    }

    pub fn error(text: impl Into<String>) -> Self {
        Frame::Error(text.into())
    }

    /// Parse one line (without its trailing `\n`) into a frame.
    ///
    /// Lines that carry none of the known tags yield `None`; the consumer
    /// ignores them rather than failing the whole stream.
    pub fn parse(line: &str) -> Option<Frame> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if let Some(text) = line.strip_prefix(STATUS_PREFIX) {
            return Some(Frame::Status(text.to_string()));
        }
        if let Some(text) = line.strip_prefix(DESCRIPTION_PREFIX) {
            return Some(Frame::Description(text.to_string()));
        }
        if let Some(text) = line.strip_prefix(ERROR_PREFIX) {
            return Some(Frame::Error(text.to_string()));
        }
        None
    }

    /// Encode the frame as a single `\n`-terminated line.
    ///
    /// Newlines in the payload would break the framing, so runs of line
    /// breaks are flattened to single spaces first.
    pub fn encode(&self) -> String {
        let (prefix, text) = match self {
            Frame::Status(text) => (STATUS_PREFIX, text),
            Frame::Description(text) => (DESCRIPTION_PREFIX, text),
            Frame::Error(text) => (ERROR_PREFIX, text),
        };
        format!("{prefix}{}\n", flatten_line_breaks(text))
    }

    /// True for the frames that end a stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Frame::Description(_) | Frame::Error(_))
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Status(text) => write!(f, "STATUS: {text}"),
            Frame::Description(text) => write!(f, "DESCRIPTION: {text}"),
            Frame::Error(text) => write!(f, "ERROR: {text}"),
        }
    }
}

fn flatten_line_breaks(text: &str) -> String {
    if !text.contains(['\n', '\r']) {
        return text.to_string();
    }
    text.split(['\n', '\r'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
