use std::fmt;

/// Result of one successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub final_url: String,
    pub content_type: Option<String>,
    /// Attempts used, counting the successful one.
    pub attempts: usize,
}

/// One attempt's failure. Always retryable within the attempt budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchFailure {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// HTTP 429; retried without being recorded as the last concrete error.
    RateLimited,
    /// Any other non-2xx status.
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::RateLimited => write!(f, "rate limited"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Terminal fetch error: every attempt in the budget failed.
///
/// Carries the last concrete failure when one was recorded; an exhaustion
/// made up entirely of 429 responses has none and falls back to a generic
/// message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchExhausted {
    pub attempts: usize,
    pub last: Option<FetchFailure>,
}

impl fmt::Display for FetchExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.last {
            Some(failure) => write!(f, "{}", failure.message),
            None => write!(f, "Failed to fetch after multiple attempts"),
        }
    }
}

impl std::error::Error for FetchExhausted {}
