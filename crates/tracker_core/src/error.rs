use std::fmt;
use std::time::Duration;

/// Errors surfaced on the observable job record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    /// Missing job or user identifier. Tracking never starts.
    Input(String),
    /// Request failed before a usable response arrived.
    Network(String),
    /// Response arrived but the envelope could not be decoded.
    Parse(String),
    /// Backend answered with an error envelope.
    Remote(String),
    /// Create-upload call or primary upload failed.
    Submission(String),
    /// Deadline elapsed without a terminal stage.
    Timeout { after: Duration },
}

impl TrackerError {
    /// Recoverable errors leave polling running and are cleared by the next
    /// successful poll.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TrackerError::Network(_) | TrackerError::Parse(_) | TrackerError::Remote(_)
        )
    }
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerError::Input(message) => write!(f, "invalid input: {message}"),
            TrackerError::Network(message) => write!(f, "network error: {message}"),
            TrackerError::Parse(message) => write!(f, "parse error: {message}"),
            TrackerError::Remote(message) => write!(f, "backend error: {message}"),
            TrackerError::Submission(message) => write!(f, "upload failed: {message}"),
            TrackerError::Timeout { after } => write!(
                f,
                "analysis timeout: no report received after {} seconds",
                after.as_secs()
            ),
        }
    }
}
