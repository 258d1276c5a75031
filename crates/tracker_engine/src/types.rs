use std::fmt;

use tracker_core::{ResultUpdate, TrackerError};

/// Processed artifact reported by the result-lookup endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub url: String,
    pub key: Option<String>,
    pub last_modified: Option<String>,
    pub folder: Option<String>,
    pub size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultLookup {
    pub found: bool,
    /// Present only when `found` is set and the backend supplied a URL.
    pub artifact: Option<Artifact>,
}

impl From<ResultLookup> for ResultUpdate {
    fn from(lookup: ResultLookup) -> Self {
        ResultUpdate {
            artifact_url: lookup.artifact.map(|artifact| artifact.url),
        }
    }
}

/// Reply of the create-upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    pub job_id: String,
    pub primary_url: String,
    pub secondary_url: Option<String>,
    pub expires_in: Option<u64>,
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Parse,
    Remote,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Parse => write!(f, "parse error"),
            FailureKind::Remote => write!(f, "backend error"),
        }
    }
}

impl From<ApiError> for TrackerError {
    fn from(err: ApiError) -> Self {
        match err.kind {
            FailureKind::Parse => TrackerError::Parse(err.message),
            FailureKind::Remote => TrackerError::Remote(err.message),
            FailureKind::HttpStatus(code) => {
                TrackerError::Network(format!("http status {code} {}", err.message))
            }
            FailureKind::InvalidUrl | FailureKind::Timeout | FailureKind::Network => {
                TrackerError::Network(err.to_string())
            }
        }
    }
}
