use std::fmt;

use fixit_core::{Classification, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A classification finished. `fallback` carries the failure that forced
    /// the deterministic default, if any.
    Classified {
        request_id: RequestId,
        classification: Classification,
        fallback: Option<FailureKind>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ClassifyError {
    pub kind: FailureKind,
    pub message: String,
}

impl ClassifyError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    MissingApiKey,
    InvalidEndpoint,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    MalformedResponse,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::MissingApiKey => write!(f, "missing api key"),
            FailureKind::InvalidEndpoint => write!(f, "invalid endpoint"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::MalformedResponse => write!(f, "malformed response"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
