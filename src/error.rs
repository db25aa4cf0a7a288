use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Whether a failure is worth one immediate retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Network-level failure, timeout, or 5xx — may succeed on retry.
    Transient,
    /// 4xx or undecodable payload — will fail identically on retry.
    Permanent,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("marketplace request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("marketplace returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("marketplace payload was not the expected schema: {0}")]
    Parse(#[source] serde_json::Error),
}

impl FetchError {
    pub fn class(&self) -> ErrorClass {
        match self {
            FetchError::Transport(_) => ErrorClass::Transient,
            FetchError::Status { status, .. } if status.is_server_error() => ErrorClass::Transient,
            _ => ErrorClass::Permanent,
        }
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, FetchError::Parse(_))
    }
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("delivery request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("channel returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

impl DeliveryError {
    pub fn class(&self) -> ErrorClass {
        match self {
            DeliveryError::Transport(_) => ErrorClass::Transient,
            DeliveryError::Status { status, .. } if status.is_server_error() => {
                ErrorClass::Transient
            }
            DeliveryError::Status { .. } => ErrorClass::Permanent,
        }
    }
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("could not read state file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file exists but is not the expected structure. Fatal: resetting
    /// it silently would re-notify every listing ever seen.
    #[error("state file {path} exists but could not be parsed: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not write state file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A listing too malformed to render. The item is skipped and logged; it
/// never aborts the delivery phase.
#[derive(Debug, Error)]
#[error("listing cannot be rendered: {reason}")]
pub struct RenderError {
    pub reason: String,
}
