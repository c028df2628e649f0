//! Error types for the chimu API client.
//!
//! # Design
//! Every failure is surfaced to the caller as one `ChimuError`; nothing is
//! retried or recovered locally. `ApiError` carries the service's own message
//! verbatim, while `MalformedResponseError` names the offending field so a
//! schema drift upstream is easy to pin down.

use std::fmt;

/// Errors returned by the chimu clients and by `ChimuClient` parse methods.
#[allow(clippy::enum_variant_names)]
#[derive(Debug, Clone, PartialEq)]
pub enum ChimuError {
    /// The service answered with a non-zero `code`.
    ApiError(String),

    /// The envelope reported success but a field is missing or has the wrong
    /// shape. `field` is a path such as `ChildrenBeatmaps[2].BPM`.
    MalformedResponseError { field: String, reason: String },

    /// The HTTP exchange itself failed, or the body was not JSON.
    TransportError(String),

    /// The download endpoint answered with something other than 200.
    DownloadError { set_id: u32, status: u16 },

    /// Client configuration could not be read.
    ConfigError(String),
}

impl ChimuError {
    pub(crate) fn missing(field: impl Into<String>) -> Self {
        ChimuError::MalformedResponseError {
            field: field.into(),
            reason: "missing field".to_string(),
        }
    }

    pub(crate) fn invalid(field: impl Into<String>, reason: impl fmt::Display) -> Self {
        ChimuError::MalformedResponseError {
            field: field.into(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for ChimuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChimuError::ApiError(message) => write!(f, "chimu api error: {message}"),
            ChimuError::MalformedResponseError { field, reason } => {
                write!(f, "malformed response at `{field}`: {reason}")
            }
            ChimuError::TransportError(msg) => write!(f, "transport failed: {msg}"),
            ChimuError::DownloadError { set_id, status } => {
                write!(f, "map file of set {set_id} could not be fetched (HTTP {status})")
            }
            ChimuError::ConfigError(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for ChimuError {}

impl From<ureq::Error> for ChimuError {
    fn from(e: ureq::Error) -> Self {
        ChimuError::TransportError(e.to_string())
    }
}

impl From<reqwest::Error> for ChimuError {
    fn from(e: reqwest::Error) -> Self {
        ChimuError::TransportError(e.to_string())
    }
}

impl From<std::io::Error> for ChimuError {
    fn from(e: std::io::Error) -> Self {
        ChimuError::TransportError(e.to_string())
    }
}

pub type Result<T, E = ChimuError> = std::result::Result<T, E>;
