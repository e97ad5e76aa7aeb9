//! Errors raised while fetching and normalizing cultural events.

use std::fmt;

use thiserror::Error;

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the client can surface. Nothing is retried internally.
#[derive(Debug, Error)]
pub enum Error {
    /// The request did not complete: connection failure, timeout or a non-success HTTP status.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body is not well-formed XML or has an unknown envelope.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// The upstream answered with a SOAP fault.
    #[error("SOAP fault: {fault_string}")]
    SoapFault { fault_string: String },

    /// The upstream answered with a result code other than `00`.
    #[error("upstream error {code}: {message}")]
    Upstream { code: String, message: String },

    /// A raw item is not a record.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// A date field could not be read as a calendar date.
    #[error("invalid date: {0:?}")]
    InvalidDate(String),

    /// The request parameters are out of the range the upstream accepts.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// The category of an [`Error`], stable enough to hand out to API consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    MalformedPayload,
    SoapFault,
    Upstream,
    InvalidRecord,
    InvalidDate,
    InvalidRequest,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::MalformedPayload => "malformed_payload",
            Self::SoapFault => "soap_fault",
            Self::Upstream => "upstream",
            Self::InvalidRecord => "invalid_record",
            Self::InvalidDate => "invalid_date",
            Self::InvalidRequest => "invalid_request",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::Transport,
            Self::MalformedPayload(_) => ErrorKind::MalformedPayload,
            Self::SoapFault { .. } => ErrorKind::SoapFault,
            Self::Upstream { .. } => ErrorKind::Upstream,
            Self::InvalidRecord(_) => ErrorKind::InvalidRecord,
            Self::InvalidDate(_) => ErrorKind::InvalidDate,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }

    /// The upstream result code, for [`Error::Upstream`] only.
    pub fn upstream_code(&self) -> Option<&str> {
        match self {
            Self::Upstream { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Whether the request ran into the configured timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_timeout())
    }
}
