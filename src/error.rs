//! Error handling for toptracks.
//!
//! Every failure the library can produce is one of a small set of kinds,
//! so callers can decide whether to retry, re-authenticate or just show a
//! message:
//!
//! * [`Error::Auth`] - the authentication flow failed, was denied or expired
//! * [`Error::Http`] - the Web API answered with a non-2xx status
//! * [`Error::Decode`] - a response did not have the expected shape
//! * [`Error::Timeout`] - a request or the browser handshake took too long
//! * [`Error::Network`] - the request never produced a response
//! * [`Error::InvalidArgument`] - a caller passed a value outside the domain
//! * [`Error::Config`] - the environment configuration is missing or invalid
//!
//! Nothing here is fatal to the process.

use std::fmt;

use thiserror::Error;

/// Standard result type for toptracks operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("Spotify API returned HTTP {status}")]
    Http { status: u16 },

    #[error("unexpected response shape: {0}")]
    Decode(String),

    #[error("operation timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Classification of an [`Error`] without its payload.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    Auth,
    Http(u16),
    Decode,
    Timeout,
    Network,
    InvalidArgument,
    Config,
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Auth(_) => ErrorKind::Auth,
            Error::Http { status } => ErrorKind::Http(*status),
            Error::Decode(_) => ErrorKind::Decode,
            Error::Timeout => ErrorKind::Timeout,
            Error::Network(_) => ErrorKind::Network,
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    /// Whether reconnecting is the likely way out of this error.
    #[must_use]
    pub fn needs_reauthentication(&self) -> bool {
        matches!(self, Error::Auth(_) | Error::Http { status: 401 })
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else if let Some(status) = err.status() {
            Error::Http {
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            Error::Decode(err.to_string())
        } else {
            Error::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// A cloneable snapshot of an [`Error`], kept in session state and shown to the user.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ErrorNotice {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorNotice {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<&Error> for ErrorNotice {
    fn from(err: &Error) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

impl From<Error> for ErrorNotice {
    fn from(err: Error) -> Self {
        Self::from(&err)
    }
}

impl fmt::Display for ErrorNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
