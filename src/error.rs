//! Error types for the veil crate.

use std::io;
use std::time::Duration;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during client operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No cookie with the given name is stored for the URL.
    ///
    /// Distinguishes "absent" from transport failure.
    #[error("cookie not found: {0}")]
    CookieNotFound(String),

    /// Non-success HTTP status where a 2xx was required.
    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// Malformed wire data (response head, chunked framing).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Connection establishment or socket error.
    #[error("connection error: {0}")]
    Connection(String),

    /// TLS-related error. The canonical transport does not perform
    /// handshakes; https URIs surface here.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Cookie parsing error.
    #[error("cookie parse error: {0}")]
    CookieParse(String),

    /// Malformed or missing embedded user-agent table. Fatal at
    /// rotator construction.
    #[error("user agent data error: {0}")]
    UserAgentData(String),

    /// Connect deadline exceeded.
    #[error("connect timeout after {0:?}")]
    ConnectTimeout(Duration),

    /// URL parsing error.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// URI parsing error.
    #[error("URI parse error: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),

    /// Request construction error.
    #[error("HTTP error: {0}")]
    Http(#[from] http::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create an HTTP status error.
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            message: message.into(),
        }
    }

    /// Create a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create a cookie parse error.
    pub fn cookie_parse(message: impl Into<String>) -> Self {
        Self::CookieParse(message.into())
    }

    /// Create a user-agent data error.
    pub fn user_agent_data(message: impl Into<String>) -> Self {
        Self::UserAgentData(message.into())
    }
}
