//! Error types for the DDNS system
//!
//! Every failure a provider can produce is surfaced as an [`Error`] value.
//! Nothing here retries; the caller inspects [`Error::kind`] or
//! [`Error::is_retryable`] and applies its own policy.

use std::net::IpAddr;
use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a record's settings are rejected before any network call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Domain failed the syntax check
    #[error("domain is not valid: {0}")]
    DomainNotValid(String),

    /// Owner is the `*` wildcard
    #[error("owner cannot be a wildcard")]
    OwnerWildcard,

    /// Username (or user) is empty
    #[error("username is not set")]
    UsernameNotSet,

    /// Password is empty
    #[error("password is not set")]
    PasswordNotSet,

    /// No factory registered for the provider name
    #[error("unknown provider type: {0}")]
    UnknownProvider(String),

    /// Settings document is structurally wrong
    #[error("{0}")]
    Invalid(String),
}

/// Canonical failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ConfigInvalid,
    Network,
    Cancelled,
    HttpStatus,
    AuthFailure,
    HostnameNotExists,
    BannedAbuse,
    BadRequest,
    IpMismatch,
    MalformedIpResponse,
    UnknownResponse,
    InvalidInput,
}

/// Core error type for the DDNS system
#[derive(Error, Debug)]
pub enum Error {
    /// Settings rejected at construction time
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Transport failure: connect, TLS, timeout, body read
    #[error("network error: {0}")]
    Network(String),

    /// The caller cancelled the update while it was in flight
    #[error("update cancelled")]
    Cancelled,

    /// Registrar answered with a status code outside its protocol
    #[error("HTTP status is not valid: {status}: {body}")]
    HttpStatus {
        /// Status code received
        status: u16,
        /// Single-line body excerpt
        body: String,
    },

    /// Registrar rejected the credentials
    #[error("authentication failed{}", detail_suffix(.0))]
    Authentication(String),

    /// Registrar does not know the hostname
    #[error("hostname does not exist{}", detail_suffix(.0))]
    HostnameNotExists(String),

    /// Registrar locked the account for abuse
    #[error("banned due to abuse{}", detail_suffix(.0))]
    BannedAbuse(String),

    /// Registrar considers the request malformed
    #[error("bad request{}", detail_suffix(.0))]
    BadRequest(String),

    /// Registrar echoed a different address than the one sent
    #[error("received IP mismatch: sent ip {sent} to update but received {received}")]
    IpMismatch {
        /// Address placed in the request
        sent: IpAddr,
        /// Address the registrar reports having applied
        received: IpAddr,
    },

    /// Registrar echoed something that is not an address
    #[error("received IP is malformed: for response {response:?}: {reason}")]
    MalformedIp {
        /// The text that should have been an address
        response: String,
        /// Parser message
        reason: String,
    },

    /// No known marker matched the body
    #[error("unknown response: {0}")]
    UnknownResponse(String),

    /// Request assembly failed; settings were validated so this is a bug
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn detail_suffix(detail: &str) -> String {
    if detail.is_empty() {
        String::new()
    } else {
        format!(": {}", detail)
    }
}

impl Error {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create an unknown response error
    pub fn unknown_response(body: impl Into<String>) -> Self {
        Self::UnknownResponse(body.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Canonical kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) | Self::Json(_) => ErrorKind::ConfigInvalid,
            Self::Network(_) => ErrorKind::Network,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::HttpStatus { .. } => ErrorKind::HttpStatus,
            Self::Authentication(_) => ErrorKind::AuthFailure,
            Self::HostnameNotExists(_) => ErrorKind::HostnameNotExists,
            Self::BannedAbuse(_) => ErrorKind::BannedAbuse,
            Self::BadRequest(_) => ErrorKind::BadRequest,
            Self::IpMismatch { .. } => ErrorKind::IpMismatch,
            Self::MalformedIp { .. } => ErrorKind::MalformedIpResponse,
            Self::UnknownResponse(_) => ErrorKind::UnknownResponse,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }

    /// Whether a later attempt with the same settings may succeed
    ///
    /// Terminal kinds stay failed until the configuration changes.
    pub fn is_retryable(&self) -> bool {
        match self.kind() {
            ErrorKind::Network
            | ErrorKind::Cancelled
            | ErrorKind::HttpStatus
            | ErrorKind::UnknownResponse
            | ErrorKind::IpMismatch
            | ErrorKind::MalformedIpResponse => true,
            ErrorKind::ConfigInvalid
            | ErrorKind::AuthFailure
            | ErrorKind::HostnameNotExists
            | ErrorKind::BannedAbuse
            | ErrorKind::BadRequest
            | ErrorKind::InvalidInput => false,
        }
    }
}
