//! Application layer errors

use std::fmt;
use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Vendor error: {0}")]
    Vendor(#[from] VendorError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Malformed slash-command input. Always answered with a usage hint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Missing {what}. Usage: `{usage}`")]
    MissingArgument { what: &'static str, usage: &'static str },

    #[error("Too many arguments ({found}). Usage: `{usage}`")]
    TooManyArguments { found: usize, usage: &'static str },

    #[error("Sequence length must be {expected} (got {actual} bp)")]
    SequenceLength { expected: &'static str, actual: usize },

    #[error("Invalid base '{found}': sequence may only contain {allowed}")]
    InvalidBase { found: char, allowed: &'static str },

    #[error("Unknown species '{0}'. Supported: human, mouse, rat, zebrafish, celegans")]
    UnknownSpecies(String),
}

/// Vendor credential exchange failures
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("token request rejected with HTTP {status}")]
    Rejected { status: u16 },

    #[error("token request failed: {0}")]
    Transport(String),

    #[error("invalid token response: {0}")]
    InvalidResponse(String),
}

/// Classification of a failed vendor API call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorErrorKind {
    Unauthorized,
    NotFound,
    RateLimited,
    ValidationRejected,
    Timeout,
    Connection,
    Unknown,
}

impl VendorErrorKind {
    /// Classify a non-2xx HTTP status
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => VendorErrorKind::Unauthorized,
            404 => VendorErrorKind::NotFound,
            429 => VendorErrorKind::RateLimited,
            400..=499 => VendorErrorKind::ValidationRejected,
            _ => VendorErrorKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VendorErrorKind::Unauthorized => "unauthorized",
            VendorErrorKind::NotFound => "not found",
            VendorErrorKind::RateLimited => "rate limited",
            VendorErrorKind::ValidationRejected => "validation rejected",
            VendorErrorKind::Timeout => "timeout",
            VendorErrorKind::Connection => "connection failed",
            VendorErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for VendorErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Maximum number of characters of a vendor body kept in an error
const MAX_BODY_CHARS: usize = 200;

/// A failed vendor API call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} (HTTP {}): {message}", .http_status.map_or_else(|| "-".to_string(), |s| s.to_string()))]
pub struct VendorError {
    pub kind: VendorErrorKind,
    pub http_status: Option<u16>,
    pub message: String,
}

impl VendorError {
    pub fn new(kind: VendorErrorKind, http_status: Option<u16>, message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self {
            kind,
            http_status,
            message: message.chars().take(MAX_BODY_CHARS).collect(),
        }
    }

    /// Build from a non-2xx response status and its body
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        Self::new(VendorErrorKind::from_status(status), Some(status), body)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(VendorErrorKind::Timeout, None, message)
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(VendorErrorKind::Connection, None, message)
    }

    /// Map a reqwest send/receive failure
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(err.to_string())
        } else if err.is_connect() {
            Self::connection(err.to_string())
        } else if let Some(status) = err.status() {
            Self::from_status(status.as_u16(), err.to_string())
        } else {
            Self::new(VendorErrorKind::Unknown, None, err.to_string())
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == VendorErrorKind::Unauthorized
    }
}

/// Posting a reply back to the chat platform failed
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("platform rejected request: {0}")]
    Rejected(String),

    #[error("unexpected response: {0}")]
    Parse(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingEnv(Vec<String>),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(VendorErrorKind::from_status(401), VendorErrorKind::Unauthorized);
        assert_eq!(VendorErrorKind::from_status(404), VendorErrorKind::NotFound);
        assert_eq!(VendorErrorKind::from_status(429), VendorErrorKind::RateLimited);
        assert_eq!(VendorErrorKind::from_status(400), VendorErrorKind::ValidationRejected);
        assert_eq!(VendorErrorKind::from_status(422), VendorErrorKind::ValidationRejected);
        assert_eq!(VendorErrorKind::from_status(500), VendorErrorKind::Unknown);
        assert_eq!(VendorErrorKind::from_status(302), VendorErrorKind::Unknown);
    }

    #[test]
    fn test_vendor_message_truncated() {
        let body = "x".repeat(500);
        let err = VendorError::from_status(400, body);
        assert_eq!(err.message.len(), 200);
        assert_eq!(err.http_status, Some(400));
    }

    #[test]
    fn test_missing_env_lists_all_names() {
        let err = ConfigError::MissingEnv(vec!["IDT_CLIENT_ID".to_string(), "IDT_PASSWORD".to_string()]);
        assert_eq!(
            err.to_string(),
            "Missing required environment variables: IDT_CLIENT_ID, IDT_PASSWORD"
        );
    }
}
