//! Error types for the dashboard synchronization engine
//!
//! A poll cycle failing is the normal case when the device is rebooting or
//! off the network, so most errors here are transient and surfaced only as
//! a connection-status flip by the caller.

use thiserror::Error;

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, EspDashError>;

/// Error types for device dashboard operations
#[derive(Error, Debug)]
pub enum EspDashError {
    /// Connection errors (device unreachable, non-2xx responses)
    #[error("Connection error: {0}")]
    Connection(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing errors
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Timeout errors
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors
    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl EspDashError {
    /// Create a connection error
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        EspDashError::Connection(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        EspDashError::Config(msg.into())
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        EspDashError::Timeout(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        EspDashError::InvalidInput(msg.into())
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        EspDashError::NotFound(msg.into())
    }

    /// Check if this error is retryable on the next poll cycle
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EspDashError::Connection(_)
                | EspDashError::Http(_)
                | EspDashError::Timeout(_)
                | EspDashError::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(EspDashError::connection("device offline").is_retryable());
        assert!(EspDashError::timeout("status poll").is_retryable());
        assert!(!EspDashError::config("missing base URL").is_retryable());
        assert!(!EspDashError::invalid_input("bad interval").is_retryable());
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: EspDashError = parse_err.into();
        assert!(matches!(err, EspDashError::Json(_)));
        assert!(!err.is_retryable());
    }
}
