/*
[INPUT]:  Error sources (transport, envelope status, signer, serialization, WebSocket)
[OUTPUT]: Structured error types with classification helpers
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the Hydro client
#[derive(Error, Debug)]
pub enum HydroError {
    /// No signing capability for a privileged call, or the signer itself failed
    #[error("Auth Error: {message}")]
    Auth { message: String },

    /// Transport failure or non-2xx HTTP status
    #[error("Server Error {}: {message}", display_status(.status))]
    Server { status: Option<u16>, message: String },

    /// Envelope reported a non-zero status
    #[error("API Error: {message}")]
    Api { message: String },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocket(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for HydroError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        HydroError::WebSocket(err.to_string())
    }
}

impl HydroError {
    pub fn auth(message: impl Into<String>) -> Self {
        HydroError::Auth {
            message: message.into(),
        }
    }

    /// Server error from an HTTP status line
    pub fn server_status(status: StatusCode) -> Self {
        HydroError::Server {
            status: Some(status.as_u16()),
            message: status
                .canonical_reason()
                .unwrap_or("Unknown Status")
                .to_string(),
        }
    }

    pub fn api(message: impl Into<String>) -> Self {
        HydroError::Api {
            message: message.into(),
        }
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, HydroError::Auth { .. })
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self, HydroError::Server { .. })
    }

    pub fn is_api_error(&self) -> bool {
        matches!(self, HydroError::Api { .. })
    }

    /// HTTP status carried by a server error
    pub fn status(&self) -> Option<u16> {
        match self {
            HydroError::Server { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for HydroError {
    fn from(err: reqwest::Error) -> Self {
        HydroError::Server {
            status: err.status().map(|status| status.as_u16()),
            message: err.to_string(),
        }
    }
}

fn display_status(status: &Option<u16>) -> String {
    status.map_or_else(|| "-".to_string(), |code| code.to_string())
}

/// Result type alias for Hydro operations
pub type Result<T> = std::result::Result<T, HydroError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_status_error() {
        let err = HydroError::server_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.is_server_error());
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), "Server Error 500: Internal Server Error");
    }

    #[test]
    fn test_api_error_message() {
        let err = HydroError::api("bad");
        assert!(err.is_api_error());
        assert!(!err.is_server_error());
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "API Error: bad");
    }

    #[test]
    fn test_auth_error_classification() {
        let err = HydroError::auth("Cannot authenticate without a private key!");
        assert!(err.is_auth_error());
        assert!(!err.is_api_error());
    }

    #[test]
    fn test_server_error_without_status() {
        let err = HydroError::Server {
            status: None,
            message: "connection refused".to_string(),
        };
        assert_eq!(err.to_string(), "Server Error -: connection refused");
    }
}
