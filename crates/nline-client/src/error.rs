//! Error types for the game client.

use std::time::Duration;

/// Client errors.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Rejected request (400): invalid move, unknown device, finished match.
    #[error("bad request: {message}")]
    BadRequest { message: String },

    /// Move attempted out of turn (403).
    #[error("not your turn")]
    NotYourTurn,

    /// Unknown device or match (404).
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Rate limit exceeded.
    #[error("rate limited: retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Transport failure or timeout.
    #[error("network error: {message}")]
    Network { message: String },

    /// Response body did not match the expected shape.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl ClientError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::BadRequest { .. } | Self::NotYourTurn | Self::NotFound { .. } => 1,
            Self::Config { .. } | Self::Http { .. } | Self::InvalidResponse { .. } => 2,
            Self::RateLimited { .. } | Self::Network { .. } => 5,
        }
    }

    /// Whether the error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Network { .. } => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Short message for a player, as a game screen would show it.
    pub fn player_message(&self) -> &'static str {
        match self {
            Self::NotYourTurn => "Not your turn",
            Self::BadRequest { .. } => "Invalid move",
            Self::NotFound { .. } => "Match not found",
            _ => "Connection error",
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else {
            err.to_string()
        };
        Self::Network { message }
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(ClientError::Network {
            message: "reset".into()
        }
        .is_retryable());
        assert!(ClientError::Http {
            status: 503,
            message: String::new()
        }
        .is_retryable());
        assert!(!ClientError::Http {
            status: 418,
            message: String::new()
        }
        .is_retryable());
        assert!(!ClientError::NotYourTurn.is_retryable());
    }

    #[test]
    fn test_player_message() {
        assert_eq!(ClientError::NotYourTurn.player_message(), "Not your turn");
        assert_eq!(
            ClientError::BadRequest {
                message: "cell occupied: (0, 0)".into()
            }
            .player_message(),
            "Invalid move"
        );
    }
}
