//! Error types for client operations

use thiserror::Error;

/// Main error type for remote-agent exchanges and payment authorization
#[derive(Debug, Error)]
pub enum ClientError {
    /// Two discovered agents share the same name (fatal to registry init)
    #[error("Cannot add two agents with the same name: {name}")]
    DuplicateAgent { name: String },

    /// Caller referenced an unknown agent identity
    #[error("Agent '{name}' not found. Available agents: {}", .available.join(", "))]
    AgentNotFound {
        name: String,
        available: Vec<String>,
    },

    /// The remote agent reported a protocol-level error
    #[error("Agent returned error: {message} (code {code})")]
    RemoteAgent { code: i64, message: String },

    /// The response stream ended without yielding a task or message
    #[error("No response received from agent '{agent}'")]
    NoResponse { agent: String },

    /// The authorization backend recommended an index outside the accepted list
    #[error("Invalid recommended index {index}, only {authorized} requirements authorized")]
    InvalidRecommendation { index: usize, authorized: usize },

    /// No payment requirement was authorized for a challenge
    #[error("Payment declined for agent '{agent}'")]
    PaymentDeclined { agent: String },

    /// The authorization backend rejected a request
    #[error("API error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Api {
        status: Option<u16>,
        message: String,
    },

    /// Authentication with the authorization backend failed
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Transport-level error (network, connection, etc.)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Protocol-level error (malformed frame, unexpected payload shape)
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Transport(format!("Connection error: {}", err))
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}
