//! Client configuration and outgoing message composition

use std::time::Duration;

use serde_json::json;

use crate::protocol::Message;

/// Message metadata key carrying the remote call-count limit
pub const MAX_LLM_CALLS_KEY: &str = "maxLlmCalls";

/// Configuration for remote agent exchanges
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Default request timeout
    pub request_timeout: Duration,

    /// Optional cap on the number of model calls the remote runner may make
    /// while serving one exchange, forwarded as message metadata
    pub max_llm_calls: Option<u32>,
}

impl ClientConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_llm_calls: None,
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Cap the remote runner's model calls per exchange
    pub fn with_max_llm_calls(mut self, limit: u32) -> Self {
        self.max_llm_calls = Some(limit);
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the outgoing message for one exchange
///
/// Injected into the session at construction so hosts can shape the request
/// (extra parts, metadata, routing hints) without the session knowing about
/// any particular host framework.
pub trait MessageFactory: Send + Sync {
    /// Compose the message to send for a turn of conversation
    fn compose(&self, text: &str, context_id: Option<&str>, config: &ClientConfig) -> Message;
}

/// Default composition: one user text part plus configured metadata
#[derive(Debug, Clone, Default)]
pub struct DefaultMessageFactory;

impl MessageFactory for DefaultMessageFactory {
    fn compose(&self, text: &str, context_id: Option<&str>, config: &ClientConfig) -> Message {
        let mut message = Message::user(text);

        if let Some(context_id) = context_id {
            message = message.with_context_id(context_id);
        }
        if let Some(limit) = config.max_llm_calls {
            message = message.with_metadata(MAX_LLM_CALLS_KEY, json!(limit));
        }

        message
    }
}
