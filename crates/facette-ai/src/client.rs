//! The AI classifier seam and its error taxonomy.

use std::future::Future;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AiError {
    #[error("AI provider not configured: {0}")]
    NotConfigured(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("AI request timed out")]
    Timeout,
    #[error("AI request cancelled")]
    Cancelled,
    #[error("malformed AI response: {0}")]
    Malformed(String),
}

/// Coarse failure class used for fallback reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiFailureKind {
    /// Network, HTTP, configuration, timeout or cancellation.
    Unavailable,
    /// The provider answered but no usable payload could be parsed.
    ResponseMalformed,
}

impl AiError {
    pub fn kind(&self) -> AiFailureKind {
        match self {
            AiError::Malformed(_) => AiFailureKind::ResponseMalformed,
            _ => AiFailureKind::Unavailable,
        }
    }
}

/// One chat exchange: optional system instructions plus the user message.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: Option<String>,
    pub user: String,
    /// Overrides the client's default token budget.
    pub max_tokens: Option<u32>,
}

/// A chat-completion backend. Implementations make exactly one attempt per call.
pub trait AiClient {
    /// Send the prompt and return the assistant's raw text.
    fn complete(&self, prompt: &Prompt) -> impl Future<Output = Result<String, AiError>> + Send;
}
