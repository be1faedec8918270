use std::fmt;

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use crate::core::conversation::Conversation;

/// Errors that can occur talking to the agent endpoint.
/// Variants carry enough info to determine retryability (future use).
#[derive(Debug)]
pub enum EndpointError {
    /// Endpoint misconfigured (bad URL, missing credentials). Not retryable.
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused, stream lost
    /// before the terminal signal). Retryable.
    Network(String),
    /// The agent returned an error response. Retryable if status >= 500 or 429.
    Api { status: u16, message: String },
    /// Failed to parse the agent's response. Not retryable.
    Parse(String),
    /// The mpsc channel was closed (the surface dropped the receiver). Not retryable.
    ChannelClosed,
}

impl fmt::Display for EndpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointError::Config(msg) => write!(f, "config error: {msg}"),
            EndpointError::Network(msg) => write!(f, "network error: {msg}"),
            EndpointError::Api { status, message } => {
                write!(f, "agent error (HTTP {status}): {message}")
            }
            EndpointError::Parse(msg) => write!(f, "parse error: {msg}"),
            EndpointError::ChannelClosed => write!(f, "channel closed"),
        }
    }
}

impl std::error::Error for EndpointError {}

/// Everything an endpoint needs to produce one reply.
pub struct ReplyRequest<'a> {
    /// The transcript whose completed turns form the payload.
    pub conversation: &'a Conversation,
    /// Affinity token from a previous exchange, if the agent issued one.
    pub session_id: Option<&'a str>,
    /// Directive prepended to the payload. Empty string sends none.
    pub system_prompt: &'a str,
}

/// A piece of the agent's reply as it arrives.
///
/// `Completed` is the explicit end-of-reply signal. A chunk channel that
/// closes without it means the connection was lost, not that the reply
/// finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyChunk {
    Fragment(String),
    Completed { session_id: Option<String> },
}

/// The external agent collaborator. Implementations stream the reply into
/// `sender` and finish with `ReplyChunk::Completed`; every error path
/// returns `Err` instead.
#[async_trait]
pub trait AgentEndpoint: Send + Sync {
    /// Produces one reply for the request, sending chunks to the provided
    /// channel. Returns only after `Completed` was sent or with an error.
    async fn stream_reply(
        &self,
        request: ReplyRequest<'_>,
        sender: Sender<ReplyChunk>,
    ) -> Result<(), EndpointError>;
}
