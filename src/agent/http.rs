//! HTTP implementation of the agent endpoint.
//!
//! Speaks to the agent service's `/api/chat` route. Two response modes:
//! - streaming (default): SSE events `reply.delta` carrying text fragments,
//!   terminated by a `reply.completed` event
//! - complete: a single JSON body `{"reply": ..., "session_id": ...}`
//!
//! Either way the reply ends with an explicit `ReplyChunk::Completed`; a
//! connection that drops before the terminal event is reported as a network
//! error, never as a finished reply.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Sender;

use crate::agent::endpoint::{AgentEndpoint, EndpointError, ReplyChunk, ReplyRequest};
use crate::core::config::ResolvedConfig;
use crate::core::conversation::Role;

// ============================================================================
// Wire Types
// ============================================================================

/// A single message in the request payload.
#[derive(Serialize, Debug)]
struct WireMessage<'a> {
    role: Role,
    content: &'a str,
}

/// The request body for `/api/chat`.
#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
    stream: bool,
}

/// Complete-mode response body.
#[derive(Deserialize, Debug)]
struct ChatResponse {
    reply: String,
    #[serde(default)]
    session_id: Option<String>,
}

/// SSE event carrying a reply fragment.
#[derive(Deserialize, Debug)]
struct DeltaEvent {
    delta: String,
}

/// SSE terminal event.
#[derive(Deserialize, Debug, Default)]
struct CompletedEvent {
    #[serde(default)]
    session_id: Option<String>,
}

// ============================================================================
// Translation Layer
// ============================================================================

/// Builds the ordered payload: the system directive (when configured)
/// followed by every completed user/agent turn. In-flight placeholders and
/// failed replies never reach the agent.
fn build_payload<'a>(request: &'a ReplyRequest<'_>) -> Vec<WireMessage<'a>> {
    let mut messages = Vec::new();
    if !request.system_prompt.is_empty() {
        messages.push(WireMessage {
            role: Role::System,
            content: request.system_prompt,
        });
    }
    messages.extend(request.conversation.completed_turns().map(|m| WireMessage {
        role: m.role,
        content: &m.content,
    }));
    messages
}

// ============================================================================
// Endpoint Implementation
// ============================================================================

/// Agent service reachable over HTTP at `{base_url}/api/chat`.
pub struct HttpAgentEndpoint {
    base_url: String,
    api_key: Option<String>,
    stream: bool,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpAgentEndpoint {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        stream: bool,
        timeout_secs: u64,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            stream,
            timeout: Duration::from_secs(timeout_secs),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(
            config.base_url.clone(),
            config.api_key.clone(),
            config.stream,
            config.timeout_secs,
        )
    }

    /// Drives the SSE stream, forwarding fragments until `reply.completed`.
    async fn consume_sse(
        &self,
        mut response: reqwest::Response,
        sender: &Sender<ReplyChunk>,
    ) -> Result<(), EndpointError> {
        let mut buffer = String::new();
        let mut current_event_type: Option<String> = None;
        let mut total_content_len = 0usize;
        let mut chunk_count = 0usize;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| EndpointError::Network(e.to_string()))?
        {
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            // Process complete lines from buffer
            while let Some(pos) = buffer.find('\n') {
                let line = buffer[..pos].to_string();
                buffer.drain(..pos + 1);
                let line = line.trim();

                // Parse SSE event type
                if let Some(event_type) = line.strip_prefix("event: ") {
                    current_event_type = Some(event_type.to_string());
                    continue;
                }

                // Parse SSE data
                if let Some(data) = line.strip_prefix("data: ") {
                    match current_event_type.as_deref() {
                        Some("reply.delta") => {
                            let event: DeltaEvent = serde_json::from_str(data)
                                .map_err(|e| EndpointError::Parse(e.to_string()))?;
                            if !event.delta.is_empty() {
                                chunk_count += 1;
                                total_content_len += event.delta.len();
                                if sender
                                    .send(ReplyChunk::Fragment(event.delta))
                                    .await
                                    .is_err()
                                {
                                    warn!("Fragment send failed: receiver dropped");
                                    return Err(EndpointError::ChannelClosed);
                                }
                            }
                        }
                        Some("reply.completed") => {
                            info!(
                                "Stream complete: {} fragments, {} content bytes",
                                chunk_count, total_content_len
                            );
                            let event: CompletedEvent =
                                serde_json::from_str(data).unwrap_or_default();
                            if sender
                                .send(ReplyChunk::Completed {
                                    session_id: event.session_id,
                                })
                                .await
                                .is_err()
                            {
                                warn!("Completed send failed: receiver dropped");
                                return Err(EndpointError::ChannelClosed);
                            }
                            return Ok(());
                        }
                        Some(other) => {
                            // Log unrecognized event types so we can discover new ones
                            debug!("Unrecognized event type '{}' with data: {}", other, data);
                        }
                        None => {
                            debug!("Data without event type: {}", data);
                        }
                    }

                    // Reset event type after processing data
                    current_event_type = None;
                }
            }
        }

        warn!(
            "Stream closed early: {} fragments, {} content bytes",
            chunk_count, total_content_len
        );
        Err(EndpointError::Network(
            "connection closed before the reply completed".to_string(),
        ))
    }
}

#[async_trait]
impl AgentEndpoint for HttpAgentEndpoint {
    async fn stream_reply(
        &self,
        request: ReplyRequest<'_>,
        sender: Sender<ReplyChunk>,
    ) -> Result<(), EndpointError> {
        let chat_request = ChatRequest {
            messages: build_payload(&request),
            session_id: request.session_id,
            stream: self.stream,
        };

        info!(
            "Agent request: {} messages, session={:?}, stream={}",
            chat_request.messages.len(),
            request.session_id,
            self.stream
        );

        let mut builder = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&chat_request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        if !self.stream {
            // One whole-exchange deadline; a live stream sets its own pace.
            builder = builder.timeout(self.timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| EndpointError::Network(e.to_string()))?;

        debug!("Agent response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Agent API error: {} - {}", status, err_body);
            return Err(EndpointError::Api {
                status,
                message: err_body,
            });
        }

        if self.stream {
            return self.consume_sse(response, &sender).await;
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| EndpointError::Parse(e.to_string()))?;

        if !chat_response.reply.is_empty()
            && sender
                .send(ReplyChunk::Fragment(chat_response.reply))
                .await
                .is_err()
        {
            warn!("Reply send failed: receiver dropped");
            return Err(EndpointError::ChannelClosed);
        }
        if sender
            .send(ReplyChunk::Completed {
                session_id: chat_response.session_id,
            })
            .await
            .is_err()
        {
            warn!("Completed send failed: receiver dropped");
            return Err(EndpointError::ChannelClosed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::conversation::{Conversation, Message, MessageStatus};

    fn request_over<'a>(
        conversation: &'a Conversation,
        system_prompt: &'a str,
    ) -> ReplyRequest<'a> {
        ReplyRequest {
            conversation,
            session_id: None,
            system_prompt,
        }
    }

    #[test]
    fn test_build_payload_prepends_system_prompt() {
        let mut conv = Conversation::new();
        conv.push(Message::user("hi".to_string()));

        let request = request_over(&conv, "Be brief.");
        let payload = build_payload(&request);
        assert_eq!(payload.len(), 2);
        assert_eq!(payload[0].role, Role::System);
        assert_eq!(payload[0].content, "Be brief.");
        assert_eq!(payload[1].role, Role::User);
    }

    #[test]
    fn test_build_payload_empty_prompt_sends_none() {
        let mut conv = Conversation::new();
        conv.push(Message::user("hi".to_string()));

        let request = request_over(&conv, "");
        let payload = build_payload(&request);
        assert_eq!(payload.len(), 1);
        assert_eq!(payload[0].role, Role::User);
    }

    #[test]
    fn test_build_payload_excludes_pending_and_failed() {
        let mut conv = Conversation::new();
        conv.push(Message::user("one".to_string()));
        let failed = conv.push(Message::agent_placeholder());
        conv.get_mut(failed).unwrap().status = MessageStatus::Failed;
        conv.push(Message::user("two".to_string()));
        conv.push(Message::agent_placeholder());

        let request = request_over(&conv, "");
        let payload = build_payload(&request);
        let contents: Vec<&str> = payload.iter().map(|m| m.content).collect();
        assert_eq!(contents, vec!["one", "two"]);
    }

    #[test]
    fn test_chat_request_wire_shape() {
        let mut conv = Conversation::new();
        conv.push(Message::user("Hello".to_string()));
        let reply = conv.push(Message::agent_placeholder());
        {
            let msg = conv.get_mut(reply).unwrap();
            msg.content.push_str("Hi there");
            msg.status = MessageStatus::Complete;
        }

        let request = ReplyRequest {
            conversation: &conv,
            session_id: Some("sess-1"),
            system_prompt: "Be brief.",
        };
        let chat_request = ChatRequest {
            messages: build_payload(&request),
            session_id: request.session_id,
            stream: true,
        };

        let value = serde_json::to_value(&chat_request).unwrap();
        assert_eq!(value["session_id"], "sess-1");
        assert_eq!(value["stream"], true);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["messages"][1]["content"], "Hello");
        assert_eq!(value["messages"][2]["role"], "assistant");
        assert_eq!(value["messages"][2]["content"], "Hi there");
    }

    #[test]
    fn test_chat_request_omits_absent_session_id() {
        let conv = Conversation::new();
        let request = request_over(&conv, "");
        let chat_request = ChatRequest {
            messages: build_payload(&request),
            session_id: None,
            stream: false,
        };
        let value = serde_json::to_value(&chat_request).unwrap();
        assert!(value.get("session_id").is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let endpoint =
            HttpAgentEndpoint::new("http://localhost:8000/".to_string(), None, true, 120);
        assert_eq!(endpoint.base_url, "http://localhost:8000");
    }
}
