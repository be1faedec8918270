//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use crate::agent::{AgentEndpoint, EndpointError, ReplyChunk, ReplyRequest};

/// A no-op endpoint for tests that don't need real HTTP calls.
pub struct NoopEndpoint;

#[async_trait]
impl AgentEndpoint for NoopEndpoint {
    async fn stream_reply(
        &self,
        _request: ReplyRequest<'_>,
        _sender: Sender<ReplyChunk>,
    ) -> Result<(), EndpointError> {
        Ok(())
    }
}

/// An endpoint that replays a fixed chunk script, for exercising the
/// streaming path without a server.
pub struct ScriptedEndpoint {
    pub chunks: Vec<ReplyChunk>,
}

#[async_trait]
impl AgentEndpoint for ScriptedEndpoint {
    async fn stream_reply(
        &self,
        _request: ReplyRequest<'_>,
        sender: Sender<ReplyChunk>,
    ) -> Result<(), EndpointError> {
        for chunk in &self.chunks {
            sender
                .send(chunk.clone())
                .await
                .map_err(|_| EndpointError::ChannelClosed)?;
        }
        Ok(())
    }
}

/// Creates a test App with a NoopEndpoint.
pub fn test_app() -> crate::core::state::App {
    crate::core::state::App::new(Arc::new(NoopEndpoint), "test-agent".to_string())
}
