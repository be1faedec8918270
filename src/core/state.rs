//! # Application State
//!
//! Core business state for Palaver. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── endpoint: Arc<dyn AgentEndpoint>  // external agent collaborator
//! ├── conversation: Conversation        // the transcript
//! ├── session_id: Option<String>        // backend affinity token
//! ├── system_prompt: String             // directive sent with each request
//! ├── agent_label: String               // endpoint shown in the title bar
//! └── status_message: String            // status bar text
//! ```
//!
//! There is deliberately no `is_loading` flag: whether an exchange is in
//! flight is the derived question `conversation.has_pending()`. State changes
//! only happen through `update(state, action)` in action.rs.

use std::sync::Arc;

use crate::agent::AgentEndpoint;
use crate::core::config::ResolvedConfig;
use crate::core::conversation::Conversation;

pub struct App {
    pub endpoint: Arc<dyn AgentEndpoint>,
    pub conversation: Conversation,
    /// Session id handed back by the agent. None until the first completed
    /// exchange; reset by Clear. Never persisted.
    pub session_id: Option<String>,
    pub system_prompt: String,
    pub agent_label: String,
    pub status_message: String,
}

impl App {
    pub fn new(endpoint: Arc<dyn AgentEndpoint>, agent_label: String) -> Self {
        Self {
            endpoint,
            conversation: Conversation::new(),
            session_id: None,
            system_prompt: String::new(),
            agent_label,
            status_message: String::new(),
        }
    }

    pub fn from_config(endpoint: Arc<dyn AgentEndpoint>, config: &ResolvedConfig) -> Self {
        let mut app = Self::new(endpoint, config.base_url.clone());
        app.system_prompt = config.system_prompt.clone();
        app
    }

    /// True while a reply is outstanding; submissions are refused meanwhile.
    pub fn is_waiting(&self) -> bool {
        self.conversation.has_pending()
    }
}
