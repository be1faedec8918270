//! # Conversation
//!
//! The transcript data model: an ordered list of [`Message`]s, each one turn
//! of the exchange with the agent.
//!
//! Every message carries an explicit [`MessageStatus`] instead of the app
//! tracking an ad hoc "loading" flag. The one-request-in-flight rule falls out
//! of [`Conversation::has_pending`]: while any message is `Pending`, no new
//! submission is accepted. Streamed reply fragments are addressed by
//! [`MessageId`], so a late reply either lands on the exact message it was
//! issued for or finds nothing and is dropped.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Identity of a message, stable for the message's lifetime.
pub type MessageId = Uuid;

/// Who produced a message. Serialized with the wire names the agent
/// endpoint expects.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Agent,
    #[serde(rename = "system")]
    System,
}

/// Lifecycle of a single message.
///
/// User messages are born `Complete`. An agent reply starts as a `Pending`
/// placeholder, then moves to `Complete` or `Failed` exactly once. `Failed`
/// only ever transitions back to `Pending` through an explicit retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStatus {
    Pending,
    Complete,
    Failed,
}

/// One turn in the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub status: MessageStatus,
    /// Human-readable failure description. Set iff `status` is `Failed`.
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: String, status: MessageStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content,
            status,
            error: None,
            created_at: Utc::now(),
        }
    }

    /// A user turn. Complete from the moment it exists.
    pub fn user(content: String) -> Self {
        Self::new(Role::User, content, MessageStatus::Complete)
    }

    /// An empty agent placeholder awaiting the reply.
    pub fn agent_placeholder() -> Self {
        Self::new(Role::Agent, String::new(), MessageStatus::Pending)
    }

    pub fn is_pending(&self) -> bool {
        self.status == MessageStatus::Pending
    }

    pub fn is_failed(&self) -> bool {
        self.status == MessageStatus::Failed
    }
}

/// Ordered message history. Insertion order is chronological.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Appends a message and returns its id.
    pub fn push(&mut self, message: Message) -> MessageId {
        let id = message.id;
        self.messages.push(message);
        id
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn get_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }

    /// True while any message awaits its reply. Derived, never cached:
    /// this is the single source of truth for the in-flight check.
    pub fn has_pending(&self) -> bool {
        self.messages.iter().any(Message::is_pending)
    }

    /// The most recent failed message, if any. Target for the retry key.
    pub fn last_failed(&self) -> Option<MessageId> {
        self.messages.iter().rev().find(|m| m.is_failed()).map(|m| m.id)
    }

    /// Completed user/agent turns, in order. This is what a request to the
    /// agent carries: pending placeholders and failed replies are excluded.
    pub fn completed_turns(&self) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(|m| m.status == MessageStatus::Complete)
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
