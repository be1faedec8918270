//! # Actions
//!
//! Everything that can happen in Palaver becomes an `Action`.
//! User presses Enter? That's `Action::Submit`.
//! A reply fragment arrives? That's `Action::Fragment`.
//!
//! The `update()` function takes the current state and an action and mutates
//! the state. No I/O here; anything the outside world must do comes back as
//! an [`Effect`] for the event loop to execute.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! Replies are addressed by the placeholder's [`MessageId`]. An action whose
//! id no longer names a pending message (cleared conversation, already
//! failed, stale task) mutates nothing — that one rule gives us both the
//! no-misattribution and the discard-after-teardown guarantees.

use log::{debug, info, warn};

use crate::core::conversation::{Message, MessageId, MessageStatus};
use crate::core::state::App;

/// Everything that can happen to the conversation surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// User submitted text from the input box.
    Submit(String),
    /// User asked to retry a failed reply.
    Retry(MessageId),
    /// User asked to wipe the conversation.
    Clear,
    /// A streamed fragment of the reply identified by `id`.
    Fragment { id: MessageId, text: String },
    /// The reply identified by `id` finished cleanly.
    Completed {
        id: MessageId,
        session_id: Option<String>,
    },
    /// The exchange for `id` failed; `reason` is shown to the user.
    Failed { id: MessageId, reason: String },
    /// User asked to leave.
    Quit,
}

/// Side effects the event loop must perform after an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Issue a request to the agent for the pending message `id`.
    SpawnRequest { id: MessageId },
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Submit(text) => submit(app, text),
        Action::Retry(id) => retry(app, id),
        Action::Clear => {
            info!("Conversation cleared ({} messages)", app.conversation.len());
            app.conversation.clear();
            app.session_id = None;
            app.status_message = String::new();
            Effect::None
        }
        Action::Fragment { id, text } => {
            match app.conversation.get_mut(id) {
                Some(msg) if msg.is_pending() => msg.content.push_str(&text),
                _ => debug!("Discarding stale fragment for {id}"),
            }
            Effect::None
        }
        Action::Completed { id, session_id } => {
            match app.conversation.get_mut(id) {
                Some(msg) if msg.is_pending() => {
                    msg.status = MessageStatus::Complete;
                    app.status_message = String::new();
                    if session_id.is_some() {
                        app.session_id = session_id;
                    }
                    info!("Reply {id} complete");
                }
                _ => debug!("Discarding stale completion for {id}"),
            }
            Effect::None
        }
        Action::Failed { id, reason } => {
            match app.conversation.get_mut(id) {
                Some(msg) if msg.is_pending() => {
                    warn!("Reply {id} failed: {reason}");
                    app.status_message = format!("Agent error: {reason} (Ctrl+R retries)");
                    msg.status = MessageStatus::Failed;
                    msg.error = Some(reason);
                }
                _ => debug!("Discarding stale failure for {id}"),
            }
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

/// Append the user turn plus an agent placeholder and request a reply.
/// Blank input and an exchange already in flight are rejected locally:
/// the conversation is left untouched.
fn submit(app: &mut App, text: String) -> Effect {
    let text = text.trim();
    if text.is_empty() {
        app.status_message = String::from("Nothing to send");
        return Effect::None;
    }
    if app.conversation.has_pending() {
        debug!("Submit refused: a reply is already pending");
        app.status_message = String::from("Still waiting on the agent");
        return Effect::None;
    }

    app.conversation.push(Message::user(text.to_string()));
    let id = app.conversation.push(Message::agent_placeholder());
    app.status_message = String::from("Waiting for the agent...");
    info!("Submitted {} chars, placeholder {id}", text.len());
    Effect::SpawnRequest { id }
}

/// Reset a failed reply to pending and re-issue its request. The partial
/// content is dropped so the restarted stream builds the reply from scratch.
/// Refused while another exchange is in flight, same as a new submission.
fn retry(app: &mut App, id: MessageId) -> Effect {
    if app.conversation.has_pending() {
        debug!("Retry refused: a reply is already pending");
        app.status_message = String::from("Still waiting on the agent");
        return Effect::None;
    }
    match app.conversation.get_mut(id) {
        Some(msg) if msg.is_failed() => {
            msg.content.clear();
            msg.error = None;
            msg.status = MessageStatus::Pending;
            app.status_message = String::from("Retrying...");
            info!("Retrying reply {id}");
            Effect::SpawnRequest { id }
        }
        _ => {
            debug!("Retry ignored for {id}: not a failed message");
            Effect::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::conversation::Role;
    use crate::test_support::test_app;
    use uuid::Uuid;

    /// Drives one exchange to the point where the reply is pending and
    /// returns the placeholder id.
    fn submit_ok(app: &mut App, text: &str) -> MessageId {
        match update(app, Action::Submit(text.to_string())) {
            Effect::SpawnRequest { id } => id,
            other => panic!("expected SpawnRequest, got {other:?}"),
        }
    }

    #[test]
    fn test_submit_appends_user_and_placeholder() {
        let mut app = test_app();
        let id = submit_ok(&mut app, "Hello");

        let messages = app.conversation.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "Hello");
        assert_eq!(messages[0].status, MessageStatus::Complete);
        assert_eq!(messages[1].role, Role::Agent);
        assert_eq!(messages[1].id, id);
        assert!(messages[1].is_pending());
    }

    #[test]
    fn test_submit_trims_whitespace() {
        let mut app = test_app();
        submit_ok(&mut app, "  hi  ");
        assert_eq!(app.conversation.messages()[0].content, "hi");
    }

    #[test]
    fn test_submit_blank_is_rejected_without_messages() {
        let mut app = test_app();
        let effect = update(&mut app, Action::Submit("   ".to_string()));
        assert_eq!(effect, Effect::None);
        assert!(app.conversation.is_empty());
    }

    #[test]
    fn test_submit_while_pending_leaves_conversation_unchanged() {
        let mut app = test_app();
        submit_ok(&mut app, "first");
        let before = app.conversation.clone();

        let effect = update(&mut app, Action::Submit("second".to_string()));
        assert_eq!(effect, Effect::None);
        assert_eq!(app.conversation, before);
    }

    #[test]
    fn test_successful_exchange_grows_by_two_in_order() {
        let mut app = test_app();
        for (i, text) in ["one", "two", "three"].iter().enumerate() {
            let id = submit_ok(&mut app, text);
            update(
                &mut app,
                Action::Fragment {
                    id,
                    text: format!("re: {text}"),
                },
            );
            update(
                &mut app,
                Action::Completed {
                    id,
                    session_id: None,
                },
            );
            assert_eq!(app.conversation.len(), (i + 1) * 2);
        }

        let contents: Vec<&str> = app
            .conversation
            .messages()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(
            contents,
            vec!["one", "re: one", "two", "re: two", "three", "re: three"]
        );
    }

    #[test]
    fn test_fragments_accumulate_on_pending_message() {
        let mut app = test_app();
        let id = submit_ok(&mut app, "Hello");

        for part in ["Hi", " ", "there"] {
            update(
                &mut app,
                Action::Fragment {
                    id,
                    text: part.to_string(),
                },
            );
        }
        update(&mut app, Action::Completed { id, session_id: None });

        let reply = app.conversation.get(id).unwrap();
        assert_eq!(reply.content, "Hi there");
        assert_eq!(reply.status, MessageStatus::Complete);
    }

    #[test]
    fn test_fragment_for_unknown_id_is_discarded() {
        let mut app = test_app();
        submit_ok(&mut app, "Hello");
        let before = app.conversation.clone();

        update(
            &mut app,
            Action::Fragment {
                id: Uuid::new_v4(),
                text: "stray".to_string(),
            },
        );
        assert_eq!(app.conversation, before);
    }

    #[test]
    fn test_reply_after_clear_is_discarded() {
        let mut app = test_app();
        let id = submit_ok(&mut app, "Hello");
        update(&mut app, Action::Clear);

        update(
            &mut app,
            Action::Fragment {
                id,
                text: "late".to_string(),
            },
        );
        update(&mut app, Action::Completed { id, session_id: None });
        assert!(app.conversation.is_empty());
    }

    #[test]
    fn test_fragment_after_completion_is_discarded() {
        let mut app = test_app();
        let id = submit_ok(&mut app, "Hello");
        update(
            &mut app,
            Action::Fragment {
                id,
                text: "done".to_string(),
            },
        );
        update(&mut app, Action::Completed { id, session_id: None });

        update(
            &mut app,
            Action::Fragment {
                id,
                text: " extra".to_string(),
            },
        );
        assert_eq!(app.conversation.get(id).unwrap().content, "done");
    }

    #[test]
    fn test_failure_marks_message_and_keeps_reason() {
        let mut app = test_app();
        let id = submit_ok(&mut app, "Hello");

        update(
            &mut app,
            Action::Failed {
                id,
                reason: "network error: connection refused".to_string(),
            },
        );

        let reply = app.conversation.get(id).unwrap();
        assert_eq!(reply.status, MessageStatus::Failed);
        assert_eq!(reply.content, "");
        assert_eq!(
            reply.error.as_deref(),
            Some("network error: connection refused")
        );
        assert!(app.status_message.contains("network error"));
    }

    #[test]
    fn test_retry_failed_message_to_completion() {
        let mut app = test_app();
        let id = submit_ok(&mut app, "Hello");
        update(
            &mut app,
            Action::Failed {
                id,
                reason: "timeout".to_string(),
            },
        );

        let effect = update(&mut app, Action::Retry(id));
        assert_eq!(effect, Effect::SpawnRequest { id });
        let reply = app.conversation.get(id).unwrap();
        assert!(reply.is_pending());
        assert!(reply.error.is_none());

        update(
            &mut app,
            Action::Fragment {
                id,
                text: "Hi".to_string(),
            },
        );
        update(&mut app, Action::Completed { id, session_id: None });
        let reply = app.conversation.get(id).unwrap();
        assert_eq!(reply.status, MessageStatus::Complete);
        assert_eq!(reply.content, "Hi");
    }

    #[test]
    fn test_retry_discards_partial_content() {
        let mut app = test_app();
        let id = submit_ok(&mut app, "Hello");
        update(
            &mut app,
            Action::Fragment {
                id,
                text: "partial ans".to_string(),
            },
        );
        update(
            &mut app,
            Action::Failed {
                id,
                reason: "stream lost".to_string(),
            },
        );

        update(&mut app, Action::Retry(id));
        assert_eq!(app.conversation.get(id).unwrap().content, "");
    }

    #[test]
    fn test_retry_while_another_pending_is_rejected() {
        let mut app = test_app();
        let first = submit_ok(&mut app, "Hello");
        update(
            &mut app,
            Action::Failed {
                id: first,
                reason: "timeout".to_string(),
            },
        );

        // A second exchange is in flight; retrying the failed one would make
        // two pending replies.
        let second = submit_ok(&mut app, "Again");
        let before = app.conversation.clone();

        assert_eq!(update(&mut app, Action::Retry(first)), Effect::None);
        assert_eq!(app.conversation, before);
        assert!(app.conversation.get(first).unwrap().is_failed());

        // Once the in-flight exchange settles, the retry goes through.
        update(
            &mut app,
            Action::Completed {
                id: second,
                session_id: None,
            },
        );
        assert_eq!(
            update(&mut app, Action::Retry(first)),
            Effect::SpawnRequest { id: first }
        );
        assert!(!app.conversation.get(second).unwrap().is_pending());
    }

    #[test]
    fn test_retry_non_failed_is_noop() {
        let mut app = test_app();
        let pending = submit_ok(&mut app, "Hello");
        update(
            &mut app,
            Action::Fragment {
                id: pending,
                text: "Hi".to_string(),
            },
        );
        let before = app.conversation.clone();

        // Pending message
        assert_eq!(update(&mut app, Action::Retry(pending)), Effect::None);
        // Complete message
        update(
            &mut app,
            Action::Completed {
                id: pending,
                session_id: None,
            },
        );
        assert_eq!(update(&mut app, Action::Retry(pending)), Effect::None);
        // Unknown id
        assert_eq!(update(&mut app, Action::Retry(Uuid::new_v4())), Effect::None);

        assert_eq!(app.conversation.messages()[0], before.messages()[0]);
    }

    #[test]
    fn test_clear_then_submit_behaves_fresh() {
        let mut app = test_app();
        let id = submit_ok(&mut app, "Hello");
        update(
            &mut app,
            Action::Completed {
                id,
                session_id: Some("sess-1".to_string()),
            },
        );
        assert_eq!(app.session_id.as_deref(), Some("sess-1"));

        update(&mut app, Action::Clear);
        assert!(app.conversation.is_empty());
        assert!(app.session_id.is_none());

        submit_ok(&mut app, "again");
        assert_eq!(app.conversation.len(), 2);
        assert_eq!(app.conversation.messages()[0].content, "again");
    }

    #[test]
    fn test_clear_during_pending_allows_new_submit() {
        let mut app = test_app();
        submit_ok(&mut app, "Hello");
        update(&mut app, Action::Clear);

        // The old exchange no longer blocks a fresh one.
        submit_ok(&mut app, "again");
        assert_eq!(app.conversation.len(), 2);
    }

    #[test]
    fn test_completed_adopts_session_id() {
        let mut app = test_app();
        let id = submit_ok(&mut app, "Hello");
        update(
            &mut app,
            Action::Completed {
                id,
                session_id: Some("sess-42".to_string()),
            },
        );
        assert_eq!(app.session_id.as_deref(), Some("sess-42"));

        // A later completion without a session id keeps the old one.
        let id = submit_ok(&mut app, "More");
        update(&mut app, Action::Completed { id, session_id: None });
        assert_eq!(app.session_id.as_deref(), Some("sess-42"));
    }

    #[test]
    fn test_quit_effect() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::Quit), Effect::Quit);
    }
}
