//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! The event loop uses conditional redraw to avoid unnecessary work:
//!
//! - **Waiting on a reply**: draws every ~80ms so the pending-border pulse
//!   stays smooth.
//! - **Idle**: sleeps up to 500ms, only redraws on events or resize.
//!
//! ## Request lifecycle
//!
//! `Effect::SpawnRequest` starts two tokio tasks: the endpoint call streaming
//! `ReplyChunk`s into a channel, and a forwarder translating chunks into
//! `Action`s addressed to the placeholder's id. Clear and quit abort both
//! tasks; anything that slips through afterwards carries an id the reducer no
//! longer knows and is discarded there.

mod component;
pub mod components;
mod event;
pub mod theme;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};

use crossterm::cursor::{SetCursorStyle, Show};
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;

use crate::agent::{AgentEndpoint, HttpAgentEndpoint, ReplyChunk, ReplyRequest};
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::conversation::MessageId;
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::{InputBox, InputEvent, MessageListState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::theme::Theme;

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    // Persistent component states
    pub message_list: MessageListState,
    pub input_box: InputBox,
    // Animation state
    pub pulse_value: f32,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            message_list: MessageListState::new(),
            input_box: InputBox::new(),
            pulse_value: 0.0,
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(
            stdout(),
            EnableBracketedPaste,
            Show,                        // Show cursor for input editing
            SetCursorStyle::SteadyBlock, // Non-blinking: avoids blink timer reset from continuous redraws
        )?;
        info!("Terminal modes enabled (bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableBracketedPaste);
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let endpoint: Arc<dyn AgentEndpoint> = Arc::new(HttpAgentEndpoint::from_config(&config));
    let theme = Theme::from_kind(config.theme);
    let mut app = App::from_config(endpoint, &config);
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    // Abort handles for the in-flight exchange (dropped on clear/quit)
    let mut active_abort_handles: Vec<tokio::task::AbortHandle> = Vec::new();

    // Animation timer
    let start_time = std::time::Instant::now();
    let mut needs_redraw = true; // Force first frame

    loop {
        // Pulse animation runs while a reply is outstanding
        let animating = app.is_waiting();
        if animating {
            needs_redraw = true;
        }

        // Only draw when something changed
        if needs_redraw {
            let elapsed = start_time.elapsed().as_secs_f32();
            tui.pulse_value = (elapsed * 5.0).sin() * 0.5 + 0.5;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, &theme))?;
            needs_redraw = false;
        }

        // Dynamic poll timeout: short when animating (~12fps), long when idle
        let timeout = if animating {
            std::time::Duration::from_millis(80)
        } else {
            std::time::Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);

        // Process first event + drain ALL pending events before next draw
        let mut should_quit = false;
        if first_event.is_some() {
            needs_redraw = true;
        }
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            match event {
                // Resize just needs a redraw (already flagged above)
                TuiEvent::Resize => {}

                TuiEvent::Quit | TuiEvent::ForceQuit => {
                    if update(&mut app, Action::Quit) == Effect::Quit {
                        should_quit = true;
                    }
                }

                // Ctrl+R retries the most recent failed reply
                TuiEvent::Retry => {
                    if let Some(id) = app.conversation.last_failed()
                        && let Effect::SpawnRequest { id } = update(&mut app, Action::Retry(id))
                    {
                        // The reducer only allows one in-flight exchange, so
                        // anything still in the list has finished; aborting is
                        // a no-op then.
                        for handle in active_abort_handles.drain(..) {
                            handle.abort();
                        }
                        active_abort_handles = spawn_request(&app, tx.clone(), id);
                    }
                }

                // Ctrl+L wipes the transcript; an in-flight request dies with it
                TuiEvent::ClearConversation => {
                    for handle in active_abort_handles.drain(..) {
                        handle.abort();
                    }
                    update(&mut app, Action::Clear);
                    tui.message_list = MessageListState::new();
                }

                TuiEvent::ScrollUp
                | TuiEvent::ScrollDown
                | TuiEvent::ScrollPageUp
                | TuiEvent::ScrollPageDown
                | TuiEvent::ScrollToBottom => {
                    tui.message_list.handle_event(&event);
                }

                // Everything else goes to the input box
                _ => {
                    if let Some(InputEvent::Submit(text)) = tui.input_box.handle_event(&event)
                        && let Effect::SpawnRequest { id } = update(&mut app, Action::Submit(text))
                    {
                        // Accepted: the text now lives in the conversation
                        tui.input_box.clear();
                        for handle in active_abort_handles.drain(..) {
                            handle.abort();
                        }
                        active_abort_handles = spawn_request(&app, tx.clone(), id);
                    }
                }
            }
        }

        if should_quit {
            break;
        }

        // Handle background task actions (streaming replies)
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            match update(&mut app, action) {
                Effect::SpawnRequest { id } => {
                    for handle in active_abort_handles.drain(..) {
                        handle.abort();
                    }
                    active_abort_handles = spawn_request(&app, tx.clone(), id);
                }
                Effect::Quit => {
                    should_quit = true;
                }
                Effect::None => {}
            }
        }

        if should_quit {
            break;
        }
    }

    // Tear down the surface: a reply that arrives after this point must not
    // be applied anywhere, so the in-flight tasks are aborted outright.
    for handle in active_abort_handles.drain(..) {
        handle.abort();
    }

    ratatui::restore();
    Ok(())
}

/// Spawn the endpoint call for the pending message `id`.
///
/// Two tasks: the endpoint streaming `ReplyChunk`s into a channel, and a
/// forwarder translating them into `Action`s. Every action carries `id`, so
/// the reducer can match the reply to the exact placeholder it belongs to.
fn spawn_request(
    app: &App,
    tx: mpsc::Sender<Action>,
    id: MessageId,
) -> Vec<tokio::task::AbortHandle> {
    info!("Spawning agent request for {id}");

    // Clone what we need for the async task
    let endpoint = app.endpoint.clone();
    let conversation = app.conversation.clone();
    let session_id = app.session_id.clone();
    let system_prompt = app.system_prompt.clone();

    // Async channel for streaming chunks
    let (chunk_tx, mut chunk_rx) = tokio::sync::mpsc::channel::<ReplyChunk>(100);

    // Clone tx for the streaming task
    let tx_stream = tx.clone();

    // Spawn the endpoint streaming task
    let stream_handle = tokio::spawn(async move {
        let request = ReplyRequest {
            conversation: &conversation,
            session_id: session_id.as_deref(),
            system_prompt: &system_prompt,
        };

        if let Err(e) = endpoint.stream_reply(request, chunk_tx).await {
            info!("Reply stream error: {}", e);
            if tx_stream
                .send(Action::Failed {
                    id,
                    reason: e.to_string(),
                })
                .is_err()
            {
                warn!("Failed to send stream error action: receiver dropped");
            }
        }
    });

    // Spawn a task to forward chunks to the Action channel
    let forward_handle = tokio::spawn(async move {
        let mut forwarded_count = 0usize;
        let mut total_content_len = 0usize;

        while let Some(chunk) = chunk_rx.recv().await {
            forwarded_count += 1;
            match chunk {
                ReplyChunk::Fragment(text) => {
                    total_content_len += text.len();
                    if tx.send(Action::Fragment { id, text }).is_err() {
                        warn!("Failed to forward Fragment: receiver dropped");
                        return;
                    }
                }
                ReplyChunk::Completed { session_id } => {
                    info!(
                        "Reply complete: {} chunks, {} content bytes",
                        forwarded_count, total_content_len
                    );
                    if tx.send(Action::Completed { id, session_id }).is_err() {
                        warn!("Failed to send Completed: receiver dropped");
                    }
                    return;
                }
            }
        }

        // Channel closed without a Completed chunk: the endpoint task has
        // already reported the failure, nothing more to do here.
        debug!(
            "Chunk channel closed without terminal signal after {} chunks",
            forwarded_count
        );
    });

    vec![stream_handle.abort_handle(), forward_handle.abort_handle()]
}
