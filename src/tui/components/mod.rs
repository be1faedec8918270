//! Reusable TUI components.
//!
//! Transient components (`MessageView`, `MessageList`, `TitleBar`) are built
//! fresh each frame from current state; persistent state they need across
//! frames (scroll position, input buffer) lives in dedicated `*State` structs
//! owned by `TuiState`.

pub mod input_box;
pub mod message;
pub mod message_list;
pub mod title_bar;

pub use input_box::{InputBox, InputEvent};
pub use message::MessageView;
pub use message_list::{MessageList, MessageListState};
pub use title_bar::TitleBar;
