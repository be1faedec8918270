//! # InputBox Component
//!
//! Captures the text of the next submission.
//!
//! ## Responsibilities
//!
//! - Capture text input and editing (backspace, delete, cursor movement, paste)
//! - Emit [`InputEvent::Submit`] on Enter
//! - Grow with its content, clamped to a few lines
//!
//! ## State Management
//!
//! The buffer and cursor are internal state. Submission does NOT clear the
//! buffer — the event loop clears it once the reducer accepts the text, so a
//! refused submission (reply still pending) loses nothing.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Text};
use ratatui::widgets::{Block, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::tui::component::EventHandler;
use crate::tui::event::TuiEvent;
use crate::tui::theme::Theme;

/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;
/// The box grows with content up to this many text rows.
const MAX_VISIBLE_LINES: u16 = 6;

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// User submitted the text (Enter pressed)
    Submit(String),
    /// Text content changed (optional, if parent needs to know)
    ContentChanged,
}

/// Text input component.
pub struct InputBox {
    /// Text buffer (internal state)
    pub buffer: String,
    /// Cursor position as a byte offset into `buffer`
    cursor_pos: usize,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor_pos: 0,
        }
    }

    /// Drop the buffered text. Called by the event loop after an accepted
    /// submission.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor_pos = 0;
    }

    /// Calculate required height for current buffer content, clamped to
    /// [1 + VERTICAL_OVERHEAD, MAX_VISIBLE_LINES + VERTICAL_OVERHEAD].
    pub fn calculate_height(&self, width: u16) -> u16 {
        let inner = inner_width(width);
        let content_lines = wrapped_lines(&self.buffer, inner).len() as u16;
        content_lines.clamp(1, MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD
    }
}

fn inner_width(width: u16) -> usize {
    width.saturating_sub(2).max(1) as usize
}

/// Wrap `text` to `width`, preserving hard newlines. Returns at least one
/// (possibly empty) line so the cursor always has a row to sit on.
fn wrapped_lines(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in text.split('\n') {
        if raw.is_empty() {
            lines.push(String::new());
            continue;
        }
        let options = textwrap::Options::new(width)
            .break_words(true)
            .word_separator(textwrap::WordSeparator::AsciiSpace);
        lines.extend(textwrap::wrap(raw, options).into_iter().map(|l| l.into_owned()));
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// (row, col) of the cursor within the wrapped buffer.
fn cursor_row_col(buffer: &str, cursor_pos: usize, width: usize) -> (u16, u16) {
    let before = &buffer[..cursor_pos];
    if before.is_empty() {
        return (0, 0);
    }
    // A trailing '\n' yields an empty final line from wrapped_lines, which
    // puts the cursor at column 0 of the next row — exactly right.
    let lines = wrapped_lines(before, width);
    let row = lines.len().saturating_sub(1);
    let col = lines.last().map(|l| l.width()).unwrap_or(0);
    if col >= width {
        (row as u16 + 1, 0)
    } else {
        (row as u16, col as u16)
    }
}

/// Largest byte index < `pos` that sits on a char boundary.
fn prev_char_boundary(s: &str, pos: usize) -> usize {
    let mut p = pos.saturating_sub(1);
    while p > 0 && !s.is_char_boundary(p) {
        p -= 1;
    }
    p
}

/// Smallest byte index > `pos` that sits on a char boundary.
fn next_char_boundary(s: &str, pos: usize) -> usize {
    let mut p = pos + 1;
    while p < s.len() && !s.is_char_boundary(p) {
        p += 1;
    }
    p.min(s.len())
}

impl InputBox {
    /// Render with the given theme. Wrapping is done here with the same
    /// options as `calculate_height`, so displayed and predicted heights
    /// always agree.
    pub fn render_themed(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let inner = inner_width(area.width);
        let lines = wrapped_lines(&self.buffer, inner);
        let visible = area.height.saturating_sub(VERTICAL_OVERHEAD).max(1) as usize;

        let (cursor_row, cursor_col) = cursor_row_col(&self.buffer, self.cursor_pos, inner);

        // Scroll the window so the cursor's row stays visible.
        let first_visible = (cursor_row as usize + 1).saturating_sub(visible);
        let shown: Vec<Line> = lines
            .iter()
            .skip(first_visible)
            .take(visible)
            .map(|l| Line::raw(l.clone()))
            .collect();

        let block = Block::bordered()
            .border_type(ratatui::widgets::BorderType::Rounded)
            .border_style(theme.input_border)
            .title("Input");

        let paragraph = Paragraph::new(Text::from(shown))
            .block(block)
            .style(theme.input);
        frame.render_widget(paragraph, area);

        let screen_row = (cursor_row as usize).saturating_sub(first_visible) as u16;
        frame.set_cursor_position((
            area.x + 1 + cursor_col,
            area.y + 1 + screen_row.min(area.height.saturating_sub(VERTICAL_OVERHEAD)),
        ));
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor_pos, *c);
                self.cursor_pos += c.len_utf8();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                self.buffer.insert_str(self.cursor_pos, text);
                self.cursor_pos += text.len();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace => {
                if self.cursor_pos > 0 {
                    let prev = prev_char_boundary(&self.buffer, self.cursor_pos);
                    self.buffer.drain(prev..self.cursor_pos);
                    self.cursor_pos = prev;
                    Some(InputEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::Delete => {
                if self.cursor_pos < self.buffer.len() {
                    let next = next_char_boundary(&self.buffer, self.cursor_pos);
                    self.buffer.drain(self.cursor_pos..next);
                    Some(InputEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::CursorLeft => {
                if self.cursor_pos > 0 {
                    self.cursor_pos = prev_char_boundary(&self.buffer, self.cursor_pos);
                    Some(InputEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::CursorRight => {
                if self.cursor_pos < self.buffer.len() {
                    self.cursor_pos = next_char_boundary(&self.buffer, self.cursor_pos);
                    Some(InputEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::CursorHome => {
                let line_start = self.buffer[..self.cursor_pos]
                    .rfind('\n')
                    .map(|i| i + 1)
                    .unwrap_or(0);
                (self.cursor_pos != line_start).then(|| {
                    self.cursor_pos = line_start;
                    InputEvent::ContentChanged
                })
            }
            TuiEvent::Submit => {
                if self.buffer.trim().is_empty() {
                    None
                } else {
                    Some(InputEvent::Submit(self.buffer.clone()))
                }
            }
            _ => None,
        }
    }
}
