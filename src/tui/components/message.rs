use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Text};
use ratatui::widgets::{Block, Padding, Paragraph, Widget, Wrap};

use crate::core::conversation::{Message, Role};
use crate::tui::component::Component;
use crate::tui::theme::Theme;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;

/// Pulse intensity threshold above which the border transitions from normal to BOLD.
const PULSE_BOLD_THRESHOLD: f32 = 0.6;
/// Pulse intensity threshold above which the border transitions from DIM to normal.
const PULSE_NORMAL_THRESHOLD: f32 = 0.2;

/// Placeholder shown while a reply is pending and no fragment has arrived yet.
const PENDING_PLACEHOLDER: &str = "...";

/// A stateless component that renders a single chat message.
///
/// `MessageView` is a transient component: it's created fresh each frame with
/// the data it needs to render. Colors come exclusively from the [`Theme`]
/// passed in by the parent.
///
/// A pending reply pulses its border while streaming; a failed reply is drawn
/// with the error style, a `(failed)` title tag, and the failure description
/// under any partial content.
///
/// # Height Calculation
///
/// [`calculate_height`](Self::calculate_height) predicts rendered height
/// using `textwrap` with options matching Ratatui's `Paragraph` wrapping.
/// This lets the parent `MessageList` place messages without rendering them.
#[derive(Clone, Copy)]
pub struct MessageView<'a> {
    pub message: &'a Message,
    pub theme: &'a Theme,
    /// Current pulse intensity (0.0 to 1.0) for active generation animation
    pub pulse_intensity: f32,
}

impl<'a> MessageView<'a> {
    pub fn new(message: &'a Message, theme: &'a Theme, pulse_intensity: f32) -> Self {
        Self {
            message,
            theme,
            pulse_intensity,
        }
    }

    /// Calculate the height required for this message given a width.
    ///
    /// Wrapping options must match the `Ratatui` default for `Paragraph`
    /// to keep a 1:1 mapping between calculated and actual height.
    pub fn calculate_height(message: &Message, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            // Degenerate case: terminal too narrow for borders + padding.
            return 1;
        }

        let mut lines: u16 = 0;
        let content = message.content.trim();
        if !content.is_empty() {
            lines += wrapped_line_count(content, content_width);
        } else if message.is_pending() {
            lines += 1; // the "..." placeholder row
        }
        if let Some(error) = &message.error {
            lines += wrapped_line_count(&error_line(error), content_width);
        }

        lines + VERTICAL_OVERHEAD
    }
}

/// Lines `text` occupies when wrapped to `width`, counting embedded newlines.
fn wrapped_line_count(text: &str, width: u16) -> u16 {
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                1
            } else {
                let options = textwrap::Options::new(width as usize)
                    .break_words(true)
                    .word_separator(textwrap::WordSeparator::AsciiSpace);
                textwrap::wrap(line, options).len() as u16
            }
        })
        .sum::<u16>()
        .max(1)
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "you",
        Role::Agent => "agent",
        Role::System => "system",
    }
}

fn error_line(error: &str) -> String {
    format!("error: {error}")
}

impl Widget for MessageView<'_> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let style = self.theme.role_style(self.message.role);

        let (title, mut border_style) = if self.message.is_failed() {
            (
                format!("{} (failed)", role_label(self.message.role)),
                self.theme.error,
            )
        } else {
            (
                role_label(self.message.role).to_string(),
                style.add_modifier(Modifier::DIM),
            )
        };

        // Pulse animation while the reply streams in.
        // Three-phase breathing: DIM → normal → BOLD using the role's color.
        if self.message.is_pending() {
            if self.pulse_intensity > PULSE_BOLD_THRESHOLD {
                border_style = border_style
                    .remove_modifier(Modifier::DIM)
                    .add_modifier(Modifier::BOLD);
            } else if self.pulse_intensity > PULSE_NORMAL_THRESHOLD {
                border_style = border_style.remove_modifier(Modifier::DIM);
            }
        }

        let block = Block::bordered()
            .title(title)
            .border_type(ratatui::widgets::BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner_area = block.inner(area);
        block.render(area, buf);

        let mut text = Text::default();
        let content = self.message.content.trim();
        if !content.is_empty() {
            for line in content.lines() {
                text.push_line(Line::styled(line, style));
            }
        } else if self.message.is_pending() {
            text.push_line(Line::styled(PENDING_PLACEHOLDER, self.theme.pending));
        }
        if let Some(error) = &self.message.error {
            text.push_line(Line::styled(error_line(error), self.theme.error));
        }

        let paragraph = Paragraph::new(text).wrap(Wrap { trim: true });
        paragraph.render(inner_area, buf);
    }
}

/// `MessageView` is stateless, so the `&mut self` required by the trait is a
/// no-op; rendering is delegated to the [`Widget`] implementation.
impl Component for MessageView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}
