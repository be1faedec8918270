//! # TitleBar Component
//!
//! The one-line page heading: application title, the agent it talks to, and
//! a transient status notice. Purely presentational — every field is a prop
//! from the parent, so it is trivial to test.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::Span;

use crate::tui::component::Component;
use crate::tui::theme::Theme;

/// Top status bar component showing the agent endpoint and status notices.
pub struct TitleBar<'a> {
    /// Label for the agent endpoint (its base URL)
    pub agent_label: &'a str,
    /// Transient status (e.g. "Waiting for the agent...", an error notice)
    pub status_message: &'a str,
    pub theme: &'a Theme,
}

impl<'a> TitleBar<'a> {
    pub fn new(agent_label: &'a str, status_message: &'a str, theme: &'a Theme) -> Self {
        Self {
            agent_label,
            status_message,
            theme,
        }
    }
}

impl Component for TitleBar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let title_text = if self.status_message.is_empty() {
            format!("AI Agent (endpoint: {})", self.agent_label)
        } else {
            format!(
                "AI Agent (endpoint: {}) | {}",
                self.agent_label, self.status_message
            )
        };

        frame.render_widget(Span::styled(title_text, self.theme.title), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render_to_text(agent_label: &str, status: &str) -> String {
        let backend = TestBackend::new(80, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::default();
        terminal
            .draw(|f| {
                let mut bar = TitleBar::new(agent_label, status, &theme);
                bar.render(f, f.area());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_title_bar_default_no_status() {
        let text = render_to_text("http://localhost:8000", "");
        assert!(text.contains("AI Agent"));
        assert!(text.contains("http://localhost:8000"));
        assert!(!text.contains('|'));
    }

    #[test]
    fn test_title_bar_with_status_message() {
        let text = render_to_text("http://localhost:8000", "Waiting for the agent...");
        assert!(text.contains("AI Agent"));
        assert!(text.contains("Waiting for the agent..."));
        assert!(text.contains('|'));
    }
}
