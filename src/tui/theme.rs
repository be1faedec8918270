//! # Theme
//!
//! The visual shell: one [`Theme`] value built from the configured
//! [`ThemeKind`] at startup and passed by reference down the render tree.
//! Widgets take their colors from it and nothing else, so there is no
//! process-wide styling state and no runtime mutation.

use ratatui::style::{Color, Modifier, Style};

use crate::ThemeKind;
use crate::core::conversation::Role;

/// Concrete palette for every themed element of the interface.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub user: Style,
    pub agent: Style,
    pub system: Style,
    /// Placeholder text and spinner while a reply is streaming in.
    pub pending: Style,
    /// Failed replies and the error notice in the status bar.
    pub error: Style,
    pub title: Style,
    pub input: Style,
    pub input_border: Style,
}

impl Theme {
    pub fn from_kind(kind: ThemeKind) -> Self {
        match kind {
            ThemeKind::Dark => Self {
                user: Style::default().fg(Color::Green),
                agent: Style::default().fg(Color::Blue),
                system: Style::default().fg(Color::Yellow),
                pending: Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
                error: Style::default().fg(Color::Red),
                title: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                input: Style::default().fg(Color::Green),
                input_border: Style::default().fg(Color::DarkGray),
            },
            ThemeKind::Light => Self {
                user: Style::default().fg(Color::Blue),
                agent: Style::default().fg(Color::Magenta),
                system: Style::default().fg(Color::Cyan),
                pending: Style::default()
                    .fg(Color::Gray)
                    .add_modifier(Modifier::ITALIC),
                error: Style::default().fg(Color::LightRed),
                title: Style::default().fg(Color::Black).add_modifier(Modifier::BOLD),
                input: Style::default().fg(Color::Blue),
                input_border: Style::default().fg(Color::Gray),
            },
        }
    }

    /// Style for a message authored by `role`.
    pub fn role_style(&self, role: Role) -> Style {
        match role {
            Role::User => self.user,
            Role::Agent => self.agent,
            Role::System => self.system,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_kind(ThemeKind::default())
    }
}
