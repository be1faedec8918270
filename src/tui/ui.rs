use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{MessageList, TitleBar};
use crate::tui::theme::Theme;

/// Compose the frame: title bar, transcript, input box.
/// The input area grows with its content; the transcript takes the rest.
pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, theme: &Theme) {
    use Constraint::{Length, Min};

    let input_height = tui.input_box.calculate_height(frame.area().width);
    let layout = Layout::vertical([Length(1), Min(0), Length(input_height)]);
    let [title_area, transcript_area, input_area] = layout.areas(frame.area());

    let mut title_bar = TitleBar::new(&app.agent_label, &app.status_message, theme);
    title_bar.render(frame, title_area);

    let mut message_list = MessageList::new(
        &mut tui.message_list,
        &app.conversation,
        theme,
        tui.pulse_value,
    );
    message_list.render(frame, transcript_area);

    tui.input_box.render_themed(frame, input_area, theme);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::{Action, update};
    use crate::test_support::test_app;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw_to_text(app: &App) -> String {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut tui = TuiState::new();
        let theme = Theme::default();
        terminal
            .draw(|f| {
                draw_ui(f, app, &mut tui, &theme);
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
    fn test_draw_ui_empty_conversation() {
        let app = test_app();
        let text = draw_to_text(&app);
        assert!(text.contains("AI Agent"));
        assert!(text.contains("Input"));
    }

    #[test]
    fn test_draw_ui_renders_exchange() {
        let mut app = test_app();
        let id = match update(&mut app, Action::Submit("Hello".to_string())) {
            crate::core::action::Effect::SpawnRequest { id } => id,
            other => panic!("expected SpawnRequest, got {other:?}"),
        };
        update(
            &mut app,
            Action::Fragment {
                id,
                text: "Hi there".to_string(),
            },
        );
        update(&mut app, Action::Completed { id, session_id: None });

        let text = draw_to_text(&app);
        assert!(text.contains("Hello"));
        assert!(text.contains("Hi there"));
    }
}
