//! Header component: the top row with connection dot, status line, server and last poll.

use ratatui::crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{
    action::Action,
    app_state::AppState,
    component::Component,
    theme::{style_active, style_muted, style_secondary, C_PENDING, C_PRIMARY},
};

#[derive(Default)]
pub struct Header;

impl Header {
    pub fn new() -> Self {
        Self
    }

    fn left_line(state: &AppState) -> Line<'static> {
        let display = state.display();
        let dot = if display.connection_status.is_active() {
            Span::styled(" ● ", style_active())
        } else {
            Span::styled(" ○ ", style_muted())
        };
        let status = Span::styled(
            display.status_line(),
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        );
        let mut spans = vec![dot, status];
        if let Some(kind) = state.view.commands.submitting() {
            spans.push(Span::styled(
                format!("  ({}…)", kind.label()),
                Style::default().fg(C_PENDING),
            ));
        }
        Line::from(spans)
    }

    fn right_line(state: &AppState) -> Line<'static> {
        let polled = match state.view.last_poll {
            Some(at) => format!("polled {}", at.format("%H:%M:%S")),
            None => "waiting for server…".to_string(),
        };
        Line::from(vec![
            Span::styled(state.server_url.clone(), style_muted()),
            Span::raw("  "),
            Span::styled(polled, style_secondary()),
            Span::raw(" "),
        ])
        .right_aligned()
    }
}

impl Component for Header {
    fn handle_key(&mut self, _key: KeyEvent, _state: &AppState) -> Vec<Action> {
        Vec::new()
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);
        frame.render_widget(Paragraph::new(Self::left_line(state)), halves[0]);
        frame.render_widget(Paragraph::new(Self::right_line(state)), halves[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{ConnectionStatus, DisplayState};
    use scrobble_proto::protocol::Station;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_left_line_shows_active_station() {
        let mut state = AppState::new("http://127.0.0.1:5000", true);
        state.view.display = DisplayState {
            connection_status: ConnectionStatus::Active,
            active_station: Some(Station::from("fipjazz")),
            ..DisplayState::default()
        };
        assert_eq!(text(&Header::left_line(&state)), " ● Scrobbling: FIP Jazz");
    }

    #[test]
    fn test_right_line_before_first_poll() {
        let state = AppState::new("http://scrobbler.lan:5000", true);
        let line = text(&Header::right_line(&state));
        assert!(line.contains("http://scrobbler.lan:5000"));
        assert!(line.contains("waiting for server"));
    }
}
