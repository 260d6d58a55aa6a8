//! TrackPanel component: now playing and last scrobbled, right of the list.
//!
//! Each half is drawn only while its track is visible in `DisplayState`.

use ratatui::crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use scrobble_proto::protocol::Track;

use crate::{
    action::Action,
    app_state::AppState,
    component::Component,
    theme::{style_default, style_muted, style_secondary, C_ACTIVE, C_PRIMARY},
    widgets::pane_chrome::{pane_chrome, Badge},
};

#[derive(Default)]
pub struct TrackPanel;

impl TrackPanel {
    pub fn new() -> Self {
        Self
    }
}

fn track_lines(track: &Track) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            track.title.clone().unwrap_or_default(),
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            track.artist.clone().unwrap_or_default(),
            style_secondary(),
        )),
    ]
}

fn draw_track(frame: &mut Frame, area: Rect, title: &str, track: &Track, live: bool) {
    let badge = live.then_some(Badge {
        text: "LIVE",
        color: C_ACTIVE,
    });
    let block = pane_chrome(title, false, badge);
    frame.render_widget(
        Paragraph::new(track_lines(track))
            .block(block)
            .wrap(Wrap { trim: true }),
        area,
    );
}

impl Component for TrackPanel {
    fn handle_key(&mut self, _key: KeyEvent, _state: &AppState) -> Vec<Action> {
        Vec::new()
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        let display = state.display();
        let panels: Vec<(&str, &Track, bool)> = [
            display
                .current_track
                .as_ref()
                .map(|t| ("now playing", t, display.connection_status.is_active())),
            display
                .last_scrobbled
                .as_ref()
                .map(|t| ("last scrobbled", t, false)),
        ]
        .into_iter()
        .flatten()
        .collect();

        if panels.is_empty() {
            let hint = if display.connection_status.is_active() {
                " waiting for track info…"
            } else {
                " select a station and press s to start scrobbling"
            };
            frame.render_widget(
                Paragraph::new(vec![Line::from(""), Line::from(Span::styled(hint, style_muted()))])
                    .style(style_default()),
                area,
            );
            return;
        }

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                panels
                    .iter()
                    .map(|_| Constraint::Length(4))
                    .chain(std::iter::once(Constraint::Min(0))),
            )
            .split(area);
        for (i, (title, track, live)) in panels.into_iter().enumerate() {
            draw_track(frame, rows[i], title, track, live);
        }
    }
}
