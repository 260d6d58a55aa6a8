//! StationList component: the station catalog on the left.
//!
//! The cursor is local UI state.  The selection (the station Start will use)
//! lives in the client core; `Enter` asks for it to change.

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use scrobble_proto::protocol::Station;

use crate::{
    action::Action,
    app_state::AppState,
    component::Component,
    core::CatalogState,
    intent::UserIntent,
    theme::{
        style_muted, style_secondary, style_selected, style_selected_focused, C_ACTIVE, C_ERROR,
        C_PRIMARY, C_SECONDARY,
    },
    widgets::{
        pane_chrome::{pane_chrome, Badge},
        scrollable_list::ScrollableList,
    },
};

const PAGE: usize = 10;

pub struct StationList {
    pub list: ScrollableList<Station>,
}

impl StationList {
    pub fn new() -> Self {
        Self {
            list: ScrollableList::new(),
        }
    }

    /// Refresh items from the latest client view.
    pub fn sync_stations(&mut self, state: &AppState) {
        let first_load = self.list.is_empty();
        self.list.set_items(state.stations().to_vec());
        if first_load {
            self.jump_to_current(state);
        }
    }

    fn jump_to_current(&mut self, state: &AppState) {
        let target = state
            .display()
            .active_station
            .as_ref()
            .or(state.selection());
        if let Some(station) = target {
            self.list.select_item(station);
        }
    }

    fn select_under_cursor(&self, state: &AppState) -> Vec<Action> {
        if !state.display().station_select_enabled {
            return Vec::new();
        }
        match self.list.selected_item() {
            Some(station) => vec![Action::Intent(UserIntent::SelectStation(Some(
                station.clone(),
            )))],
            None => Vec::new(),
        }
    }

    fn row<'a>(station: &'a Station, cursor: bool, focused: bool, state: &AppState) -> Line<'a> {
        let display = state.display();
        let is_active = display.active_station.as_ref() == Some(station)
            && display.connection_status.is_active();
        let is_selected = state.selection() == Some(station);

        let marker = if is_active {
            Span::styled(" ▶ ", Style::default().fg(C_ACTIVE))
        } else if is_selected {
            Span::styled(" ● ", Style::default().fg(C_PRIMARY))
        } else {
            Span::raw("   ")
        };
        let name_style = if is_active {
            Style::default().fg(C_ACTIVE).add_modifier(Modifier::BOLD)
        } else if is_selected {
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(C_SECONDARY)
        };

        let line = Line::from(vec![
            marker,
            Span::styled(station.display_name(), name_style),
            Span::styled(format!("  {}", station.as_str()), style_muted()),
        ]);
        match (cursor, focused) {
            (true, true) => line.style(style_selected_focused()),
            (true, false) => line.style(style_selected()),
            _ => line,
        }
    }
}

impl Default for StationList {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for StationList {
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return Vec::new();
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => vec![Action::SelectUp(1)],
            KeyCode::Down | KeyCode::Char('j') => vec![Action::SelectDown(1)],
            KeyCode::PageUp => vec![Action::SelectUp(PAGE)],
            KeyCode::PageDown => vec![Action::SelectDown(PAGE)],
            KeyCode::Home | KeyCode::Char('g') => vec![Action::SelectFirst],
            KeyCode::End | KeyCode::Char('G') => vec![Action::SelectLast],
            KeyCode::Char('J') => vec![Action::JumpToCurrent],
            KeyCode::Enter => self.select_under_cursor(state),
            KeyCode::Esc
                if state.display().station_select_enabled && state.selection().is_some() =>
            {
                vec![Action::Intent(UserIntent::SelectStation(None))]
            }
            _ => Vec::new(),
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::ScrollUp => vec![Action::SelectUp(1)],
            MouseEventKind::ScrollDown => vec![Action::SelectDown(1)],
            MouseEventKind::Down(MouseButton::Left) => {
                // Inside the border only.
                let top = area.y + 1;
                if event.row < top || event.row >= area.y + area.height.saturating_sub(1) {
                    return Vec::new();
                }
                if self.list.handle_click((event.row - top) as usize) {
                    self.select_under_cursor(state)
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }

    fn on_action(&mut self, action: &Action, state: &AppState) -> Vec<Action> {
        match action {
            Action::SelectUp(n) => self.list.select_up(*n),
            Action::SelectDown(n) => self.list.select_down(*n),
            Action::SelectFirst => self.list.select_first(),
            Action::SelectLast => self.list.select_last(),
            Action::JumpToCurrent => self.jump_to_current(state),
            _ => {}
        }
        Vec::new()
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let count = self.list.len().to_string();
        let badge = match &state.view.catalog {
            CatalogState::Ready(_) => Some(Badge {
                text: &count,
                color: C_SECONDARY,
            }),
            CatalogState::Failed => Some(Badge {
                text: "ERR",
                color: C_ERROR,
            }),
            CatalogState::Loading => None,
        };
        let block = pane_chrome("stations", focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let placeholder = match &state.view.catalog {
            CatalogState::Loading => Some("loading stations…"),
            CatalogState::Failed => Some("station catalog unavailable"),
            CatalogState::Ready(stations) if stations.is_empty() => Some("no stations"),
            CatalogState::Ready(_) => None,
        };
        if let Some(text) = placeholder {
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(format!(" {}", text), style_secondary()))),
                inner,
            );
            return;
        }

        let height = inner.height as usize;
        self.list.ensure_visible(height);
        let cursor = self.list.selected;
        let lines: Vec<Line> = self
            .list
            .visible_items(height)
            .into_iter()
            .map(|(i, station)| Self::row(station, i == cursor, focused, state))
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplayState;
    use ratatui::crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ready_state(select_enabled: bool) -> AppState {
        let mut state = AppState::new("http://127.0.0.1:5000", true);
        state.view.catalog =
            CatalogState::Ready(vec![Station::from("fipjazz"), Station::from("superfly")]);
        state.view.display = DisplayState {
            station_select_enabled: select_enabled,
            ..DisplayState::default()
        };
        state
    }

    #[test]
    fn test_enter_selects_station_under_cursor() {
        let state = ready_state(true);
        let mut list = StationList::new();
        list.sync_stations(&state);
        list.on_action(&Action::SelectDown(1), &state);
        assert_eq!(
            list.handle_key(key(KeyCode::Enter), &state),
            vec![Action::Intent(UserIntent::SelectStation(Some(
                Station::from("superfly")
            )))]
        );
    }

    #[test]
    fn test_enter_does_nothing_when_selection_disabled() {
        let state = ready_state(false);
        let mut list = StationList::new();
        list.sync_stations(&state);
        assert!(list.handle_key(key(KeyCode::Enter), &state).is_empty());
    }

    #[test]
    fn test_esc_clears_existing_selection() {
        let mut state = ready_state(true);
        let mut list = StationList::new();
        assert!(list.handle_key(key(KeyCode::Esc), &state).is_empty());

        state.view.selection = Some(Station::from("fipjazz"));
        assert_eq!(
            list.handle_key(key(KeyCode::Esc), &state),
            vec![Action::Intent(UserIntent::SelectStation(None))]
        );
    }

    #[test]
    fn test_first_sync_puts_cursor_on_active_station() {
        let mut state = ready_state(false);
        state.view.display.active_station = Some(Station::from("superfly"));
        let mut list = StationList::new();
        list.sync_stations(&state);
        assert_eq!(list.list.selected_item(), Some(&Station::from("superfly")));
    }
}
