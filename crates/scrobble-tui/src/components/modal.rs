//! Modal component: the emergency-stop confirmation and the acknowledgement
//! that follows it.
//!
//! Requests arrive from the core's `ChannelPrompt`.  While a modal is open it
//! swallows every key; polling and rendering carry on underneath.

use std::collections::VecDeque;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use tracing::{debug, warn};

use crate::{
    action::Action,
    app_state::AppState,
    component::Component,
    prompt::PromptRequest,
    theme::{C_EMERGENCY, C_MUTED, C_POPUP_BG, C_PRIMARY, C_TOAST_WARNING},
    widgets::centered_rect,
};

#[derive(Default)]
pub struct Modal {
    queue: VecDeque<PromptRequest>,
}

impl Modal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, request: PromptRequest) {
        debug!("modal queued: {}", request.message());
        self.queue.push_back(request);
    }

    pub fn is_open(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Answer the open confirmation.  No-op if the front request is not one.
    pub fn answer(&mut self, confirmed: bool) {
        if !matches!(self.queue.front(), Some(PromptRequest::Confirm { .. })) {
            return;
        }
        if let Some(PromptRequest::Confirm { reply, .. }) = self.queue.pop_front() {
            if reply.send(confirmed).is_err() {
                warn!("confirmation answered after the core stopped waiting");
            }
        }
    }

    /// Close the open acknowledgement.
    pub fn dismiss(&mut self) {
        if matches!(self.queue.front(), Some(PromptRequest::Acknowledge { .. })) {
            self.queue.pop_front();
        }
    }
}

impl Component for Modal {
    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return Vec::new();
        }
        match self.queue.front() {
            Some(PromptRequest::Confirm { .. }) => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    vec![Action::Answer(true)]
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    vec![Action::Answer(false)]
                }
                _ => Vec::new(),
            },
            Some(PromptRequest::Acknowledge { .. }) => vec![Action::Dismiss],
            None => Vec::new(),
        }
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        match action {
            Action::Answer(confirmed) => self.answer(*confirmed),
            Action::Dismiss => self.dismiss(),
            _ => {}
        }
        Vec::new()
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, _state: &AppState) {
        let Some(request) = self.queue.front() else {
            return;
        };
        let (title, color, footer) = match request {
            PromptRequest::Confirm { .. } => {
                (" EMERGENCY STOP ", C_EMERGENCY, " y / enter confirm    n / esc cancel")
            }
            PromptRequest::Acknowledge { .. } => (" done ", C_TOAST_WARNING, " press any key"),
        };

        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!(" {}", request.message()),
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(footer, Style::default().fg(C_MUTED))),
        ];

        let popup = centered_rect(60, 7, area);
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(color))
                        .title(Span::styled(
                            title,
                            Style::default().fg(color).add_modifier(Modifier::BOLD),
                        ))
                        .style(Style::default().bg(C_POPUP_BG)),
                )
                .wrap(Wrap { trim: false }),
            popup,
        );
    }
}
