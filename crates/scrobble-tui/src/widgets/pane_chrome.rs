//! Bordered pane block shared by the station list and the track panels.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders},
};

use crate::theme::{style_focused_border, style_muted, style_unfocused_border, C_PRIMARY};

/// Short right-aligned label in the pane's top border ("LIVE", "12").
pub struct Badge<'a> {
    pub text: &'a str,
    pub color: Color,
}

pub fn pane_chrome<'a>(title: &'a str, focused: bool, badge: Option<Badge<'a>>) -> Block<'a> {
    let (border, title_style) = if focused {
        (
            style_focused_border(),
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        )
    } else {
        (style_unfocused_border(), style_muted())
    };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::styled(format!(" {} ", title), title_style));

    if let Some(badge) = badge {
        block = block.title_top(
            Line::from(Span::styled(
                format!(" {} ", badge.text),
                Style::default().fg(badge.color).add_modifier(Modifier::BOLD),
            ))
            .right_aligned(),
        );
    }
    block
}
