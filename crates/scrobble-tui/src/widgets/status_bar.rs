//! Bottom rows: the error banner and the keybindings bar.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::display::DisplayState;
use crate::intent::CommandBoard;
use crate::theme::{
    style_error, C_ACTIVE, C_EMERGENCY, C_MUTED, C_PENDING, C_PRIMARY, C_SECONDARY, C_SEPARATOR,
};

/// Draw a horizontal separator line.
pub fn draw_separator(frame: &mut Frame, area: Rect) {
    let line = Line::from(Span::styled(
        "─".repeat(area.width as usize),
        Style::default().fg(C_SEPARATOR),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

/// Draw the error banner; an empty row when there is nothing to show.
pub fn draw_banner(frame: &mut Frame, area: Rect, banner: Option<&str>) {
    let line = match banner {
        Some(message) => Line::from(vec![
            Span::styled(" ✗ ", style_error()),
            Span::styled(message, style_error()),
        ]),
        None => Line::from(""),
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// One key hint; dimmed when the control it triggers is disabled.
fn key_hint<'a>(
    key: &'a str,
    label: &'a str,
    enabled: bool,
    key_color: Color,
) -> [Span<'a>; 2] {
    let (key_style, label_style) = if enabled {
        (
            Style::default().fg(key_color).add_modifier(Modifier::BOLD),
            Style::default().fg(C_SECONDARY),
        )
    } else {
        (Style::default().fg(C_MUTED), Style::default().fg(C_MUTED))
    };
    [
        Span::styled(format!(" {} ", key), key_style),
        Span::styled(format!("{} ", label), label_style),
    ]
}

/// Draw the keybindings footer bar (one row).
pub fn draw_keys_bar(
    frame: &mut Frame,
    area: Rect,
    display: &DisplayState,
    commands: &CommandBoard,
) {
    let (mode, mode_color) = match commands.submitting() {
        Some(_) => ("SENDING", C_PENDING),
        None if display.connection_status.is_active() => ("ACTIVE", C_ACTIVE),
        None => ("IDLE", C_SECONDARY),
    };

    let mut spans = vec![
        Span::styled(
            format!(" {} ", mode),
            Style::default().fg(mode_color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ];
    spans.extend(key_hint("↑↓/jk", "move", true, C_PRIMARY));
    spans.extend(key_hint("enter", "select", display.station_select_enabled, C_PRIMARY));
    spans.extend(key_hint("s", "start", display.can_start, C_ACTIVE));
    spans.extend(key_hint("x", "stop", display.can_stop, C_PRIMARY));
    spans.extend(key_hint("E", "emergency stop", display.can_emergency_stop, C_EMERGENCY));
    spans.extend(key_hint("K", "keys", true, C_PRIMARY));
    spans.extend(key_hint("?", "help", true, C_PRIMARY));
    spans.extend(key_hint("q", "quit", true, C_PRIMARY));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
