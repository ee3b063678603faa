//! Status bar
//!
//! Displays connection state, the latest status message and room information.

use livetype_app::{App, ConnectionState};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Render the status bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let connection_status = match app.connection_state() {
        ConnectionState::Disconnected => {
            Span::styled("Disconnected", Style::default().fg(Color::Red))
        },
        ConnectionState::Connecting => {
            Span::styled("Connecting...", Style::default().fg(Color::Yellow))
        },
        ConnectionState::Connected => {
            Span::styled("Signing in...", Style::default().fg(Color::Yellow))
        },
        ConnectionState::SignedIn { connection_id } => Span::styled(
            format!("Online ({connection_id})"),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    };

    let message = app.status_message().map_or_else(String::new, |m| format!(" | {m}"));

    let room_info = app.room().map_or_else(String::new, |room| {
        format!(" | Room: {} | Users: {}", room.room_id, room.panes.len())
    });

    let status_line = Line::from(vec![
        Span::raw(" "),
        connection_status,
        Span::raw(message),
        Span::styled(room_info, Style::default().fg(Color::Gray)),
    ]);

    let paragraph =
        Paragraph::new(status_line).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}
