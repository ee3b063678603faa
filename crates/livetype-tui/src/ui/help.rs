//! Help panel
//!
//! Lists the interactive commands.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};

/// Command reference shown in the help panel.
pub const HELP_TEXT: &str = "\
Available Commands:
  rooms                     - Display available rooms
  join <room_id>            - Join a room
  join <room_id> <code>     - Join a semi-private room with access code
  create <name>             - Create a new public room
  createp <name> <code>     - Create a semi-private room with access code
  leave                     - Leave the current room
  help                      - Toggle this help panel
  quit                      - Exit the application

Type your message and it will be sent in real-time.";

/// Render the help panel.
pub fn render(frame: &mut Frame, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Help Menu ");
    let paragraph =
        Paragraph::new(HELP_TEXT).style(Style::default().fg(Color::Gray)).block(block);

    frame.render_widget(paragraph, area);
}
