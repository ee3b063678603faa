//! Room list
//!
//! Displays the lobby catalog, one line per room.

use livetype_app::{App, room_line};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

/// Shown when the catalog is empty.
const NO_ROOMS: &str = "No rooms available";

/// Render the room list.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let current = app.room().map(|room| room.room_id.as_str());

    let items: Vec<ListItem> = if app.rooms().is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            NO_ROOMS,
            Style::default().fg(Color::DarkGray),
        )))]
    } else {
        app.rooms()
            .iter()
            .map(|room| {
                let style = if current == Some(room.id.as_str()) {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(Span::styled(room_line(room), style)))
            })
            .collect()
    };

    let block = Block::default().borders(Borders::ALL).title(" Available Rooms ");
    let list = List::new(items).block(block);

    frame.render_widget(list, area);
}
