//! Chat area
//!
//! Presence notices on top, then one pane per participant showing their
//! live buffer.

use livetype_app::{App, Pane};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

const BORDER_SIZE: u16 = 2;

/// Most presence notices shown at once; older ones scroll off.
const MAX_SYSTEM_LINES: usize = 3;

const NO_MESSAGES: &str = "No messages yet.";
const NO_ROOM: &str = "Join a room to start chatting";

/// Render the chat area.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let title = app.room().map_or_else(
        || " Chat Messages ".to_string(),
        |room| format!(" Chat Messages: {} ({}) ", room.room_name, room.room_id),
    );
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(room) = app.room() else {
        let hint = Paragraph::new(Span::styled(NO_ROOM, Style::default().fg(Color::DarkGray)));
        frame.render_widget(hint, inner);
        return;
    };

    let first_notice = room.system_messages.len().saturating_sub(MAX_SYSTEM_LINES);
    let notices = &room.system_messages[first_notice..];

    let mut constraints = vec![Constraint::Length(notices.len() as u16)];
    if room.panes.is_empty() {
        constraints.push(Constraint::Length(1));
    } else {
        constraints.extend(room.panes.iter().map(|_| Constraint::Fill(1)));
    }

    let chunks =
        Layout::default().direction(Direction::Vertical).constraints(constraints).split(inner);

    let Some((notice_area, pane_areas)) = chunks.split_first() else {
        return;
    };

    let notice_lines: Vec<Line> = notices
        .iter()
        .map(|m| Line::from(Span::styled(m.as_str(), Style::default().fg(Color::Magenta))))
        .collect();
    frame.render_widget(Paragraph::new(notice_lines), *notice_area);

    if room.panes.is_empty() {
        if let Some(area) = pane_areas.first() {
            frame.render_widget(Paragraph::new(NO_MESSAGES), *area);
        }
        return;
    }

    for (pane, area) in room.panes.iter().zip(pane_areas) {
        render_pane(frame, pane, *area);
    }
}

/// Render one participant's buffer, keeping the end of the text in view.
fn render_pane(frame: &mut Frame, pane: &Pane, area: Rect) {
    let (title, style) = if pane.is_local {
        (format!(" {} (you) ", pane.username), Style::default().fg(Color::Yellow))
    } else {
        (format!(" {} ", pane.username), Style::default().fg(Color::Green))
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(title, style.add_modifier(Modifier::BOLD)));

    let width = area.width.saturating_sub(BORDER_SIZE) as usize;
    let height = area.height.saturating_sub(BORDER_SIZE) as usize;
    let paragraph = Paragraph::new(tail(&pane.text, width * height))
        .wrap(Wrap { trim: false })
        .block(block);

    frame.render_widget(paragraph, area);
}

/// Last `max_chars` characters of `text`.
fn tail(text: &str, max_chars: usize) -> &str {
    let skip = text.chars().count().saturating_sub(max_chars);
    text.char_indices().nth(skip).map_or("", |(i, _)| &text[i..])
}
