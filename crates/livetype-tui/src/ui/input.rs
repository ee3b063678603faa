//! Input line
//!
//! Displays the prompt and input buffer with cursor.

use livetype_app::App;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

const INPUT_LINE_OFFSET_Y: u16 = 1; // inside top border
const LEFT_BORDER: u16 = 1;
const RIGHT_PADDING: u16 = 1; // inside right border

/// Render the input line.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Input ");

    let prompt = app.prompt();
    let input = app.input();

    let line = Line::from(vec![
        Span::styled(prompt.as_str(), Style::default().fg(Color::Cyan)),
        Span::styled(input.buffer(), Style::default().fg(Color::White)),
    ]);
    frame.render_widget(Paragraph::new(line).block(block), area);

    let prompt_width = prompt.chars().count() as u16;
    let cursor_x = area
        .x
        .saturating_add(LEFT_BORDER)
        .saturating_add(prompt_width)
        .saturating_add(input.cursor() as u16);
    let cursor_y = area.y.saturating_add(INPUT_LINE_OFFSET_Y);
    let max_x = area.x.saturating_add(area.width).saturating_sub(RIGHT_PADDING + 1);

    frame.set_cursor_position((cursor_x.min(max_x), cursor_y));
}
