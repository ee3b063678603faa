//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), taking state and
//! drawing into a frame.

mod chat;
mod help;
mod input;
mod rooms;
mod status;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::Paragraph,
};

use crate::App;

/// Title shown on the first row.
const HEADER: &str = "Livetype CLI";

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    const HEADER_HEIGHT: u16 = 1;
    const TOP_ROW_HEIGHT: u16 = 10;
    const CHAT_AREA_MIN_HEIGHT: u16 = 3;
    const INPUT_HEIGHT: u16 = 3;
    const STATUS_HEIGHT: u16 = 1;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Length(TOP_ROW_HEIGHT),
            Constraint::Min(CHAT_AREA_MIN_HEIGHT),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [header_area, top_area, chat_area, input_area, status_area] = chunks.as_ref() else {
        return;
    };

    let header = Paragraph::new(HEADER)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(header, *header_area);

    render_top_row(frame, app, *top_area);
    chat::render(frame, app, *chat_area);
    input::render(frame, app, *input_area);
    status::render(frame, app, *status_area);
}

/// Render the help panel (when shown) next to the room list.
fn render_top_row(frame: &mut Frame, app: &App, area: Rect) {
    if !app.show_help() {
        rooms::render(frame, app, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
        .split(area);

    let [help_area, rooms_area] = chunks.as_ref() else {
        return;
    };

    help::render(frame, *help_area);
    rooms::render(frame, app, *rooms_area);
}


#[cfg(test)]
mod tests {
    use livetype_app::{AppEvent, KeyInput};

    use super::{
        test_support::{app, contains, draw},
        *,
    };

    #[test]
    fn full_screen_shows_every_panel() {
        let app = app();
        let buffer = draw(100, 30, |frame| render(frame, &app));

        assert!(contains(&buffer, HEADER));
        assert!(contains(&buffer, "Help Menu"));
        assert!(contains(&buffer, "Available Rooms"));
        assert!(contains(&buffer, "Chat Messages"));
        assert!(contains(&buffer, "alice@home> "));
        assert!(contains(&buffer, "Not connected"));
    }

    #[test]
    fn hidden_help_gives_rooms_the_row() {
        let mut app = app();
        for c in "help".chars() {
            app.handle(AppEvent::Key(KeyInput::Char(c)));
        }
        app.handle(AppEvent::Key(KeyInput::Enter));
        assert!(!app.show_help());

        let buffer = draw(100, 30, |frame| render(frame, &app));
        assert!(!contains(&buffer, "Help Menu"));
        assert!(contains(&buffer, "Available Rooms"));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let app = app();
        let _ = draw(4, 2, |frame| render(frame, &app));
    }
}
