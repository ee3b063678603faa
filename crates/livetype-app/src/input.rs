//! Terminal-agnostic keyboard input and the local line editor.

/// Keyboard input abstraction.
///
/// Decouples application logic from terminal libraries (crossterm, termion,
/// etc.) enabling deterministic simulation testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Enter/Return key.
    Enter,
    /// Backspace key (delete character before cursor).
    Backspace,
    /// Delete key (delete character at cursor).
    Delete,
    /// Tab key.
    Tab,
    /// Escape key (quit).
    Esc,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
    /// Up arrow key.
    Up,
    /// Down arrow key.
    Down,
    /// Home key (cursor to start).
    Home,
    /// End key (cursor to end).
    End,
}

/// What a key did to the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LineEffect {
    /// Content changed.
    Edited,
    /// Only the cursor moved.
    Moved,
    /// Enter pressed; carries the line as it was. The line is now empty.
    Submitted(String),
    /// Quit requested.
    Quit,
    /// Nothing happened.
    Ignored,
}

/// Local input line.
///
/// The cursor counts code points, never bytes, so multi-byte characters are
/// edited as single units.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Text buffer for user input.
    buffer: String,
    /// Cursor position in code points.
    cursor: usize,
}

impl InputState {
    /// Create a new empty input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text in the input buffer.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Current cursor position in code points.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Line length in code points.
    pub fn len(&self) -> usize {
        self.buffer.chars().count()
    }

    /// Returns true if the line is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub(crate) fn apply(&mut self, key: KeyInput) -> LineEffect {
        match key {
            KeyInput::Char(c) => {
                let at = self.byte_index(self.cursor);
                self.buffer.insert(at, c);
                self.cursor = self.cursor.saturating_add(1);
                LineEffect::Edited
            },
            KeyInput::Backspace => {
                if self.cursor == 0 {
                    return LineEffect::Ignored;
                }
                self.cursor = self.cursor.saturating_sub(1);
                let at = self.byte_index(self.cursor);
                self.buffer.remove(at);
                LineEffect::Edited
            },
            KeyInput::Delete => {
                if self.cursor >= self.len() {
                    return LineEffect::Ignored;
                }
                let at = self.byte_index(self.cursor);
                self.buffer.remove(at);
                LineEffect::Edited
            },
            KeyInput::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                LineEffect::Moved
            },
            KeyInput::Right => {
                if self.cursor < self.len() {
                    self.cursor = self.cursor.saturating_add(1);
                }
                LineEffect::Moved
            },
            KeyInput::Home => {
                self.cursor = 0;
                LineEffect::Moved
            },
            KeyInput::End => {
                self.cursor = self.len();
                LineEffect::Moved
            },
            KeyInput::Enter => {
                self.cursor = 0;
                LineEffect::Submitted(std::mem::take(&mut self.buffer))
            },
            KeyInput::Esc => LineEffect::Quit,
            KeyInput::Tab | KeyInput::Up | KeyInput::Down => LineEffect::Ignored,
        }
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.buffer.char_indices().nth(chars).map_or(self.buffer.len(), |(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> InputState {
        let mut input = InputState::new();
        for c in text.chars() {
            input.apply(KeyInput::Char(c));
        }
        input
    }

    #[test]
    fn insert_at_cursor() {
        let mut input = typed("hllo");
        input.apply(KeyInput::Home);
        input.apply(KeyInput::Right);
        assert_eq!(input.apply(KeyInput::Char('e')), LineEffect::Edited);

        assert_eq!(input.buffer(), "hello");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn multibyte_characters_edit_as_units() {
        let mut input = typed("héé");
        input.apply(KeyInput::Left);
        input.apply(KeyInput::Backspace);

        assert_eq!(input.buffer(), "hé");
        assert_eq!(input.cursor(), 1);

        input.apply(KeyInput::Delete);
        assert_eq!(input.buffer(), "h");
    }

    #[test]
    fn edges_are_ignored() {
        let mut input = typed("ab");
        assert_eq!(input.apply(KeyInput::Delete), LineEffect::Ignored);
        input.apply(KeyInput::Home);
        assert_eq!(input.apply(KeyInput::Backspace), LineEffect::Ignored);
        input.apply(KeyInput::Left);
        assert_eq!(input.cursor(), 0);
        input.apply(KeyInput::End);
        input.apply(KeyInput::Right);
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn enter_takes_the_line() {
        let mut input = typed("rooms");

        assert_eq!(input.apply(KeyInput::Enter), LineEffect::Submitted("rooms".into()));
        assert!(input.is_empty());
        assert_eq!(input.cursor(), 0);
    }
}
