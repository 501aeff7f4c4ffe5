use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextInput {
    buffer: String,
    cursor: usize,
}

impl TextInput {
    pub fn with_text(text: &str) -> Self {
        let mut input = Self::default();
        input.set_text(text);
        input
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Cursor as a byte offset into `text()`.
    pub fn cursor_byte(&self) -> usize {
        self.byte_index(self.cursor)
    }

    pub fn is_blank(&self) -> bool {
        self.buffer.trim().is_empty()
    }

    pub fn set_text(&mut self, text: &str) {
        self.buffer = text.to_string();
        self.cursor = self.char_len();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    fn char_len(&self) -> usize {
        self.buffer.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.buffer.len())
    }

    pub fn insert_char(&mut self, c: char) {
        self.cursor = self.cursor.min(self.char_len());
        let at = self.byte_index(self.cursor);
        self.buffer.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        self.cursor = self.cursor.min(self.char_len());
        if self.cursor == 0 {
            return;
        }
        let at = self.byte_index(self.cursor - 1);
        self.buffer.remove(at);
        self.cursor -= 1;
    }

    pub fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_index(self.cursor);
            self.buffer.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.min(self.char_len()).saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    /// Start of the current line.
    pub fn move_home(&mut self) {
        let before = &self.buffer[..self.cursor_byte()];
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        self.cursor = self.buffer[..line_start].chars().count();
    }

    /// End of the current line.
    pub fn move_end(&mut self) {
        let at = self.cursor_byte();
        let line_end = self.buffer[at..]
            .find('\n')
            .map(|i| at + i)
            .unwrap_or(self.buffer.len());
        self.cursor = self.buffer[..line_end].chars().count();
    }

    /// Apply an editing key. Returns whether the key was consumed.
    /// `multiline` lets Enter insert a newline instead of being left to the caller.
    pub fn handle_key(&mut self, key: KeyEvent, multiline: bool) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) || key.modifiers.contains(KeyModifiers::ALT)
        {
            return false;
        }
        match key.code {
            KeyCode::Char(c) => self.insert_char(c),
            KeyCode::Tab if multiline => {
                for _ in 0..4 {
                    self.insert_char(' ');
                }
            }
            KeyCode::Enter if multiline => self.insert_char('\n'),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.move_home(),
            KeyCode::End => self.move_end(),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    #[test]
    fn test_can_type_r_and_c() {
        let mut input = TextInput::default();
        for c in ['r', 'c', 'R', 'C'] {
            input.handle_key(key(KeyCode::Char(c)), false);
        }
        assert_eq!(input.text(), "rcRC");
        assert_eq!(input.cursor(), 4);
    }

    #[test]
    fn test_cursor_left_right_movement() {
        let mut input = TextInput::with_text("Hello");
        input.handle_key(key(KeyCode::Left), false);
        assert_eq!(input.cursor(), 4);
        input.handle_key(key(KeyCode::Left), false);
        input.handle_key(key(KeyCode::Right), false);
        assert_eq!(input.cursor(), 4);

        for _ in 0..10 {
            input.move_left();
        }
        assert_eq!(input.cursor(), 0);
        for _ in 0..10 {
            input.move_right();
        }
        assert_eq!(input.cursor(), 5);
    }

    #[test]
    fn test_insert_character_at_cursor_position() {
        let mut input = TextInput::with_text("Helo");
        input.move_left();
        input.insert_char('l');
        assert_eq!(input.text(), "Hello");
        assert_eq!(input.cursor(), 4);
    }

    #[test]
    fn test_backspace_deletes_at_cursor_position() {
        let mut input = TextInput::with_text("Hello World");
        for _ in 0..6 {
            input.move_left();
        }
        input.backspace();
        assert_eq!(input.text(), "Hell World");
        assert_eq!(input.cursor(), 4);

        input.move_home();
        let before = input.text().to_string();
        input.backspace();
        assert_eq!(input.text(), before);
    }

    #[test]
    fn test_multibyte_characters() {
        let mut input = TextInput::default();
        input.insert_char('é');
        input.insert_char('→');
        input.insert_char('x');
        input.move_left();
        input.backspace();
        assert_eq!(input.text(), "éx");
        assert_eq!(input.cursor(), 1);
        assert_eq!(input.cursor_byte(), 2);
    }

    #[test]
    fn test_enter_only_inserts_in_multiline() {
        let mut input = TextInput::with_text("a");
        assert!(!input.handle_key(key(KeyCode::Enter), false));
        assert_eq!(input.text(), "a");
        assert!(input.handle_key(key(KeyCode::Enter), true));
        assert_eq!(input.text(), "a\n");
    }

    #[test]
    fn test_home_end_are_line_local() {
        let mut input = TextInput::with_text("first\nsecond");
        input.move_home();
        assert_eq!(input.cursor(), 6);
        input.move_left();
        input.move_home();
        assert_eq!(input.cursor(), 0);
        input.move_end();
        assert_eq!(input.cursor(), 5);
    }

    #[test]
    fn test_control_keys_are_not_consumed() {
        let mut input = TextInput::default();
        let ctrl_r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert!(!input.handle_key(ctrl_r, true));
        assert!(input.text().is_empty());
    }
}
