use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::util::unicode::{next_grapheme_boundary, prev_grapheme_boundary, word_boundary_left};

/// An editable text buffer with a byte-offset cursor on grapheme boundaries.
///
/// Enter and Esc are never consumed here; the owning state decides what they
/// mean. In multi-line mode Alt+Enter inserts a newline.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    buffer: String,
    cursor: usize,
    multiline: bool,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn multiline() -> Self {
        TextInput {
            multiline: true,
            ..Self::default()
        }
    }

    pub fn value(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the contents, cursor at the end
    pub fn set(&mut self, text: &str) {
        self.buffer = text.to_string();
        self.cursor = self.buffer.len();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    /// Take the contents, leaving the input empty
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }

    pub fn insert_str(&mut self, text: &str) {
        let text = if self.multiline {
            text.replace('\r', "")
        } else {
            text.replace('\n', " ").replace('\r', "")
        };
        self.buffer.insert_str(self.cursor, &text);
        self.cursor += text.len();
    }

    /// Apply an editing key. Returns false if the key is not an edit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match (key.modifiers, key.code) {
            (KeyModifiers::ALT, KeyCode::Enter) if self.multiline => {
                self.insert_str("\n");
            }
            (KeyModifiers::CONTROL, KeyCode::Char('a')) | (_, KeyCode::Home) => {
                self.cursor = self.line_start();
            }
            (KeyModifiers::CONTROL, KeyCode::Char('e')) | (_, KeyCode::End) => {
                self.cursor = self.line_end();
            }
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => {
                let start = self.line_start();
                self.buffer.replace_range(start..self.cursor, "");
                self.cursor = start;
            }
            (KeyModifiers::CONTROL, KeyCode::Char('w')) | (KeyModifiers::ALT, KeyCode::Backspace) => {
                let start = word_boundary_left(&self.buffer, self.cursor);
                self.buffer.replace_range(start..self.cursor, "");
                self.cursor = start;
            }
            (_, KeyCode::Left) => {
                if let Some(prev) = prev_grapheme_boundary(&self.buffer, self.cursor) {
                    self.cursor = prev;
                }
            }
            (_, KeyCode::Right) => {
                if let Some(next) = next_grapheme_boundary(&self.buffer, self.cursor) {
                    self.cursor = next;
                }
            }
            (_, KeyCode::Backspace) => {
                if let Some(prev) = prev_grapheme_boundary(&self.buffer, self.cursor) {
                    self.buffer.replace_range(prev..self.cursor, "");
                    self.cursor = prev;
                }
            }
            (_, KeyCode::Delete) => {
                if let Some(next) = next_grapheme_boundary(&self.buffer, self.cursor) {
                    self.buffer.replace_range(self.cursor..next, "");
                }
            }
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
                self.buffer.insert(self.cursor, c);
                self.cursor += c.len_utf8();
            }
            _ => return false,
        }
        true
    }

    /// Byte offset where the cursor's line starts
    fn line_start(&self) -> usize {
        self.buffer[..self.cursor].rfind('\n').map_or(0, |i| i + 1)
    }

    /// Byte offset where the cursor's line ends
    fn line_end(&self) -> usize {
        self.buffer[self.cursor..]
            .find('\n')
            .map_or(self.buffer.len(), |i| self.cursor + i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(input: &mut TextInput, s: &str) {
        for c in s.chars() {
            input.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut input = TextInput::new();
        type_str(&mut input, "Ship itt");
        input.handle_key(key(KeyCode::Backspace));
        assert_eq!(input.value(), "Ship it");
        assert_eq!(input.cursor(), 7);
    }

    #[test]
    fn test_cursor_moves_by_grapheme() {
        let mut input = TextInput::new();
        input.set("a🎉");
        input.handle_key(key(KeyCode::Left));
        assert_eq!(input.cursor(), 1);
        type_str(&mut input, "b");
        assert_eq!(input.value(), "ab🎉");
        input.handle_key(key(KeyCode::Delete));
        assert_eq!(input.value(), "ab");
    }

    #[test]
    fn test_home_end_and_kill() {
        let mut input = TextInput::new();
        input.set("hello world");
        input.handle_key(KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL));
        assert_eq!(input.value(), "hello ");
        input.handle_key(key(KeyCode::Home));
        assert_eq!(input.cursor(), 0);
        input.handle_key(key(KeyCode::End));
        input.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(input.value(), "");
    }

    #[test]
    fn test_enter_and_esc_are_not_consumed() {
        let mut input = TextInput::new();
        assert!(!input.handle_key(key(KeyCode::Enter)));
        assert!(!input.handle_key(key(KeyCode::Esc)));
        assert!(!input.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT)));
    }

    #[test]
    fn test_multiline_newline_and_line_home() {
        let mut input = TextInput::multiline();
        type_str(&mut input, "one");
        assert!(input.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT)));
        type_str(&mut input, "two");
        assert_eq!(input.value(), "one\ntwo");
        input.handle_key(key(KeyCode::Home));
        assert_eq!(input.cursor(), 4);
    }

    #[test]
    fn test_single_line_paste_flattens_newlines() {
        let mut input = TextInput::new();
        input.insert_str("a\nb\r\n");
        assert_eq!(input.value(), "a b ");
    }
}
