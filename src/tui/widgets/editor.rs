use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Single-line text field used by popups. The cursor is a char index, so
/// multi-byte input (Cyrillic names, the ruble sign) edits correctly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEditor {
    text: String,
    cursor: usize,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_string(content: impl Into<String>) -> Self {
        let text: String = content.into();
        // Newlines have no meaning in a single-line field
        let text = text.replace(['\n', '\r'], " ");
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn set_text(&mut self, content: impl Into<String>) {
        *self = Self::from_string(content);
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn insert_char(&mut self, ch: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, ch);
        self.cursor += 1;
    }

    /// Backspace
    pub fn delete_char(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let at = self.byte_index(self.cursor - 1);
        self.text.remove(at);
        self.cursor -= 1;
    }

    /// Delete key
    pub fn delete_forward(&mut self) {
        if self.cursor < self.len() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.len());
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor = self.len();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Apply an editing key. Returns false for keys the editor does not use,
    /// so the caller can treat them as commands.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('u') => {
                    self.clear();
                    true
                }
                _ => false,
            };
        }
        match key.code {
            KeyCode::Char(c) => self.insert_char(c),
            KeyCode::Backspace => self.delete_char(),
            KeyCode::Delete => self.delete_forward(),
            KeyCode::Left => self.move_cursor_left(),
            KeyCode::Right => self.move_cursor_right(),
            KeyCode::Home => self.move_cursor_home(),
            KeyCode::End => self.move_cursor_end(),
            _ => return false,
        }
        true
    }

    /// Text to draw in a field `width` columns wide, scrolled so the cursor
    /// stays visible, plus the cursor's column within that text
    pub fn visible(&self, width: usize) -> (String, usize) {
        if width == 0 {
            return (String::new(), 0);
        }
        let offset = (self.cursor + 1).saturating_sub(width);
        let shown: String = self.text.chars().skip(offset).take(width).collect();
        (shown, self.cursor - offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_multibyte_text() {
        let mut editor = LineEditor::from_string("Иван");
        assert_eq!(editor.cursor(), 4);
        editor.delete_char();
        editor.insert_char('н');
        assert_eq!(editor.text(), "Иван");
        editor.move_cursor_home();
        editor.delete_forward();
        assert_eq!(editor.text(), "ван");
    }

    #[test]
    fn keys_drive_the_editor() {
        let mut editor = LineEditor::new();
        for c in "12,5".chars() {
            assert!(editor.handle_key(&KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)));
        }
        assert!(editor.handle_key(&KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE)));
        assert_eq!(editor.text(), "12,");
        assert!(!editor.handle_key(&KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));
        assert!(editor.handle_key(&KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL)));
        assert!(editor.is_empty());
    }

    #[test]
    fn visible_window_follows_cursor() {
        let editor = LineEditor::from_string("abcdefgh");
        let (shown, col) = editor.visible(4);
        assert_eq!(shown, "fgh");
        assert_eq!(col, 3);

        let (shown, col) = LineEditor::from_string("ab").visible(10);
        assert_eq!((shown.as_str(), col), ("ab", 2));
    }

    #[test]
    fn newlines_are_flattened() {
        assert_eq!(LineEditor::from_string("a\nb").text(), "a b");
    }
}
