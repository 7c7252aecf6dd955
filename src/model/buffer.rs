use ropey::Rope;

use super::cursor::CursorState;

/// Viewport state for scroll tracking.
#[derive(Debug, Clone)]
pub struct Viewport {
    pub top_line: usize,
    pub height: u16,
    pub scroll_off: u16,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            top_line: 0,
            height: 10,
            scroll_off: 1,
        }
    }
}

/// A multi-line input field backed by a Rope (plugin code, plugin style).
#[derive(Debug, Default)]
pub struct Buffer {
    pub rope: Rope,
    pub cursor: CursorState,
    pub viewport: Viewport,
}

impl Buffer {
    /// Create a new empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn is_blank(&self) -> bool {
        self.rope.chars().all(char::is_whitespace)
    }

    pub fn clear(&mut self) {
        self.rope = Rope::new();
        self.cursor = CursorState::default();
        self.viewport.top_line = 0;
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get the text of a specific line (without trailing newline).
    pub fn line_text(&self, idx: usize) -> Option<String> {
        if idx >= self.rope.len_lines() {
            return None;
        }
        let line = self.rope.line(idx);
        let mut s: String = line.chunks().collect();
        if s.ends_with('\n') {
            s.pop();
        }
        if s.ends_with('\r') {
            s.pop();
        }
        Some(s)
    }

    /// Insert a character at the cursor position.
    pub fn insert_char(&mut self, ch: char) {
        let char_idx = self.cursor_char_index();
        self.rope.insert_char(char_idx, ch);
        self.cursor.col += ch.len_utf8();
        self.cursor.desired_col = self.cursor.col;
    }

    /// Insert a newline at the cursor position.
    pub fn insert_newline(&mut self) {
        let char_idx = self.cursor_char_index();
        self.rope.insert_char(char_idx, '\n');
        self.cursor.row += 1;
        self.cursor.col = 0;
        self.cursor.desired_col = 0;
    }

    /// Insert pasted text, normalizing line endings.
    pub fn insert_str(&mut self, text: &str) {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        for ch in normalized.chars() {
            if ch == '\n' {
                self.insert_newline();
            } else {
                self.insert_char(ch);
            }
        }
    }

    /// Delete the character before the cursor (backspace).
    pub fn delete_char_before(&mut self) {
        if self.cursor.col == 0 && self.cursor.row == 0 {
            return;
        }

        let char_idx = self.cursor_char_index();
        if self.cursor.col == 0 {
            // Join with previous line
            let prev_line_len = self
                .line_text(self.cursor.row - 1)
                .map(|l| l.len())
                .unwrap_or(0);
            self.rope.remove(char_idx - 1..char_idx);
            self.cursor.row -= 1;
            self.cursor.col = prev_line_len;
        } else {
            let prev_char_len = self.rope.char(char_idx - 1).len_utf8();
            self.rope.remove(char_idx - 1..char_idx);
            self.cursor.col -= prev_char_len;
        }
        self.cursor.desired_col = self.cursor.col;
    }

    pub fn move_left(&mut self) {
        if self.cursor.col > 0 {
            let char_idx = self.cursor_char_index();
            self.cursor.col -= self.rope.char(char_idx - 1).len_utf8();
        } else if self.cursor.row > 0 {
            self.cursor.row -= 1;
            self.cursor.col = self.line_len(self.cursor.row);
        }
        self.cursor.desired_col = self.cursor.col;
    }

    pub fn move_right(&mut self) {
        let line_len = self.line_len(self.cursor.row);
        if self.cursor.col < line_len {
            let char_idx = self.cursor_char_index();
            self.cursor.col += self.rope.char(char_idx).len_utf8();
        } else if self.cursor.row + 1 < self.line_count() {
            self.cursor.row += 1;
            self.cursor.col = 0;
        }
        self.cursor.desired_col = self.cursor.col;
    }

    pub fn move_up(&mut self) {
        if self.cursor.row > 0 {
            self.cursor.row -= 1;
            self.snap_to_desired_col();
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor.row + 1 < self.line_count() {
            self.cursor.row += 1;
            self.snap_to_desired_col();
        }
    }

    pub fn move_line_start(&mut self) {
        self.cursor.col = 0;
        self.cursor.desired_col = 0;
    }

    pub fn move_line_end(&mut self) {
        self.cursor.col = self.line_len(self.cursor.row);
        self.cursor.desired_col = self.cursor.col;
    }

    /// Cursor column in terminal cells, for placing the terminal cursor.
    pub fn cursor_display_col(&self) -> usize {
        self.line_text(self.cursor.row)
            .map(|line| line[..self.cursor.col.min(line.len())].chars().count())
            .unwrap_or(0)
    }

    /// Ensure the viewport keeps the cursor visible.
    pub fn scroll_to_cursor(&mut self) {
        let off = self.viewport.scroll_off as usize;
        let height = (self.viewport.height as usize).max(off * 2 + 1);

        if self.cursor.row < self.viewport.top_line + off {
            self.viewport.top_line = self.cursor.row.saturating_sub(off);
        }
        if self.cursor.row >= self.viewport.top_line + height - off {
            self.viewport.top_line = self.cursor.row + off + 1 - height;
        }
    }

    fn line_len(&self, row: usize) -> usize {
        self.line_text(row).map(|l| l.len()).unwrap_or(0)
    }

    /// Move to the nearest char boundary at or before the sticky column.
    fn snap_to_desired_col(&mut self) {
        let line = self.line_text(self.cursor.row).unwrap_or_default();
        let mut col = self.cursor.desired_col.min(line.len());
        while !line.is_char_boundary(col) {
            col -= 1;
        }
        self.cursor.col = col;
    }

    /// Rope char index of the cursor. `cursor.col` is a byte offset in the line.
    fn cursor_char_index(&self) -> usize {
        let line_start = self.rope.line_to_byte(self.cursor.row);
        self.rope.byte_to_char(line_start + self.cursor.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> Buffer {
        let mut buffer = Buffer::new();
        buffer.insert_str(text);
        buffer
    }

    #[test]
    fn paste_normalizes_line_endings() {
        let buffer = typed("id = \"a\"\r\nname = \"A\"\rversion = \"1\"");
        assert_eq!(buffer.text(), "id = \"a\"\nname = \"A\"\nversion = \"1\"");
        assert_eq!(buffer.line_count(), 3);
        assert_eq!(buffer.cursor.row, 2);
    }

    #[test]
    fn backspace_joins_lines() {
        let mut buffer = typed("ab\ncd");
        buffer.move_line_start();
        buffer.delete_char_before();
        assert_eq!(buffer.text(), "abcd");
        assert_eq!((buffer.cursor.row, buffer.cursor.col), (0, 2));
    }

    #[test]
    fn multibyte_editing_stays_on_char_boundaries() {
        let mut buffer = typed("便签é");
        buffer.move_left();
        buffer.move_left();
        buffer.insert_char('x');
        assert_eq!(buffer.text(), "便x签é");
        assert_eq!(buffer.cursor_display_col(), 2);

        buffer.move_line_end();
        buffer.delete_char_before();
        assert_eq!(buffer.text(), "便x签");
    }

    #[test]
    fn vertical_moves_keep_sticky_column() {
        let mut buffer = typed("long line\nab\nanother line");
        buffer.move_up();
        assert_eq!((buffer.cursor.row, buffer.cursor.col), (1, 2));
        buffer.move_up();
        assert_eq!((buffer.cursor.row, buffer.cursor.col), (0, 9));
        buffer.move_down();
        buffer.move_down();
        assert_eq!(buffer.cursor.row, 2);
        buffer.move_down();
        assert_eq!(buffer.cursor.row, 2);
    }

    #[test]
    fn clear_resets_cursor() {
        let mut buffer = typed("a\nb");
        assert!(!buffer.is_blank());
        buffer.clear();
        assert!(buffer.is_blank());
        assert_eq!((buffer.cursor.row, buffer.cursor.col), (0, 0));
    }

    #[test]
    fn scroll_follows_cursor() {
        let mut buffer = typed(&"x\n".repeat(30));
        buffer.viewport.height = 10;
        buffer.scroll_to_cursor();
        assert!(buffer.viewport.top_line > 0);
        assert!(buffer.cursor.row < buffer.viewport.top_line + 10);
    }
}
