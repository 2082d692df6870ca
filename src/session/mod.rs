//! The single program buffer behind the editor pane.

use tokio::sync::watch;

const INDENT: &str = "    ";

/// Owns the program text, cursor, focus and scroll position.
///
/// Every mutation publishes the new line count, so subscribers such as the line
/// counter never lag behind the buffer.
#[derive(Debug)]
pub struct EditorSession {
    lines: Vec<String>,
    /// Cursor as (line, column in chars).
    cursor: (usize, usize),
    scroll_top: usize,
    focused: bool,
    line_count_tx: watch::Sender<usize>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new("")
    }
}

impl EditorSession {
    pub fn new(text: &str) -> Self {
        let lines = split_lines(text);
        let (line_count_tx, _) = watch::channel(lines.len());
        Self { lines, cursor: (0, 0), scroll_top: 0, focused: false, line_count_tx }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Replaces the whole buffer and puts the cursor at the start.
    pub fn set_text(&mut self, text: &str) {
        self.lines = split_lines(text);
        self.cursor = (0, 0);
        self.scroll_top = 0;
        self.notify();
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn subscribe_line_count(&self) -> watch::Receiver<usize> {
        self.line_count_tx.subscribe()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_top = 0;
    }

    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    /// Adjusts the scroll offset so the cursor row is inside a viewport of `height` rows.
    pub fn scroll_to_cursor(&mut self, height: usize) {
        let row = self.cursor.0;
        if height == 0 {
            return;
        }
        if row < self.scroll_top {
            self.scroll_top = row;
        } else if row >= self.scroll_top + height {
            self.scroll_top = row + 1 - height;
        }
    }

    // ----- Keystroke editing -----

    pub fn insert_char(&mut self, c: char) {
        let (row, col) = self.cursor;
        let at = byte_index(&self.lines[row], col);
        self.lines[row].insert(at, c);
        self.cursor.1 += 1;
        self.notify();
    }

    pub fn insert_indent(&mut self) {
        for c in INDENT.chars() {
            self.insert_char(c);
        }
    }

    pub fn insert_newline(&mut self) {
        let (row, col) = self.cursor;
        let at = byte_index(&self.lines[row], col);
        let rest = self.lines[row].split_off(at);
        self.lines.insert(row + 1, rest);
        self.cursor = (row + 1, 0);
        self.notify();
    }

    pub fn backspace(&mut self) {
        let (row, col) = self.cursor;
        if col > 0 {
            let at = byte_index(&self.lines[row], col - 1);
            self.lines[row].remove(at);
            self.cursor.1 -= 1;
        } else if row > 0 {
            let current = self.lines.remove(row);
            let prev_len = self.lines[row - 1].chars().count();
            self.lines[row - 1].push_str(&current);
            self.cursor = (row - 1, prev_len);
        } else {
            return;
        }
        self.notify();
    }

    pub fn delete(&mut self) {
        let (row, col) = self.cursor;
        if col < self.lines[row].chars().count() {
            let at = byte_index(&self.lines[row], col);
            self.lines[row].remove(at);
        } else if row + 1 < self.lines.len() {
            let next = self.lines.remove(row + 1);
            self.lines[row].push_str(&next);
        } else {
            return;
        }
        self.notify();
    }

    pub fn move_left(&mut self) {
        let (row, col) = self.cursor;
        if col > 0 {
            self.cursor.1 -= 1;
        } else if row > 0 {
            self.cursor = (row - 1, self.line_len(row - 1));
        }
    }

    pub fn move_right(&mut self) {
        let (row, col) = self.cursor;
        if col < self.line_len(row) {
            self.cursor.1 += 1;
        } else if row + 1 < self.lines.len() {
            self.cursor = (row + 1, 0);
        }
    }

    pub fn move_up(&mut self) {
        if self.cursor.0 > 0 {
            let row = self.cursor.0 - 1;
            self.cursor = (row, self.cursor.1.min(self.line_len(row)));
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor.0 + 1 < self.lines.len() {
            let row = self.cursor.0 + 1;
            self.cursor = (row, self.cursor.1.min(self.line_len(row)));
        }
    }

    pub fn move_home(&mut self) {
        self.cursor.1 = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor.1 = self.line_len(self.cursor.0);
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines[row].chars().count()
    }

    fn notify(&self) {
        self.line_count_tx.send_replace(self.lines.len());
    }
}

/// An empty buffer is one empty line; a trailing newline opens another.
fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(|l| l.trim_end_matches('\r').to_string()).collect()
}

fn byte_index(line: &str, col: usize) -> usize {
    line.char_indices().nth(col).map(|(i, _)| i).unwrap_or(line.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_count_matches_buffer() {
        assert_eq!(EditorSession::new("").line_count(), 1);
        assert_eq!(EditorSession::new("a").line_count(), 1);
        assert_eq!(EditorSession::new("a\n").line_count(), 2);
        assert_eq!(EditorSession::new("a\nb\nc").line_count(), 3);
    }

    #[test]
    fn set_text_notifies_subscribers() {
        let mut session = EditorSession::new("one");
        let mut rx = session.subscribe_line_count();
        assert_eq!(*rx.borrow(), 1);

        session.set_text("START\n    OUTPUT: 1\nSTOP");
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 3);
        assert_eq!(session.text(), "START\n    OUTPUT: 1\nSTOP");

        session.set_text("");
        assert_eq!(*rx.borrow_and_update(), 1);
    }

    #[test]
    fn typing_keeps_counter_current() {
        let mut session = EditorSession::default();
        let rx = session.subscribe_line_count();
        for c in "VAR a AS INT".chars() {
            session.insert_char(c);
        }
        session.insert_newline();
        session.insert_char('S');
        assert_eq!(*rx.borrow(), 2);
        assert_eq!(session.text(), "VAR a AS INT\nS");

        session.backspace();
        session.backspace();
        assert_eq!(*rx.borrow(), 1);
        assert_eq!(session.text(), "VAR a AS INT");
    }

    #[test]
    fn newline_splits_at_cursor() {
        let mut session = EditorSession::new("STARTSTOP");
        for _ in 0..5 {
            session.move_right();
        }
        session.insert_newline();
        assert_eq!(session.text(), "START\nSTOP");
        assert_eq!(session.cursor(), (1, 0));

        session.move_up();
        session.move_end();
        session.delete();
        assert_eq!(session.text(), "STARTSTOP");
    }

    #[test]
    fn edits_respect_multibyte_chars() {
        let mut session = EditorSession::new("é");
        session.move_end();
        session.insert_char('x');
        session.move_left();
        session.move_left();
        session.insert_char('a');
        assert_eq!(session.text(), "aéx");
    }

    #[test]
    fn set_text_resets_cursor_and_scroll() {
        let mut session = EditorSession::new(&"x\n".repeat(40));
        for _ in 0..30 {
            session.move_down();
        }
        session.scroll_to_cursor(10);
        assert_eq!(session.scroll_top(), 21);

        session.set_text("a\nb");
        assert_eq!(session.cursor(), (0, 0));
        assert_eq!(session.scroll_top(), 0);
    }

    #[test]
    fn focus_and_scroll_to_top() {
        let mut session = EditorSession::new(&"x\n".repeat(20));
        for _ in 0..15 {
            session.move_down();
        }
        session.scroll_to_cursor(5);
        assert!(session.scroll_top() > 0);

        session.scroll_to_top();
        session.focus();
        assert_eq!(session.scroll_top(), 0);
        assert!(session.is_focused());
        session.blur();
        assert!(!session.is_focused());
    }
}
