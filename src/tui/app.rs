//! TUI application state management.

use tokio::sync::watch;

use crate::{
    catalog::{Catalog, Example},
    orchestrator::{OutputView, VariablesView},
    session::EditorSession,
    status::IndicatorState,
};

/// Which widget receives typed characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Editor,
    Input,
}

/// Application state for the TUI
#[derive(Debug)]
pub struct App {
    /// Program buffer
    pub session: EditorSession,
    /// Line counter, fed by the session's change notifications
    line_count: watch::Receiver<usize>,
    /// Example registry and current selection
    pub catalog: Catalog,
    /// Free-text input passed to INPUT statements
    pub input: String,
    /// Cursor position in input (char index)
    pub input_cursor: usize,
    pub focus: Focus,
    /// Last output render
    pub output: OutputView,
    /// Last variable panel render
    pub variables: VariablesView,
    /// Read half of the orchestrator's indicators
    indicators: watch::Receiver<IndicatorState>,
    /// Where the engine lives, for the status bar
    pub engine_url: String,
    pub show_reference: bool,
    pub show_help: bool,
}

impl App {
    /// Create a new TUI application instance
    pub fn new(
        catalog: Catalog,
        indicators: watch::Receiver<IndicatorState>,
        engine_url: String,
    ) -> Self {
        let mut session = EditorSession::default();
        session.focus();
        let line_count = session.subscribe_line_count();
        Self {
            session,
            line_count,
            catalog,
            input: String::new(),
            input_cursor: 0,
            focus: Focus::Editor,
            output: OutputView::idle(),
            variables: VariablesView::NotLoaded,
            indicators,
            engine_url,
            show_reference: false,
            show_help: false,
        }
    }

    pub fn line_count(&self) -> usize {
        *self.line_count.borrow()
    }

    pub fn indicator(&self) -> IndicatorState {
        self.indicators.borrow().clone()
    }

    pub fn current_example(&self) -> &Example {
        self.catalog.current()
    }

    pub fn next_example(&mut self) {
        self.catalog.select_next();
    }

    pub fn previous_example(&mut self) {
        self.catalog.select_previous();
    }

    pub fn toggle_reference(&mut self) {
        self.show_reference = !self.show_reference;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Editor => {
                self.session.blur();
                Focus::Input
            }
            Focus::Input => {
                self.session.focus();
                Focus::Editor
            }
        };
    }

    /// Keeps `focus` in step after an operation focused the editor directly.
    pub fn sync_focus(&mut self) {
        if self.session.is_focused() {
            self.focus = Focus::Editor;
        }
    }

    // ----- Input field editing -----

    pub fn input_insert(&mut self, c: char) {
        let at = byte_index(&self.input, self.input_cursor);
        self.input.insert(at, c);
        self.input_cursor += 1;
    }

    pub fn input_backspace(&mut self) {
        if self.input_cursor > 0 {
            let at = byte_index(&self.input, self.input_cursor - 1);
            self.input.remove(at);
            self.input_cursor -= 1;
        }
    }

    pub fn input_left(&mut self) {
        self.input_cursor = self.input_cursor.saturating_sub(1);
    }

    pub fn input_right(&mut self) {
        if self.input_cursor < self.input.chars().count() {
            self.input_cursor += 1;
        }
    }

    pub fn input_home(&mut self) {
        self.input_cursor = 0;
    }

    pub fn input_end(&mut self) {
        self.input_cursor = self.input.chars().count();
    }

    /// Pastes into whichever widget has focus. The input field is single-line.
    pub fn paste(&mut self, text: &str) {
        match self.focus {
            Focus::Editor => {
                for c in text.chars() {
                    match c {
                        '\n' => self.session.insert_newline(),
                        '\r' => {}
                        '\t' => self.session.insert_indent(),
                        c => self.session.insert_char(c),
                    }
                }
            }
            Focus::Input => {
                for c in text.chars().filter(|c| *c != '\n' && *c != '\r') {
                    self.input_insert(c);
                }
            }
        }
    }
}

fn byte_index(s: &str, col: usize) -> usize {
    s.char_indices().nth(col).map(|(i, _)| i).unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::StatusIndicator;

    fn app() -> App {
        let indicator = StatusIndicator::new();
        App::new(Catalog::default(), indicator.subscribe(), "http://engine".into())
    }

    #[test]
    fn line_counter_follows_editor() {
        let mut app = app();
        assert_eq!(app.line_count(), 1);
        app.paste("VAR a AS INT\nSTART\nSTOP");
        assert_eq!(app.line_count(), 3);
        app.session.set_text("");
        assert_eq!(app.line_count(), 1);
    }

    #[test]
    fn input_field_stays_single_line() {
        let mut app = app();
        app.toggle_focus();
        assert_eq!(app.focus, Focus::Input);
        app.paste("17,\n42");
        assert_eq!(app.input, "17,42");
        app.input_left();
        app.input_left();
        app.input_backspace();
        assert_eq!(app.input, "1742");
        app.input_home();
        app.input_insert('-');
        assert_eq!(app.input, "-1742");
    }

    #[test]
    fn switching_examples_leaves_editor_alone() {
        let mut app = app();
        app.paste("mine");
        app.next_example();
        assert_eq!(app.current_example().id, "conditions");
        app.previous_example();
        app.previous_example();
        assert_eq!(app.current_example().id, "loops");
        assert_eq!(app.session.text(), "mine");
    }

    #[test]
    fn sync_focus_returns_to_editor() {
        let mut app = app();
        app.toggle_focus();
        app.session.focus();
        app.sync_focus();
        assert_eq!(app.focus, Focus::Editor);
    }
}
