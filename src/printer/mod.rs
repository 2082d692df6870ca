//! Printers for one-shot commands: coloured run output, variable tables and markdown (termimad).

use owo_colors::OwoColorize;
use termimad::MadSkin;

use crate::orchestrator::{
    view::NO_VARIABLES, OutputKind, OutputView, Renderer, VariablesView,
};
use crate::variables::DisplayEntry;

/// Renders orchestrator views straight to the terminal.
#[derive(Debug, Default)]
pub struct ConsoleRenderer {
    pub color: bool,
}

impl ConsoleRenderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }
}

impl Renderer for ConsoleRenderer {
    fn render_output(&self, view: OutputView) {
        match view.kind {
            OutputKind::Error if self.color => eprintln!("{}", view.text.red()),
            OutputKind::Error => eprintln!("{}", view.text),
            OutputKind::Idle if self.color => println!("{}", view.text.dimmed()),
            OutputKind::Normal | OutputKind::Idle => println!("{}", view.text),
        }
    }

    fn render_variables(&self, view: VariablesView) {
        match view {
            VariablesView::NotLoaded => {}
            VariablesView::Empty => println!("{}", NO_VARIABLES),
            VariablesView::Entries(entries) => {
                for line in variable_table(&entries) {
                    if self.color {
                        println!("{}", line.cyan());
                    } else {
                        println!("{}", line);
                    }
                }
            }
        }
    }
}

/// Aligned `name  TYPE  value` rows.
pub fn variable_table(entries: &[DisplayEntry]) -> Vec<String> {
    let name_w = entries.iter().map(|e| e.name.chars().count()).max().unwrap_or(0);
    let type_w = entries.iter().map(|e| e.type_label.as_str().len()).max().unwrap_or(0);
    entries
        .iter()
        .map(|e| {
            format!(
                "{:<name_w$}  {:<type_w$}  {}",
                e.name,
                e.type_label.as_str(),
                e.value,
            )
        })
        .collect()
}

pub struct MarkdownPrinter {
    pub skin: MadSkin,
}

impl Default for MarkdownPrinter {
    fn default() -> Self {
        Self { skin: MadSkin::default() }
    }
}

impl MarkdownPrinter {
    pub fn print(&self, text: &str) {
        self.skin.print_text(text);
        println!();
    }
}
