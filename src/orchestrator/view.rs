//! What the orchestrator hands to whatever draws the playground.

use std::sync::Arc;

use crate::variables::DisplayEntry;

pub const IDLE_OUTPUT: &str = "Ready to execute CFPL code...";
pub const NO_OUTPUT: &str = "(No output)";
pub const NO_VARIABLES: &str = "No variables declared";

/// Output styling. The text itself never encodes the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Idle,
    Normal,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputView {
    pub kind: OutputKind,
    pub text: String,
}

impl OutputView {
    pub fn idle() -> Self {
        Self { kind: OutputKind::Idle, text: IDLE_OUTPUT.to_string() }
    }

    pub fn normal(text: impl Into<String>) -> Self {
        Self { kind: OutputKind::Normal, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: OutputKind::Error, text: text.into() }
    }
}

impl Default for OutputView {
    fn default() -> Self {
        Self::idle()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VariablesView {
    /// Nothing fetched yet.
    #[default]
    NotLoaded,
    Empty,
    Entries(Vec<DisplayEntry>),
}

impl VariablesView {
    pub fn from_entries(entries: Vec<DisplayEntry>) -> Self {
        if entries.is_empty() {
            VariablesView::Empty
        } else {
            VariablesView::Entries(entries)
        }
    }
}

/// Rendering boundary between orchestration and a concrete surface.
pub trait Renderer: Send + Sync {
    fn render_output(&self, view: OutputView);

    fn render_variables(&self, view: VariablesView);
}

impl<R: Renderer + ?Sized> Renderer for Arc<R> {
    fn render_output(&self, view: OutputView) {
        (**self).render_output(view)
    }

    fn render_variables(&self, view: VariablesView) {
        (**self).render_variables(view)
    }
}
