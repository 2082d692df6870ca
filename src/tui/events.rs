//! Custom event types for the playground loop.

use crossterm::event::KeyEvent;
use tokio::sync::mpsc;

use crate::orchestrator::{OutputView, Renderer, VariablesView};

/// Events that can occur in the TUI application
#[derive(Debug)]
pub enum TuiEvent {
    /// User keyboard input
    Key(KeyEvent),
    /// Bracketed paste content
    Paste(String),
    /// New content for the output region
    Output(OutputView),
    /// New content for the variable panel
    Variables(VariablesView),
}

/// Forwards orchestrator renders into the event loop, which owns the app state.
#[derive(Debug, Clone)]
pub struct ChannelRenderer {
    tx: mpsc::UnboundedSender<TuiEvent>,
}

impl ChannelRenderer {
    pub fn new(tx: mpsc::UnboundedSender<TuiEvent>) -> Self {
        Self { tx }
    }
}

impl Renderer for ChannelRenderer {
    fn render_output(&self, view: OutputView) {
        if self.tx.send(TuiEvent::Output(view)).is_err() {
            tracing::debug!("event loop gone, output dropped");
        }
    }

    fn render_variables(&self, view: VariablesView) {
        if self.tx.send(TuiEvent::Variables(view)).is_err() {
            tracing::debug!("event loop gone, variables dropped");
        }
    }
}
