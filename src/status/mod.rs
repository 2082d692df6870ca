//! Status line and loading overlay state.

use tokio::sync::watch;

pub const READY: &str = "Ready";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorState {
    pub status: String,
    /// Gates the blocking "executing" overlay. Not reference-counted.
    pub busy: bool,
}

impl Default for IndicatorState {
    fn default() -> Self {
        Self { status: READY.to_string(), busy: false }
    }
}

/// Write half of the indicator state.
///
/// Not `Clone`: whoever owns this value is the only writer. Readers get a
/// [`watch::Receiver`] from [`StatusIndicator::subscribe`].
#[derive(Debug)]
pub struct StatusIndicator {
    tx: watch::Sender<IndicatorState>,
}

impl Default for StatusIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusIndicator {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(IndicatorState::default());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<IndicatorState> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> IndicatorState {
        self.tx.borrow().clone()
    }

    pub fn set_status(&self, text: impl Into<String>) {
        let text = text.into();
        tracing::debug!(status = %text, "status");
        self.tx.send_modify(|state| state.status = text);
    }

    pub fn set_busy(&self, busy: bool) {
        self.tx.send_modify(|state| state.busy = busy);
    }
}
