//! Run orchestration: sequences engine calls and keeps output, variables and indicators
//! consistent whatever the engine does.
//!
//! One run is `execute`, then (only after success) `fetch_variables`. A second trigger
//! while a run or reset is in flight is rejected with [`RunError::Busy`]; nothing is
//! queued and nothing is cancelled.

use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tokio::sync::watch;

use crate::{
    catalog::{capitalize_first, Catalog},
    config::VariableErrorPolicy,
    engine::{EngineError, ExecutionRequest, ExecutionResult, RemoteEngine},
    session::EditorSession,
    status::{IndicatorState, StatusIndicator, READY},
    variables::display_entries,
};

pub mod view;

pub use view::{OutputKind, OutputView, Renderer, VariablesView};

pub const EMPTY_PROGRAM: &str = "Please enter some CFPL code to execute.";
pub const CONNECTION_ERROR_PREFIX: &str = "Connection error: ";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunError {
    #[error("Please enter some CFPL code to execute.")]
    EmptyProgram,
    #[error("an execution is already in progress")]
    Busy,
}

/// How a triggered operation ended once it got past validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed { variables_refreshed: bool },
    /// The engine answered and reported a failure of its own.
    Failed,
    /// The call never produced an answer.
    ConnectionError,
}

pub struct Orchestrator<E, R> {
    engine: E,
    renderer: R,
    indicators: StatusIndicator,
    in_flight: AtomicBool,
    variable_errors: VariableErrorPolicy,
}

impl<E: RemoteEngine, R: Renderer> Orchestrator<E, R> {
    pub fn new(engine: E, renderer: R, variable_errors: VariableErrorPolicy) -> Self {
        Self {
            engine,
            renderer,
            indicators: StatusIndicator::new(),
            in_flight: AtomicBool::new(false),
            variable_errors,
        }
    }

    pub fn indicators(&self) -> watch::Receiver<IndicatorState> {
        self.indicators.subscribe()
    }

    pub fn indicator_state(&self) -> IndicatorState {
        self.indicators.snapshot()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Reads the buffer through the session and runs it.
    pub async fn run_session(
        &self,
        session: &EditorSession,
        input: &str,
    ) -> Result<RunOutcome, RunError> {
        self.run(&session.text(), input).await
    }

    pub async fn run(&self, program: &str, input: &str) -> Result<RunOutcome, RunError> {
        if program.trim().is_empty() {
            self.renderer.render_output(OutputView::error(EMPTY_PROGRAM));
            return Err(RunError::EmptyProgram);
        }

        let _slot = self.acquire()?;
        self.indicators.set_status("Executing...");
        tracing::info!(program_len = program.len(), input_len = input.len(), "executing program");

        let request = ExecutionRequest::new(program, input);
        let outcome = match self.engine.execute(request).await {
            Ok(ExecutionResult::Success { output }) => {
                let text = output.filter(|o| !o.is_empty()).unwrap_or_else(|| view::NO_OUTPUT.into());
                self.renderer.render_output(OutputView::normal(text));
                self.indicators.set_status("Execution completed successfully");
                let variables_refreshed = self.refresh_variables().await.is_ok();
                RunOutcome::Completed { variables_refreshed }
            }
            Ok(ExecutionResult::Failure { error }) => {
                tracing::info!(%error, "program failed");
                self.renderer.render_output(OutputView::error(error));
                self.indicators.set_status("Execution failed");
                RunOutcome::Failed
            }
            Err(err) => {
                self.connection_error(&err);
                RunOutcome::ConnectionError
            }
        };
        Ok(outcome)
    }

    /// Replaces the variable panel with a fresh snapshot.
    ///
    /// Failures are logged; with [`VariableErrorPolicy::Status`] they also overwrite the
    /// status line. Output is never touched.
    pub async fn refresh_variables(&self) -> Result<usize, EngineError> {
        match self.engine.fetch_variables().await {
            Ok(snapshot) => {
                let entries = display_entries(&snapshot);
                let count = entries.len();
                tracing::debug!(count, "variables refreshed");
                self.renderer.render_variables(VariablesView::from_entries(entries));
                Ok(count)
            }
            Err(err) => {
                tracing::error!(error = %err, "error refreshing variables");
                if self.variable_errors == VariableErrorPolicy::Status {
                    self.indicators.set_status(format!("Variable refresh failed: {err}"));
                }
                Err(err)
            }
        }
    }

    /// Drops the engine's variables and shows the (now empty) snapshot.
    pub async fn reset_interpreter(&self) -> Result<RunOutcome, RunError> {
        let _slot = self.acquire()?;
        self.indicators.set_status("Resetting interpreter...");

        let outcome = match self.engine.reset().await {
            Ok(()) => {
                self.indicators.set_status("Interpreter reset");
                let variables_refreshed = self.refresh_variables().await.is_ok();
                RunOutcome::Completed { variables_refreshed }
            }
            Err(EngineError::Reset(message)) => {
                self.renderer.render_output(OutputView::error(message));
                self.indicators.set_status("Reset failed");
                RunOutcome::Failed
            }
            Err(err) => {
                self.connection_error(&err);
                RunOutcome::ConnectionError
            }
        };
        Ok(outcome)
    }

    pub fn clear_output(&self) {
        self.renderer.render_output(OutputView::idle());
        self.indicators.set_status(READY);
    }

    pub fn clear_code(&self, session: &mut EditorSession) {
        session.set_text("");
        session.focus();
        self.indicators.set_status("Code cleared");
    }

    /// Copies the selected example into the buffer. The catalog entry is left as is.
    pub fn load_current_example(&self, catalog: &Catalog, session: &mut EditorSession) {
        let example = catalog.current();
        session.set_text(example.code);
        session.focus();
        session.scroll_to_top();
        self.indicators
            .set_status(format!("{} example loaded to editor", capitalize_first(example.id)));
    }

    fn connection_error(&self, err: &EngineError) {
        tracing::warn!(error = %err, "engine call failed");
        self.renderer
            .render_output(OutputView::error(format!("{CONNECTION_ERROR_PREFIX}{err}")));
        self.indicators.set_status("Connection error");
    }

    fn acquire(&self) -> Result<InFlight<'_>, RunError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("trigger ignored, execution already in progress");
            return Err(RunError::Busy);
        }
        self.indicators.set_busy(true);
        Ok(InFlight { slot: &self.in_flight, indicators: &self.indicators })
    }
}

/// Holds the in-flight slot; dropping it clears busy and frees the slot on every path.
struct InFlight<'a> {
    slot: &'a AtomicBool,
    indicators: &'a StatusIndicator,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.indicators.set_busy(false);
        self.slot.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests;
