use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Notify;

use super::*;
use crate::engine::VariableSnapshot;
use crate::variables::TypeLabel;

#[derive(Debug, Clone)]
enum Script {
    Success(Option<&'static str>),
    Failure(&'static str),
    Down,
}

fn engine_down() -> EngineError {
    EngineError::Status { status: 503, body: "engine down".into() }
}

struct FakeEngine {
    script: Script,
    variables: Option<serde_json::Value>,
    reset_ok: bool,
    execute_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    /// When set, `execute` signals `entered` and waits for `release`.
    gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl FakeEngine {
    fn new(script: Script) -> Self {
        Self {
            script,
            variables: Some(json!({"abc": 10, "w_23": "a", "t": true})),
            reset_ok: true,
            execute_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    fn without_variables(mut self) -> Self {
        self.variables = None;
        self
    }

    fn gated(mut self, entered: Arc<Notify>, release: Arc<Notify>) -> Self {
        self.gate = Some((entered, release));
        self
    }
}

#[async_trait]
impl RemoteEngine for FakeEngine {
    async fn execute(&self, _request: ExecutionRequest) -> Result<ExecutionResult, EngineError> {
        self.execute_calls.fetch_add(1, Ordering::SeqCst);
        if let Some((entered, release)) = &self.gate {
            entered.notify_one();
            release.notified().await;
        }
        match &self.script {
            Script::Success(output) => {
                Ok(ExecutionResult::Success { output: output.map(str::to_string) })
            }
            Script::Failure(error) => Ok(ExecutionResult::Failure { error: error.to_string() }),
            Script::Down => Err(engine_down()),
        }
    }

    async fn fetch_variables(&self) -> Result<VariableSnapshot, EngineError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        match &self.variables {
            Some(value) => Ok(serde_json::from_value(value.clone())?),
            None => Err(engine_down()),
        }
    }

    async fn reset(&self) -> Result<(), EngineError> {
        if self.reset_ok {
            Ok(())
        } else {
            Err(EngineError::Reset("interpreter locked".into()))
        }
    }
}

#[derive(Default)]
struct Recorder {
    outputs: Mutex<Vec<OutputView>>,
    variables: Mutex<Vec<VariablesView>>,
}

impl Recorder {
    fn last_output(&self) -> Option<OutputView> {
        self.outputs.lock().unwrap().last().cloned()
    }

    fn last_variables(&self) -> Option<VariablesView> {
        self.variables.lock().unwrap().last().cloned()
    }
}

impl Renderer for Recorder {
    fn render_output(&self, view: OutputView) {
        self.outputs.lock().unwrap().push(view);
    }

    fn render_variables(&self, view: VariablesView) {
        self.variables.lock().unwrap().push(view);
    }
}

type TestOrchestrator = Orchestrator<Arc<FakeEngine>, Arc<Recorder>>;

fn harness(
    engine: FakeEngine,
    policy: VariableErrorPolicy,
) -> (TestOrchestrator, Arc<FakeEngine>, Arc<Recorder>) {
    let engine = Arc::new(engine);
    let recorder = Arc::new(Recorder::default());
    let orch = Orchestrator::new(engine.clone(), recorder.clone(), policy);
    (orch, engine, recorder)
}

#[tokio::test]
async fn blank_program_never_reaches_engine() {
    let (orch, engine, recorder) =
        harness(FakeEngine::new(Script::Success(Some("x"))), VariableErrorPolicy::Silent);

    let err = orch.run("  \n\t  ", "").await.unwrap_err();

    assert_eq!(err, RunError::EmptyProgram);
    assert_eq!(engine.execute_calls.load(Ordering::SeqCst), 0);
    assert_eq!(recorder.last_output(), Some(OutputView::error(EMPTY_PROGRAM)));
    assert_eq!(orch.indicator_state(), IndicatorState::default());
}

#[tokio::test]
async fn success_shows_output_and_fetches_variables_once() {
    let (orch, engine, recorder) =
        harness(FakeEngine::new(Script::Success(Some("42"))), VariableErrorPolicy::Silent);

    let outcome = orch.run("START\nSTOP", "").await.unwrap();

    assert_eq!(outcome, RunOutcome::Completed { variables_refreshed: true });
    assert_eq!(recorder.last_output(), Some(OutputView::normal("42")));
    assert_eq!(engine.fetch_calls.load(Ordering::SeqCst), 1);

    let Some(VariablesView::Entries(entries)) = recorder.last_variables() else {
        panic!("expected variable rows");
    };
    let labels: Vec<TypeLabel> = entries.iter().map(|e| e.type_label).collect();
    assert_eq!(labels, [TypeLabel::Int, TypeLabel::Char, TypeLabel::Bool]);

    let state = orch.indicator_state();
    assert_eq!(state.status, "Execution completed successfully");
    assert!(!state.busy);
}

#[tokio::test]
async fn missing_or_empty_output_uses_placeholder() {
    for script in [Script::Success(None), Script::Success(Some(""))] {
        let (orch, _, recorder) = harness(FakeEngine::new(script), VariableErrorPolicy::Silent);
        orch.run("START\nSTOP", "").await.unwrap();
        assert_eq!(recorder.last_output(), Some(OutputView::normal("(No output)")));
    }
}

#[tokio::test]
async fn interpreter_failure_skips_variable_fetch() {
    let (orch, engine, recorder) =
        harness(FakeEngine::new(Script::Failure("Type mismatch")), VariableErrorPolicy::Silent);

    let outcome = orch.run("START\nSTOP", "").await.unwrap();

    assert_eq!(outcome, RunOutcome::Failed);
    assert_eq!(recorder.last_output(), Some(OutputView::error("Type mismatch")));
    assert_eq!(engine.fetch_calls.load(Ordering::SeqCst), 0);
    assert_eq!(recorder.last_variables(), None);
    let state = orch.indicator_state();
    assert_eq!(state.status, "Execution failed");
    assert!(!state.busy);
}

#[tokio::test]
async fn transport_failure_is_prefixed() {
    let (orch, engine, recorder) =
        harness(FakeEngine::new(Script::Down), VariableErrorPolicy::Silent);

    let outcome = orch.run("START\nSTOP", "").await.unwrap();

    assert_eq!(outcome, RunOutcome::ConnectionError);
    let output = recorder.last_output().unwrap();
    assert_eq!(output.kind, OutputKind::Error);
    assert!(output.text.starts_with("Connection error: "));
    assert!(output.text.contains("engine down"));
    assert_eq!(engine.fetch_calls.load(Ordering::SeqCst), 0);
    let state = orch.indicator_state();
    assert_eq!(state.status, "Connection error");
    assert!(!state.busy);
}

#[tokio::test]
async fn refresh_failure_does_not_change_run_result() {
    let engine = FakeEngine::new(Script::Success(Some("ok"))).without_variables();
    let (orch, _, recorder) = harness(engine, VariableErrorPolicy::Silent);

    let outcome = orch.run("START\nSTOP", "").await.unwrap();

    assert_eq!(outcome, RunOutcome::Completed { variables_refreshed: false });
    assert_eq!(recorder.last_output(), Some(OutputView::normal("ok")));
    assert_eq!(recorder.last_variables(), None);
    assert_eq!(orch.indicator_state().status, "Execution completed successfully");
}

#[tokio::test]
async fn refresh_failure_can_surface_in_status() {
    let engine = FakeEngine::new(Script::Success(Some("ok"))).without_variables();
    let (orch, _, recorder) = harness(engine, VariableErrorPolicy::Status);

    assert!(orch.refresh_variables().await.is_err());

    assert!(orch.indicator_state().status.starts_with("Variable refresh failed"));
    assert_eq!(recorder.last_output(), None);
}

#[tokio::test]
async fn empty_snapshot_renders_placeholder_view() {
    let mut engine = FakeEngine::new(Script::Success(Some("ok")));
    engine.variables = Some(json!({}));
    let (orch, _, recorder) = harness(engine, VariableErrorPolicy::Silent);

    assert_eq!(orch.refresh_variables().await.unwrap(), 0);
    assert_eq!(recorder.last_variables(), Some(VariablesView::Empty));
}

#[tokio::test]
async fn second_trigger_while_running_is_rejected() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let engine = FakeEngine::new(Script::Success(Some("first")))
        .gated(entered.clone(), release.clone());
    let (orch, engine, recorder) = harness(engine, VariableErrorPolicy::Silent);
    let orch = Arc::new(orch);

    let first = {
        let orch = orch.clone();
        tokio::spawn(async move { orch.run("START\nSTOP", "").await })
    };
    entered.notified().await;

    let state = orch.indicator_state();
    assert!(state.busy);
    assert_eq!(state.status, "Executing...");
    assert!(orch.is_busy());

    assert_eq!(orch.run("START\nSTOP", "").await, Err(RunError::Busy));
    assert_eq!(orch.reset_interpreter().await, Err(RunError::Busy));
    assert_eq!(engine.execute_calls.load(Ordering::SeqCst), 1);
    assert_eq!(recorder.last_output(), None);

    release.notify_one();
    let outcome = first.await.unwrap().unwrap();
    assert_eq!(outcome, RunOutcome::Completed { variables_refreshed: true });
    assert!(!orch.is_busy());
    assert!(!orch.indicator_state().busy);

    // The slot is free again once the first run finished.
    release.notify_one();
    assert!(orch.run("START\nSTOP", "").await.is_ok());
}

#[tokio::test]
async fn clear_output_is_idempotent() {
    let (orch, _, recorder) =
        harness(FakeEngine::new(Script::Failure("boom")), VariableErrorPolicy::Silent);
    orch.run("START\nSTOP", "").await.unwrap();

    orch.clear_output();
    let once = (recorder.last_output(), orch.indicator_state());
    orch.clear_output();
    let twice = (recorder.last_output(), orch.indicator_state());

    assert_eq!(once, twice);
    assert_eq!(once.0, Some(OutputView::idle()));
    assert_eq!(once.1.status, "Ready");
}

#[tokio::test]
async fn loading_example_only_touches_the_buffer() {
    let (orch, _, _) = harness(FakeEngine::new(Script::Success(None)), VariableErrorPolicy::Silent);
    let mut catalog = Catalog::default();
    catalog.switch_example("loops").unwrap();
    let before = catalog.current().clone();

    let mut session = EditorSession::new("old program");
    let line_count = session.subscribe_line_count();
    orch.load_current_example(&catalog, &mut session);

    assert_eq!(catalog.current(), &before);
    assert_eq!(session.text(), before.code);
    assert_eq!(*line_count.borrow(), before.code.split('\n').count());
    assert!(session.is_focused());
    assert_eq!(session.scroll_top(), 0);
    assert_eq!(orch.indicator_state().status, "Loops example loaded to editor");
}

#[tokio::test]
async fn clear_code_empties_buffer() {
    let (orch, engine, recorder) =
        harness(FakeEngine::new(Script::Success(None)), VariableErrorPolicy::Silent);
    let mut session = EditorSession::new("VAR a AS INT\nSTART\nSTOP");

    orch.clear_code(&mut session);
    assert_eq!(session.text(), "");
    assert_eq!(session.line_count(), 1);
    assert_eq!(orch.indicator_state().status, "Code cleared");

    assert_eq!(orch.run_session(&session, "").await, Err(RunError::EmptyProgram));
    assert_eq!(engine.execute_calls.load(Ordering::SeqCst), 0);
    assert_eq!(recorder.last_output(), Some(OutputView::error(EMPTY_PROGRAM)));
}

#[tokio::test]
async fn reset_refreshes_variables() {
    let mut engine = FakeEngine::new(Script::Success(None));
    engine.variables = Some(json!({}));
    let (orch, engine, recorder) = harness(engine, VariableErrorPolicy::Silent);

    let outcome = orch.reset_interpreter().await.unwrap();

    assert_eq!(outcome, RunOutcome::Completed { variables_refreshed: true });
    assert_eq!(engine.fetch_calls.load(Ordering::SeqCst), 1);
    assert_eq!(recorder.last_variables(), Some(VariablesView::Empty));
    assert_eq!(orch.indicator_state().status, "Interpreter reset");
}

#[tokio::test]
async fn rejected_reset_reports_failure() {
    let mut engine = FakeEngine::new(Script::Success(None));
    engine.reset_ok = false;
    let (orch, _, recorder) = harness(engine, VariableErrorPolicy::Silent);

    assert_eq!(orch.reset_interpreter().await, Ok(RunOutcome::Failed));
    assert_eq!(recorder.last_output(), Some(OutputView::error("interpreter locked")));
    assert_eq!(orch.indicator_state().status, "Reset failed");
    assert!(!orch.indicator_state().busy);
}
