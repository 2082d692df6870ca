//! Async event loop for the terminal playground.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use tokio::sync::mpsc;

use super::{
    app::{App, Focus},
    events::{ChannelRenderer, TuiEvent},
    ui::{editor_viewport_height, render_ui},
};
use crate::{
    catalog::Catalog,
    config::Config,
    engine::{HttpEngine, RemoteEngine},
    orchestrator::{Orchestrator, RunError},
};

type Playground<E> = Arc<Orchestrator<E, ChannelRenderer>>;

/// Run the interactive playground
pub async fn run_playground(cfg: &Config) -> Result<()> {
    // Check if we're in a proper terminal environment
    if !io::IsTerminal::is_terminal(&io::stdout()) {
        return Err(anyhow::anyhow!("the playground requires a proper terminal environment"));
    }

    let engine = HttpEngine::from_config(cfg)?;
    let (event_tx, event_rx) = mpsc::unbounded_channel::<TuiEvent>();
    let orchestrator = Arc::new(Orchestrator::new(
        engine,
        ChannelRenderer::new(event_tx.clone()),
        cfg.variable_error_policy(),
    ));

    let mut app = App::new(
        Catalog::with_selection(&cfg.default_example()),
        orchestrator.indicators(),
        cfg.engine_url(),
    );
    // Start with the selected example in the editor
    orchestrator.load_current_example(&app.catalog, &mut app.session);
    tracing::info!(engine = %cfg.engine_url(), "playground started");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    // Legacy key reporting folds Ctrl+Enter into a bare Enter
    let keyboard_enhanced = match supports_keyboard_enhancement() {
        Ok(true) => stdout
            .execute(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES,
            ))
            .is_ok(),
        _ => false,
    };
    if !keyboard_enhanced {
        tracing::info!("terminal lacks keyboard enhancement, Ctrl+Enter falls back to F5");
    }
    stdout.execute(EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main event loop
    let result = run_app(&mut terminal, &mut app, orchestrator, event_tx, event_rx).await;

    // Restore terminal
    if keyboard_enhanced {
        terminal.backend_mut().execute(PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    terminal.backend_mut().execute(DisableBracketedPaste)?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Main application loop
async fn run_app<E: RemoteEngine + 'static>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    orchestrator: Playground<E>,
    event_tx: mpsc::UnboundedSender<TuiEvent>,
    mut event_rx: mpsc::UnboundedReceiver<TuiEvent>,
) -> Result<()> {
    // Spawn input handler
    let input_tx = event_tx.clone();
    tokio::task::spawn_blocking(move || loop {
        // Poll for keyboard events
        if event::poll(Duration::from_millis(100)).unwrap_or(false) {
            let sent = match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                    input_tx.send(TuiEvent::Key(key))
                }
                Ok(Event::Paste(text)) => input_tx.send(TuiEvent::Paste(text)),
                _ => Ok(()),
            };
            if sent.is_err() {
                break; // Channel closed
            }
        } else if input_tx.is_closed() {
            break;
        }
    });

    loop {
        let size = terminal.size()?;
        app.session.scroll_to_cursor(editor_viewport_height(size.height));

        // Render UI
        terminal.draw(|frame| render_ui(frame, app))?;

        // Handle every pending event before the next frame
        while let Ok(tui_event) = event_rx.try_recv() {
            match tui_event {
                TuiEvent::Key(key) => {
                    if handle_key_event(app, key, &orchestrator) {
                        return Ok(()); // Quit requested
                    }
                }
                TuiEvent::Paste(text) => app.paste(&text),
                TuiEvent::Output(view) => app.output = view,
                TuiEvent::Variables(view) => app.variables = view,
            }
        }

        // Small delay to prevent busy waiting
        tokio::time::sleep(Duration::from_millis(16)).await; // ~60 FPS
    }
}

/// Handle keyboard events. Returns true when the user asked to quit.
fn handle_key_event<E: RemoteEngine + 'static>(
    app: &mut App,
    key: KeyEvent,
    orchestrator: &Playground<E>,
) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Overlays swallow everything except their own toggles
    if app.show_help || app.show_reference {
        match key.code {
            KeyCode::F(1) | KeyCode::Esc if app.show_help => app.toggle_help(),
            KeyCode::F(2) | KeyCode::Esc if app.show_reference => app.toggle_reference(),
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('c') if ctrl => return true,
        KeyCode::Enter if ctrl => trigger_run(app, orchestrator),
        KeyCode::F(5) => trigger_run(app, orchestrator),
        KeyCode::Char('k') if ctrl => orchestrator.clear_output(),
        KeyCode::Char('d') if ctrl => {
            orchestrator.clear_code(&mut app.session);
            app.sync_focus();
        }
        KeyCode::Char('r') if ctrl => trigger_refresh(orchestrator),
        KeyCode::Char('x') if ctrl => trigger_reset(orchestrator),
        KeyCode::Char('l') if ctrl => {
            orchestrator.load_current_example(&app.catalog, &mut app.session);
            app.sync_focus();
        }
        KeyCode::F(1) => app.toggle_help(),
        KeyCode::F(2) => app.toggle_reference(),
        KeyCode::F(3) => app.next_example(),
        KeyCode::F(4) => app.previous_example(),
        KeyCode::Esc | KeyCode::BackTab => app.toggle_focus(),
        _ if ctrl => {}
        _ => match app.focus {
            Focus::Editor => handle_editor_key(app, key),
            Focus::Input => match key.code {
                KeyCode::Enter => trigger_run(app, orchestrator),
                KeyCode::Tab => app.toggle_focus(),
                _ => handle_input_key(app, key),
            },
        },
    }
    false
}

fn handle_editor_key(app: &mut App, key: KeyEvent) {
    let session = &mut app.session;
    match key.code {
        KeyCode::Char(c) => session.insert_char(c),
        KeyCode::Enter => session.insert_newline(),
        KeyCode::Tab => session.insert_indent(),
        KeyCode::Backspace => session.backspace(),
        KeyCode::Delete => session.delete(),
        KeyCode::Left => session.move_left(),
        KeyCode::Right => session.move_right(),
        KeyCode::Up => session.move_up(),
        KeyCode::Down => session.move_down(),
        KeyCode::Home => session.move_home(),
        KeyCode::End => session.move_end(),
        KeyCode::PageUp => (0..10).for_each(|_| session.move_up()),
        KeyCode::PageDown => (0..10).for_each(|_| session.move_down()),
        _ => {}
    }
}

fn handle_input_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) => app.input_insert(c),
        KeyCode::Backspace => app.input_backspace(),
        KeyCode::Left => app.input_left(),
        KeyCode::Right => app.input_right(),
        KeyCode::Home => app.input_home(),
        KeyCode::End => app.input_end(),
        _ => {}
    }
}

fn trigger_run<E: RemoteEngine + 'static>(app: &App, orchestrator: &Playground<E>) {
    let program = app.session.text();
    let input = app.input.clone();
    let orchestrator = Arc::clone(orchestrator);
    tokio::spawn(async move {
        match orchestrator.run(&program, &input).await {
            Ok(outcome) => tracing::debug!(?outcome, "run finished"),
            Err(RunError::Busy) => tracing::debug!("run trigger ignored while busy"),
            Err(RunError::EmptyProgram) => {}
        }
    });
}

fn trigger_refresh<E: RemoteEngine + 'static>(orchestrator: &Playground<E>) {
    let orchestrator = Arc::clone(orchestrator);
    tokio::spawn(async move {
        // Failures are already logged by the orchestrator
        let _ = orchestrator.refresh_variables().await;
    });
}

fn trigger_reset<E: RemoteEngine + 'static>(orchestrator: &Playground<E>) {
    let orchestrator = Arc::clone(orchestrator);
    tokio::spawn(async move {
        if let Err(err) = orchestrator.reset_interpreter().await {
            tracing::debug!(error = %err, "reset trigger ignored");
        }
    });
}
