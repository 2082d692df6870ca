mod catalog;
mod cli;
mod config;
mod engine;
mod orchestrator;
mod printer;
mod session;
mod status;
mod tui;
mod variables;

use std::fs;
use std::io::{self, Read};

use anyhow::{bail, Context, Result};
use is_terminal::IsTerminal;
use tracing_subscriber::EnvFilter;

use catalog::{Catalog, LANGUAGE_REFERENCE};
use cli::{Cli, Command};
use config::Config;
use engine::HttpEngine;
use orchestrator::{Orchestrator, RunError, RunOutcome};
use printer::{ConsoleRenderer, MarkdownPrinter};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // Load config; CLI flags win over rc file and environment
    let mut cfg = Config::load();
    if let Some(url) = &args.engine {
        cfg.set("ENGINE_URL", url.as_str());
    }
    if let Some(secs) = args.timeout {
        cfg.set("REQUEST_TIMEOUT", secs.to_string());
    }
    if let Some(policy) = &args.variable_errors {
        cfg.set("VARIABLE_ERRORS", policy.as_str());
    }
    if args.verbose {
        cfg.set("LOG_LEVEL", "debug");
    }

    init_logging(&cfg, args.is_interactive())?;
    tracing::debug!(
        config = %cfg.config_path.display(),
        exists = cfg.config_path.exists(),
        "configuration loaded"
    );

    let color = !args.no_color && io::stdout().is_terminal();

    match args.command.unwrap_or(Command::Play { example: None }) {
        Command::Play { example } => {
            if let Some(id) = example {
                if Catalog::default().get(&id).is_none() {
                    bail!("unknown example: {id}");
                }
                cfg.set("DEFAULT_EXAMPLE", id);
            }
            tui::run_playground(&cfg).await
        }
        Command::Run { file, input } => {
            let program = if file.as_os_str() == "-" {
                let mut buf = String::new();
                io::stdin().read_to_string(&mut buf)?;
                buf
            } else {
                fs::read_to_string(&file)
                    .with_context(|| format!("failed to read {}", file.display()))?
            };
            run_once(&cfg, &program, &input, color).await
        }
        Command::Vars => {
            let orchestrator = console_orchestrator(&cfg, color)?;
            orchestrator
                .refresh_variables()
                .await
                .with_context(|| format!("could not fetch variables from {}", cfg.engine_url()))?;
            Ok(())
        }
        Command::Reset => {
            let orchestrator = console_orchestrator(&cfg, color)?;
            match orchestrator.reset_interpreter().await {
                Ok(RunOutcome::Completed { .. }) => {
                    println!("{}", orchestrator.indicator_state().status);
                    Ok(())
                }
                Ok(_) => bail!("{}", orchestrator.indicator_state().status),
                Err(err) => Err(err.into()),
            }
        }
        Command::Examples { show } => {
            let catalog = Catalog::default();
            match show {
                Some(id) => {
                    let example = catalog
                        .get(&id)
                        .ok_or_else(|| catalog::CatalogError::UnknownExample(id.clone()))?;
                    println!("** {}\n{}", example.title, example.code);
                }
                None => {
                    for example in catalog.examples() {
                        println!("{:<12} {}", example.id, example.title);
                    }
                }
            }
            Ok(())
        }
        Command::Reference => {
            if color {
                MarkdownPrinter::default().print(LANGUAGE_REFERENCE);
            } else {
                println!("{LANGUAGE_REFERENCE}");
            }
            Ok(())
        }
    }
}

fn console_orchestrator(cfg: &Config, color: bool) -> Result<Orchestrator<HttpEngine, ConsoleRenderer>> {
    let engine = HttpEngine::from_config(cfg)?;
    Ok(Orchestrator::new(engine, ConsoleRenderer::new(color), cfg.variable_error_policy()))
}

async fn run_once(cfg: &Config, program: &str, input: &str, color: bool) -> Result<()> {
    let orchestrator = console_orchestrator(cfg, color)?;
    match orchestrator.run(program, input).await {
        Ok(RunOutcome::Completed { .. }) => Ok(()),
        Ok(RunOutcome::Failed) => bail!("program failed"),
        Ok(RunOutcome::ConnectionError) => {
            bail!("could not reach the engine at {}", cfg.engine_url())
        }
        // Already printed by the renderer
        Err(RunError::EmptyProgram) => bail!("nothing to run"),
        Err(err) => Err(err.into()),
    }
}

/// One-shot commands log to stderr; the playground logs to a file so the
/// alternate screen stays clean.
fn init_logging(cfg: &Config, interactive: bool) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.log_level()));

    if interactive {
        let path = cfg.log_file();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create log directory {}", parent.display()))?;
        }
        let log_file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(log_file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}
