use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "cfpl", about = "CFPL playground client", version)]
pub struct Cli {
    /// Base URL of the CFPL engine (overrides ENGINE_URL).
    #[arg(long, global = true)]
    pub engine: Option<String>,

    /// Seconds before an engine call is abandoned (overrides REQUEST_TIMEOUT).
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Where variable refresh failures show up: silent or status.
    #[arg(long = "variable-errors", global = true, value_parser = ["silent", "status"])]
    pub variable_errors: Option<String>,

    /// Disable coloured output for one-shot commands.
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Log at debug level (RUST_LOG still wins).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Open the interactive playground (default).
    Play {
        /// Example to select and load on start.
        #[arg(long)]
        example: Option<String>,
    },
    /// Run a program once and print its output and variables.
    Run {
        /// Program file, or "-" to read from stdin.
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Comma separated values consumed by INPUT statements.
        #[arg(short, long, default_value = "")]
        input: String,
    },
    /// Print the engine's current variables.
    Vars,
    /// Reset the engine's interpreter state.
    Reset,
    /// List the built-in examples, or print one.
    Examples {
        /// Example id to print.
        #[arg(long)]
        show: Option<String>,
    },
    /// Print the CFPL quick reference.
    Reference,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self.command, None | Some(Command::Play { .. }))
    }
}
