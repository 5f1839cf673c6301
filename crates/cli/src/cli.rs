use std::env;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use shellkit_core::{
    CommandResult, Console, CrosstermTerminal, Error, Settings, Shell, TerminalShell,
};
use tracing::{debug, info};

use crate::commands::builtins;
use crate::terminal::StdioTerminal;

/// Exit code for a `-c` line that left a command waiting for input
pub const UNFINISHED_EXIT_CODE: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "shellkit")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
pub struct Shellkit {
    /// Run a single command line and exit
    #[arg(short = 'c', long = "command", value_name = "LINE")]
    pub command: Option<String>,

    /// Settings file (defaults to the nearest .shellkit.json or shellkit.json)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Prompt to show instead of the configured one
    #[arg(long)]
    pub prompt: Option<String>,

    /// Never pause long output
    #[arg(long)]
    pub no_paging: bool,
}

impl Shellkit {
    /// Settings from file or discovery, with command-line overrides applied.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load_from_file(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => {
                let cwd = env::current_dir().context("Failed to get current directory")?;
                Settings::discover(&cwd)?
            }
        };

        if let Some(prompt) = &self.prompt {
            settings.prompt = prompt.clone();
        }
        if self.no_paging {
            settings.paging = false;
        }
        Ok(settings)
    }

    /// Run and return the process exit code.
    pub fn execute(self) -> Result<i32> {
        let settings = self.settings()?;

        if let Some(line) = &self.command {
            let shell = TerminalShell::new(StdioTerminal::new())
                .with_settings(&settings)
                .with_paging(false)
                .with_echo(false);
            return run_line(console(shell, settings)?, line);
        }

        let mut console = if io::stdin().is_terminal() {
            info!("Starting interactive session");
            let terminal = CrosstermTerminal::new().context("Failed to enable raw mode")?;
            let shell = TerminalShell::new(terminal).with_settings(&settings);
            console(shell, settings)?
        } else {
            debug!("Standard input is not a terminal, reading commands from it");
            let shell = TerminalShell::new(StdioTerminal::new())
                .with_settings(&settings)
                .with_paging(false)
                .with_echo(false);
            console(shell, settings)?
        };
        console.run()?;
        Ok(console.last_result().exit_code())
    }
}

fn console(shell: impl Shell + 'static, settings: Settings) -> Result<Console> {
    let commands = builtins(&settings)?;
    let mut builder = Console::builder(shell).settings(settings);
    for command in commands {
        builder = builder.command(command);
    }
    Ok(builder.build()?)
}

fn run_line(mut console: Console, line: &str) -> Result<i32> {
    match console.execute(line) {
        Ok(_) if console.has_attached() => {
            eprintln!("shellkit: '{line}' waits for more input; run it in a session instead");
            Ok(UNFINISHED_EXIT_CODE)
        }
        Ok(result) => Ok(result.exit_code()),
        Err(Error::CommandNotFound { token }) => {
            eprintln!("shellkit: {token}: command not found");
            Ok(CommandResult::not_found().exit_code())
        }
        Err(err) => Err(err.into()),
    }
}
