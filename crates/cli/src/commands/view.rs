use std::fs;

use anyhow::{Context, Result};
use shellkit_core::{
    Command, CommandArguments, CommandContainer, CommandInvocation, CommandMetadata, CommandResult,
    Prompt,
};
use tracing::debug;

/// Shows a file on the alternate screen and returns on any key.
struct View;

impl Command for View {
    fn execute(
        &self,
        invocation: &mut CommandInvocation<'_>,
        args: &CommandArguments,
    ) -> Result<CommandResult> {
        let Some(path) = args.get(0) else {
            invocation.println("usage: view <file>")?;
            return Ok(CommandResult::failure());
        };
        let contents =
            fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;

        let shell = invocation.shell();
        let switched = shell.enable_alternate_buffer()?;
        if switched {
            shell.clear()?;
        } else {
            debug!("No alternate screen, viewing inline");
        }

        let shown = shell.write(&contents, true);
        let waited = match shown {
            Ok(()) if switched => shell
                .read_key(Some(&Prompt::new("\n-- press any key --")))
                .map(drop),
            other => other,
        };

        // Always restore the main screen, even when interrupted
        if switched {
            shell.enable_main_buffer()?;
        }
        waited?;
        Ok(CommandResult::Success)
    }
}

pub fn command() -> Result<CommandContainer> {
    let metadata = CommandMetadata::builder("view")
        .alias("less")
        .description("Page through a file on the alternate screen")
        .generate_help(true)
        .build()?;
    Ok(CommandContainer::new(metadata, View))
}
