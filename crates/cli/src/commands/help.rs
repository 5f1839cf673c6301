use std::fmt::Write;

use anyhow::Result;
use shellkit_core::{
    Command, CommandArguments, CommandContainer, CommandInvocation, CommandMetadata, CommandResult,
    Error,
};

struct Help;

impl Help {
    fn overview(invocation: &CommandInvocation<'_>) -> String {
        let commands = invocation.registry().all_commands();
        let width = commands
            .iter()
            .map(|command| command.name().len())
            .max()
            .unwrap_or(0);

        let mut out = String::from("Commands:\n");
        for command in &commands {
            let _ = writeln!(
                out,
                "  {:<width$}  {}",
                command.name(),
                command.metadata().description()
            );
        }
        out.push_str("\nRun 'help <command>' for details.\n");
        out
    }
}

impl Command for Help {
    fn execute(
        &self,
        invocation: &mut CommandInvocation<'_>,
        args: &CommandArguments,
    ) -> Result<CommandResult> {
        let text = match args.get(0) {
            None => Self::overview(invocation),
            Some(name) => match invocation.help_info(name) {
                Ok(text) => text,
                Err(Error::CommandNotFound { token }) => {
                    invocation.println(&format!("help: no command named '{token}'"))?;
                    return Ok(CommandResult::failure());
                }
                Err(err) => return Err(err.into()),
            },
        };
        invocation.shell().write(&text, true)?;
        Ok(CommandResult::Success)
    }
}

pub fn command() -> Result<CommandContainer> {
    let metadata = CommandMetadata::builder("help")
        .alias("?")
        .description("List commands, or show help for one")
        .version(env!("CARGO_PKG_VERSION"))
        .build()?;
    Ok(CommandContainer::new(metadata, Help))
}
