use anyhow::Result;
use shellkit_core::{
    Command, CommandArguments, CommandContainer, CommandInvocation, CommandMetadata, CommandResult,
};

struct Echo;

impl Command for Echo {
    fn execute(
        &self,
        invocation: &mut CommandInvocation<'_>,
        args: &CommandArguments,
    ) -> Result<CommandResult> {
        // Bare `echo` on the right of a pipe passes its input through
        if args.is_empty() {
            if let Some(input) = invocation.take_input() {
                invocation.print(&input)?;
                return Ok(CommandResult::Success);
            }
        }
        invocation.println(&args.joined())?;
        Ok(CommandResult::Success)
    }
}

pub fn command() -> Result<CommandContainer> {
    let metadata = CommandMetadata::builder("echo")
        .description("Print the arguments")
        .generate_help(true)
        .build()?;
    Ok(CommandContainer::new(metadata, Echo))
}
