use anyhow::Result;
use shellkit_core::{CommandContainer, CommandMetadata, CommandResult, from_fn};

pub fn command() -> Result<CommandContainer> {
    let metadata = CommandMetadata::builder("clear")
        .alias("cls")
        .description("Clear the screen")
        .build()?;
    Ok(CommandContainer::new(
        metadata,
        from_fn(|invocation, _| {
            invocation.shell().clear()?;
            Ok(CommandResult::Success)
        }),
    ))
}
