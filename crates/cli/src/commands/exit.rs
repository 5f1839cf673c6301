use anyhow::Result;
use shellkit_core::{CommandContainer, CommandMetadata, CommandResult, from_fn};

pub fn command() -> Result<CommandContainer> {
    let metadata = CommandMetadata::builder("exit")
        .alias("quit")
        .description("End the session")
        .generate_help(true)
        .build()?;
    Ok(CommandContainer::new(
        metadata,
        from_fn(|invocation, _| {
            invocation.stop();
            Ok(CommandResult::Success)
        }),
    ))
}
