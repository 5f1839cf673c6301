use anyhow::Result;
use shellkit_core::{CommandContainer, CommandMetadata, CommandResult, from_fn};

pub fn command() -> Result<CommandContainer> {
    let metadata = CommandMetadata::builder("size")
        .description("Show the terminal size as WIDTHxHEIGHT")
        .build()?;
    Ok(CommandContainer::new(
        metadata,
        from_fn(|invocation, _| {
            let size = invocation.shell().size()?;
            invocation.println(&size.to_string())?;
            Ok(CommandResult::Success)
        }),
    ))
}
