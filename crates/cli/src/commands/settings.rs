use anyhow::{Context, Result};
use shellkit_core::{CommandContainer, CommandMetadata, CommandResult, Settings, from_fn};

pub fn command(settings: Settings) -> Result<CommandContainer> {
    let metadata = CommandMetadata::builder("settings")
        .alias("config")
        .description("Show the settings this session started with")
        .build()?;
    Ok(CommandContainer::new(
        metadata,
        from_fn(move |invocation, _| {
            if let Some(path) = &settings.source {
                invocation.println(&format!("# {}", path.display()))?;
            }
            let json =
                serde_json::to_string_pretty(&settings).context("Failed to serialize settings")?;
            invocation.println(&json)?;
            Ok(CommandResult::Success)
        }),
    ))
}
