use std::fs;

use anyhow::{Context, Result};
use shellkit_core::{
    Command, CommandArguments, CommandContainer, CommandInvocation, CommandMetadata, CommandResult,
};
use tracing::debug;

struct Cat;

impl Command for Cat {
    fn execute(
        &self,
        invocation: &mut CommandInvocation<'_>,
        args: &CommandArguments,
    ) -> Result<CommandResult> {
        let mut out = invocation.take_input().unwrap_or_default();
        for path in args.iter() {
            debug!("Reading {}", path);
            let contents =
                fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
            out.push_str(&contents);
        }
        invocation.shell().write(&out, true)?;
        Ok(CommandResult::Success)
    }
}

pub fn command() -> Result<CommandContainer> {
    let metadata = CommandMetadata::builder("cat")
        .description("Print files, or piped input, one page at a time")
        .generate_help(true)
        .build()?;
    Ok(CommandContainer::new(metadata, Cat))
}
