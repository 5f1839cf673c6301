use std::sync::Arc;

use anyhow::Result;
use shellkit_core::{
    Command, CommandArguments, CommandContainer, CommandMetadata, CommandResult, ValidationError,
    Validator, from_fn,
};

/// Rejects an empty prompt.
struct NonEmpty;

impl Validator for NonEmpty {
    fn validate(
        &self,
        _command: &dyn Command,
        args: &CommandArguments,
    ) -> std::result::Result<(), ValidationError> {
        if args.joined().trim().is_empty() {
            return Err(ValidationError::new("usage: prompt <text>"));
        }
        Ok(())
    }
}

pub fn command() -> Result<CommandContainer> {
    let metadata = CommandMetadata::builder("prompt")
        .description("Change the prompt; the rest of the line is taken literally")
        .disable_parsing(true)
        .validator(Arc::new(NonEmpty))
        .build()?;
    Ok(CommandContainer::new(
        metadata,
        from_fn(|invocation, args| {
            let text = format!("{} ", args.joined().trim_end());
            invocation.set_prompt(text);
            Ok(CommandResult::Success)
        }),
    ))
}
