use anyhow::Result;
use shellkit_core::{
    Attachment, CommandContainer, CommandInvocation, CommandMetadata, CommandResult,
    ConsoleCommand, Prompt, from_fn,
};

const FINISH: &str = ".";

/// Upper-cases every line it is given until a line holding only `.`.
struct UpperMode;

impl ConsoleCommand for UpperMode {
    fn process_line(
        &mut self,
        line: &str,
        invocation: &mut CommandInvocation<'_>,
    ) -> Result<Attachment> {
        if line.trim() == FINISH {
            return Ok(Attachment::Detach);
        }
        invocation.println(&line.to_uppercase())?;
        Ok(Attachment::Keep)
    }

    fn prompt(&self) -> Option<Prompt> {
        Some(Prompt::new("upper> "))
    }
}

pub fn command() -> Result<CommandContainer> {
    let metadata = CommandMetadata::builder("upper")
        .description("Upper-case arguments, piped input, or each following line until '.'")
        .generate_help(true)
        .build()?;
    Ok(CommandContainer::new(
        metadata,
        from_fn(|invocation, args| {
            if let Some(input) = invocation.take_input() {
                invocation.print(&input.to_uppercase())?;
            } else if !args.is_empty() {
                invocation.println(&args.joined().to_uppercase())?;
            } else {
                invocation.println(&format!("Enter text, '{FINISH}' on its own line to finish"))?;
                invocation.attach(Box::new(UpperMode));
            }
            Ok(CommandResult::Success)
        }),
    ))
}
