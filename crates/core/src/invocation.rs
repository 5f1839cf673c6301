//! Per-execution context handed to running commands
//!
//! A [`CommandInvocation`] borrows the console's shell and session state for
//! exactly one call. Commands reach everything they may touch through it:
//! terminal I/O, the prompt, the registry, child command attachment, help for
//! other commands and the stop signal. The console itself stays out of reach.

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::help;
use crate::parser::ControlOperator;
use crate::registry::CommandRegistry;
use crate::resolver::CommandResolver;
use crate::shell::{Prompt, Shell};

/// What an attached command wants after handling a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    /// Keep receiving input lines
    Keep,
    /// Hand input back to the console
    Detach,
}

/// Interactive sub-command that receives raw input lines once attached.
///
/// While attached it sees every line the user enters instead of the
/// resolver. Attaching from inside an attached command stacks the new one on
/// top; lines go to the most recent attachment.
pub trait ConsoleCommand: Send {
    fn process_line(
        &mut self,
        line: &str,
        invocation: &mut CommandInvocation<'_>,
    ) -> anyhow::Result<Attachment>;

    /// Prompt shown while attached. `None` keeps the session prompt.
    fn prompt(&self) -> Option<Prompt> {
        None
    }
}

/// Mutable state a console keeps across invocations.
pub(crate) struct SessionState {
    pub(crate) prompt: Prompt,
    pub(crate) stop_requested: bool,
    pub(crate) attached: Vec<Box<dyn ConsoleCommand>>,
}

impl SessionState {
    pub(crate) fn new(prompt: Prompt) -> Self {
        Self {
            prompt,
            stop_requested: false,
            attached: Vec::new(),
        }
    }

    /// Prompt of the top attached command, else the session prompt.
    pub(crate) fn active_prompt(&self) -> Prompt {
        self.attached
            .last()
            .and_then(|command| command.prompt())
            .unwrap_or_else(|| self.prompt.clone())
    }
}

/// Capability surface a running command sees.
pub struct CommandInvocation<'a> {
    shell: &'a mut dyn Shell,
    session: &'a mut SessionState,
    resolver: &'a CommandResolver,
    operator: ControlOperator,
    input: Option<String>,
}

impl<'a> CommandInvocation<'a> {
    pub(crate) fn new(
        shell: &'a mut dyn Shell,
        session: &'a mut SessionState,
        resolver: &'a CommandResolver,
        operator: ControlOperator,
        input: Option<String>,
    ) -> Self {
        Self {
            shell,
            session,
            resolver,
            operator,
            input,
        }
    }

    pub fn shell(&mut self) -> &mut dyn Shell {
        self.shell
    }

    /// Write without paging.
    pub fn print(&mut self, text: &str) -> Result<()> {
        self.shell.write(text, false)
    }

    /// Write a line without paging.
    pub fn println(&mut self, text: &str) -> Result<()> {
        self.shell.writeln(text, false)
    }

    pub fn prompt(&self) -> &Prompt {
        &self.session.prompt
    }

    /// Replace the session prompt; takes effect from the next read.
    pub fn set_prompt(&mut self, prompt: impl Into<Prompt>) {
        self.session.prompt = prompt.into();
    }

    pub fn registry(&self) -> &Arc<dyn CommandRegistry> {
        self.resolver.registry()
    }

    /// Hand subsequent input lines to `command` until it detaches.
    pub fn attach(&mut self, command: Box<dyn ConsoleCommand>) {
        debug!(
            "Attaching console command (depth {})",
            self.session.attached.len() + 1
        );
        self.session.attached.push(command);
    }

    /// Help text for another command, looked up by name or alias.
    pub fn help_info(&self, name: &str) -> Result<String> {
        let container = self.resolver.resolve_word(name, name)?;
        Ok(help::render(&container))
    }

    /// Ask the console to end the session once this command returns.
    pub fn stop(&mut self) {
        debug!("Stop requested");
        self.session.stop_requested = true;
    }

    pub fn is_stop_requested(&self) -> bool {
        self.session.stop_requested
    }

    /// Operator that followed this command on the input line.
    pub fn control_operator(&self) -> ControlOperator {
        self.operator
    }

    /// Output piped from the previous command, if this one is on the right of `|`.
    pub fn input(&self) -> Option<&str> {
        self.input.as_deref()
    }

    pub fn take_input(&mut self) -> Option<String> {
        self.input.take()
    }
}
