//! Command model
//!
//! A command is an implementation of [`Command`] paired with its
//! [`CommandMetadata`] inside a [`CommandContainer`]. Metadata is built
//! explicitly at registration time and carries the command's identity and
//! its activator, validator and result handler strategies.

pub mod container;
pub mod metadata;
pub mod strategy;

use std::fmt;

use crate::invocation::CommandInvocation;

pub use container::CommandContainer;
pub use metadata::{CommandMetadata, CommandMetadataBuilder};
pub use strategy::{
    ActivationContext, Activator, NoopActivator, NoopResultHandler, NoopValidator,
    ResultHandler, Validator,
};

/// Outcome of a command that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandResult {
    #[default]
    Success,
    Failure(i32),
}

impl CommandResult {
    pub fn failure() -> Self {
        CommandResult::Failure(1)
    }

    /// Result recorded for a line whose command does not exist.
    pub fn not_found() -> Self {
        CommandResult::Failure(127)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CommandResult::Success)
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            CommandResult::Success => 0,
            CommandResult::Failure(code) => *code,
        }
    }
}

impl From<bool> for CommandResult {
    fn from(success: bool) -> Self {
        if success {
            CommandResult::Success
        } else {
            CommandResult::failure()
        }
    }
}

/// Arguments handed to a command body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandArguments {
    /// Words after the command name (and after the group member name, for groups).
    Parsed(Vec<String>),
    /// Raw remainder of the line, for commands that disable parsing.
    Raw(String),
}

impl CommandArguments {
    /// Argument at `index`. A raw blob is a single argument when non-empty.
    pub fn get(&self, index: usize) -> Option<&str> {
        match self {
            CommandArguments::Parsed(words) => words.get(index).map(String::as_str),
            CommandArguments::Raw(raw) if index == 0 && !raw.is_empty() => Some(raw.as_str()),
            CommandArguments::Raw(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            CommandArguments::Parsed(words) => words.len(),
            CommandArguments::Raw(raw) => usize::from(!raw.is_empty()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    pub fn as_raw(&self) -> Option<&str> {
        match self {
            CommandArguments::Raw(raw) => Some(raw.as_str()),
            CommandArguments::Parsed(_) => None,
        }
    }

    /// Arguments joined by single spaces.
    pub fn joined(&self) -> String {
        self.iter().collect::<Vec<_>>().join(" ")
    }
}

impl Default for CommandArguments {
    fn default() -> Self {
        CommandArguments::Parsed(Vec::new())
    }
}

/// An executable command.
///
/// Bodies return `anyhow::Result` so they can use `?` on anything; shell
/// errors such as [`Error::InterruptedRead`](crate::Error::InterruptedRead)
/// keep their identity when they come back out.
pub trait Command: Send + Sync {
    fn execute(
        &self,
        invocation: &mut CommandInvocation<'_>,
        args: &CommandArguments,
    ) -> anyhow::Result<CommandResult>;
}

/// Command backed by a closure, see [`from_fn`].
pub struct FnCommand<F> {
    body: F,
}

impl<F> fmt::Debug for FnCommand<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCommand").finish_non_exhaustive()
    }
}

/// Wrap a closure as a [`Command`].
pub fn from_fn<F>(body: F) -> FnCommand<F>
where
    F: Fn(&mut CommandInvocation<'_>, &CommandArguments) -> anyhow::Result<CommandResult>
        + Send
        + Sync,
{
    FnCommand { body }
}

impl<F> Command for FnCommand<F>
where
    F: Fn(&mut CommandInvocation<'_>, &CommandArguments) -> anyhow::Result<CommandResult>
        + Send
        + Sync,
{
    fn execute(
        &self,
        invocation: &mut CommandInvocation<'_>,
        args: &CommandArguments,
    ) -> anyhow::Result<CommandResult> {
        (self.body)(invocation, args)
    }
}
