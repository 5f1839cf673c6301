//! shellkit - Building blocks for interactive command shells
//!
//! This crate provides:
//! - Command metadata, containers and a thread-safe registry
//! - Resolution of input lines to commands by name, then alias
//! - A per-execution invocation context for running commands
//! - The [`Shell`] contract with paging and cancellable reads
//! - A [`Console`] that ties these together into a read/execute loop
pub mod command;
pub mod config;
pub mod console;
pub mod error;
pub mod help;
pub mod invocation;
pub mod parser;
pub mod registry;
pub mod resolver;
pub mod shell;

// Re-export commonly used types and traits
pub use error::{Error, Result, ValidationError};

pub use command::{
    ActivationContext, Activator, Command, CommandArguments, CommandContainer, CommandMetadata,
    CommandMetadataBuilder, CommandResult, ResultHandler, Validator, from_fn,
};
pub use config::Settings;
pub use console::{Console, ConsoleBuilder};
pub use invocation::{Attachment, CommandInvocation, ConsoleCommand};
pub use parser::{ControlOperator, DefaultTokenizer, LineTokenizer, ParsedLine};
pub use registry::{CommandNotFound, CommandRegistry, MutableCommandRegistry};
pub use resolver::CommandResolver;
pub use shell::{
    BufferState, CancellationToken, CaptureShell, CrosstermTerminal, Key, Prompt,
    ScriptedTerminal, Shell, Size, Terminal, TerminalEvent, TerminalShell,
};
