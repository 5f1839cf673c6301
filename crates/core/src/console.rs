//! Interactive console: reads lines, resolves commands and runs them
//!
//! Each command goes through the same gate chain: activation, the synthesized
//! `--help` and `--version` options, argument preparation, validation and
//! finally execution. Whatever happens is reported to the command's result
//! handler; only resolution misses and shell failures reach the caller.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::command::{ActivationContext, CommandArguments, CommandContainer, CommandResult};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::help;
use crate::invocation::{Attachment, CommandInvocation, SessionState};
use crate::parser::{ControlOperator, LineTokenizer, Segment, split_operators};
use crate::registry::{CommandRegistry, MutableCommandRegistry};
use crate::resolver::CommandResolver;
use crate::shell::{CaptureShell, Prompt, Shell};

/// Builder for [`Console`].
pub struct ConsoleBuilder {
    shell: Box<dyn Shell>,
    settings: Settings,
    registry: Option<Arc<MutableCommandRegistry>>,
    tokenizer: Option<Arc<dyn LineTokenizer>>,
    commands: Vec<CommandContainer>,
}

impl ConsoleBuilder {
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Share an existing registry instead of creating an empty one.
    pub fn registry(mut self, registry: Arc<MutableCommandRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn tokenizer(mut self, tokenizer: Arc<dyn LineTokenizer>) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    /// Register `container` when the console is built.
    pub fn command(mut self, container: CommandContainer) -> Self {
        self.commands.push(container);
        self
    }

    pub fn build(self) -> Result<Console> {
        let registry = self.registry.unwrap_or_default();
        for container in self.commands {
            registry.register(container)?;
        }

        let shared: Arc<dyn CommandRegistry> = registry.clone();
        let resolver = match self.tokenizer {
            Some(tokenizer) => {
                registry.set_tokenizer(Arc::clone(&tokenizer));
                CommandResolver::with_tokenizer(shared, tokenizer)
            }
            None => CommandResolver::new(shared),
        };

        Ok(Console {
            shell: self.shell,
            registry,
            resolver,
            session: SessionState::new(Prompt::new(self.settings.prompt.clone())),
            settings: self.settings,
            last_result: CommandResult::Success,
        })
    }
}

/// A line-oriented command session over a [`Shell`].
pub struct Console {
    shell: Box<dyn Shell>,
    registry: Arc<MutableCommandRegistry>,
    resolver: CommandResolver,
    session: SessionState,
    settings: Settings,
    last_result: CommandResult,
}

impl Console {
    pub fn builder(shell: impl Shell + 'static) -> ConsoleBuilder {
        ConsoleBuilder {
            shell: Box::new(shell),
            settings: Settings::default(),
            registry: None,
            tokenizer: None,
            commands: Vec::new(),
        }
    }

    pub fn register(&self, container: CommandContainer) -> Result<()> {
        self.registry.register(container)
    }

    pub fn resolve(&self, line: &str) -> Result<Arc<CommandContainer>> {
        self.resolver.resolve(line)
    }

    pub fn registry(&self) -> &Arc<MutableCommandRegistry> {
        &self.registry
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn shell(&mut self) -> &mut dyn Shell {
        self.shell.as_mut()
    }

    pub fn prompt(&self) -> &Prompt {
        &self.session.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<Prompt>) {
        self.session.prompt = prompt.into();
    }

    pub fn is_stopped(&self) -> bool {
        self.session.stop_requested
    }

    pub fn stop(&mut self) {
        self.session.stop_requested = true;
    }

    /// Result of the last non-blank line handled by [`run`](Self::run).
    /// A line that named no command counts as [`CommandResult::not_found`].
    pub fn last_result(&self) -> CommandResult {
        self.last_result
    }

    /// Whether input currently goes to an attached command.
    pub fn has_attached(&self) -> bool {
        !self.session.attached.is_empty()
    }

    /// Read and handle lines until a command stops the session or input ends.
    pub fn run(&mut self) -> Result<()> {
        info!("Console session started");

        while !self.session.stop_requested {
            let prompt = self.session.active_prompt();
            let line = match self.shell.read_line(Some(&prompt)) {
                Ok(line) => line,
                Err(Error::InterruptedRead) => {
                    self.shell.writeln("^C", false)?;
                    continue;
                }
                Err(Error::EndOfInput) => {
                    debug!("Input closed");
                    break;
                }
                Err(err) => return Err(err),
            };

            match self.handle_line(&line) {
                Ok(result) => {
                    if !line.trim().is_empty() {
                        self.last_result = result;
                    }
                }
                Err(Error::CommandNotFound { token }) => {
                    self.last_result = CommandResult::not_found();
                    self.shell.writeln(&format!("{token}: command not found"), false)?;
                }
                Err(Error::InterruptedRead) => {
                    self.shell.writeln("^C", false)?;
                }
                Err(Error::EndOfInput) => break,
                Err(err) => return Err(err),
            }
        }

        info!("Console session ended");
        Ok(())
    }

    /// Route one input line: to the attached command if there is one,
    /// otherwise through [`execute`](Self::execute). Blank lines do nothing.
    pub fn handle_line(&mut self, line: &str) -> Result<CommandResult> {
        if self.has_attached() {
            return self.dispatch_attached(line);
        }
        if line.trim().is_empty() {
            return Ok(CommandResult::Success);
        }
        self.execute(line)
    }

    /// Execute a line that may chain commands with `;`, `&&`, `||` and `|`.
    ///
    /// Returns the result of the last command that ran. A segment that does
    /// not resolve aborts the rest of the line with `CommandNotFound`.
    pub fn execute(&mut self, line: &str) -> Result<CommandResult> {
        let Console {
            shell,
            resolver,
            session,
            ..
        } = self;

        let mut last = CommandResult::Success;
        let mut piped: Option<String> = None;
        let mut previous = ControlOperator::None;

        for segment in split_operators(line) {
            let skip = match previous {
                ControlOperator::And => !last.is_success(),
                ControlOperator::Or => last.is_success(),
                _ => false,
            };
            previous = segment.operator;

            if skip {
                debug!("Skipping '{}' after {:?}", segment.text.trim(), last);
                piped = None;
                continue;
            }

            let input = piped.take();
            if segment.operator == ControlOperator::Pipe {
                let mut capture = CaptureShell::new(shell.as_mut());
                last = run_segment(resolver, session, &mut capture, &segment, input)?;
                piped = Some(capture.into_output());
            } else {
                last = run_segment(resolver, session, shell.as_mut(), &segment, input)?;
            }

            if session.stop_requested {
                debug!("Stop requested, dropping the rest of the line");
                break;
            }
        }

        // A trailing pipe has nowhere to go
        if let Some(output) = piped {
            shell.write(&output, true)?;
        }

        Ok(last)
    }

    fn dispatch_attached(&mut self, line: &str) -> Result<CommandResult> {
        let Console {
            shell,
            resolver,
            session,
            ..
        } = self;

        let Some(mut attached) = session.attached.pop() else {
            return Ok(CommandResult::Success);
        };
        let depth = session.attached.len();

        let outcome = {
            let mut invocation = CommandInvocation::new(
                shell.as_mut(),
                session,
                resolver,
                ControlOperator::None,
                None,
            );
            attached.process_line(line, &mut invocation)
        };

        match outcome {
            Ok(Attachment::Keep) => {
                // Anything attached while handling the line stays on top
                session.attached.insert(depth, attached);
                Ok(CommandResult::Success)
            }
            Ok(Attachment::Detach) => {
                debug!("Console command detached (depth {})", depth + 1);
                Ok(CommandResult::Success)
            }
            Err(err) => {
                let err = Error::from(err);
                if !err.is_interrupt() {
                    shell.writeln(&err.to_string(), false)?;
                }
                warn!("Attached command failed and was detached: {}", err);
                Ok(CommandResult::failure())
            }
        }
    }
}

/// Run one segment of a line through the gate chain.
fn run_segment(
    resolver: &CommandResolver,
    session: &mut SessionState,
    shell: &mut dyn Shell,
    segment: &Segment,
    input: Option<String>,
) -> Result<CommandResult> {
    let parsed = resolver.tokenizer().tokenize(&segment.text);
    let Some(first) = parsed.first_word() else {
        return Err(Error::not_found(""));
    };
    let resolved = resolver.resolve_word(first, &segment.text)?;

    // Group members are also reachable through the group's aliases
    let (container, consumed) = if resolved.metadata().answers_to(first) {
        let child = parsed
            .words()
            .get(1)
            .and_then(|word| resolved.child(word))
            .cloned();
        match child {
            Some(child) => (child, 2),
            None => (resolved, 1),
        }
    } else {
        (resolved, 2)
    };

    let metadata = container.metadata();
    let name = metadata.name();
    let handler = Arc::clone(metadata.result_handler());

    let context = ActivationContext {
        metadata,
        line: &parsed,
    };
    if !metadata.activator().can_activate(&context) {
        info!("Command '{}' refused by its activator", name);
        let err = Error::ActivationDenied {
            command: name.to_string(),
        };
        shell.writeln(&err.to_string(), false)?;
        handler.on_failure(&err);
        return Ok(CommandResult::failure());
    }

    let args = if metadata.disable_parsing() {
        CommandArguments::Raw(parsed.remainder_after(consumed).to_string())
    } else {
        CommandArguments::Parsed(parsed.words().get(consumed..).unwrap_or_default().to_vec())
    };

    if let CommandArguments::Parsed(words) = &args {
        if metadata.generate_help() && words.iter().any(|w| w == "--help" || w == "-h") {
            shell.write(&help::render(&container), true)?;
            return Ok(CommandResult::Success);
        }
        if let Some(version) = metadata.version() {
            if words.iter().any(|w| w == "--version" || w == "-v") {
                shell.writeln(version, false)?;
                return Ok(CommandResult::Success);
            }
        }
    }

    let command = container.command();
    if let Err(invalid) = metadata.validator().validate(command.as_ref(), &args) {
        debug!("Command '{}' rejected its arguments: {}", name, invalid);
        let err = Error::Validation(invalid);
        shell.writeln(&format!("{name}: {err}"), false)?;
        handler.on_failure(&err);
        return Ok(CommandResult::failure());
    }

    debug!("Executing '{}' with {} argument(s)", name, args.len());
    let outcome = {
        let mut invocation =
            CommandInvocation::new(shell, session, resolver, segment.operator, input);
        command.execute(&mut invocation, &args)
    };

    match outcome {
        Ok(CommandResult::Success) => {
            handler.on_success(&CommandResult::Success);
            Ok(CommandResult::Success)
        }
        Ok(CommandResult::Failure(code)) => {
            debug!("Command '{}' exited with {}", name, code);
            handler.on_failure(&Error::CommandFailed {
                command: name.to_string(),
                code,
            });
            Ok(CommandResult::Failure(code))
        }
        Err(err) => {
            let err = Error::from(err);
            if !err.is_interrupt() {
                warn!("Command '{}' failed: {}", name, err);
                shell.writeln(&format!("{name}: {err}"), false)?;
            }
            handler.on_failure(&err);
            Ok(CommandResult::failure())
        }
    }
}
