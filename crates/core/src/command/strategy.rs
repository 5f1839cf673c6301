//! Pluggable activation, validation and result-handling strategies
//!
//! Each strategy has a no-op implementation shared as a single `Arc`, which
//! metadata falls back to when the command does not supply its own.

use std::sync::{Arc, LazyLock};

use super::{Command, CommandArguments, CommandMetadata, CommandResult};
use crate::error::{Error, ValidationError};
use crate::parser::ParsedLine;

/// What an [`Activator`] sees when deciding whether a command may run.
#[derive(Debug, Clone, Copy)]
pub struct ActivationContext<'a> {
    pub metadata: &'a CommandMetadata,
    pub line: &'a ParsedLine,
}

/// Gate deciding whether a command may run at all.
pub trait Activator: Send + Sync {
    fn can_activate(&self, context: &ActivationContext<'_>) -> bool;
}

/// Correctness check run after activation and before the command body.
pub trait Validator: Send + Sync {
    fn validate(
        &self,
        command: &dyn Command,
        args: &CommandArguments,
    ) -> Result<(), ValidationError>;
}

/// Observer of how an invocation ended.
pub trait ResultHandler: Send + Sync {
    fn on_success(&self, result: &CommandResult);

    /// Activation denial, validation failure, a failing exit code, or an
    /// error raised by the command body.
    fn on_failure(&self, error: &Error);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopActivator;

impl Activator for NoopActivator {
    fn can_activate(&self, _context: &ActivationContext<'_>) -> bool {
        true
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopValidator;

impl Validator for NoopValidator {
    fn validate(
        &self,
        _command: &dyn Command,
        _args: &CommandArguments,
    ) -> Result<(), ValidationError> {
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopResultHandler;

impl ResultHandler for NoopResultHandler {
    fn on_success(&self, _result: &CommandResult) {}

    fn on_failure(&self, _error: &Error) {}
}

static NOOP_ACTIVATOR: LazyLock<Arc<dyn Activator>> = LazyLock::new(|| Arc::new(NoopActivator));
static NOOP_VALIDATOR: LazyLock<Arc<dyn Validator>> = LazyLock::new(|| Arc::new(NoopValidator));
static NOOP_RESULT_HANDLER: LazyLock<Arc<dyn ResultHandler>> =
    LazyLock::new(|| Arc::new(NoopResultHandler));

pub(crate) fn noop_activator() -> Arc<dyn Activator> {
    Arc::clone(&NOOP_ACTIVATOR)
}

pub(crate) fn noop_validator() -> Arc<dyn Validator> {
    Arc::clone(&NOOP_VALIDATOR)
}

pub(crate) fn noop_result_handler() -> Arc<dyn ResultHandler> {
    Arc::clone(&NOOP_RESULT_HANDLER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_singletons_are_shared() {
        assert!(Arc::ptr_eq(&noop_activator(), &noop_activator()));
        assert!(Arc::ptr_eq(&noop_validator(), &noop_validator()));
        assert!(Arc::ptr_eq(&noop_result_handler(), &noop_result_handler()));
    }

    #[test]
    fn test_noop_activator_permits() {
        let metadata = CommandMetadata::builder("ls").build().unwrap();
        let line = ParsedLine::new("ls", vec!["ls".to_string()]);
        let context = ActivationContext {
            metadata: &metadata,
            line: &line,
        };
        assert!(NoopActivator.can_activate(&context));
    }
}
