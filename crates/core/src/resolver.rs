//! Maps input text to a registered command

use std::sync::Arc;

use tracing::debug;

use crate::command::CommandContainer;
use crate::error::{Error, Result};
use crate::parser::{DefaultTokenizer, LineTokenizer};
use crate::registry::CommandRegistry;

/// Resolves the first word of a line by canonical name, then by alias.
///
/// A command's name always wins over another command's alias spelled the
/// same way. There is no fuzzy or prefix matching.
#[derive(Clone)]
pub struct CommandResolver {
    registry: Arc<dyn CommandRegistry>,
    tokenizer: Arc<dyn LineTokenizer>,
}

impl CommandResolver {
    pub fn new(registry: Arc<dyn CommandRegistry>) -> Self {
        Self::with_tokenizer(registry, Arc::new(DefaultTokenizer))
    }

    pub fn with_tokenizer(
        registry: Arc<dyn CommandRegistry>,
        tokenizer: Arc<dyn LineTokenizer>,
    ) -> Self {
        Self {
            registry,
            tokenizer,
        }
    }

    pub fn registry(&self) -> &Arc<dyn CommandRegistry> {
        &self.registry
    }

    pub fn tokenizer(&self) -> &Arc<dyn LineTokenizer> {
        &self.tokenizer
    }

    pub fn resolve(&self, line: &str) -> Result<Arc<CommandContainer>> {
        let parsed = self.tokenizer.tokenize(line);
        let Some(first) = parsed.first_word() else {
            return Err(Error::not_found(""));
        };
        self.resolve_word(first, line)
    }

    /// Resolve an already extracted first word against the full line.
    pub fn resolve_word(&self, word: &str, line: &str) -> Result<Arc<CommandContainer>> {
        if let Ok(container) = self.registry.get_command(word, line) {
            return Ok(container);
        }

        match self.registry.get_command_by_alias(word) {
            Ok(container) => {
                debug!("Resolved alias '{}' to '{}'", word, container.name());
                Ok(container)
            }
            Err(miss) => {
                debug!("No command or alias named '{}'", word);
                Err(miss.into())
            }
        }
    }
}
