//! Declarative command metadata

use std::fmt;
use std::sync::Arc;

use super::strategy::{
    Activator, ResultHandler, Validator, noop_activator, noop_result_handler, noop_validator,
};
use crate::error::{Error, Result};

/// Static description of a command: identity, parsing mode and strategies.
///
/// Built once through [`CommandMetadata::builder`] and never changed after.
#[derive(Clone)]
pub struct CommandMetadata {
    name: String,
    aliases: Vec<String>,
    description: String,
    generate_help: bool,
    disable_parsing: bool,
    version: Option<String>,
    activator: Arc<dyn Activator>,
    validator: Arc<dyn Validator>,
    result_handler: Arc<dyn ResultHandler>,
}

impl CommandMetadata {
    pub fn builder(name: impl Into<String>) -> CommandMetadataBuilder {
        CommandMetadataBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether `--help` / `-h` is synthesized for this command.
    pub fn generate_help(&self) -> bool {
        self.generate_help
    }

    /// Whether the command receives the raw remainder instead of parsed words.
    pub fn disable_parsing(&self) -> bool {
        self.disable_parsing
    }

    /// Version string; when present `--version` / `-v` is synthesized.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn activator(&self) -> &Arc<dyn Activator> {
        &self.activator
    }

    pub fn validator(&self) -> &Arc<dyn Validator> {
        &self.validator
    }

    pub fn result_handler(&self) -> &Arc<dyn ResultHandler> {
        &self.result_handler
    }

    /// True if `word` is this command's name or one of its aliases.
    pub fn answers_to(&self, word: &str) -> bool {
        self.name == word || self.aliases.iter().any(|alias| alias == word)
    }

    /// Name followed by aliases.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

impl fmt::Debug for CommandMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandMetadata")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("description", &self.description)
            .field("generate_help", &self.generate_help)
            .field("disable_parsing", &self.disable_parsing)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

/// Builder for [`CommandMetadata`]. Strategies left unset use the shared no-op ones.
pub struct CommandMetadataBuilder {
    name: String,
    aliases: Vec<String>,
    description: String,
    generate_help: bool,
    disable_parsing: bool,
    version: Option<String>,
    activator: Option<Arc<dyn Activator>>,
    validator: Option<Arc<dyn Validator>>,
    result_handler: Option<Arc<dyn ResultHandler>>,
}

impl CommandMetadataBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            description: String::new(),
            generate_help: false,
            disable_parsing: false,
            version: None,
            activator: None,
            validator: None,
            result_handler: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn generate_help(mut self, generate: bool) -> Self {
        self.generate_help = generate;
        self
    }

    pub fn disable_parsing(mut self, disable: bool) -> Self {
        self.disable_parsing = disable;
        self
    }

    /// An empty string leaves the version option disabled.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        let version = version.into();
        self.version = (!version.is_empty()).then_some(version);
        self
    }

    pub fn activator(mut self, activator: Arc<dyn Activator>) -> Self {
        self.activator = Some(activator);
        self
    }

    pub fn validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn result_handler(mut self, handler: Arc<dyn ResultHandler>) -> Self {
        self.result_handler = Some(handler);
        self
    }

    pub fn build(self) -> Result<CommandMetadata> {
        check_identifier("Command name", &self.name)?;

        for (i, alias) in self.aliases.iter().enumerate() {
            check_identifier("Alias", alias)?;
            if *alias == self.name {
                return Err(Error::Configuration(format!(
                    "Alias '{alias}' repeats the name of command '{}'",
                    self.name
                )));
            }
            if self.aliases[..i].contains(alias) {
                return Err(Error::Configuration(format!(
                    "Alias '{alias}' is declared twice on command '{}'",
                    self.name
                )));
            }
        }

        Ok(CommandMetadata {
            name: self.name,
            aliases: self.aliases,
            description: self.description,
            generate_help: self.generate_help,
            disable_parsing: self.disable_parsing,
            version: self.version,
            activator: self.activator.unwrap_or_else(noop_activator),
            validator: self.validator.unwrap_or_else(noop_validator),
            result_handler: self.result_handler.unwrap_or_else(noop_result_handler),
        })
    }
}

fn check_identifier(kind: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::Configuration(format!("{kind} must not be empty")));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(Error::Configuration(format!(
            "{kind} '{value}' must not contain whitespace"
        )));
    }
    Ok(())
}
