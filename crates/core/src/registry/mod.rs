//! Command registry
//!
//! Maps command names to containers and keeps a derived alias index. Lookups
//! return a typed [`CommandNotFound`] miss so callers can branch on it
//! without going through the general error type.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};

use crate::command::CommandContainer;
use crate::error::{Error, Result};
use crate::parser::{DefaultTokenizer, LineTokenizer};

/// A lookup that found nothing, carrying the word that was looked up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{token}: command not found")]
pub struct CommandNotFound {
    pub token: String,
}

impl CommandNotFound {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl From<CommandNotFound> for Error {
    fn from(miss: CommandNotFound) -> Self {
        Error::CommandNotFound { token: miss.token }
    }
}

/// Read side of a registry, as seen by the resolver and by running commands.
pub trait CommandRegistry: Send + Sync {
    /// Exact lookup by canonical name.
    ///
    /// `line` is the full raw input so implementations can select a group
    /// member from the words that follow the name.
    fn get_command(
        &self,
        name: &str,
        line: &str,
    ) -> std::result::Result<Arc<CommandContainer>, CommandNotFound>;

    /// Lookup through the alias index.
    fn get_command_by_alias(
        &self,
        alias: &str,
    ) -> std::result::Result<Arc<CommandContainer>, CommandNotFound>;

    /// Registered command names, sorted.
    fn command_names(&self) -> Vec<String>;

    /// Registered containers, sorted by name.
    fn all_commands(&self) -> Vec<Arc<CommandContainer>>;
}

#[derive(Default)]
struct Inner {
    commands: BTreeMap<String, Arc<CommandContainer>>,
    aliases: HashMap<String, String>,
}

impl Inner {
    fn owner_of<'a>(&'a self, word: &'a str) -> Option<&'a str> {
        if self.commands.contains_key(word) {
            return Some(word);
        }
        self.aliases.get(word).map(String::as_str)
    }
}

/// Thread-safe registry that accepts registrations at runtime.
///
/// Names and aliases are case-sensitive.
pub struct MutableCommandRegistry {
    inner: RwLock<Inner>,
    tokenizer: RwLock<Arc<dyn LineTokenizer>>,
}

impl Default for MutableCommandRegistry {
    fn default() -> Self {
        Self {
            inner: RwLock::default(),
            tokenizer: RwLock::new(Arc::new(DefaultTokenizer)),
        }
    }
}

impl MutableCommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenizer used to find the group member named on a line.
    pub fn set_tokenizer(&self, tokenizer: Arc<dyn LineTokenizer>) {
        *self.tokenizer.write().unwrap_or_else(PoisonError::into_inner) = tokenizer;
    }

    fn tokenizer(&self) -> Arc<dyn LineTokenizer> {
        Arc::clone(&self.tokenizer.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Create a registry holding `containers`, failing on the first collision.
    pub fn from_containers<I>(containers: I) -> Result<Self>
    where
        I: IntoIterator<Item = CommandContainer>,
    {
        let registry = Self::new();
        for container in containers {
            registry.register(container)?;
        }
        Ok(registry)
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a command. Fails without changing anything if its name or any of
    /// its aliases is already taken by a name or alias.
    pub fn register(&self, container: CommandContainer) -> Result<()> {
        let mut inner = self.write();
        let metadata = container.metadata();

        for word in metadata.identifiers() {
            if let Some(owner) = inner.owner_of(word) {
                return Err(Error::Configuration(format!(
                    "Cannot register '{}': '{word}' is already used by command '{owner}'",
                    metadata.name()
                )));
            }
        }

        let name = metadata.name().to_string();
        for alias in metadata.aliases() {
            inner.aliases.insert(alias.clone(), name.clone());
        }
        info!(
            "Registered command '{}' with {} alias(es)",
            name,
            metadata.aliases().len()
        );
        inner.commands.insert(name, Arc::new(container));
        Ok(())
    }

    /// Remove a command together with its aliases.
    pub fn unregister(&self, name: &str) -> Result<Arc<CommandContainer>> {
        let mut inner = self.write();
        let container = inner
            .commands
            .remove(name)
            .ok_or_else(|| Error::not_found(name))?;
        inner.aliases.retain(|_, owner| owner.as_str() != name);
        debug!("Unregistered command '{}'", name);
        Ok(container)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().commands.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.read().commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().commands.is_empty()
    }
}

impl CommandRegistry for MutableCommandRegistry {
    fn get_command(
        &self,
        name: &str,
        line: &str,
    ) -> std::result::Result<Arc<CommandContainer>, CommandNotFound> {
        let container = self
            .read()
            .commands
            .get(name)
            .cloned()
            .ok_or_else(|| CommandNotFound::new(name))?;

        if container.is_group() {
            let parsed = self.tokenizer().tokenize(line);
            if let Some(child) = parsed
                .words()
                .get(1)
                .and_then(|member| container.child(member))
            {
                debug!("Selected group member '{}' of '{}'", child.name(), name);
                return Ok(Arc::clone(child));
            }
        }

        Ok(container)
    }

    fn get_command_by_alias(
        &self,
        alias: &str,
    ) -> std::result::Result<Arc<CommandContainer>, CommandNotFound> {
        let inner = self.read();
        inner
            .aliases
            .get(alias)
            .and_then(|name| inner.commands.get(name))
            .cloned()
            .ok_or_else(|| CommandNotFound::new(alias))
    }

    fn command_names(&self) -> Vec<String> {
        self.read().commands.keys().cloned().collect()
    }

    fn all_commands(&self) -> Vec<Arc<CommandContainer>> {
        self.read().commands.values().cloned().collect()
    }
}

impl fmt::Debug for MutableCommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.read();
        f.debug_struct("MutableCommandRegistry")
            .field("commands", &inner.commands.keys().collect::<Vec<_>>())
            .field("aliases", &inner.aliases)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandMetadata, CommandResult, from_fn};
    use crate::parser::ParsedLine;

    struct CommaTokenizer;

    impl LineTokenizer for CommaTokenizer {
        fn tokenize(&self, raw: &str) -> ParsedLine {
            let words = raw.split(',').map(|w| w.trim().to_string()).collect();
            ParsedLine::new(raw, words)
        }
    }

    fn container(name: &str, aliases: &[&str]) -> CommandContainer {
        let metadata = CommandMetadata::builder(name)
            .aliases(aliases.iter().copied())
            .build()
            .unwrap();
        CommandContainer::new(metadata, from_fn(|_, _| Ok(CommandResult::Success)))
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = MutableCommandRegistry::new();
        registry.register(container("list", &["ls", "dir"])).unwrap();

        assert_eq!(registry.get_command("list", "list").unwrap().name(), "list");
        assert_eq!(registry.get_command_by_alias("ls").unwrap().name(), "list");
        assert_eq!(
            registry.get_command("ls", "ls").unwrap_err(),
            CommandNotFound::new("ls")
        );
        assert_eq!(
            registry.get_command_by_alias("list").unwrap_err(),
            CommandNotFound::new("list")
        );
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let registry = MutableCommandRegistry::new();
        registry.register(container("echo", &[])).unwrap();
        assert!(registry.get_command("ECHO", "ECHO").is_err());
    }

    #[test]
    fn test_duplicate_name_leaves_state_unchanged() {
        let registry = MutableCommandRegistry::new();
        registry.register(container("list", &["ls"])).unwrap();

        let err = registry.register(container("list", &["l"])).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert_eq!(registry.len(), 1);
        assert!(registry.get_command_by_alias("l").is_err());
    }

    #[test]
    fn test_alias_collisions_rejected() {
        let registry = MutableCommandRegistry::new();
        registry.register(container("list", &["ls"])).unwrap();

        // Alias clashing with an existing alias
        assert!(matches!(
            registry.register(container("dir", &["ls"])),
            Err(Error::Configuration(_))
        ));
        // Alias clashing with an existing name
        assert!(matches!(
            registry.register(container("show", &["list"])),
            Err(Error::Configuration(_))
        ));
        // Name clashing with an existing alias
        assert!(matches!(
            registry.register(container("ls", &[])),
            Err(Error::Configuration(_))
        ));

        assert_eq!(registry.command_names(), vec!["list"]);
        assert!(registry.get_command_by_alias("list").is_err());
    }

    #[test]
    fn test_unregister_drops_aliases() {
        let registry = MutableCommandRegistry::new();
        registry.register(container("list", &["ls"])).unwrap();
        registry.register(container("cat", &[])).unwrap();

        let removed = registry.unregister("list").unwrap();
        assert_eq!(removed.name(), "list");
        assert!(registry.get_command_by_alias("ls").is_err());
        assert!(!registry.contains("list"));
        assert!(matches!(
            registry.unregister("list"),
            Err(Error::CommandNotFound { .. })
        ));

        // The alias is free again
        registry.register(container("ls", &[])).unwrap();
        assert_eq!(registry.command_names(), vec!["cat", "ls"]);
    }

    #[test]
    fn test_group_member_selected_from_line() {
        let group = container("remote", &[])
            .with_child(container("add", &["a"]))
            .unwrap();
        let registry = MutableCommandRegistry::from_containers([group]).unwrap();

        let selected = registry.get_command("remote", "remote a origin").unwrap();
        assert_eq!(selected.name(), "add");

        let itself = registry.get_command("remote", "remote").unwrap();
        assert_eq!(itself.name(), "remote");

        let unknown_member = registry.get_command("remote", "remote zap").unwrap();
        assert_eq!(unknown_member.name(), "remote");
    }

    #[test]
    fn test_concurrent_register_and_lookup() {
        let registry = Arc::new(MutableCommandRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    let name = format!("cmd{i}");
                    let alias = format!("c{i}");
                    registry.register(container(&name, &[alias.as_str()])).unwrap();
                    assert_eq!(registry.get_command_by_alias(&alias).unwrap().name(), name);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.len(), 8);
    }

    #[test]
    fn test_group_member_selected_with_custom_tokenizer() {
        let group = container("remote", &[])
            .with_child(container("add", &[]))
            .unwrap();
        let registry = MutableCommandRegistry::from_containers([group]).unwrap();

        // The default tokenizer sees one word
        let selected = registry.get_command("remote", "remote,add").unwrap();
        assert_eq!(selected.name(), "remote");

        registry.set_tokenizer(Arc::new(CommaTokenizer));
        let selected = registry.get_command("remote", "remote,add").unwrap();
        assert_eq!(selected.name(), "add");
        let selected = registry.get_command("remote", "remote add").unwrap();
        assert_eq!(selected.name(), "remote");
    }
}
