//! Runtime pairing of metadata and command instance

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use super::{Command, CommandMetadata};
use crate::error::{Error, Result};

type Factory = Box<dyn Fn() -> Arc<dyn Command> + Send + Sync>;

enum Instance {
    Ready(Arc<dyn Command>),
    Lazy {
        factory: Factory,
        cell: OnceLock<Arc<dyn Command>>,
    },
}

/// A command's metadata together with its executable instance.
///
/// Containers may hold child containers, forming a command group such as
/// `remote add` / `remote remove`.
pub struct CommandContainer {
    metadata: Arc<CommandMetadata>,
    instance: Instance,
    children: Vec<Arc<CommandContainer>>,
}

impl CommandContainer {
    pub fn new(metadata: CommandMetadata, command: impl Command + 'static) -> Self {
        Self::from_arc(metadata, Arc::new(command))
    }

    pub fn from_arc(metadata: CommandMetadata, command: Arc<dyn Command>) -> Self {
        Self {
            metadata: Arc::new(metadata),
            instance: Instance::Ready(command),
            children: Vec::new(),
        }
    }

    /// Build the command on first use. The factory runs at most once.
    pub fn lazy<F, C>(metadata: CommandMetadata, factory: F) -> Self
    where
        F: Fn() -> C + Send + Sync + 'static,
        C: Command + 'static,
    {
        Self {
            metadata: Arc::new(metadata),
            instance: Instance::Lazy {
                factory: Box::new(move || Arc::new(factory()) as Arc<dyn Command>),
                cell: OnceLock::new(),
            },
            children: Vec::new(),
        }
    }

    /// Add a group member. Its name and aliases must not clash with earlier members.
    pub fn with_child(mut self, child: CommandContainer) -> Result<Self> {
        if let Some(clash) = child
            .metadata
            .identifiers()
            .find(|id| self.child(id).is_some())
        {
            return Err(Error::Configuration(format!(
                "Group '{}' already has a member answering to '{clash}'",
                self.metadata.name()
            )));
        }
        self.children.push(Arc::new(child));
        Ok(self)
    }

    pub fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    pub fn shared_metadata(&self) -> Arc<CommandMetadata> {
        Arc::clone(&self.metadata)
    }

    pub fn name(&self) -> &str {
        self.metadata.name()
    }

    /// The executable command, constructing it if this container is lazy.
    pub fn command(&self) -> Arc<dyn Command> {
        match &self.instance {
            Instance::Ready(command) => Arc::clone(command),
            Instance::Lazy { factory, cell } => Arc::clone(cell.get_or_init(|| {
                debug!("Instantiating command '{}'", self.metadata.name());
                factory()
            })),
        }
    }

    pub fn children(&self) -> &[Arc<CommandContainer>] {
        &self.children
    }

    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }

    /// Group member answering to `word` by name or alias.
    pub fn child(&self, word: &str) -> Option<&Arc<CommandContainer>> {
        self.children
            .iter()
            .find(|child| child.metadata.name() == word)
            .or_else(|| {
                self.children
                    .iter()
                    .find(|child| child.metadata.answers_to(word))
            })
    }
}

impl fmt::Debug for CommandContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContainer")
            .field("metadata", &self.metadata)
            .field(
                "children",
                &self
                    .children
                    .iter()
                    .map(|child| child.name())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandArguments, CommandResult, from_fn};
    use crate::invocation::CommandInvocation;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Noop;

    impl Command for Noop {
        fn execute(
            &self,
            _invocation: &mut CommandInvocation<'_>,
            _args: &CommandArguments,
        ) -> anyhow::Result<CommandResult> {
            Ok(CommandResult::Success)
        }
    }

    fn metadata(name: &str) -> CommandMetadata {
        CommandMetadata::builder(name).build().unwrap()
    }

    #[test]
    fn test_lazy_factory_runs_once() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&built);
        let container = CommandContainer::lazy(metadata("slow"), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Noop
        });

        assert_eq!(built.load(Ordering::SeqCst), 0);
        let first = container.command();
        let second = container.command();
        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_group_children() {
        let group = CommandContainer::new(metadata("remote"), Noop)
            .with_child(CommandContainer::new(
                CommandMetadata::builder("add").alias("a").build().unwrap(),
                Noop,
            ))
            .unwrap()
            .with_child(CommandContainer::new(
                metadata("remove"),
                from_fn(|_, _| Ok(CommandResult::Success)),
            ))
            .unwrap();

        assert!(group.is_group());
        assert_eq!(group.child("add").unwrap().name(), "add");
        assert_eq!(group.child("a").unwrap().name(), "add");
        assert_eq!(group.child("remove").unwrap().name(), "remove");
        assert!(group.child("rename").is_none());
    }

    #[test]
    fn test_group_rejects_clashing_members() {
        let group = CommandContainer::new(metadata("remote"), Noop)
            .with_child(CommandContainer::new(
                CommandMetadata::builder("add").alias("a").build().unwrap(),
                Noop,
            ))
            .unwrap();

        let clash = CommandContainer::new(
            CommandMetadata::builder("append").alias("a").build().unwrap(),
            Noop,
        );
        assert!(matches!(
            group.with_child(clash),
            Err(Error::Configuration(_))
        ));
    }
}
