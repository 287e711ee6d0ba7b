//! Command registry.
//!
//! A [`CommandRegistry`] is an ordered list of [`CommandDefinition`]s. Names
//! and aliases share one namespace: registering a definition whose name or
//! any alias is already taken fails with [`RegistryError::DuplicateName`].
//!
//! Lookup checks primary names first, then aliases in registration order.

use std::sync::Arc;

use tracing::trace;

use crate::error::{RegistryError, RegistryResult};
use crate::handler::{BoxedCommandHandler, BoxedSuggestHandler, CommandHandler, SuggestHandler};

/// A named command with its behaviour and help metadata.
pub struct CommandDefinition {
    name: String,
    aliases: Vec<String>,
    description: String,
    usage: String,
    execute: BoxedCommandHandler,
    suggest: Option<BoxedSuggestHandler>,
}

impl CommandDefinition {
    /// Creates a definition with the given primary name and handler.
    pub fn new(name: impl Into<String>, handler: impl CommandHandler) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            description: String::new(),
            usage: String::new(),
            execute: Arc::new(handler),
            suggest: None,
        }
    }

    /// Adds aliases, keeping their order.
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

    /// Usage text shown after the prefixed name in help, e.g. `" <tag>"`.
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    /// Attaches an autocomplete behaviour.
    pub fn suggest(mut self, suggest: impl SuggestHandler) -> Self {
        self.suggest = Some(Arc::new(suggest));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias_list(&self) -> &[String] {
        &self.aliases
    }

    pub fn description_text(&self) -> &str {
        &self.description
    }

    pub fn usage_text(&self) -> &str {
        &self.usage
    }

    pub fn handler(&self) -> &BoxedCommandHandler {
        &self.execute
    }

    pub fn suggester(&self) -> Option<&BoxedSuggestHandler> {
        self.suggest.as_ref()
    }

    /// The primary name followed by every alias.
    fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

impl std::fmt::Debug for CommandDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDefinition")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("has_suggest", &self.suggest.is_some())
            .finish_non_exhaustive()
    }
}

/// An ordered, name-unique collection of commands.
#[derive(Default, Clone)]
pub struct CommandRegistry {
    commands: Vec<Arc<CommandDefinition>>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Adds a definition.
    ///
    /// Fails if the name or any alias is already used as a name or alias by
    /// another definition. The registry is unchanged on failure.
    pub fn register(&mut self, definition: CommandDefinition) -> RegistryResult<()> {
        for candidate in definition.names() {
            if let Some(existing) = self
                .commands
                .iter()
                .find(|c| c.names().any(|n| n == candidate))
            {
                return Err(RegistryError::DuplicateName {
                    name: candidate.to_string(),
                    existing: existing.name.clone(),
                });
            }
        }

        trace!(
            command = %definition.name,
            aliases = ?definition.aliases,
            "Registered command"
        );
        self.commands.push(Arc::new(definition));
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, definition: CommandDefinition) -> RegistryResult<Self> {
        self.register(definition)?;
        Ok(self)
    }

    /// Resolves a token to a definition by exact name, then by alias.
    pub fn resolve(&self, token: &str) -> RegistryResult<Arc<CommandDefinition>> {
        self.lookup(token, |a, b| a == b)
    }

    /// Like [`resolve`](Self::resolve), comparing ASCII case-insensitively.
    pub fn resolve_ignore_case(&self, token: &str) -> RegistryResult<Arc<CommandDefinition>> {
        self.lookup(token, |a, b| a.eq_ignore_ascii_case(b))
    }

    fn lookup(
        &self,
        token: &str,
        eq: impl Fn(&str, &str) -> bool,
    ) -> RegistryResult<Arc<CommandDefinition>> {
        self.commands
            .iter()
            .find(|c| eq(&c.name, token))
            .or_else(|| {
                self.commands
                    .iter()
                    .find(|c| c.aliases.iter().any(|a| eq(a, token)))
            })
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(token.to_string()))
    }

    /// Iterates definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<CommandDefinition>> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("command_count", &self.commands.len())
            .finish()
    }
}
