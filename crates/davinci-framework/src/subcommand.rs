//! Subcommand table.
//!
//! Slash commands with subcommands (`/bookmark list`, `/bookmark delete`) are
//! registered as one [`CommandDefinition`] built by
//! [`CommandDefinition::with_subcommands`]. Its handler looks up the invoked
//! `(command, group, subcommand)` in the runtime's [`SubcommandTable`].

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use davinci_core::{AutocompleteChoice, Reply};

use crate::context::InvocationContext;
use crate::error::{HandlerResult, RegistryError, RegistryResult};
use crate::handler::{BoxedCommandHandler, BoxedSuggestHandler, CommandHandler, SuggestHandler};
use crate::registry::CommandDefinition;

/// Reply sent when a subcommand cannot be resolved.
pub const UNKNOWN_SUBCOMMAND: &str = "I couldn't understand that command!";

/// Identifies one subcommand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubcommandKey {
    pub command: String,
    pub group: Option<String>,
    pub name: String,
}

impl SubcommandKey {
    pub fn new(command: impl Into<String>, group: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            group: group.map(str::to_string),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for SubcommandKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.group {
            Some(group) => write!(f, "{} {} {}", self.command, group, self.name),
            None => write!(f, "{} {}", self.command, self.name),
        }
    }
}

/// One subcommand's behaviour.
pub struct Subcommand {
    execute: BoxedCommandHandler,
    suggest: Option<BoxedSuggestHandler>,
}

impl Subcommand {
    pub fn new(handler: impl CommandHandler) -> Self {
        Self {
            execute: Arc::new(handler),
            suggest: None,
        }
    }

    pub fn suggest(mut self, suggest: impl SuggestHandler) -> Self {
        self.suggest = Some(Arc::new(suggest));
        self
    }
}

/// Subcommands keyed by `(command, group, subcommand)`.
#[derive(Default, Clone)]
pub struct SubcommandTable {
    entries: HashMap<SubcommandKey, Arc<Subcommand>>,
}

impl SubcommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subcommand. Fails if the key is already taken.
    pub fn insert(&mut self, key: SubcommandKey, subcommand: Subcommand) -> RegistryResult<()> {
        if self.entries.contains_key(&key) {
            return Err(RegistryError::DuplicateName {
                name: key.to_string(),
                existing: key.command.clone(),
            });
        }
        self.entries.insert(key, Arc::new(subcommand));
        Ok(())
    }

    pub fn resolve(&self, command: &str, group: Option<&str>, name: &str) -> Option<Arc<Subcommand>> {
        self.entries
            .get(&SubcommandKey::new(command, group, name))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for SubcommandTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

impl CommandDefinition {
    /// A command whose behaviour is routed through the subcommand table.
    pub fn with_subcommands(name: impl Into<String>) -> Self {
        Self::new(name, execute_subcommand).suggest(suggest_subcommand)
    }
}

async fn execute_subcommand(ctx: Arc<InvocationContext>, args: Vec<String>) -> HandlerResult {
    let found = ctx.command_invocation().and_then(|cmd| {
        let name = cmd.subcommand.as_deref()?;
        ctx.runtime()
            .subcommands()
            .resolve(&cmd.name, cmd.group.as_deref(), name)
    });

    match found {
        Some(subcommand) => subcommand.execute.call(ctx, args).await,
        None => {
            debug!("Unresolved subcommand");
            ctx.reply(Reply::text(UNKNOWN_SUBCOMMAND).ephemeral()).await?;
            Ok(())
        }
    }
}

async fn suggest_subcommand(
    ctx: Arc<InvocationContext>,
    partial: String,
) -> HandlerResult<Vec<AutocompleteChoice>> {
    let found = ctx.autocomplete_request().and_then(|req| {
        let name = req.subcommand.as_deref()?;
        ctx.runtime()
            .subcommands()
            .resolve(&req.name, req.group.as_deref(), name)
    });

    match found.as_ref().and_then(|s| s.suggest.as_ref()) {
        Some(suggest) => suggest.call(ctx, partial).await,
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn noop(_ctx: Arc<InvocationContext>, _args: Vec<String>) -> HandlerResult {
        Ok(())
    }

    #[test]
    fn test_resolve_by_group_and_name() {
        let mut table = SubcommandTable::new();
        table
            .insert(SubcommandKey::new("bookmark", None, "list"), Subcommand::new(noop))
            .unwrap();
        table
            .insert(
                SubcommandKey::new("admin", Some("users"), "ban"),
                Subcommand::new(noop),
            )
            .unwrap();

        assert!(table.resolve("bookmark", None, "list").is_some());
        assert!(table.resolve("bookmark", Some("x"), "list").is_none());
        assert!(table.resolve("admin", Some("users"), "ban").is_some());
        assert!(table.resolve("admin", None, "ban").is_none());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut table = SubcommandTable::new();
        let key = SubcommandKey::new("bookmark", None, "list");
        table.insert(key.clone(), Subcommand::new(noop)).unwrap();
        let err = table.insert(key, Subcommand::new(noop)).unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateName {
                name: "bookmark list".into(),
                existing: "bookmark".into()
            }
        );
    }
}
