//! Runtime and invocation contexts.
//!
//! - [`RuntimeContext`]: built once at startup, then shared as
//!   `Arc<RuntimeContext>`. Holds the gateway, both command registries, the
//!   button router, the subcommand table, the live pagination sessions, the
//!   settings and the typed service map.
//! - [`InvocationContext`]: one per handled event. Pairs the runtime with the
//!   [`Trigger`] that caused the invocation and offers reply helpers.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use davinci_core::{
    AutocompleteRequest, BoxedGateway, ButtonPress, CommandInvocation, Embed, GatewayError,
    MessageRef, MessageView, Origin, Reply, User,
};

use crate::button::{ButtonBinding, ButtonRouter, ButtonToken};
use crate::constants::{DEFAULT_PAGINATION_TIMEOUT_MS, DEFAULT_PREFIX};
use crate::embed::error_reply;
use crate::error::{HandlerError, HandlerResult, RegistryResult};
use crate::pagination::{SessionHandle, SessionRegistry, paginate};
use crate::registry::{CommandDefinition, CommandRegistry};
use crate::subcommand::{Subcommand, SubcommandKey, SubcommandTable};

/// Heterogeneous service map values. Each entry holds an `Arc<T>` upcast to
/// `Any`, keyed by `TypeId::of::<T>()`.
pub type ServiceArc = Arc<dyn Any + Send + Sync>;

/// Bot behaviour settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Prefix that marks a text message as a command.
    pub prefix: String,
    /// Idle time after which a pagination session ends.
    pub pagination_timeout: Duration,
    pub help_page_size: usize,
    pub bookmark_page_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            pagination_timeout: Duration::from_millis(DEFAULT_PAGINATION_TIMEOUT_MS),
            help_page_size: 5,
            bookmark_page_size: 4,
        }
    }
}

// =============================================================================
// RuntimeContext
// =============================================================================

/// Everything a handler can reach, built once and frozen.
pub struct RuntimeContext {
    gateway: BoxedGateway,
    commands: CommandRegistry,
    text_commands: CommandRegistry,
    buttons: ButtonRouter,
    subcommands: SubcommandTable,
    sessions: SessionRegistry,
    settings: Settings,
    services: HashMap<TypeId, ServiceArc>,
    shutdown: CancellationToken,
    tasks: TaskTracker,
}

impl RuntimeContext {
    /// Starts building a context around a gateway.
    pub fn builder(gateway: BoxedGateway) -> RuntimeContextBuilder {
        RuntimeContextBuilder::new(gateway)
    }

    pub fn gateway(&self) -> &BoxedGateway {
        &self.gateway
    }

    /// Application (slash and context-menu) commands.
    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    /// Prefixed text commands.
    pub fn text_commands(&self) -> &CommandRegistry {
        &self.text_commands
    }

    pub fn buttons(&self) -> &ButtonRouter {
        &self.buttons
    }

    pub fn subcommands(&self) -> &SubcommandTable {
        &self.subcommands
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Cancelled when the bot shuts down.
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Tracks every task spawned on behalf of this runtime.
    pub fn tasks(&self) -> &TaskTracker {
        &self.tasks
    }

    /// Looks up a service by its (usually trait-object) type.
    pub fn get_service<T: ?Sized + 'static>(&self) -> Option<Arc<T>> {
        self.services
            .get(&TypeId::of::<T>())
            .and_then(|arc| arc.downcast_ref::<Arc<T>>().map(Arc::clone))
    }

    pub fn require_service<T: ?Sized + 'static>(&self) -> HandlerResult<Arc<T>> {
        self.get_service::<T>()
            .ok_or(HandlerError::ServiceNotFound(std::any::type_name::<T>()))
    }
}

impl std::fmt::Debug for RuntimeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeContext")
            .field("commands", &self.commands)
            .field("text_commands", &self.text_commands)
            .field("buttons", &self.buttons.len())
            .field("subcommands", &self.subcommands.len())
            .field("sessions", &self.sessions.len())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Builder for [`RuntimeContext`].
pub struct RuntimeContextBuilder {
    gateway: BoxedGateway,
    commands: CommandRegistry,
    text_commands: CommandRegistry,
    buttons: ButtonRouter,
    subcommands: SubcommandTable,
    settings: Settings,
    services: HashMap<TypeId, ServiceArc>,
    shutdown: CancellationToken,
}

impl RuntimeContextBuilder {
    pub fn new(gateway: BoxedGateway) -> Self {
        Self {
            gateway,
            commands: CommandRegistry::new(),
            text_commands: CommandRegistry::new(),
            buttons: ButtonRouter::new(),
            subcommands: SubcommandTable::new(),
            settings: Settings::default(),
            services: HashMap::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Registers an application command.
    pub fn command(&mut self, definition: CommandDefinition) -> RegistryResult<&mut Self> {
        self.commands.register(definition)?;
        Ok(self)
    }

    /// Registers a prefixed text command.
    pub fn text_command(&mut self, definition: CommandDefinition) -> RegistryResult<&mut Self> {
        self.text_commands.register(definition)?;
        Ok(self)
    }

    pub fn button(&mut self, binding: ButtonBinding) -> &mut Self {
        self.buttons.add(binding);
        self
    }

    pub fn subcommand(
        &mut self,
        key: SubcommandKey,
        subcommand: Subcommand,
    ) -> RegistryResult<&mut Self> {
        self.subcommands.insert(key, subcommand)?;
        Ok(self)
    }

    /// Registers a service under type `T`.
    ///
    /// ```rust,ignore
    /// builder.service::<dyn BookmarkStore>(Arc::new(MemoryBookmarkStore::new()));
    /// ```
    pub fn service<T: ?Sized + Send + Sync + 'static>(&mut self, service: Arc<T>) -> &mut Self {
        self.services
            .insert(TypeId::of::<T>(), Arc::new(service) as ServiceArc);
        self
    }

    pub fn settings(&mut self, settings: Settings) -> &mut Self {
        self.settings = settings;
        self
    }

    /// Uses an externally owned shutdown token.
    pub fn shutdown_token(&mut self, token: CancellationToken) -> &mut Self {
        self.shutdown = token;
        self
    }

    pub fn current_settings(&self) -> &Settings {
        &self.settings
    }

    pub fn build(self) -> Arc<RuntimeContext> {
        Arc::new(RuntimeContext {
            gateway: self.gateway,
            commands: self.commands,
            text_commands: self.text_commands,
            buttons: self.buttons,
            subcommands: self.subcommands,
            sessions: SessionRegistry::new(),
            settings: self.settings,
            services: self.services,
            shutdown: self.shutdown,
            tasks: TaskTracker::new(),
        })
    }
}

// =============================================================================
// InvocationContext
// =============================================================================

/// What caused a handler to run.
#[derive(Debug, Clone)]
pub enum Trigger {
    Command(CommandInvocation),
    Autocomplete(AutocompleteRequest),
    Button { press: ButtonPress, token: ButtonToken },
    Text(MessageView),
}

/// The context handed to every handler.
///
/// ```rust,ignore
/// async fn handle(ctx: Arc<InvocationContext>, args: Vec<String>) -> HandlerResult {
///     let store = ctx.require_service::<dyn BookmarkStore>()?;
///     ctx.reply(Reply::text("done")).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct InvocationContext {
    runtime: Arc<RuntimeContext>,
    trigger: Trigger,
}

impl InvocationContext {
    pub fn new(runtime: Arc<RuntimeContext>, trigger: Trigger) -> Self {
        Self { runtime, trigger }
    }

    // ─── Accessors ───────────────────────────────────────────────────────────

    pub fn runtime(&self) -> &Arc<RuntimeContext> {
        &self.runtime
    }

    pub fn gateway(&self) -> &BoxedGateway {
        self.runtime.gateway()
    }

    pub fn settings(&self) -> &Settings {
        self.runtime.settings()
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    /// The user who caused the invocation.
    pub fn actor(&self) -> &User {
        match &self.trigger {
            Trigger::Command(c) => &c.actor,
            Trigger::Autocomplete(a) => &a.actor,
            Trigger::Button { press, .. } => &press.actor,
            Trigger::Text(m) => &m.author,
        }
    }

    pub fn channel_id(&self) -> &str {
        match &self.trigger {
            Trigger::Command(c) => &c.interaction.channel_id,
            Trigger::Autocomplete(a) => &a.interaction.channel_id,
            Trigger::Button { press, .. } => &press.interaction.channel_id,
            Trigger::Text(m) => &m.channel_id,
        }
    }

    /// Where replies to this invocation go.
    pub fn origin(&self) -> Origin {
        match &self.trigger {
            Trigger::Command(c) => Origin::Interaction(c.interaction.clone()),
            Trigger::Autocomplete(a) => Origin::Interaction(a.interaction.clone()),
            Trigger::Button { press, .. } => Origin::Interaction(press.interaction.clone()),
            Trigger::Text(m) => Origin::Message(m.to_ref()),
        }
    }

    pub fn command_invocation(&self) -> Option<&CommandInvocation> {
        match &self.trigger {
            Trigger::Command(c) => Some(c),
            _ => None,
        }
    }

    pub fn autocomplete_request(&self) -> Option<&AutocompleteRequest> {
        match &self.trigger {
            Trigger::Autocomplete(a) => Some(a),
            _ => None,
        }
    }

    pub fn button_token(&self) -> Option<&ButtonToken> {
        match &self.trigger {
            Trigger::Button { token, .. } => Some(token),
            _ => None,
        }
    }

    /// The message carrying the pressed button.
    pub fn host_message(&self) -> Option<&MessageRef> {
        match &self.trigger {
            Trigger::Button { press, .. } => Some(&press.host_message),
            _ => None,
        }
    }

    /// The text message that invoked a text command.
    pub fn message(&self) -> Option<&MessageView> {
        match &self.trigger {
            Trigger::Text(m) => Some(m),
            _ => None,
        }
    }

    /// Whether the invocation happened in a direct-message channel.
    pub fn is_direct(&self) -> bool {
        self.message().is_some_and(|m| m.is_direct)
    }

    pub fn get_service<T: ?Sized + 'static>(&self) -> Option<Arc<T>> {
        self.runtime.get_service::<T>()
    }

    pub fn require_service<T: ?Sized + 'static>(&self) -> HandlerResult<Arc<T>> {
        self.runtime.require_service::<T>()
    }

    // ─── Actions ─────────────────────────────────────────────────────────────

    /// Sends a reply to the origin of this invocation.
    pub async fn reply(&self, reply: Reply) -> HandlerResult<MessageRef> {
        Ok(self.gateway().respond(&self.origin(), reply).await?)
    }

    /// Replies with an ephemeral error embed.
    pub async fn reply_error(&self, description: impl Into<String>) -> HandlerResult<()> {
        self.reply(error_reply(self.actor(), description)).await?;
        Ok(())
    }

    /// Reacts to the message that caused the invocation.
    pub async fn react(&self, emoji: &str) -> HandlerResult<()> {
        let target = match &self.trigger {
            Trigger::Text(m) => m.to_ref(),
            Trigger::Button { press, .. } => press.host_message.clone(),
            _ => return Err(GatewayError::not_found("message to react to").into()),
        };
        Ok(self.gateway().react(&target, emoji).await?)
    }

    /// Fetches the message a text command replied to, if any.
    pub async fn replied_message(&self) -> HandlerResult<Option<MessageView>> {
        let Some(reference) = self.message().and_then(|m| m.reference.as_ref()) else {
            return Ok(None);
        };
        Ok(Some(self.gateway().fetch_message(reference).await?))
    }

    /// Fetches the target message of a context-menu command, if any.
    pub async fn target_message(&self) -> HandlerResult<Option<MessageView>> {
        let Some(cmd) = self.command_invocation() else {
            return Ok(None);
        };
        let Some(id) = cmd.target_message_id.as_deref() else {
            return Ok(None);
        };
        let reference = MessageRef::new(cmd.interaction.channel_id.clone(), id);
        Ok(Some(self.gateway().fetch_message(&reference).await?))
    }

    /// Sends `pages` with navigation buttons owned by the actor.
    pub async fn paginate(&self, pages: Vec<Embed>) -> HandlerResult<SessionHandle> {
        paginate(self, pages).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingGateway;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct English;

    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".into()
        }
    }

    #[test]
    fn test_service_lookup_by_trait_object() {
        let mut builder = RuntimeContext::builder(RecordingGateway::new());
        builder.service::<dyn Greeter>(Arc::new(English));
        let runtime = builder.build();

        let greeter = runtime.require_service::<dyn Greeter>().unwrap();
        assert_eq!(greeter.greet(), "hello");
        assert!(runtime.get_service::<String>().is_none());
        assert!(matches!(
            runtime.require_service::<String>(),
            Err(HandlerError::ServiceNotFound(_))
        ));
    }

    #[test]
    fn test_text_origin_targets_message() {
        let runtime = RuntimeContext::builder(RecordingGateway::new()).build();
        let message = crate::testing::text_message("m1", "u1", "!ping");
        let ctx = InvocationContext::new(runtime, Trigger::Text(message));
        assert_eq!(ctx.origin(), Origin::Message(MessageRef::new("c1", "m1")));
        assert_eq!(ctx.actor().id, "u1");
        assert!(!ctx.is_direct());
        assert!(ctx.button_token().is_none());
    }

    #[tokio::test]
    async fn test_replied_message_fetches_reference() {
        let gateway = RecordingGateway::new();
        gateway.store(crate::testing::text_message("m0", "u2", "original"));
        let runtime = RuntimeContext::builder(gateway.clone()).build();

        let mut message = crate::testing::text_message("m1", "u1", "!bc tag");
        message.reference = Some(MessageRef::new("c1", "m0"));
        let ctx = InvocationContext::new(runtime, Trigger::Text(message));

        let replied = ctx.replied_message().await.unwrap().unwrap();
        assert_eq!(replied.content, "original");
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.prefix, "!");
        assert_eq!(settings.pagination_timeout, Duration::from_millis(120_000));
        assert_eq!(settings.help_page_size, 5);
        assert_eq!(settings.bookmark_page_size, 4);
    }
}
