//! Event router.
//!
//! The [`Router`] takes one [`InboundEvent`] at a time and sends it to exactly
//! one destination:
//!
//! | event            | destination                                              |
//! |------------------|----------------------------------------------------------|
//! | `Command`        | application registry, exact name                         |
//! | `Autocomplete`   | the command's suggestion behaviour                       |
//! | `TextMessage`    | text registry, prefix stripped, case-insensitive         |
//! | `ButtonPress`    | the pagination session on the host message, else buttons |
//! | `MessageDeleted` | the pagination session on that message                   |
//!
//! Handlers run behind an isolating boundary: an error or a panic is logged
//! with the handler identity and answered with a single ephemeral failure
//! notice. The router itself never fails.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc::error::SendError;
use tracing::{Instrument, Level, debug, error, span, trace, warn};

use davinci_core::{
    AutocompleteChoice, AutocompleteRequest, ButtonPress, CommandInvocation, DeferKind,
    InboundEvent, MessageDeleted, TextMessage,
};

use crate::button::{ButtonToken, denial_reply};
use crate::context::{InvocationContext, RuntimeContext, Trigger};
use crate::embed::error_reply;
use crate::error::{HandlerError, HandlerResult};
use crate::handler::BoxFuture;
use crate::pagination::SessionSignal;

/// Failure notice for commands.
pub const COMMAND_FAILURE: &str = "There was an error while executing this command!";
/// Failure notice for buttons.
pub const BUTTON_FAILURE: &str = "There was an error while executing this button!";

/// What happened to a routed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// A handler ran to completion.
    Handled,
    /// A handler returned an error or panicked.
    Failed,
    /// A button binding refused the actor.
    Denied,
    /// Nothing matched; no reply was sent.
    Ignored,
    /// Passed to a pagination session.
    Forwarded,
}

/// Routes inbound events to handlers.
#[derive(Debug, Clone)]
pub struct Router {
    runtime: Arc<RuntimeContext>,
}

impl Router {
    pub fn new(runtime: Arc<RuntimeContext>) -> Self {
        Self { runtime }
    }

    pub fn runtime(&self) -> &Arc<RuntimeContext> {
        &self.runtime
    }

    /// Routes one event.
    pub async fn route(&self, event: InboundEvent) -> RouteOutcome {
        let kind = event.kind();
        let actor = event.actor().map(|u| u.id.clone()).unwrap_or_default();
        let span = span!(Level::DEBUG, "route", event = %kind, actor = %actor);

        async move {
            let outcome = match event {
                InboundEvent::Command(cmd) => self.route_command(cmd).await,
                InboundEvent::Autocomplete(req) => self.route_autocomplete(req).await,
                InboundEvent::TextMessage(msg) => self.route_text(msg).await,
                InboundEvent::ButtonPress(press) => self.route_button(press).await,
                InboundEvent::MessageDeleted(deleted) => self.route_deleted(deleted).await,
            };
            trace!(outcome = ?outcome, "Routed event");
            outcome
        }
        .instrument(span)
        .await
    }

    async fn route_command(&self, cmd: CommandInvocation) -> RouteOutcome {
        if let Err(e) = self
            .runtime
            .gateway()
            .defer(&cmd.interaction, DeferKind::Reply)
            .await
        {
            warn!(command = %cmd.name, error = %e, "Failed to defer command");
        }

        let Ok(definition) = self.runtime.commands().resolve(&cmd.name) else {
            debug!(command = %cmd.name, "Unknown application command");
            return RouteOutcome::Ignored;
        };

        let args = cmd.args.clone();
        let ctx = self.context(Trigger::Command(cmd));
        let handler = Arc::clone(definition.handler());
        let call_ctx = Arc::clone(&ctx);
        let fut = Box::pin(async move { handler.call(call_ctx, args).await });

        self.guard(&ctx, definition.name(), COMMAND_FAILURE, fut).await
    }

    async fn route_autocomplete(&self, req: AutocompleteRequest) -> RouteOutcome {
        let Ok(definition) = self.runtime.commands().resolve(&req.name) else {
            debug!(command = %req.name, "Autocomplete for unknown command");
            return RouteOutcome::Ignored;
        };

        let gateway = self.runtime.gateway();
        let interaction = req.interaction.clone();

        let Some(suggester) = definition.suggester().cloned() else {
            error!(command = %req.name, "No autocomplete handler registered");
            let fallback = vec![AutocompleteChoice::new("Failed to autocomplete", "error")];
            if let Err(e) = gateway.autocomplete(&interaction, fallback).await {
                warn!(error = %e, "Failed to answer autocomplete");
            }
            return RouteOutcome::Failed;
        };

        let partial = req.partial.clone();
        let ctx = self.context(Trigger::Autocomplete(req));
        let result = AssertUnwindSafe(async move { suggester.call(ctx, partial).await })
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(HandlerError::Panicked(panic_message(&*panic))));

        match result {
            Ok(choices) => match gateway.autocomplete(&interaction, choices).await {
                Ok(()) => RouteOutcome::Handled,
                Err(e) => {
                    warn!(command = %definition.name(), error = %e, "Failed to answer autocomplete");
                    RouteOutcome::Failed
                }
            },
            Err(e) => {
                error!(command = %definition.name(), error = %e, "Autocomplete handler failed");
                RouteOutcome::Failed
            }
        }
    }

    async fn route_text(&self, msg: TextMessage) -> RouteOutcome {
        if msg.is_bot() {
            trace!("Ignoring bot-authored message");
            return RouteOutcome::Ignored;
        }

        let prefix = self.runtime.settings().prefix.as_str();
        let Some(rest) = msg.content().strip_prefix(prefix) else {
            return RouteOutcome::Ignored;
        };

        let mut parts = rest.split_whitespace();
        let Some(token) = parts.next() else {
            return RouteOutcome::Ignored;
        };
        let args: Vec<String> = parts.map(str::to_string).collect();

        let Ok(definition) = self.runtime.text_commands().resolve_ignore_case(token) else {
            debug!(command = %token, "Unknown text command");
            return RouteOutcome::Ignored;
        };

        let ctx = self.context(Trigger::Text(msg.message));
        let handler = Arc::clone(definition.handler());
        let call_ctx = Arc::clone(&ctx);
        let fut = Box::pin(async move { handler.call(call_ctx, args).await });

        self.guard(&ctx, definition.name(), COMMAND_FAILURE, fut).await
    }

    async fn route_button(&self, press: ButtonPress) -> RouteOutcome {
        if let Err(e) = self
            .runtime
            .gateway()
            .defer(&press.interaction, DeferKind::Update)
            .await
        {
            warn!(token = %press.token, error = %e, "Failed to defer button press");
        }

        let press = match self.runtime.sessions().sender(&press.host_message.message_id) {
            Some(sender) => match sender.send(SessionSignal::Press(press)).await {
                Ok(()) => return RouteOutcome::Forwarded,
                // The session ended in between; fall back to the bindings.
                Err(SendError(SessionSignal::Press(press))) => press,
                Err(_) => return RouteOutcome::Ignored,
            },
            None => press,
        };

        let Some(token) = ButtonToken::parse(&press.token) else {
            debug!(token = %press.token, "Unparseable button token");
            return RouteOutcome::Ignored;
        };

        let Some(binding) = self.runtime.buttons().find(token.action()).cloned() else {
            trace!(action = %token.action(), "No binding for button action");
            return RouteOutcome::Ignored;
        };

        let ctx = self.context(Trigger::Button { press, token });

        if !binding.is_authorized(&ctx) {
            debug!(action = %binding.action(), "Button press denied");
            if let Err(e) = ctx
                .gateway()
                .respond(&ctx.origin(), denial_reply(ctx.actor()))
                .await
            {
                warn!(error = %e, "Failed to send denial notice");
            }
            return RouteOutcome::Denied;
        }

        let handler = Arc::clone(binding.handler());
        let call_ctx = Arc::clone(&ctx);
        let fut = Box::pin(async move { handler.call(call_ctx).await });

        self.guard(&ctx, binding.action(), BUTTON_FAILURE, fut).await
    }

    async fn route_deleted(&self, deleted: MessageDeleted) -> RouteOutcome {
        let Some(sender) = self.runtime.sessions().sender(&deleted.message.message_id) else {
            return RouteOutcome::Ignored;
        };
        match sender.send(SessionSignal::HostDeleted).await {
            Ok(()) => RouteOutcome::Forwarded,
            Err(_) => RouteOutcome::Ignored,
        }
    }

    fn context(&self, trigger: Trigger) -> Arc<InvocationContext> {
        Arc::new(InvocationContext::new(Arc::clone(&self.runtime), trigger))
    }

    /// Runs a handler future, converting errors and panics into one notice.
    async fn guard(
        &self,
        ctx: &InvocationContext,
        identity: &str,
        notice: &'static str,
        fut: BoxFuture<'static, HandlerResult>,
    ) -> RouteOutcome {
        let result = AssertUnwindSafe(fut)
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(HandlerError::Panicked(panic_message(&*panic))));

        let Err(err) = result else {
            return RouteOutcome::Handled;
        };

        error!(handler = %identity, error = %err, "Handler failed");

        if !err.is_reported() {
            let reply = error_reply(ctx.actor(), notice);
            if let Err(e) = ctx.gateway().respond(&ctx.origin(), reply).await {
                warn!(handler = %identity, error = %e, "Failed to send failure notice");
            }
        }

        RouteOutcome::Failed
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
