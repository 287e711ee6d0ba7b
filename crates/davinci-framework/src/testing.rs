//! Test support: a recording gateway and event builders.
//!
//! Enabled for this crate's tests and, through the `testing` feature, for
//! downstream crates' tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use davinci_core::{
    Attachment, AutocompleteChoice, AutocompleteRequest, ButtonPress, CommandInvocation, DeferKind,
    Gateway, GatewayError, GatewayResult, InteractionRef, MessageRef, MessageView, Origin, Reply,
    User,
};

/// Channel used by every builder in this module.
pub const CHANNEL: &str = "c1";

/// A gateway call captured by [`RecordingGateway`].
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    Defer { interaction: String, kind: DeferKind },
    Respond { origin: Origin, reply: Reply },
    Edit { message: MessageRef, reply: Reply },
    Delete(MessageRef),
    React { message: MessageRef, emoji: String },
    Pin(MessageRef),
    Unpin(MessageRef),
    Autocomplete { interaction: String, choices: Vec<AutocompleteChoice> },
}

/// An in-memory gateway that records every outbound call.
///
/// Sent replies become fetchable messages, with uploaded files exposed as
/// attachments under `https://cdn.test/<message>/<filename>`.
#[derive(Debug, Default)]
pub struct RecordingGateway {
    calls: Mutex<Vec<GatewayCall>>,
    messages: Mutex<HashMap<String, MessageView>>,
    managers: Mutex<HashSet<String>>,
    failing_pins: Mutex<bool>,
    next_id: AtomicU64,
}

impl RecordingGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes a message fetchable.
    pub fn store(&self, message: MessageView) {
        self.messages.lock().insert(message.id.clone(), message);
    }

    /// Grants a user the manage-messages permission.
    pub fn grant_manage_messages(&self, user_id: &str) {
        self.managers.lock().insert(user_id.to_string());
    }

    /// Makes pin and unpin calls fail.
    pub fn fail_pins(&self) {
        *self.failing_pins.lock() = true;
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().clone()
    }

    /// Replies passed to `respond`, in order.
    pub fn responses(&self) -> Vec<Reply> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                GatewayCall::Respond { reply, .. } => Some(reply.clone()),
                _ => None,
            })
            .collect()
    }

    /// Message edits, in order.
    pub fn edits(&self) -> Vec<(MessageRef, Reply)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                GatewayCall::Edit { message, reply } => Some((message.clone(), reply.clone())),
                _ => None,
            })
            .collect()
    }

    /// Emojis reacted with, in order.
    pub fn reactions(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                GatewayCall::React { emoji, .. } => Some(emoji.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn message(&self, id: &str) -> Option<MessageView> {
        self.messages.lock().get(id).cloned()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().push(call);
    }

    fn view_of(&self, id: &str, channel_id: &str, reply: &Reply) -> MessageView {
        MessageView {
            id: id.to_string(),
            channel_id: channel_id.to_string(),
            url: format!("https://chat.test/{channel_id}/{id}"),
            author: User {
                bot: true,
                ..User::new(self.user_id(), "davinci#0000")
            },
            content: reply.content.clone().unwrap_or_default(),
            attachments: reply
                .files
                .iter()
                .map(|f| Attachment {
                    filename: f.filename.clone(),
                    url: format!("https://cdn.test/{id}/{}", f.filename),
                })
                .collect(),
            embeds: reply.embeds.clone(),
            reference: None,
            is_direct: false,
            created_at_ms: 0,
        }
    }
}

#[async_trait]
impl Gateway for RecordingGateway {
    fn user_id(&self) -> &str {
        "bot"
    }

    async fn defer(&self, interaction: &InteractionRef, kind: DeferKind) -> GatewayResult<()> {
        self.record(GatewayCall::Defer {
            interaction: interaction.id.clone(),
            kind,
        });
        Ok(())
    }

    async fn respond(&self, origin: &Origin, reply: Reply) -> GatewayResult<MessageRef> {
        let id = format!("out-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let view = self.view_of(&id, origin.channel_id(), &reply);
        self.store(view);
        self.record(GatewayCall::Respond {
            origin: origin.clone(),
            reply,
        });
        Ok(MessageRef::new(origin.channel_id(), id))
    }

    async fn edit_message(&self, message: &MessageRef, reply: Reply) -> GatewayResult<()> {
        let view = self.view_of(&message.message_id, &message.channel_id, &reply);
        self.store(view);
        self.record(GatewayCall::Edit {
            message: message.clone(),
            reply,
        });
        Ok(())
    }

    async fn delete_message(&self, message: &MessageRef) -> GatewayResult<()> {
        self.messages.lock().remove(&message.message_id);
        self.record(GatewayCall::Delete(message.clone()));
        Ok(())
    }

    async fn react(&self, message: &MessageRef, emoji: &str) -> GatewayResult<()> {
        self.record(GatewayCall::React {
            message: message.clone(),
            emoji: emoji.to_string(),
        });
        Ok(())
    }

    async fn fetch_message(&self, message: &MessageRef) -> GatewayResult<MessageView> {
        self.message(&message.message_id)
            .ok_or_else(|| GatewayError::not_found(format!("message {}", message.message_id)))
    }

    async fn pin_message(&self, message: &MessageRef) -> GatewayResult<()> {
        if *self.failing_pins.lock() {
            return Err(GatewayError::Forbidden("pin".into()));
        }
        self.record(GatewayCall::Pin(message.clone()));
        Ok(())
    }

    async fn unpin_message(&self, message: &MessageRef) -> GatewayResult<()> {
        if *self.failing_pins.lock() {
            return Err(GatewayError::Forbidden("unpin".into()));
        }
        self.record(GatewayCall::Unpin(message.clone()));
        Ok(())
    }

    async fn member_can_manage_messages(
        &self,
        _channel_id: &str,
        user_id: &str,
    ) -> GatewayResult<bool> {
        Ok(self.managers.lock().contains(user_id))
    }

    async fn autocomplete(
        &self,
        interaction: &InteractionRef,
        choices: Vec<AutocompleteChoice>,
    ) -> GatewayResult<()> {
        self.record(GatewayCall::Autocomplete {
            interaction: interaction.id.clone(),
            choices,
        });
        Ok(())
    }
}

/// A non-bot user whose tag derives from the id.
pub fn user(id: &str) -> User {
    User::new(id, format!("{id}#0001"))
}

/// A plain message in [`CHANNEL`].
pub fn text_message(id: &str, author_id: &str, content: &str) -> MessageView {
    MessageView {
        id: id.to_string(),
        channel_id: CHANNEL.to_string(),
        url: format!("https://chat.test/{CHANNEL}/{id}"),
        author: user(author_id),
        content: content.to_string(),
        attachments: Vec::new(),
        embeds: Vec::new(),
        reference: None,
        is_direct: false,
        created_at_ms: 0,
    }
}

/// A slash command invocation in [`CHANNEL`].
pub fn command(name: &str, args: &[&str], actor_id: &str) -> CommandInvocation {
    CommandInvocation {
        interaction: InteractionRef::new(format!("i-{name}"), CHANNEL),
        name: name.to_string(),
        group: None,
        subcommand: None,
        args: args.iter().map(|a| a.to_string()).collect(),
        target_message_id: None,
        actor: user(actor_id),
    }
}

/// An autocomplete request, optionally for a subcommand.
pub fn autocomplete(
    name: &str,
    subcommand: Option<&str>,
    partial: &str,
    actor_id: &str,
) -> AutocompleteRequest {
    AutocompleteRequest {
        interaction: InteractionRef::new(format!("ac-{name}"), CHANNEL),
        name: name.to_string(),
        group: None,
        subcommand: subcommand.map(str::to_string),
        partial: partial.to_string(),
        actor: user(actor_id),
    }
}

/// A press of `token` on `host_message_id` in [`CHANNEL`].
pub fn button_press(token: &str, actor_id: &str, host_message_id: &str) -> ButtonPress {
    ButtonPress {
        interaction: InteractionRef::new(format!("b-{token}"), CHANNEL),
        token: token.to_string(),
        actor: user(actor_id),
        host_message: MessageRef::new(CHANNEL, host_message_id),
    }
}
