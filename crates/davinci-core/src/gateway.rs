//! The outbound gateway contract.
//!
//! A [`Gateway`] is the bot's only way to act on the platform. The dispatch
//! core never talks to a socket or HTTP API directly; it asks the gateway to
//! acknowledge interactions, send and edit messages, react, and so on.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GatewayResult;
use crate::event::{InteractionRef, MessageRef};
use crate::message::{MessageView, Reply};

/// Where a reply goes.
///
/// Interaction origins are answered through the interaction (immediately, by
/// editing a deferred response, or as an ephemeral follow-up); message origins
/// are answered by a reply message in the same channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    Interaction(InteractionRef),
    Message(MessageRef),
}

impl Origin {
    /// The channel the reply will land in.
    pub fn channel_id(&self) -> &str {
        match self {
            Self::Interaction(i) => &i.channel_id,
            Self::Message(m) => &m.channel_id,
        }
    }
}

/// How an interaction is acknowledged before the real response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeferKind {
    /// A "thinking" placeholder that the first response replaces.
    Reply,
    /// Acknowledge a component click without changing the message yet.
    Update,
}

/// One autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteChoice {
    pub name: String,
    pub value: String,
}

impl AutocompleteChoice {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Outbound operations the bot performs on the platform.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// The bot's own user id.
    fn user_id(&self) -> &str;

    /// Acknowledges an interaction.
    async fn defer(&self, interaction: &InteractionRef, kind: DeferKind) -> GatewayResult<()>;

    /// Sends a reply and returns the message it produced.
    ///
    /// For interactions the gateway picks an immediate response, an edit of
    /// the deferred response, or a follow-up, depending on the interaction's
    /// state and the reply's visibility.
    async fn respond(&self, origin: &Origin, reply: Reply) -> GatewayResult<MessageRef>;

    /// Replaces the content of an existing message.
    async fn edit_message(&self, message: &MessageRef, reply: Reply) -> GatewayResult<()>;

    async fn delete_message(&self, message: &MessageRef) -> GatewayResult<()>;

    /// Adds a unicode emoji reaction to a message.
    async fn react(&self, message: &MessageRef, emoji: &str) -> GatewayResult<()>;

    /// Fetches a message by id from a channel.
    async fn fetch_message(&self, message: &MessageRef) -> GatewayResult<MessageView>;

    async fn pin_message(&self, message: &MessageRef) -> GatewayResult<()>;

    async fn unpin_message(&self, message: &MessageRef) -> GatewayResult<()>;

    /// Whether a member holds the manage-messages permission in a channel.
    async fn member_can_manage_messages(
        &self,
        channel_id: &str,
        user_id: &str,
    ) -> GatewayResult<bool>;

    /// Answers an autocomplete request.
    async fn autocomplete(
        &self,
        interaction: &InteractionRef,
        choices: Vec<AutocompleteChoice>,
    ) -> GatewayResult<()>;
}

/// A shared gateway trait object.
pub type BoxedGateway = Arc<dyn Gateway>;
