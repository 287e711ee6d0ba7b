//! Inbound events delivered by the gateway.
//!
//! Every event the bot reacts to arrives as one [`InboundEvent`] variant:
//!
//! ```text
//! InboundEvent
//! ├── Command          slash or context-menu command
//! ├── Autocomplete     partial input for a command option
//! ├── ButtonPress      click on a message component
//! ├── TextMessage      plain channel message (prefixed commands)
//! └── MessageDeleted   a message the bot may be tracking is gone
//! ```

use serde::{Deserialize, Serialize};

use crate::message::MessageView;

// ============================================================================
// Identities
// ============================================================================

/// A platform user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: String,
    /// Human-readable tag (e.g. `name#0001`).
    pub tag: String,
    /// Whether the account is a bot.
    #[serde(default)]
    pub bot: bool,
    /// Avatar URL, if the user has one.
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl User {
    /// Creates a non-bot user without an avatar.
    pub fn new(id: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag: tag.into(),
            bot: false,
            avatar_url: None,
        }
    }
}

/// Addresses one message in one channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub channel_id: String,
    pub message_id: String,
}

impl MessageRef {
    pub fn new(channel_id: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            message_id: message_id.into(),
        }
    }
}

/// Addresses one interaction (command, autocomplete or component click).
///
/// Interactions must be acknowledged quickly; the gateway uses this reference
/// to defer, respond to, or follow up on them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InteractionRef {
    pub id: String,
    pub channel_id: String,
}

impl InteractionRef {
    pub fn new(id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            channel_id: channel_id.into(),
        }
    }
}

// ============================================================================
// Event payloads
// ============================================================================

/// A slash or context-menu command invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandInvocation {
    pub interaction: InteractionRef,
    /// The invoked command name.
    pub name: String,
    /// Subcommand group, for nested slash commands.
    #[serde(default)]
    pub group: Option<String>,
    /// Subcommand name, for nested slash commands.
    #[serde(default)]
    pub subcommand: Option<String>,
    /// Positional option values in declaration order.
    #[serde(default)]
    pub args: Vec<String>,
    /// Target message of a message context-menu command.
    #[serde(default)]
    pub target_message_id: Option<String>,
    pub actor: User,
}

/// A request for option suggestions while the user is typing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteRequest {
    pub interaction: InteractionRef,
    pub name: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub subcommand: Option<String>,
    /// The current value of the focused option.
    #[serde(default)]
    pub partial: String,
    pub actor: User,
}

/// A click on a button attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonPress {
    pub interaction: InteractionRef,
    /// The raw custom id of the pressed button (`action[-ownerId]`).
    pub token: String,
    pub actor: User,
    /// The message carrying the button.
    pub host_message: MessageRef,
}

/// A plain message posted in a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMessage {
    pub message: MessageView,
}

impl TextMessage {
    /// The raw message content.
    pub fn content(&self) -> &str {
        &self.message.content
    }

    /// The message author.
    pub fn author(&self) -> &User {
        &self.message.author
    }

    /// Whether the author is a bot account.
    pub fn is_bot(&self) -> bool {
        self.message.author.bot
    }
}

/// Notification that a message was deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDeleted {
    pub message: MessageRef,
}

// ============================================================================
// InboundEvent
// ============================================================================

/// High-level classification of an inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Command,
    Autocomplete,
    ButtonPress,
    TextMessage,
    MessageDeleted,
}

impl EventKind {
    /// Returns the kind as a static string, for logging.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Autocomplete => "autocomplete",
            Self::ButtonPress => "button_press",
            Self::TextMessage => "text_message",
            Self::MessageDeleted => "message_deleted",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event delivered by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    Command(CommandInvocation),
    Autocomplete(AutocompleteRequest),
    ButtonPress(ButtonPress),
    TextMessage(TextMessage),
    MessageDeleted(MessageDeleted),
}

impl InboundEvent {
    /// Returns the classification of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Command(_) => EventKind::Command,
            Self::Autocomplete(_) => EventKind::Autocomplete,
            Self::ButtonPress(_) => EventKind::ButtonPress,
            Self::TextMessage(_) => EventKind::TextMessage,
            Self::MessageDeleted(_) => EventKind::MessageDeleted,
        }
    }

    /// Returns the user who caused the event, if any.
    pub fn actor(&self) -> Option<&User> {
        match self {
            Self::Command(c) => Some(&c.actor),
            Self::Autocomplete(a) => Some(&a.actor),
            Self::ButtonPress(b) => Some(&b.actor),
            Self::TextMessage(t) => Some(t.author()),
            Self::MessageDeleted(_) => None,
        }
    }
}
