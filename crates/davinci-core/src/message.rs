//! Message model: what the bot reads and what it sends.
//!
//! [`MessageView`] is the read side, a snapshot of a platform message as the
//! gateway fetched it. [`Reply`] is the write side: text, embeds, button rows
//! and file uploads, with a [`Visibility`].

use serde::{Deserialize, Serialize};

use crate::event::{MessageRef, User};

// ============================================================================
// Read side
// ============================================================================

/// A file attached to a fetched message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub url: String,
}

/// A snapshot of a platform message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageView {
    pub id: String,
    pub channel_id: String,
    /// Jump link to the message.
    #[serde(default)]
    pub url: String,
    pub author: User,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub embeds: Vec<Embed>,
    /// The message this one replies to.
    #[serde(default)]
    pub reference: Option<MessageRef>,
    /// Whether the message lives in a direct or group-direct channel.
    #[serde(default)]
    pub is_direct: bool,
    /// Creation time in Unix milliseconds.
    #[serde(default)]
    pub created_at_ms: i64,
}

impl MessageView {
    /// Returns a reference addressing this message.
    pub fn to_ref(&self) -> MessageRef {
        MessageRef::new(self.channel_id.clone(), self.id.clone())
    }
}

// ============================================================================
// Embeds
// ============================================================================

/// Colour family of an embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedKind {
    Error,
    Success,
    Warning,
    Info,
    Neutral,
}

impl EmbedKind {
    /// The RGB colour used for this kind.
    pub fn color(self) -> u32 {
        match self {
            Self::Error => 0xff2056,
            Self::Success => 0x00bc7d,
            Self::Warning => 0xffb900,
            Self::Info => 0x7c86ff,
            Self::Neutral => 0x808080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
    #[serde(default)]
    pub icon_url: Option<String>,
}

/// A rich embed block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default)]
    pub color: Option<u32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<EmbedField>,
    #[serde(default)]
    pub footer: Option<EmbedFooter>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    /// Whether the platform should stamp the embed with the send time.
    #[serde(default)]
    pub timestamp: bool,
}

impl Embed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = EmbedField>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn footer(mut self, text: impl Into<String>, icon_url: Option<String>) -> Self {
        self.footer = Some(EmbedFooter {
            text: text.into(),
            icon_url,
        });
        self
    }

    pub fn image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    pub fn timestamp(mut self) -> Self {
        self.timestamp = true;
        self
    }
}

// ============================================================================
// Components
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Success,
    Danger,
}

/// An interactive button. `custom_id` is routed back to the bot on click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub custom_id: String,
    pub style: ButtonStyle,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub disabled: bool,
}

impl Button {
    pub fn new(custom_id: impl Into<String>, style: ButtonStyle) -> Self {
        Self {
            custom_id: custom_id.into(),
            style,
            emoji: None,
            label: None,
            disabled: false,
        }
    }

    pub fn emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// A horizontal row of buttons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRow {
    pub buttons: Vec<Button>,
}

impl ActionRow {
    pub fn new(buttons: impl IntoIterator<Item = Button>) -> Self {
        Self {
            buttons: buttons.into_iter().collect(),
        }
    }

    /// Returns a copy of this row with every button disabled.
    pub fn disabled(&self) -> Self {
        Self {
            buttons: self
                .buttons
                .iter()
                .cloned()
                .map(|b| b.disabled(true))
                .collect(),
        }
    }
}

// ============================================================================
// Replies
// ============================================================================

/// Who can see a reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    /// Only the acting user sees the reply.
    Ephemeral,
}

/// A file to upload with a reply.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUpload {
    pub filename: String,
    pub data: Vec<u8>,
}

impl FileUpload {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            data,
        }
    }
}

impl std::fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileUpload")
            .field("filename", &self.filename)
            .field("len", &self.data.len())
            .finish()
    }
}

/// An outbound message: the abstract `send(content, visibility, components)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub embeds: Vec<Embed>,
    #[serde(default)]
    pub components: Vec<ActionRow>,
    #[serde(default)]
    pub files: Vec<FileUpload>,
    #[serde(default)]
    pub visibility: Visibility,
}

impl Reply {
    pub fn new() -> Self {
        Self::default()
    }

    /// A reply consisting of plain text.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// A reply consisting of one embed.
    pub fn embed(embed: Embed) -> Self {
        Self {
            embeds: vec![embed],
            ..Self::default()
        }
    }

    pub fn with_embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn with_row(mut self, row: ActionRow) -> Self {
        self.components.push(row);
        self
    }

    pub fn with_components(mut self, rows: Vec<ActionRow>) -> Self {
        self.components = rows;
        self
    }

    pub fn with_file(mut self, file: FileUpload) -> Self {
        self.files.push(file);
        self
    }

    /// Marks the reply as visible to the acting user only.
    pub fn ephemeral(mut self) -> Self {
        self.visibility = Visibility::Ephemeral;
        self
    }

    pub fn is_ephemeral(&self) -> bool {
        self.visibility == Visibility::Ephemeral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_kind_palette() {
        assert_eq!(EmbedKind::Error.color(), 0xff2056);
        assert_eq!(EmbedKind::Info.color(), 0x7c86ff);
    }

    #[test]
    fn test_disabled_row_keeps_ids() {
        let row = ActionRow::new([
            Button::new("left-1", ButtonStyle::Primary),
            Button::new("right-1", ButtonStyle::Primary),
        ]);
        let disabled = row.disabled();
        assert!(disabled.buttons.iter().all(|b| b.disabled));
        assert_eq!(disabled.buttons[1].custom_id, "right-1");
        assert!(row.buttons.iter().all(|b| !b.disabled));
    }

    #[test]
    fn test_reply_builder() {
        let reply = Reply::embed(Embed::new().title("Error")).ephemeral();
        assert!(reply.is_ephemeral());
        assert_eq!(reply.embeds.len(), 1);
        assert!(reply.content.is_none());
    }
}
