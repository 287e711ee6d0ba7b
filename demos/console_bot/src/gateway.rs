//! A [`Gateway`] that prints to the terminal and keeps messages in memory.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use davinci::core::{
    Attachment, AutocompleteChoice, DeferKind, Gateway, GatewayError, GatewayResult,
    InteractionRef, MessageRef, MessageView, Origin, Reply, User, Visibility,
};
use parking_lot::Mutex;
use tracing::debug;

pub const BOT_ID: &str = "davinci";

pub struct ConsoleGateway {
    bot: User,
    next_id: AtomicU64,
    messages: Mutex<HashMap<String, MessageView>>,
    pinned: Mutex<HashSet<String>>,
    moderators: HashSet<String>,
    out_dir: Option<PathBuf>,
}

impl ConsoleGateway {
    pub fn new(moderators: impl IntoIterator<Item = String>, out_dir: Option<PathBuf>) -> Self {
        let mut bot = User::new(BOT_ID, "Da Vinci#0000");
        bot.bot = true;
        Self {
            bot,
            next_id: AtomicU64::new(1),
            messages: Mutex::new(HashMap::new()),
            pinned: Mutex::new(HashSet::new()),
            moderators: moderators.into_iter().collect(),
            out_dir,
        }
    }

    /// Hands out message and interaction ids shared with the input side.
    pub fn next_id(&self, prefix: char) -> String {
        format!("{prefix}{}", self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Records an inbound message so later commands can fetch it.
    pub fn remember(&self, message: MessageView) {
        self.messages.lock().insert(message.id.clone(), message);
    }

    pub fn forget(&self, message_id: &str) {
        self.messages.lock().remove(message_id);
    }

    async fn store_files(&self, reply: &Reply) -> Vec<Attachment> {
        let mut attachments = Vec::new();
        for file in &reply.files {
            let url = match &self.out_dir {
                Some(dir) => {
                    let path = dir.join(&file.filename);
                    match tokio::fs::write(&path, &file.data).await {
                        Ok(()) => format!("file://{}", path.display()),
                        Err(e) => {
                            println!("   (could not save {}: {e})", file.filename);
                            format!("attachment://{}", file.filename)
                        }
                    }
                }
                None => format!("attachment://{}", file.filename),
            };
            attachments.push(Attachment {
                filename: file.filename.clone(),
                url,
            });
        }
        attachments
    }

    fn print(&self, header: &str, reply: &Reply) {
        println!("{}", render(header, reply));
    }
}

/// Formats a reply as terminal text.
pub fn render(header: &str, reply: &Reply) -> String {
    let mut out = String::from(header);
    if reply.visibility == Visibility::Ephemeral {
        out.push_str(" (only you can see this)");
    }
    if let Some(content) = &reply.content {
        let _ = write!(out, "\n   {content}");
    }
    for embed in &reply.embeds {
        if let Some(title) = &embed.title {
            let _ = write!(out, "\n   ┃ {title}");
        }
        if let Some(description) = &embed.description {
            for line in description.lines() {
                let _ = write!(out, "\n   ┃ {line}");
            }
        }
        for field in &embed.fields {
            let _ = write!(out, "\n   ┃ • {}: {}", field.name, field.value.replace('\n', " / "));
        }
        if let Some(footer) = &embed.footer {
            let _ = write!(out, "\n   ┃ {}", footer.text);
        }
    }
    for file in &reply.files {
        let _ = write!(out, "\n   📎 {} ({} bytes)", file.filename, file.data.len());
    }
    for row in &reply.components {
        let buttons: Vec<String> = row
            .buttons
            .iter()
            .map(|b| {
                let face = b.emoji.as_deref().or(b.label.as_deref()).unwrap_or("?");
                let state = if b.disabled { " disabled" } else { "" };
                format!("[{face} {}{state}]", b.custom_id)
            })
            .collect();
        let _ = write!(out, "\n   {}", buttons.join(" "));
    }
    out
}

#[async_trait]
impl Gateway for ConsoleGateway {
    fn user_id(&self) -> &str {
        &self.bot.id
    }

    async fn defer(&self, interaction: &InteractionRef, kind: DeferKind) -> GatewayResult<()> {
        debug!(interaction = %interaction.id, ?kind, "Deferred");
        Ok(())
    }

    async fn respond(&self, origin: &Origin, reply: Reply) -> GatewayResult<MessageRef> {
        let id = self.next_id('m');
        let channel_id = origin.channel_id().to_string();
        self.print(&format!("<{id}> Da Vinci:"), &reply);

        let attachments = self.store_files(&reply).await;
        let view = MessageView {
            id: id.clone(),
            channel_id: channel_id.clone(),
            url: format!("console://{channel_id}/{id}"),
            author: self.bot.clone(),
            content: reply.content.unwrap_or_default(),
            attachments,
            embeds: reply.embeds,
            reference: None,
            is_direct: false,
            created_at_ms: crate::now_ms(),
        };
        self.remember(view);
        Ok(MessageRef::new(channel_id, id))
    }

    async fn edit_message(&self, message: &MessageRef, reply: Reply) -> GatewayResult<()> {
        let attachments = self.store_files(&reply).await;
        let mut messages = self.messages.lock();
        let view = messages
            .get_mut(&message.message_id)
            .ok_or_else(|| GatewayError::not_found(message.message_id.clone()))?;
        self.print(&format!("<{}> (edited)", message.message_id), &reply);

        view.content = reply.content.unwrap_or_default();
        view.embeds = reply.embeds;
        if !attachments.is_empty() {
            view.attachments = attachments;
        }
        Ok(())
    }

    async fn delete_message(&self, message: &MessageRef) -> GatewayResult<()> {
        match self.messages.lock().remove(&message.message_id) {
            Some(_) => {
                println!("<{}> (deleted)", message.message_id);
                Ok(())
            }
            None => Err(GatewayError::not_found(message.message_id.clone())),
        }
    }

    async fn react(&self, message: &MessageRef, emoji: &str) -> GatewayResult<()> {
        println!("<{}> + {emoji}", message.message_id);
        Ok(())
    }

    async fn fetch_message(&self, message: &MessageRef) -> GatewayResult<MessageView> {
        self.messages
            .lock()
            .get(&message.message_id)
            .cloned()
            .ok_or_else(|| GatewayError::not_found(message.message_id.clone()))
    }

    async fn pin_message(&self, message: &MessageRef) -> GatewayResult<()> {
        if !self.messages.lock().contains_key(&message.message_id) {
            return Err(GatewayError::not_found(message.message_id.clone()));
        }
        self.pinned.lock().insert(message.message_id.clone());
        Ok(())
    }

    async fn unpin_message(&self, message: &MessageRef) -> GatewayResult<()> {
        self.pinned.lock().remove(&message.message_id);
        Ok(())
    }

    async fn member_can_manage_messages(
        &self,
        _channel_id: &str,
        user_id: &str,
    ) -> GatewayResult<bool> {
        Ok(self.moderators.contains(user_id))
    }

    async fn autocomplete(
        &self,
        interaction: &InteractionRef,
        choices: Vec<AutocompleteChoice>,
    ) -> GatewayResult<()> {
        let listed: Vec<String> = choices
            .iter()
            .map(|c| format!("{} = {}", c.name, c.value))
            .collect();
        println!("<{}> suggestions: {}", interaction.id, listed.join(", "));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use davinci::core::{ActionRow, Button, ButtonStyle, Embed};

    use super::*;

    #[test]
    fn test_render_embed_and_buttons() {
        let reply = Reply {
            embeds: vec![Embed::new().title("Help").field("ping", "Pong", false).footer("Page 1 / 2", None)],
            components: vec![ActionRow::new([
                Button::new("left-u1", ButtonStyle::Primary).emoji("⬅️"),
                Button::new("right-u1", ButtonStyle::Primary).emoji("➡️").disabled(true),
            ])],
            visibility: Visibility::Ephemeral,
            ..Reply::default()
        };
        let text = render("<m1> Da Vinci:", &reply);

        assert!(text.starts_with("<m1> Da Vinci: (only you can see this)"));
        assert!(text.contains("┃ • ping: Pong"));
        assert!(text.contains("Page 1 / 2"));
        assert!(text.ends_with("[⬅️ left-u1] [➡️ right-u1 disabled]"));
    }

    #[tokio::test]
    async fn test_sent_messages_can_be_fetched_and_deleted() {
        let gateway = ConsoleGateway::new(["u1".to_string()], None);
        let origin = Origin::Message(MessageRef::new("console", "m0"));
        let sent = gateway.respond(&origin, Reply::text("hello")).await.unwrap();

        let view = gateway.fetch_message(&sent).await.unwrap();
        assert_eq!(view.content, "hello");
        assert!(view.author.bot);

        gateway.delete_message(&sent).await.unwrap();
        assert!(gateway.fetch_message(&sent).await.is_err());
        assert!(gateway.member_can_manage_messages("console", "u1").await.unwrap());
        assert!(!gateway.member_can_manage_messages("console", "u2").await.unwrap());
    }
}
