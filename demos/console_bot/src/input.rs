//! Turns terminal lines into inbound events.
//!
//! ```text
//! <text>                          a message, e.g. `!help` or `hello`
//! :reply <id> <text>              a message replying to message <id>
//! :attach <url> [text]            a message with an image attachment
//! :slash <name>[/<sub>] [args]    a slash command
//! :menu <id> <name>               a context-menu command on message <id>
//! :complete <name>[/<sub>] <text> an autocomplete request
//! :press <id> <custom-id>         a button click on message <id>
//! :delete <id>                    delete message <id>
//! :quit
//! ```

use davinci::core::{
    Attachment, AutocompleteRequest, ButtonPress, CommandInvocation, InboundEvent,
    InteractionRef, MessageDeleted, MessageRef, MessageView, TextMessage, User,
};

pub const CHANNEL: &str = "console";

#[derive(Debug, PartialEq)]
pub enum Line {
    Event(InboundEvent),
    Quit,
    Usage(&'static str),
    Empty,
}

/// Builds events on behalf of one console user.
pub struct Console<F> {
    user: User,
    next_id: F,
}

impl<F: Fn(char) -> String> Console<F> {
    pub fn new(user: User, next_id: F) -> Self {
        Self { user, next_id }
    }

    pub fn parse(&self, line: &str) -> Line {
        let line = line.trim();
        if line.is_empty() {
            return Line::Empty;
        }
        let Some(directive) = line.strip_prefix(':') else {
            return Line::Event(self.message(line, None, Vec::new()));
        };

        let (verb, rest) = directive.split_once(' ').unwrap_or((directive, ""));
        let rest = rest.trim();
        match verb {
            "quit" | "q" => Line::Quit,
            "reply" => match rest.split_once(' ') {
                Some((id, text)) => {
                    let target = MessageRef::new(CHANNEL, id);
                    Line::Event(self.message(text.trim(), Some(target), Vec::new()))
                }
                None => Line::Usage(":reply <id> <text>"),
            },
            "attach" => {
                let (url, text) = rest.split_once(' ').unwrap_or((rest, ""));
                if url.is_empty() {
                    return Line::Usage(":attach <url> [text]");
                }
                let filename = url.rsplit('/').next().unwrap_or(url).to_string();
                let attachment = Attachment {
                    filename,
                    url: url.to_string(),
                };
                Line::Event(self.message(text.trim(), None, vec![attachment]))
            }
            "slash" => {
                let mut words = rest.split_whitespace();
                let Some(path) = words.next() else {
                    return Line::Usage(":slash <name>[/<sub>] [args]");
                };
                let (name, subcommand) = split_path(path);
                Line::Event(InboundEvent::Command(CommandInvocation {
                    interaction: self.interaction(),
                    name,
                    group: None,
                    subcommand,
                    args: words.map(str::to_string).collect(),
                    target_message_id: None,
                    actor: self.user.clone(),
                }))
            }
            "menu" => match rest.split_once(' ') {
                Some((id, name)) => Line::Event(InboundEvent::Command(CommandInvocation {
                    interaction: self.interaction(),
                    name: name.trim().to_string(),
                    group: None,
                    subcommand: None,
                    args: Vec::new(),
                    target_message_id: Some(id.to_string()),
                    actor: self.user.clone(),
                })),
                None => Line::Usage(":menu <id> <name>"),
            },
            "complete" => {
                let (path, partial) = rest.split_once(' ').unwrap_or((rest, ""));
                if path.is_empty() {
                    return Line::Usage(":complete <name>[/<sub>] <text>");
                }
                let (name, subcommand) = split_path(path);
                Line::Event(InboundEvent::Autocomplete(AutocompleteRequest {
                    interaction: self.interaction(),
                    name,
                    group: None,
                    subcommand,
                    partial: partial.trim().to_string(),
                    actor: self.user.clone(),
                }))
            }
            "press" => match rest.split_once(' ') {
                Some((id, token)) => Line::Event(InboundEvent::ButtonPress(ButtonPress {
                    interaction: self.interaction(),
                    token: token.trim().to_string(),
                    actor: self.user.clone(),
                    host_message: MessageRef::new(CHANNEL, id),
                })),
                None => Line::Usage(":press <id> <custom-id>"),
            },
            "delete" if !rest.is_empty() => Line::Event(InboundEvent::MessageDeleted(MessageDeleted {
                message: MessageRef::new(CHANNEL, rest),
            })),
            "delete" => Line::Usage(":delete <id>"),
            _ => Line::Usage("unknown directive, try :slash, :reply, :press or :quit"),
        }
    }

    fn interaction(&self) -> InteractionRef {
        InteractionRef::new((self.next_id)('i'), CHANNEL)
    }

    fn message(
        &self,
        content: &str,
        reference: Option<MessageRef>,
        attachments: Vec<Attachment>,
    ) -> InboundEvent {
        let id = (self.next_id)('m');
        InboundEvent::TextMessage(TextMessage {
            message: MessageView {
                url: format!("console://{CHANNEL}/{id}"),
                id,
                channel_id: CHANNEL.to_string(),
                author: self.user.clone(),
                content: content.to_string(),
                attachments,
                embeds: Vec::new(),
                reference,
                is_direct: false,
                created_at_ms: crate::now_ms(),
            },
        })
    }
}

fn split_path(path: &str) -> (String, Option<String>) {
    match path.split_once('/') {
        Some((name, sub)) => (name.to_string(), Some(sub.to_string())),
        None => (path.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn console() -> Console<impl Fn(char) -> String> {
        let counter = Cell::new(0);
        Console::new(User::new("u1", "you#0001"), move |prefix: char| {
            counter.set(counter.get() + 1);
            format!("{prefix}{}", counter.get())
        })
    }

    #[test]
    fn test_plain_text_is_a_message() {
        let Line::Event(InboundEvent::TextMessage(msg)) = console().parse("!ping") else {
            panic!("expected a text message");
        };
        assert_eq!(msg.content(), "!ping");
        assert_eq!(msg.message.id, "m1");
        assert!(msg.message.reference.is_none());
    }

    #[test]
    fn test_reply_sets_reference() {
        let Line::Event(InboundEvent::TextMessage(msg)) = console().parse(":reply m7 !pin") else {
            panic!("expected a text message");
        };
        assert_eq!(msg.content(), "!pin");
        assert_eq!(msg.message.reference, Some(MessageRef::new(CHANNEL, "m7")));
    }

    #[test]
    fn test_slash_with_subcommand() {
        let Line::Event(InboundEvent::Command(cmd)) = console().parse(":slash bookmark/search cats tag")
        else {
            panic!("expected a command");
        };
        assert_eq!(cmd.name, "bookmark");
        assert_eq!(cmd.subcommand.as_deref(), Some("search"));
        assert_eq!(cmd.args, ["cats", "tag"]);
    }

    #[test]
    fn test_menu_keeps_spaces_in_name() {
        let Line::Event(InboundEvent::Command(cmd)) = console().parse(":menu m3 Rotate 90deg") else {
            panic!("expected a command");
        };
        assert_eq!(cmd.name, "Rotate 90deg");
        assert_eq!(cmd.target_message_id.as_deref(), Some("m3"));
    }

    #[test]
    fn test_press_and_usage() {
        let Line::Event(InboundEvent::ButtonPress(press)) = console().parse(":press m2 right-u1") else {
            panic!("expected a button press");
        };
        assert_eq!(press.token, "right-u1");
        assert_eq!(press.host_message.message_id, "m2");

        assert!(matches!(console().parse(":press"), Line::Usage(_)));
        assert_eq!(console().parse("   "), Line::Empty);
        assert_eq!(console().parse(":q"), Line::Quit);
    }
}
