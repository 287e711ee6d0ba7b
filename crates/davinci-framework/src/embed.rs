//! Embed helpers.

use davinci_core::{Embed, EmbedKind, Reply, User};

/// Starts an embed of the given kind, stamped and signed with the user.
pub fn create_embed(kind: EmbedKind, user: &User) -> Embed {
    let tag = if user.tag.is_empty() {
        "unknown"
    } else {
        user.tag.as_str()
    };
    Embed::new()
        .color(kind.color())
        .timestamp()
        .footer(tag, user.avatar_url.clone())
}

/// An error embed titled `Error`.
pub fn error_embed(user: &User, description: impl Into<String>) -> Embed {
    create_embed(EmbedKind::Error, user)
        .title("Error")
        .description(description)
}

/// An ephemeral reply carrying one [`error_embed`].
pub fn error_reply(user: &User, description: impl Into<String>) -> Reply {
    Reply::embed(error_embed(user, description)).ephemeral()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_embed_signs_with_user() {
        let mut user = User::new("1", "alice#0001");
        user.avatar_url = Some("https://cdn/a.png".into());
        let embed = create_embed(EmbedKind::Success, &user);
        assert_eq!(embed.color, Some(0x00bc7d));
        assert!(embed.timestamp);
        let footer = embed.footer.unwrap();
        assert_eq!(footer.text, "alice#0001");
        assert_eq!(footer.icon_url.as_deref(), Some("https://cdn/a.png"));
    }

    #[test]
    fn test_error_reply_is_ephemeral() {
        let reply = error_reply(&User::new("1", ""), "boom");
        assert!(reply.is_ephemeral());
        let embed = &reply.embeds[0];
        assert_eq!(embed.title.as_deref(), Some("Error"));
        assert_eq!(embed.description.as_deref(), Some("boom"));
        assert_eq!(embed.footer.as_ref().unwrap().text, "unknown");
    }
}
