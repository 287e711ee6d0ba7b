//! Finding image references on a message.

use davinci_core::MessageView;

/// Every image URL on a message, in lookup order.
///
/// Attachments come first. Then, per embed, its image, thumbnail and footer
/// icon.
pub fn image_urls(message: &MessageView) -> impl Iterator<Item = &str> {
    let attachments = message.attachments.iter().map(|a| a.url.as_str());
    let embeds = message.embeds.iter().flat_map(|embed| {
        [
            embed.image_url.as_deref(),
            embed.thumbnail_url.as_deref(),
            embed.footer.as_ref().and_then(|f| f.icon_url.as_deref()),
        ]
        .into_iter()
        .flatten()
    });
    attachments.chain(embeds)
}

/// The first image URL on a message.
pub fn first_image(message: &MessageView) -> Option<&str> {
    image_urls(message).next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use davinci_core::{Attachment, Embed, User};

    fn message() -> MessageView {
        MessageView {
            id: "m1".into(),
            channel_id: "c1".into(),
            url: String::new(),
            author: User::new("u1", "u1#0001"),
            content: String::new(),
            attachments: Vec::new(),
            embeds: Vec::new(),
            reference: None,
            is_direct: false,
            created_at_ms: 0,
        }
    }

    #[test]
    fn test_attachments_win_over_embeds() {
        let mut m = message();
        m.embeds.push(Embed::new().image("https://e/img.png"));
        m.attachments.push(Attachment {
            filename: "a.jpg".into(),
            url: "https://a/a.jpg".into(),
        });
        assert_eq!(first_image(&m), Some("https://a/a.jpg"));
    }

    #[test]
    fn test_embed_order_is_image_thumbnail_footer() {
        let mut m = message();
        m.embeds.push(Embed::new().footer("f", Some("https://e/icon.png".into())));
        m.embeds.push(
            Embed::new()
                .thumbnail("https://e/thumb.png")
                .image("https://e/big.png"),
        );
        let urls: Vec<_> = image_urls(&m).collect();
        assert_eq!(
            urls,
            ["https://e/icon.png", "https://e/big.png", "https://e/thumb.png"]
        );
    }

    #[test]
    fn test_no_image() {
        let mut m = message();
        m.embeds.push(Embed::new().description("text only"));
        assert_eq!(first_image(&m), None);
    }
}
