//! Reply helpers shared by the commands.

use davinci_core::{EmbedKind, Reply};
use davinci_framework::{HandlerResult, InvocationContext, create_embed};

/// Replies with an error embed carrying `title` and `description`.
///
/// Replies to button presses are ephemeral; everything else is public.
pub(crate) async fn fail(ctx: &InvocationContext, title: &str, description: &str) -> HandlerResult {
    let embed = create_embed(EmbedKind::Error, ctx.actor())
        .title(title)
        .description(description);
    let reply = if ctx.button_token().is_some() {
        Reply::embed(embed).ephemeral()
    } else {
        Reply::embed(embed)
    };
    ctx.reply(reply).await?;
    Ok(())
}

/// Acknowledges success: a reaction on text commands, a success embed on
/// interactions, which have no message to react to.
pub(crate) async fn confirm(ctx: &InvocationContext, emoji: &str, title: &str) -> HandlerResult {
    if ctx.message().is_some() {
        return ctx.react(emoji).await;
    }
    let embed = create_embed(EmbedKind::Success, ctx.actor()).title(format!("{emoji} {title}"));
    ctx.reply(Reply::embed(embed).ephemeral()).await?;
    Ok(())
}
