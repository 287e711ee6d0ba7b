use std::sync::Arc;

use davinci_core::{EmbedKind, Reply};
use davinci_framework::{CommandDefinition, HandlerResult, InvocationContext, create_embed};
use time::OffsetDateTime;

pub fn command() -> CommandDefinition {
    CommandDefinition::new("ping", ping).description("Get the bot's ping")
}

async fn ping(ctx: Arc<InvocationContext>, _args: Vec<String>) -> HandlerResult {
    let sent_ms = ctx.message().map_or(0, |m| m.created_at_ms);
    let now_ms = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;
    let latency = now_ms.saturating_sub(sent_ms).max(0);

    let embed = create_embed(EmbedKind::Success, ctx.actor())
        .title("Pong!")
        .description(format!("Bot's ping is {latency}ms 🏓"));
    ctx.reply(Reply::embed(embed)).await?;
    Ok(())
}
