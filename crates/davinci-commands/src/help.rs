//! `help [command]`.

use std::sync::Arc;

use davinci_core::{Embed, EmbedKind, Reply};
use davinci_framework::{
    CommandDefinition, HandlerResult, InvocationContext, create_embed,
};

use crate::reply::fail;

pub fn command() -> CommandDefinition {
    CommandDefinition::new("help", help)
        .description("Shows a list of all commands")
        .usage("<command?>")
}

fn usage_line(prefix: &str, definition: &CommandDefinition) -> String {
    format!("{prefix}{} {}", definition.name(), definition.usage_text())
        .trim_end()
        .to_string()
}

fn aliases(definition: &CommandDefinition) -> String {
    match definition.alias_list() {
        [] => "None".to_string(),
        list => list.join(", "),
    }
}

async fn help(ctx: Arc<InvocationContext>, args: Vec<String>) -> HandlerResult {
    let prefix = ctx.settings().prefix.clone();
    let registry = ctx.runtime().text_commands();

    if let Some(name) = args.first() {
        let Ok(definition) = registry.resolve_ignore_case(name) else {
            return fail(
                &ctx,
                "Command not found",
                &format!("The command `{name}` does not exist"),
            )
            .await;
        };

        let embed = create_embed(EmbedKind::Info, ctx.actor())
            .title(definition.name())
            .description(definition.description_text())
            .field("Aliases", aliases(&definition), true)
            .field("Usage", format!("`{}`", usage_line(&prefix, &definition)), true);
        ctx.reply(Reply::embed(embed)).await?;
        return Ok(());
    }

    let entries: Vec<_> = registry.iter().collect();
    let pages: Vec<Embed> = entries
        .chunks(ctx.settings().help_page_size.max(1))
        .map(|chunk| {
            chunk.iter().fold(
                create_embed(EmbedKind::Info, ctx.actor()).title("Help").description(format!(
                    "Here is a list of all commands\nUse {prefix}help <command> for more info on a specific command"
                )),
                |embed, definition| {
                    embed.field(
                        definition.name(),
                        format!(
                            "{}\nAliases: {} | Usage: `{}`",
                            definition.description_text(),
                            aliases(definition),
                            usage_line(&prefix, definition)
                        ),
                        false,
                    )
                },
            )
        })
        .collect();

    ctx.paginate(pages).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::test_support::{IntoEvent, bot, reply_titles, text};

    #[tokio::test]
    async fn test_help_for_one_command_by_alias() {
        let (router, gateway) = bot();
        router.route(text("m1", "u1", "!help BLS").into_event()).await;

        let replies = gateway.responses();
        let embed = &replies[0].embeds[0];
        assert_eq!(embed.title.as_deref(), Some("bookmark-list"));
        assert_eq!(embed.fields[0].value, "bookmark-ls, bls");
        assert_eq!(embed.fields[1].value, "`!bookmark-list <query?>`");
    }

    #[tokio::test]
    async fn test_help_unknown_command() {
        let (router, gateway) = bot();
        router.route(text("m1", "u1", "!help nope").into_event()).await;
        assert_eq!(reply_titles(&gateway), ["Command not found"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_help_lists_five_commands_per_page() {
        let (router, gateway) = bot();
        let total = router.runtime().text_commands().len();
        router.route(text("m1", "u1", "!help").into_event()).await;

        let first = &gateway.responses()[0];
        let embed = &first.embeds[0];
        assert_eq!(embed.title.as_deref(), Some("Help"));
        assert_eq!(embed.fields.len(), 5.min(total));
        assert_eq!(embed.fields[0].name, "help");
        // Usage without arguments has no trailing space.
        assert!(embed.fields[1].value.ends_with("Usage: `!ping`"));
        assert_eq!(
            embed.footer.as_ref().map(|f| f.text.clone()),
            Some(format!("Page 1 / {}", total.div_ceil(5)))
        );
        assert_eq!(router.runtime().sessions().len(), 1);
    }
}
