//! Bookmarks: text commands and the `/bookmark` application command.
//!
//! The list, search and delete handlers are shared. Text commands confirm
//! with a reaction; the slash variants answer with a success embed.

use std::sync::Arc;

use davinci_core::{AutocompleteChoice, Embed, EmbedKind, MessageRef, MessageView, Reply};
use davinci_framework::{
    CommandDefinition, HandlerError, HandlerResult, InvocationContext, RegistryResult,
    RuntimeContextBuilder, Subcommand, SubcommandKey, create_embed, emojis,
};
use davinci_storage::{Bookmark, BookmarkFilter, BookmarkStore, NewBookmark};
use tracing::debug;

use crate::reply::{confirm, fail};

/// Name of the application command carrying the subcommands.
pub const BOOKMARK_COMMAND: &str = "bookmark";

/// Autocomplete answers are capped by the platform.
pub const MAX_SUGGESTIONS: usize = 25;

pub fn create_command() -> CommandDefinition {
    CommandDefinition::new("bookmark-create", create)
        .aliases(["bookmark-add", "bc", "bmcr"])
        .description("Create a bookmark")
        .usage("<tag>, <message-id?>")
}

pub fn list_command() -> CommandDefinition {
    CommandDefinition::new("bookmark-list", list)
        .aliases(["bookmark-ls", "bls"])
        .description("List all bookmarks")
        .usage("<query?>")
}

pub fn search_command() -> CommandDefinition {
    CommandDefinition::new("bookmark-search", search)
        .aliases(["bookmark-query", "bq"])
        .description("Search bookmarks by content, or by tag")
        .usage("<term> <field?>")
}

pub fn delete_command() -> CommandDefinition {
    CommandDefinition::new("bookmark-delete", delete)
        .aliases(["bookmark-del", "bd", "bmdel"])
        .description("Delete a bookmark")
        .usage("<id>")
}

/// Registers `/bookmark` and its `list`, `delete` and `search` subcommands.
pub fn install_application(builder: &mut RuntimeContextBuilder) -> RegistryResult<()> {
    builder.command(
        CommandDefinition::with_subcommands(BOOKMARK_COMMAND).description("Manage your bookmarks"),
    )?;
    builder
        .subcommand(
            SubcommandKey::new(BOOKMARK_COMMAND, None, "list"),
            Subcommand::new(list),
        )?
        .subcommand(
            SubcommandKey::new(BOOKMARK_COMMAND, None, "delete"),
            Subcommand::new(delete).suggest(suggest_ids),
        )?
        .subcommand(
            SubcommandKey::new(BOOKMARK_COMMAND, None, "search"),
            Subcommand::new(search),
        )?;
    Ok(())
}

/// Marks a storage failure as already answered with `title`.
async fn storage_failure(
    ctx: &InvocationContext,
    title: &str,
    description: &str,
    err: davinci_storage::StorageError,
) -> HandlerError {
    if let Err(reply_err) = fail(ctx, title, description).await {
        debug!(error = %reply_err, "Could not report storage failure");
    }
    HandlerError::reported(HandlerError::other(err))
}

/// `<tag>[, <message-id>]` from whitespace-split arguments.
fn parse_create_args(args: &[String]) -> (String, Option<String>) {
    let joined = args.join(" ");
    let mut parts = joined.splitn(2, ',');
    let tag = parts.next().unwrap_or_default().trim().to_string();
    let message_id = parts
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    (tag, message_id)
}

fn bookmark_content(message: &MessageView) -> Option<String> {
    if !message.content.is_empty() {
        return Some(message.content.clone());
    }
    message
        .embeds
        .first()
        .and_then(|e| e.description.clone())
        .filter(|d| !d.is_empty())
}

async fn create(ctx: Arc<InvocationContext>, args: Vec<String>) -> HandlerResult {
    let store = ctx.require_service::<dyn BookmarkStore>()?;
    let (tag, message_id) = parse_create_args(&args);

    if tag.is_empty() {
        return fail(&ctx, "Invalid arguments", "Please provide the tag of the bookmark.").await;
    }
    if message_id
        .as_deref()
        .is_some_and(|id| !id.chars().all(|c| c.is_ascii_digit()))
    {
        return fail(
            &ctx,
            "Invalid arguments",
            "The message id must be a number. Format is `<tag>, <message-id?>`.",
        )
        .await;
    }

    let source = match ctx.replied_message().await? {
        Some(message) => message,
        None => match message_id {
            Some(id) => {
                let reference = MessageRef::new(ctx.channel_id(), id);
                ctx.gateway().fetch_message(&reference).await?
            }
            None => {
                return fail(
                    &ctx,
                    "No message to bookmark",
                    "You need to reply to a message to bookmark it. If you want to bookmark a message by id, please provide the message id.",
                )
                .await;
            }
        },
    };

    let Some(content) = bookmark_content(&source) else {
        return fail(
            &ctx,
            "No content to bookmark",
            "The message you are trying to bookmark has no content or embed description.",
        )
        .await;
    };

    let new = NewBookmark::new(ctx.actor().id.clone(), tag, content, source.url.clone());
    if let Err(e) = store.create(new).await {
        return Err(storage_failure(
            &ctx,
            "Error creating bookmark",
            "An error occurred while creating the bookmark.",
            e,
        )
        .await);
    }

    confirm(&ctx, emojis::BOOKMARK, "Bookmark created").await
}

fn pages(ctx: &InvocationContext, title: &str, bookmarks: &[Bookmark]) -> Vec<Embed> {
    bookmarks
        .chunks(ctx.settings().bookmark_page_size.max(1))
        .map(|chunk| {
            chunk.iter().fold(
                create_embed(EmbedKind::Info, ctx.actor()).title(title),
                |embed, b| {
                    embed.field(
                        format!("({}) {} - {}", b.id, b.tag, b.message_url),
                        b.content.clone(),
                        false,
                    )
                },
            )
        })
        .collect()
}

async fn show(
    ctx: &InvocationContext,
    title: &str,
    filter: BookmarkFilter,
    empty: &str,
) -> HandlerResult {
    let store = ctx.require_service::<dyn BookmarkStore>()?;
    let bookmarks = match store.find(&ctx.actor().id, &filter).await {
        Ok(found) => found,
        Err(e) => {
            return Err(storage_failure(
                ctx,
                "Error listing bookmarks",
                "An error occurred while listing the bookmarks.",
                e,
            )
            .await);
        }
    };

    if bookmarks.is_empty() {
        let embed = create_embed(EmbedKind::Info, ctx.actor())
            .title("No bookmarks")
            .description(empty);
        ctx.reply(Reply::embed(embed)).await?;
        return Ok(());
    }

    ctx.paginate(pages(ctx, title, &bookmarks)).await?;
    Ok(())
}

async fn list(ctx: Arc<InvocationContext>, args: Vec<String>) -> HandlerResult {
    let query = args.join(" ");
    let filter = if query.is_empty() {
        BookmarkFilter::All
    } else {
        BookmarkFilter::Tag(query)
    };
    show(&ctx, "Bookmarks", filter, "You have no bookmarks.").await
}

async fn search(ctx: Arc<InvocationContext>, args: Vec<String>) -> HandlerResult {
    let Some(term) = args.first().filter(|t| !t.is_empty()) else {
        return fail(&ctx, "Invalid arguments", "Please provide a search term.").await;
    };
    let filter = BookmarkFilter::search(term.clone(), args.get(1).map(String::as_str));
    show(&ctx, "Search results", filter, "No bookmarks match your search.").await
}

/// Bookmark ids are plain digit strings; signs are rejected.
fn parse_id(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

async fn delete(ctx: Arc<InvocationContext>, args: Vec<String>) -> HandlerResult {
    let store = ctx.require_service::<dyn BookmarkStore>()?;
    let Some(id) = args.first().map(String::as_str).and_then(parse_id) else {
        return fail(
            &ctx,
            "Invalid arguments",
            "Please provide the id of the bookmark to delete.",
        )
        .await;
    };

    let user_id = ctx.actor().id.clone();
    let deleted = match store.find_by_id(&user_id, id).await {
        Ok(Some(_)) => store.delete(&user_id, id).await,
        Ok(None) => {
            return fail(
                &ctx,
                "Bookmark not found",
                "The bookmark with the provided id was not found.",
            )
            .await;
        }
        Err(e) => Err(e),
    };
    if let Err(e) = deleted {
        return Err(storage_failure(
            &ctx,
            "Error deleting bookmark",
            "An error occurred while deleting the bookmark.",
            e,
        )
        .await);
    }

    confirm(&ctx, emojis::BIN, "Bookmark deleted").await
}

/// Suggests the actor's bookmark ids starting with the partial input.
async fn suggest_ids(
    ctx: Arc<InvocationContext>,
    partial: String,
) -> HandlerResult<Vec<AutocompleteChoice>> {
    let store = ctx.require_service::<dyn BookmarkStore>()?;
    let bookmarks = store
        .find(&ctx.actor().id, &BookmarkFilter::All)
        .await
        .map_err(HandlerError::other)?;

    Ok(bookmarks
        .into_iter()
        .map(|b| (b.id.to_string(), b.tag))
        .filter(|(id, _)| id.starts_with(partial.trim()))
        .take(MAX_SUGGESTIONS)
        .map(|(id, tag)| AutocompleteChoice::new(format!("({id}) {tag}"), id))
        .collect())
}
