//! Image transforms: `rotate`/`blackwhite` text commands, the message
//! context-menu entries, and the buttons attached to their output.

use std::sync::Arc;

use davinci_core::{ActionRow, Button, ButtonStyle, FileUpload, MessageView, Reply};
use davinci_framework::{
    ButtonBinding, ButtonToken, CommandDefinition, HandlerError, HandlerResult, InvocationContext,
    emojis,
};
use davinci_media::{
    ImagePipeline, MediaError, Transform, first_image, output_filename,
};
use tracing::debug;

use crate::reply::fail;

pub const ROTATE_LEFT: &str = "rotate_left";
pub const ROTATE_RIGHT: &str = "rotate_right";
pub const DELETE: &str = "delete";

/// Clockwise angles offered in the message context menu.
pub const CONTEXT_MENU_ANGLES: [i32; 4] = [90, -90, 180, 270];
pub const CONTEXT_MENU_GREYSCALE: &str = "Black & White";

/// User-facing wording for one kind of transform.
#[derive(Debug, Clone, Copy)]
struct Wording {
    no_image: &'static str,
    failed: &'static str,
    stem: &'static str,
}

const ROTATE: Wording = Wording {
    no_image: "Please reply to an image to rotate it.",
    failed: "Failed to rotate the image.",
    stem: "rotated",
};

const FILTER: Wording = Wording {
    no_image: "Please reply to an image to apply filter to it.",
    failed: "Failed to apply filter to the image.",
    stem: "blackwhite",
};

fn delete_button(owner: &str) -> Button {
    Button::new(ButtonToken::render(DELETE, Some(owner)), ButtonStyle::Danger).emoji(emojis::BIN)
}

/// Rotate left, rotate right and delete, owned by `owner`.
pub fn rotation_buttons(owner: &str) -> ActionRow {
    ActionRow::new([
        Button::new(ButtonToken::render(ROTATE_LEFT, Some(owner)), ButtonStyle::Primary)
            .emoji(emojis::LEFT_HOOK),
        Button::new(ButtonToken::render(ROTATE_RIGHT, Some(owner)), ButtonStyle::Primary)
            .emoji(emojis::RIGHT_HOOK),
        delete_button(owner),
    ])
}

pub fn delete_buttons(owner: &str) -> ActionRow {
    ActionRow::new([delete_button(owner)])
}

// ─── Commands ────────────────────────────────────────────────────────────────

pub fn rotate_command() -> CommandDefinition {
    CommandDefinition::new("rotate", rotate)
        .aliases(["rt"])
        .description("Rotate an image")
        .usage("<angle>")
}

pub fn blackwhite_command() -> CommandDefinition {
    CommandDefinition::new("blackwhite", blackwhite)
        .aliases(["bw"])
        .description("Convert an image to black and white")
}

/// `Rotate <n>deg` context-menu entries plus `Black & White`.
pub fn context_menu_commands() -> Vec<CommandDefinition> {
    let mut commands: Vec<_> = CONTEXT_MENU_ANGLES
        .into_iter()
        .map(|degrees| {
            CommandDefinition::new(
                format!("Rotate {degrees}deg"),
                move |ctx: Arc<InvocationContext>, _args: Vec<String>| rotate_target(ctx, degrees),
            )
        })
        .collect();
    commands.push(CommandDefinition::new(CONTEXT_MENU_GREYSCALE, greyscale_target));
    commands
}

/// Button bindings for the transform output. All owner-only.
pub fn button_bindings() -> Vec<ButtonBinding> {
    vec![
        ButtonBinding::new(ROTATE_LEFT, |ctx: Arc<InvocationContext>| rotate_host(ctx, -90))
            .owner_only(),
        ButtonBinding::new(ROTATE_RIGHT, |ctx: Arc<InvocationContext>| rotate_host(ctx, 90))
            .owner_only(),
        ButtonBinding::new(DELETE, delete_host).owner_only(),
    ]
}

// ─── Handlers ────────────────────────────────────────────────────────────────

async fn rotate(ctx: Arc<InvocationContext>, args: Vec<String>) -> HandlerResult {
    let Some(raw) = args.first() else {
        return fail(
            &ctx,
            "No angle provided",
            "Please provide an angle to rotate the image by.",
        )
        .await;
    };
    let Ok(degrees) = raw.parse::<i32>() else {
        return fail(&ctx, "Invalid angle", "The angle must be a whole number of degrees.").await;
    };

    let source = ctx.replied_message().await?;
    let row = rotation_buttons(&ctx.actor().id);
    transform_and_reply(&ctx, source, Transform::Rotate(degrees), ROTATE, row).await
}

async fn blackwhite(ctx: Arc<InvocationContext>, _args: Vec<String>) -> HandlerResult {
    let source = ctx.replied_message().await?;
    let row = delete_buttons(&ctx.actor().id);
    transform_and_reply(&ctx, source, Transform::Greyscale, FILTER, row).await
}

async fn rotate_target(ctx: Arc<InvocationContext>, degrees: i32) -> HandlerResult {
    let source = ctx.target_message().await?;
    let row = rotation_buttons(&ctx.actor().id);
    transform_and_reply(&ctx, source, Transform::Rotate(degrees), ROTATE, row).await
}

async fn greyscale_target(ctx: Arc<InvocationContext>, _args: Vec<String>) -> HandlerResult {
    let source = ctx.target_message().await?;
    let row = delete_buttons(&ctx.actor().id);
    transform_and_reply(&ctx, source, Transform::Greyscale, FILTER, row).await
}

/// Re-rotates the image on the button's host message in place.
async fn rotate_host(ctx: Arc<InvocationContext>, degrees: i32) -> HandlerResult {
    let Some(host) = ctx.host_message().cloned() else {
        return Ok(());
    };
    let message = ctx.gateway().fetch_message(&host).await?;
    let Some(url) = first_image(&message).map(str::to_string) else {
        return fail(&ctx, "No image found", ROTATE.no_image).await;
    };

    let filename = named_output(&ctx, &url, ROTATE).await?;
    let output = run(&ctx, &url, Transform::Rotate(degrees), ROTATE).await?;

    let owner = ctx
        .button_token()
        .and_then(|t| t.owner())
        .unwrap_or(ctx.actor().id.as_str())
        .to_string();
    let edit = Reply::new()
        .with_file(FileUpload::new(filename, output))
        .with_row(rotation_buttons(&owner));
    ctx.gateway().edit_message(&host, edit).await?;
    Ok(())
}

async fn delete_host(ctx: Arc<InvocationContext>) -> HandlerResult {
    if let Some(host) = ctx.host_message() {
        ctx.gateway().delete_message(host).await?;
    }
    Ok(())
}

// ─── Shared flow ─────────────────────────────────────────────────────────────

/// Fetches and transforms `url`. Failures are answered before they are
/// returned as [`HandlerError::Reported`].
async fn run(
    ctx: &InvocationContext,
    url: &str,
    transform: Transform,
    wording: Wording,
) -> HandlerResult<Vec<u8>> {
    let pipeline = ctx.require_service::<ImagePipeline>()?;
    match pipeline.process(url, transform).await {
        Ok(bytes) => Ok(bytes),
        Err(e) => {
            let description = match e {
                MediaError::Fetch(_) => "Failed to fetch the image.",
                _ => wording.failed,
            };
            if let Err(reply_err) = fail(ctx, "Error", description).await {
                debug!(error = %reply_err, "Could not report image failure");
            }
            Err(HandlerError::reported(HandlerError::other(e)))
        }
    }
}

/// Output filename keeping the source extension. A URL without one is
/// answered before it is returned as [`HandlerError::Reported`].
async fn named_output(
    ctx: &InvocationContext,
    url: &str,
    wording: Wording,
) -> HandlerResult<String> {
    match output_filename(wording.stem, url) {
        Ok(name) => Ok(name),
        Err(e) => {
            if let Err(reply_err) = fail(ctx, "Error", wording.failed).await {
                debug!(error = %reply_err, "Could not report image failure");
            }
            Err(HandlerError::reported(HandlerError::other(MediaError::from(e))))
        }
    }
}

async fn transform_and_reply(
    ctx: &InvocationContext,
    source: Option<MessageView>,
    transform: Transform,
    wording: Wording,
    row: ActionRow,
) -> HandlerResult {
    let Some(url) = source.as_ref().and_then(first_image).map(str::to_string) else {
        return fail(ctx, "No image found", wording.no_image).await;
    };

    let filename = named_output(ctx, &url, wording).await?;
    let output = run(ctx, &url, transform, wording).await?;
    ctx.reply(Reply::new().with_file(FileUpload::new(filename, output)).with_row(row))
        .await?;
    Ok(())
}
