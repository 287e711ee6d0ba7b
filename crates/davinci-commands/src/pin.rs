//! `pin` and `unpin`.

use std::sync::Arc;

use davinci_framework::{CommandDefinition, HandlerResult, InvocationContext, emojis};
use tracing::warn;

use crate::reply::fail;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PinAction {
    Pin,
    Unpin,
}

impl PinAction {
    fn verb(self) -> &'static str {
        match self {
            Self::Pin => "pin",
            Self::Unpin => "unpin",
        }
    }
}

pub fn pin_command() -> CommandDefinition {
    CommandDefinition::new("pin", |ctx: Arc<InvocationContext>, _args: Vec<String>| {
        toggle(ctx, PinAction::Pin)
    })
    .description("Pin a message")
}

pub fn unpin_command() -> CommandDefinition {
    CommandDefinition::new("unpin", |ctx: Arc<InvocationContext>, _args: Vec<String>| {
        toggle(ctx, PinAction::Unpin)
    })
    .description("Unpin a message")
}

async fn toggle(ctx: Arc<InvocationContext>, action: PinAction) -> HandlerResult {
    if ctx.is_direct() {
        return Ok(());
    }
    let verb = action.verb();

    let Some(target) = ctx.replied_message().await? else {
        return fail(
            &ctx,
            "No message to pin",
            &format!("You need to reply to a message to {verb} it."),
        )
        .await;
    };

    let allowed = ctx
        .gateway()
        .member_can_manage_messages(ctx.channel_id(), &ctx.actor().id)
        .await?;
    if !allowed {
        return fail(
            &ctx,
            "Missing Permissions",
            &format!("You need the `MANAGE_MESSAGES` permission to {verb} messages."),
        )
        .await;
    }

    let reference = target.to_ref();
    let result = match action {
        PinAction::Pin => ctx.gateway().pin_message(&reference).await,
        PinAction::Unpin => ctx.gateway().unpin_message(&reference).await,
    };
    if let Err(e) = result {
        warn!(message_id = %reference.message_id, error = %e, "Failed to {verb} message");
        return fail(
            &ctx,
            &format!("Unable to {verb}"),
            &format!(
                "Error while {verb}ning the message. Please check my permissions before running the command."
            ),
        )
        .await;
    }

    ctx.react(emojis::PIN).await
}
