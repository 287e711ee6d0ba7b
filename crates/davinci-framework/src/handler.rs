//! Handler traits.
//!
//! Handlers are plain async functions. Blanket implementations turn any
//! `Fn(Arc<InvocationContext>, ..) -> impl Future<Output = HandlerResult<_>>`
//! into the matching trait, so commands are written as:
//!
//! ```rust,ignore
//! async fn ping(ctx: Arc<InvocationContext>, _args: Vec<String>) -> HandlerResult {
//!     ctx.reply(Reply::text("Pong!")).await?;
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use davinci_core::AutocompleteChoice;

use crate::context::InvocationContext;
use crate::error::HandlerResult;

/// A type alias for a boxed, pinned future that is `Send`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Executes a command with its positional arguments.
pub trait CommandHandler: Send + Sync + 'static {
    fn call(&self, ctx: Arc<InvocationContext>, args: Vec<String>) -> BoxFuture<'static, HandlerResult>;
}

impl<F, Fut> CommandHandler for F
where
    F: Fn(Arc<InvocationContext>, Vec<String>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, ctx: Arc<InvocationContext>, args: Vec<String>) -> BoxFuture<'static, HandlerResult> {
        Box::pin(self(ctx, args))
    }
}

/// Produces autocomplete suggestions for partial input.
pub trait SuggestHandler: Send + Sync + 'static {
    fn call(
        &self,
        ctx: Arc<InvocationContext>,
        partial: String,
    ) -> BoxFuture<'static, HandlerResult<Vec<AutocompleteChoice>>>;
}

impl<F, Fut> SuggestHandler for F
where
    F: Fn(Arc<InvocationContext>, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult<Vec<AutocompleteChoice>>> + Send + 'static,
{
    fn call(
        &self,
        ctx: Arc<InvocationContext>,
        partial: String,
    ) -> BoxFuture<'static, HandlerResult<Vec<AutocompleteChoice>>> {
        Box::pin(self(ctx, partial))
    }
}

/// Reacts to a button press.
pub trait ButtonHandler: Send + Sync + 'static {
    fn call(&self, ctx: Arc<InvocationContext>) -> BoxFuture<'static, HandlerResult>;
}

impl<F, Fut> ButtonHandler for F
where
    F: Fn(Arc<InvocationContext>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, ctx: Arc<InvocationContext>) -> BoxFuture<'static, HandlerResult> {
        Box::pin(self(ctx))
    }
}

pub type BoxedCommandHandler = Arc<dyn CommandHandler>;
pub type BoxedSuggestHandler = Arc<dyn SuggestHandler>;
pub type BoxedButtonHandler = Arc<dyn ButtonHandler>;
