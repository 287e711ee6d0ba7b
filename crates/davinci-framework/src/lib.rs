//! # Da Vinci Framework
//!
//! The dispatch and correlation core of the bot.
//!
//! - [`CommandRegistry`]: name/alias lookup for application and text commands
//! - [`Router`]: classifies inbound events and runs exactly one handler each,
//!   behind an isolating boundary
//! - [`ButtonToken`] / [`ButtonRouter`]: `action[-ownerId]` correlation with
//!   per-binding authorization
//! - [`paginate`]: multi-page embeds driven by a per-message session task
//! - [`SubcommandTable`]: `(command, group, subcommand)` dispatch
//!
//! Everything a handler can reach lives in one explicitly built
//! [`RuntimeContext`]; there is no global client.

pub mod button;
pub mod constants;
pub mod context;
pub mod embed;
pub mod error;
pub mod handler;
pub mod pagination;
pub mod registry;
pub mod router;
pub mod subcommand;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use button::{AuthorizeFn, ButtonBinding, ButtonRouter, ButtonToken, DENIAL_NOTICE, denial_reply};
pub use constants::{DEFAULT_PAGINATION_TIMEOUT_MS, DEFAULT_PREFIX, emojis};
pub use context::{InvocationContext, RuntimeContext, RuntimeContextBuilder, Settings, Trigger};
pub use embed::{create_embed, error_embed, error_reply};
pub use error::{BoxError, HandlerError, HandlerResult, RegistryError, RegistryResult};
pub use handler::{
    BoxFuture, BoxedButtonHandler, BoxedCommandHandler, BoxedSuggestHandler, ButtonHandler,
    CommandHandler, SuggestHandler,
};
pub use pagination::{
    EndReason, Navigation, PaginationState, SessionHandle, SessionRegistry, SessionSignal,
    SessionSnapshot, SessionState, paginate,
};
pub use registry::{CommandDefinition, CommandRegistry};
pub use router::{BUTTON_FAILURE, COMMAND_FAILURE, RouteOutcome, Router};
pub use subcommand::{Subcommand, SubcommandKey, SubcommandTable, UNKNOWN_SUBCOMMAND};
