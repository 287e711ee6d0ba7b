//! # Da Vinci
//!
//! A chat-platform bot: paginated help, pin/unpin, per-user bookmarks and
//! image rotation / greyscale with follow-up buttons.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  InboundEvent  ┌─────────┐     ┌──────────────────────────┐
//! │   platform   │───────────────▶│ Router  │────▶│ command / button handler │──▶ services
//! │ (your code)  │◀───────────────│         │────▶│ pagination session task  │
//! └──────────────┘    Gateway     └─────────┘     └──────────────────────────┘
//! ```
//!
//! - **core**: platform-neutral events, messages and the outbound [`Gateway`](core::Gateway)
//! - **framework**: registries, router, button tokens, pagination sessions
//! - **media** / **storage**: image pipeline and bookmark stores
//! - **commands**: the command set
//! - **runtime**: configuration, logging and the event loop
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use davinci::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let gateway: BoxedGateway = MyPlatform::connect().await?;
//!     let (tx, rx) = tokio::sync::mpsc::channel(64);
//!     let runtime = DavinciRuntime::builder(gateway).build()?;
//!     // forward platform events into `tx`
//!     runtime.run(rx).await?;
//!     Ok(())
//! }
//! ```

pub use davinci_commands as commands;
pub use davinci_core as core;
pub use davinci_framework as framework;
pub use davinci_media as media;
pub use davinci_runtime as runtime;
pub use davinci_storage as storage;

/// Commonly used types.
pub mod prelude {
    pub use davinci_runtime::{ConfigLoader, DavinciConfig, DavinciRuntime, LoggingBuilder};

    pub use davinci_core::{
        AutocompleteChoice, BoxedGateway, DeferKind, Embed, Gateway, GatewayError, GatewayResult,
        InboundEvent, MessageRef, MessageView, Origin, Reply, User,
    };

    pub use davinci_framework::{
        CommandDefinition, HandlerError, HandlerResult, InvocationContext, Router,
        RuntimeContext,
    };

    pub use davinci_media::ImagePipeline;
    pub use davinci_storage::{Bookmark, BookmarkFilter, BookmarkStore};

    pub use davinci_runtime::prelude::*;
}
