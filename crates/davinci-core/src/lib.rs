//! # Da Vinci Core
//!
//! Foundation types shared by every layer of the Da Vinci bot.
//!
//! - **Events**: the inbound variants a gateway delivers ([`InboundEvent`])
//! - **Messages**: outbound replies, embeds and button rows ([`Reply`]), plus
//!   the read-only view of a fetched platform message ([`MessageView`])
//! - **Gateway**: the outbound collaborator the bot talks through ([`Gateway`])
//!
//! The real-time connection itself (heartbeats, reconnects, wire encoding) is
//! not part of this crate. A gateway implementation produces
//! [`InboundEvent`]s and implements [`Gateway`]; everything above that line is
//! platform-agnostic.
//!
//! ```text
//! ┌─────────────┐  InboundEvent  ┌────────────┐  Reply  ┌─────────────┐
//! │   Gateway   │───────────────▶│   Router   │────────▶│   Gateway   │
//! │  (inbound)  │                │ (framework)│         │  (outbound) │
//! └─────────────┘                └────────────┘         └─────────────┘
//! ```

pub mod error;
pub mod event;
pub mod gateway;
pub mod message;

pub use error::{GatewayError, GatewayResult};
pub use event::{
    AutocompleteRequest, ButtonPress, CommandInvocation, EventKind, InboundEvent,
    InteractionRef, MessageDeleted, MessageRef, TextMessage, User,
};
pub use gateway::{AutocompleteChoice, BoxedGateway, DeferKind, Gateway, Origin};
pub use message::{
    ActionRow, Attachment, Button, ButtonStyle, Embed, EmbedField, EmbedFooter, EmbedKind,
    FileUpload, MessageView, Reply, Visibility,
};
