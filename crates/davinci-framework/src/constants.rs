//! Shared constants.

/// Default prefix for text commands.
pub const DEFAULT_PREFIX: &str = "!";

/// Default idle timeout of a pagination session, in milliseconds.
pub const DEFAULT_PAGINATION_TIMEOUT_MS: u64 = 120_000;

/// Unicode emojis used in reactions and buttons.
pub mod emojis {
    pub const PIN: &str = "📌";
    pub const BOOKMARK: &str = "🔖";
    pub const BIN: &str = "🗑️";
    pub const LEFT: &str = "⬅️";
    pub const RIGHT: &str = "➡️";
    pub const LEFT_HOOK: &str = "↩️";
    pub const RIGHT_HOOK: &str = "↪️";
}
