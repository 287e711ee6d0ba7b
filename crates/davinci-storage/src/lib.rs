//! # Da Vinci Storage
//!
//! Bookmark records behind the [`BookmarkStore`] trait, with an SQLite
//! implementation for real deployments and an in-memory one for tests and
//! demos.

pub mod config;
pub mod error;
pub mod model;
pub mod sqlite;
pub mod store;

pub use config::{StorageBackend, StorageConfig, open_store};
pub use error::{StorageError, StorageResult};
pub use model::{Bookmark, BookmarkFilter, NewBookmark};
pub use sqlite::SqliteBookmarkStore;
pub use store::{BookmarkStore, MemoryBookmarkStore};
