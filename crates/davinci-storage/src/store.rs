//! The bookmark store seam and its in-memory implementation.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::StorageResult;
use crate::model::{Bookmark, BookmarkFilter, NewBookmark, now_ms};

/// Persistence for bookmarks. Every lookup is scoped to one user.
#[async_trait]
pub trait BookmarkStore: Send + Sync {
    /// Persists a bookmark and returns it with its assigned id.
    async fn create(&self, bookmark: NewBookmark) -> StorageResult<Bookmark>;

    /// A user's bookmarks matching `filter`, oldest first.
    async fn find(&self, user_id: &str, filter: &BookmarkFilter) -> StorageResult<Vec<Bookmark>>;

    async fn find_by_id(&self, user_id: &str, id: i64) -> StorageResult<Option<Bookmark>>;

    /// Deletes a user's bookmark. Returns `false` if nothing was deleted.
    async fn delete(&self, user_id: &str, id: i64) -> StorageResult<bool>;
}

#[derive(Debug, Default)]
struct MemoryState {
    rows: Vec<Bookmark>,
    last_id: i64,
}

/// A store that forgets everything on restart.
#[derive(Debug, Default)]
pub struct MemoryBookmarkStore {
    state: Mutex<MemoryState>,
}

impl MemoryBookmarkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookmarkStore for MemoryBookmarkStore {
    async fn create(&self, bookmark: NewBookmark) -> StorageResult<Bookmark> {
        let mut state = self.state.lock();
        state.last_id += 1;
        let row = Bookmark {
            id: state.last_id,
            tag: bookmark.tag,
            content: bookmark.content,
            message_url: bookmark.message_url,
            user_id: bookmark.user_id,
            created_at: now_ms(),
        };
        state.rows.push(row.clone());
        Ok(row)
    }

    async fn find(&self, user_id: &str, filter: &BookmarkFilter) -> StorageResult<Vec<Bookmark>> {
        Ok(self
            .state
            .lock()
            .rows
            .iter()
            .filter(|b| b.user_id == user_id && filter.matches(b))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, user_id: &str, id: i64) -> StorageResult<Option<Bookmark>> {
        Ok(self
            .state
            .lock()
            .rows
            .iter()
            .find(|b| b.id == id && b.user_id == user_id)
            .cloned())
    }

    async fn delete(&self, user_id: &str, id: i64) -> StorageResult<bool> {
        let mut state = self.state.lock();
        let before = state.rows.len();
        state.rows.retain(|b| !(b.id == id && b.user_id == user_id));
        Ok(state.rows.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ids_increase_and_are_not_reused() {
        let store = MemoryBookmarkStore::new();
        let a = store.create(NewBookmark::new("u1", "t", "a", "url")).await.unwrap();
        let b = store.create(NewBookmark::new("u1", "t", "b", "url")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        assert!(store.delete("u1", b.id).await.unwrap());
        let c = store.create(NewBookmark::new("u1", "t", "c", "url")).await.unwrap();
        assert_eq!(c.id, 3);
    }

    #[tokio::test]
    async fn test_lookups_are_scoped_to_the_user() {
        let store = MemoryBookmarkStore::new();
        let mine = store.create(NewBookmark::new("u1", "t", "mine", "url")).await.unwrap();
        store.create(NewBookmark::new("u2", "t", "theirs", "url")).await.unwrap();

        let found = store.find("u1", &BookmarkFilter::All).await.unwrap();
        assert_eq!(found, vec![mine.clone()]);
        assert_eq!(store.find_by_id("u2", mine.id).await.unwrap(), None);
        assert!(!store.delete("u2", mine.id).await.unwrap());
        assert!(store.find_by_id("u1", mine.id).await.unwrap().is_some());
    }
}
