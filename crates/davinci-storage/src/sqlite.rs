//! SQLite-backed bookmark store.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::info;

use crate::error::{StorageError, StorageResult};
use crate::model::{Bookmark, BookmarkFilter, NewBookmark, from_unix_ms, now_ms, to_unix_ms};
use crate::store::BookmarkStore;

const COLUMNS: &str = "id, tag, content, message_url, user_id, created_at";

/// Bookmarks in a single SQLite table. Queries run on the blocking pool.
#[derive(Clone)]
pub struct SqliteBookmarkStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBookmarkStore {
    /// Opens or creates the database at `path`.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        let store = Self::from_connection(conn)?;
        info!(path = %path.display(), "Bookmark store opened");
        Ok(store)
    }

    /// A private in-memory database.
    pub fn in_memory() -> StorageResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS bookmarks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                tag TEXT NOT NULL,
                content TEXT NOT NULL,
                message_url TEXT NOT NULL,
                user_id TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_bookmarks_user_id ON bookmarks(user_id);",
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StorageResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || f(&conn.lock()))
            .await
            .map_err(|e| StorageError::Join(e.to_string()))?
    }
}

impl std::fmt::Debug for SqliteBookmarkStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBookmarkStore").finish_non_exhaustive()
    }
}

type RawRow = (i64, String, String, String, String, i64);

fn raw_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn into_bookmark((id, tag, content, message_url, user_id, created_at): RawRow) -> StorageResult<Bookmark> {
    let created_at = from_unix_ms(created_at)
        .ok_or_else(|| StorageError::Corrupt(format!("bookmark {id} has timestamp {created_at}")))?;
    Ok(Bookmark {
        id,
        tag,
        content,
        message_url,
        user_id,
        created_at,
    })
}

#[async_trait]
impl BookmarkStore for SqliteBookmarkStore {
    async fn create(&self, bookmark: NewBookmark) -> StorageResult<Bookmark> {
        self.with_conn(move |conn| {
            let created_at = now_ms();
            conn.execute(
                "INSERT INTO bookmarks (tag, content, message_url, user_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    bookmark.tag,
                    bookmark.content,
                    bookmark.message_url,
                    bookmark.user_id,
                    to_unix_ms(created_at),
                ],
            )?;
            Ok(Bookmark {
                id: conn.last_insert_rowid(),
                tag: bookmark.tag,
                content: bookmark.content,
                message_url: bookmark.message_url,
                user_id: bookmark.user_id,
                created_at,
            })
        })
        .await
    }

    async fn find(&self, user_id: &str, filter: &BookmarkFilter) -> StorageResult<Vec<Bookmark>> {
        let user_id = user_id.to_string();
        let filter = filter.clone();
        self.with_conn(move |conn| {
            let (clause, needle) = match &filter {
                BookmarkFilter::All => ("", None),
                BookmarkFilter::Tag(s) => (" AND instr(tag, ?2) > 0", Some(s.as_str())),
                BookmarkFilter::Content(s) => (" AND instr(content, ?2) > 0", Some(s.as_str())),
            };
            let sql = format!("SELECT {COLUMNS} FROM bookmarks WHERE user_id = ?1{clause} ORDER BY id");
            let mut stmt = conn.prepare(&sql)?;
            let rows = match needle {
                Some(needle) => stmt
                    .query_map(params![user_id, needle], raw_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?,
                None => stmt
                    .query_map(params![user_id], raw_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?,
            };
            rows.into_iter().map(into_bookmark).collect()
        })
        .await
    }

    async fn find_by_id(&self, user_id: &str, id: i64) -> StorageResult<Option<Bookmark>> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM bookmarks WHERE id = ?1 AND user_id = ?2"),
                params![id, user_id],
                raw_row,
            )
            .optional()?
            .map(into_bookmark)
            .transpose()
        })
        .await
    }

    async fn delete(&self, user_id: &str, id: i64) -> StorageResult<bool> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let deleted = conn.execute(
                "DELETE FROM bookmarks WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
            )?;
            Ok(deleted > 0)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    async fn seeded() -> SqliteBookmarkStore {
        let store = SqliteBookmarkStore::in_memory().unwrap();
        for (user, tag, content) in [
            ("u1", "rust", "borrow checker tips"),
            ("u1", "cooking", "rust-proof pans"),
            ("u1", "music", "scales"),
            ("u2", "rust", "someone else's"),
        ] {
            store
                .create(NewBookmark::new(user, tag, content, "https://chat.test/c1/m"))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_create_assigns_ids() {
        let store = SqliteBookmarkStore::in_memory().unwrap();
        let first = assert_ok!(store.create(NewBookmark::new("u1", "a", "b", "c")).await);
        let second = assert_ok!(store.create(NewBookmark::new("u1", "a", "b", "c")).await);
        assert_eq!(second.id, first.id + 1);

        let fetched = store.find_by_id("u1", first.id).await.unwrap().unwrap();
        assert_eq!(fetched, first);
    }

    #[tokio::test]
    async fn test_find_filters() {
        let store = seeded().await;

        let all = store.find("u1", &BookmarkFilter::All).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].id < w[1].id));

        let by_tag = store.find("u1", &BookmarkFilter::Tag("rust".into())).await.unwrap();
        assert_eq!(by_tag.len(), 1);
        assert_eq!(by_tag[0].content, "borrow checker tips");

        let by_content = store
            .find("u1", &BookmarkFilter::Content("rust".into()))
            .await
            .unwrap();
        assert_eq!(by_content.len(), 1);
        assert_eq!(by_content[0].tag, "cooking");
    }

    #[tokio::test]
    async fn test_search_word_other_than_tag_searches_content() {
        let store = seeded().await;
        let filter = BookmarkFilter::search("rust", Some("content"));
        let hits = store.find("u1", &filter).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].tag, "cooking");

        let filter = BookmarkFilter::search("rust", Some("tag"));
        let hits = store.find("u1", &filter).await.unwrap();
        assert_eq!(hits[0].tag, "rust");
    }

    #[tokio::test]
    async fn test_delete_is_scoped_to_owner() {
        let store = seeded().await;
        let theirs = store.find("u2", &BookmarkFilter::All).await.unwrap()[0].id;

        assert!(!store.delete("u1", theirs).await.unwrap());
        assert!(store.delete("u2", theirs).await.unwrap());
        assert_eq!(store.find_by_id("u2", theirs).await.unwrap(), None);
    }
}
