//! Bookmark records and filters.

use time::OffsetDateTime;

/// A saved message, owned by one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    pub id: i64,
    pub tag: String,
    pub content: String,
    pub message_url: String,
    pub user_id: String,
    pub created_at: OffsetDateTime,
}

/// The fields a caller supplies when creating a bookmark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBookmark {
    pub tag: String,
    pub content: String,
    pub message_url: String,
    pub user_id: String,
}

impl NewBookmark {
    pub fn new(
        user_id: impl Into<String>,
        tag: impl Into<String>,
        content: impl Into<String>,
        message_url: impl Into<String>,
    ) -> Self {
        Self {
            tag: tag.into(),
            content: content.into(),
            message_url: message_url.into(),
            user_id: user_id.into(),
        }
    }
}

/// Which of a user's bookmarks to return.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BookmarkFilter {
    #[default]
    All,
    /// Tag contains the substring.
    Tag(String),
    /// Content contains the substring.
    Content(String),
}

impl BookmarkFilter {
    /// Builds a search filter from a term and an optional field word.
    ///
    /// Only the exact word `tag` selects tag search. Anything else, `content`
    /// included, searches content.
    pub fn search(term: impl Into<String>, field: Option<&str>) -> Self {
        match field {
            Some("tag") => Self::Tag(term.into()),
            _ => Self::Content(term.into()),
        }
    }

    /// Whether `bookmark` passes this filter.
    pub fn matches(&self, bookmark: &Bookmark) -> bool {
        match self {
            Self::All => true,
            Self::Tag(needle) => bookmark.tag.contains(needle.as_str()),
            Self::Content(needle) => bookmark.content.contains(needle.as_str()),
        }
    }
}

/// Current time truncated to whole milliseconds, the stored precision.
pub(crate) fn now_ms() -> OffsetDateTime {
    from_unix_ms(to_unix_ms(OffsetDateTime::now_utc())).unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

pub(crate) fn to_unix_ms(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}

pub(crate) fn from_unix_ms(ms: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bookmark(tag: &str, content: &str) -> Bookmark {
        Bookmark {
            id: 1,
            tag: tag.into(),
            content: content.into(),
            message_url: "https://chat.test/c1/m1".into(),
            user_id: "u1".into(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_search_field_word() {
        assert_eq!(
            BookmarkFilter::search("rust", Some("tag")),
            BookmarkFilter::Tag("rust".into())
        );
        assert_eq!(
            BookmarkFilter::search("rust", Some("content")),
            BookmarkFilter::Content("rust".into())
        );
        // Only the exact lowercase word selects tags.
        assert_eq!(
            BookmarkFilter::search("rust", Some("Tag")),
            BookmarkFilter::Content("rust".into())
        );
        assert_eq!(
            BookmarkFilter::search("rust", None),
            BookmarkFilter::Content("rust".into())
        );
    }

    #[test]
    fn test_filter_matches_substrings() {
        let b = bookmark("recipes", "grandma's lasagne");
        assert!(BookmarkFilter::All.matches(&b));
        assert!(BookmarkFilter::Tag("cipe".into()).matches(&b));
        assert!(!BookmarkFilter::Tag("lasagne".into()).matches(&b));
        assert!(BookmarkFilter::Content("lasagne".into()).matches(&b));
    }

    #[test]
    fn test_ms_round_trip_keeps_precision() {
        let now = now_ms();
        assert_eq!(from_unix_ms(to_unix_ms(now)), Some(now));
    }
}
