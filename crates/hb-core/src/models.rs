//! # Domain Models
//!
//! Posts and comments as they live inside the store, plus the read-facing
//! views handed to callers. Views never carry the requester hash.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 200;
pub const BODY_MIN_CHARS: usize = 10;
pub const BODY_MAX_CHARS: usize = 2000;
pub const COMMENT_MIN_CHARS: usize = 1;
pub const COMMENT_MAX_CHARS: usize = 1000;
pub const MAX_TAGS: usize = 5;
pub const TAG_MAX_CHARS: usize = 50;
pub const MAX_PAGE_SIZE: usize = 50;

/// The fixed set of boards a post can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    General,
    Tech,
    Crypto,
    Society,
    Confession,
    Question,
    Random,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::General,
        Category::Tech,
        Category::Crypto,
        Category::Society,
        Category::Confession,
        Category::Question,
        Category::Random,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Tech => "tech",
            Category::Crypto => "crypto",
            Category::Society => "society",
            Category::Confession => "confession",
            Category::Question => "question",
            Category::Random => "random",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category '{}'", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Sort orders accepted by `list_posts`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Newest first
    #[default]
    Timestamp,
    /// Most liked first
    Likes,
    /// Most commented first
    Comments,
}

/// Returned when a string names no known sort order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSortKey(pub String);

impl fmt::Display for UnknownSortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown sort key '{}'", self.0)
    }
}

impl std::error::Error for UnknownSortKey {}

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "timestamp" => Ok(SortKey::Timestamp),
            "likes" => Ok(SortKey::Likes),
            "comments" => Ok(SortKey::Comments),
            other => Err(UnknownSortKey(other.to_string())),
        }
    }
}

/// A validated post ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub category: Category,
    pub tags: Vec<String>,
}

/// A validated comment ready to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub body: String,
}

/// A post as held by the store.
#[derive(Debug, Clone)]
pub struct Post {
    pub id: Uuid,
    /// Pseudonym drawn once at creation
    pub display_alias: String,
    pub title: String,
    pub body: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub like_count: u64,
    pub comments: Vec<Comment>,
    /// Salted digest of the creator's network identity. Never leaves the store.
    pub requester_hash: String,
}

impl Post {
    /// A post is readable strictly before its expiry instant.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// A comment, owned by its parent post.
#[derive(Debug, Clone)]
pub struct Comment {
    pub id: Uuid,
    pub display_alias: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub requester_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub display_alias: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Comment> for CommentView {
    fn from(c: &Comment) -> Self {
        Self {
            id: c.id,
            display_alias: c.display_alias.clone(),
            body: c.body.clone(),
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: Uuid,
    pub display_alias: String,
    pub title: String,
    pub body: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub like_count: u64,
    pub comment_count: usize,
    pub comments: Vec<CommentView>,
}

impl From<&Post> for PostView {
    fn from(p: &Post) -> Self {
        Self {
            id: p.id,
            display_alias: p.display_alias.clone(),
            title: p.title.clone(),
            body: p.body.clone(),
            category: p.category,
            tags: p.tags.clone(),
            created_at: p.created_at,
            expires_at: p.expires_at,
            like_count: p.like_count,
            comment_count: p.comments.len(),
            comments: p.comments.iter().map(CommentView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

/// One page of a filtered, sorted listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Aggregate snapshot over live posts.
///
/// `capacity_used_percent` is computed from the physically stored count,
/// which may still include posts that have expired but not been swept.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_posts: usize,
    pub total_comments: usize,
    pub total_likes: u64,
    pub posts_last_24h: usize,
    pub comments_last_24h: usize,
    pub categories: BTreeMap<Category, usize>,
    pub stored_posts: usize,
    pub max_posts: usize,
    pub capacity_used_percent: f64,
}
