//! # Content Store
//!
//! In-memory home of every post, its comments and the like ledger.
//! Storage order is newest-first. Expired posts stay in memory until the
//! next `cleanup`, but no read ever returns them.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::error::{AppError, Result};
use crate::models::{
    Category, Comment, CommentView, NewComment, NewPost, Page, Pagination, Post, PostView,
    SortKey, Stats, TagCount, MAX_PAGE_SIZE, MAX_TAGS,
};
use crate::traits::{Clock, RandomSource, SystemClock, ThreadRandom};

const ALIAS_PREFIXES: &[&str] = &[
    "Anonymous", "Ghost", "Shadow", "Whisper", "Phantom", "Stranger", "Wanderer", "Echo",
    "Cipher", "Drifter", "Nomad", "Specter",
];

fn draw_alias(random: &dyn RandomSource) -> String {
    let prefix = ALIAS_PREFIXES[random.next_below(ALIAS_PREFIXES.len())];
    let suffix = random.next_between(1000, 9999);
    format!("{prefix}{suffix}")
}

pub struct ContentStore {
    config: StoreConfig,
    posts: VecDeque<Post>,
    /// requester hash -> ids of posts that requester has liked
    likes: HashMap<String, HashSet<Uuid>>,
    random: Box<dyn RandomSource>,
    clock: Arc<dyn Clock>,
}

impl ContentStore {
    pub fn new(config: StoreConfig) -> Self {
        Self::with_strategies(config, Box::new(ThreadRandom), Arc::new(SystemClock))
    }

    pub fn with_strategies(
        config: StoreConfig,
        random: Box<dyn RandomSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            posts: VecDeque::new(),
            likes: HashMap::new(),
            random,
            clock,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Physically stored posts, expired ones included.
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Number of requesters whose ledger entry references `post_id`.
    pub fn ledger_references(&self, post_id: Uuid) -> usize {
        self.likes.values().filter(|ids| ids.contains(&post_id)).count()
    }

    /// Number of requesters with at least one recorded like.
    pub fn ledger_len(&self) -> usize {
        self.likes.len()
    }

    fn live(&self) -> impl Iterator<Item = &Post> {
        let now = self.clock.now();
        self.posts.iter().filter(move |p| p.is_live(now))
    }

    pub fn create_post(&mut self, new: NewPost, requester_hash: &str) -> PostView {
        let now = self.clock.now();
        let mut tags = new.tags;
        tags.truncate(MAX_TAGS);

        let post = Post {
            id: self.random.next_id(),
            display_alias: draw_alias(self.random.as_ref()),
            title: new.title.trim().to_string(),
            body: new.body.trim().to_string(),
            category: new.category,
            tags,
            created_at: now,
            expires_at: now + self.config.retention(),
            like_count: 0,
            comments: Vec::new(),
            requester_hash: requester_hash.to_string(),
        };
        debug_assert!(post.tags.len() <= MAX_TAGS);
        let view = PostView::from(&post);

        self.posts.push_front(post);
        if self.posts.len() > self.config.max_posts {
            let evicted = self.posts.len() - self.config.max_posts;
            self.posts.truncate(self.config.max_posts);
            debug!(
                evicted,
                max_posts = self.config.max_posts,
                "Capacity reached, oldest posts dropped"
            );
        }
        view
    }

    pub fn list_posts(
        &self,
        category: Option<Category>,
        page: usize,
        page_size: usize,
        sort: SortKey,
    ) -> Page<PostView> {
        let mut matching: Vec<&Post> = self
            .live()
            .filter(|p| category.is_none_or(|c| p.category == c))
            .collect();

        // sort_by is stable, so ties keep storage order
        match sort {
            SortKey::Timestamp => matching.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortKey::Likes => matching.sort_by(|a, b| b.like_count.cmp(&a.like_count)),
            SortKey::Comments => {
                matching.sort_by(|a, b| b.comments.len().cmp(&a.comments.len()))
            }
        }

        let page = page.max(1);
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let total = matching.len();
        let total_pages = total.div_ceil(page_size);

        let items = matching
            .into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .map(PostView::from)
            .collect();

        Page {
            items,
            pagination: Pagination {
                page,
                page_size,
                total,
                total_pages,
                has_next: page < total_pages,
                has_prev: page > 1,
            },
        }
    }

    pub fn get_post(&self, id: Uuid) -> Option<PostView> {
        self.live().find(|p| p.id == id).map(PostView::from)
    }

    /// Records a like and returns the new count.
    pub fn like_post(&mut self, id: Uuid, requester_hash: &str) -> Result<u64> {
        let now = self.clock.now();
        let post = self
            .posts
            .iter_mut()
            .find(|p| p.id == id && p.is_live(now))
            .ok_or_else(|| AppError::NotFound("post".into()))?;

        let liked = self.likes.entry(requester_hash.to_string()).or_default();
        if !liked.insert(id) {
            return Err(AppError::DuplicateAction("post already liked".into()));
        }
        post.like_count += 1;
        Ok(post.like_count)
    }

    pub fn create_comment(
        &mut self,
        post_id: Uuid,
        new: NewComment,
        requester_hash: &str,
    ) -> Result<CommentView> {
        let now = self.clock.now();
        let post = self
            .posts
            .iter_mut()
            .find(|p| p.id == post_id && p.is_live(now))
            .ok_or_else(|| AppError::NotFound("post".into()))?;

        let comment = Comment {
            id: self.random.next_id(),
            display_alias: draw_alias(self.random.as_ref()),
            body: new.body.trim().to_string(),
            created_at: now,
            requester_hash: requester_hash.to_string(),
        };
        let view = CommentView::from(&comment);
        post.comments.push(comment);
        Ok(view)
    }

    /// Comments of a live post in insertion order; empty when the post is gone.
    pub fn get_comments(&self, post_id: Uuid) -> Vec<CommentView> {
        self.live()
            .find(|p| p.id == post_id)
            .map(|p| p.comments.iter().map(CommentView::from).collect())
            .unwrap_or_default()
    }

    pub fn stats(&self) -> Stats {
        let day_ago = self.clock.now() - Duration::hours(24);
        let mut categories: BTreeMap<Category, usize> =
            Category::ALL.into_iter().map(|c| (c, 0)).collect();

        let mut total_posts = 0;
        let mut total_comments = 0;
        let mut total_likes = 0;
        let mut posts_last_24h = 0;
        let mut comments_last_24h = 0;

        for post in self.live() {
            total_posts += 1;
            total_comments += post.comments.len();
            total_likes += post.like_count;
            if post.created_at > day_ago {
                posts_last_24h += 1;
            }
            comments_last_24h += post
                .comments
                .iter()
                .filter(|c| c.created_at > day_ago)
                .count();
            *categories.entry(post.category).or_insert(0) += 1;
        }

        let stored_posts = self.posts.len();
        let max_posts = self.config.max_posts;
        let capacity_used_percent = if max_posts == 0 {
            100.0
        } else {
            stored_posts as f64 / max_posts as f64 * 100.0
        };

        Stats {
            total_posts,
            total_comments,
            total_likes,
            posts_last_24h,
            comments_last_24h,
            categories,
            stored_posts,
            max_posts,
            capacity_used_percent,
        }
    }

    /// Most used tags across live posts. Ties keep the order in which the
    /// tags were first met while walking posts newest-first.
    pub fn trending_tags(&self, limit: usize) -> Vec<TagCount> {
        let mut counts: Vec<TagCount> = Vec::new();
        let mut seen: HashMap<&str, usize> = HashMap::new();

        for tag in self.live().flat_map(|p| p.tags.iter()) {
            match seen.get(tag.as_str()) {
                Some(&slot) => counts[slot].count += 1,
                None => {
                    seen.insert(tag.as_str(), counts.len());
                    counts.push(TagCount {
                        tag: tag.clone(),
                        count: 1,
                    });
                }
            }
        }

        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts.truncate(limit);
        counts
    }

    /// Case-insensitive substring search over title, body and tags.
    pub fn search(&self, query: &str, limit: usize) -> Vec<PostView> {
        let query = query.trim();
        if query.chars().count() < 2 {
            return Vec::new();
        }
        let needle = query.to_lowercase();

        self.live()
            .filter(|p| {
                p.title.to_lowercase().contains(&needle)
                    || p.body.to_lowercase().contains(&needle)
                    || p.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            })
            .take(limit)
            .map(PostView::from)
            .collect()
    }

    /// Drops expired posts and prunes ledger entries pointing at posts
    /// that are no longer stored. Returns the number of posts removed.
    pub fn cleanup(&mut self) -> usize {
        let now = self.clock.now();
        let before = self.posts.len();
        self.posts.retain(|p| p.is_live(now));
        let removed = before - self.posts.len();

        let stored: HashSet<Uuid> = self.posts.iter().map(|p| p.id).collect();
        self.likes.retain(|_, liked| {
            liked.retain(|id| stored.contains(id));
            !liked.is_empty()
        });
        let mut references: HashMap<Uuid, u64> = HashMap::new();
        for id in self.likes.values().flatten() {
            *references.entry(*id).or_default() += 1;
        }
        for post in &self.posts {
            let recorded = references.get(&post.id).copied().unwrap_or(0);
            assert_eq!(
                post.like_count, recorded,
                "like counts out of step with the ledger for post {}",
                post.id
            );
        }

        if removed > 0 {
            info!(removed, remaining = self.posts.len(), "Expired posts swept");
        } else {
            debug!(remaining = self.posts.len(), "Cleanup found nothing to sweep");
        }
        removed
    }
}
