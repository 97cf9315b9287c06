use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{Comment, Post, Tag, User};
use crate::error::RepoError;
use crate::pagination::{Page, PageSelector};

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// A published post matched by a search, with its relevance.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SearchHit {
    pub post: Post,
    pub rank: f32,
}

/// Post repository.
///
/// Every `*published*` query, `similar_posts` and `search` only ever return
/// posts whose status is `Published`, newest first unless stated otherwise.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// One page of published posts, optionally restricted to a tag.
    async fn published_page(
        &self,
        tag_id: Option<Uuid>,
        selector: PageSelector,
        per_page: u64,
    ) -> Result<Page<Post>, RepoError>;

    /// A published post by ID.
    async fn find_published(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    /// The published post with `slug` whose publish date is `date`.
    async fn find_published_by_date(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, RepoError>;

    /// Published posts sharing tags with `post`, most shared tags first,
    /// then newest first. Never includes `post` itself.
    async fn similar_posts(&self, post: &Post, limit: u64) -> Result<Vec<Post>, RepoError>;

    /// Weighted full-text search (title over body), rank descending.
    async fn search(&self, query: &str, min_rank: f32) -> Result<Vec<SearchHit>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Active comments on a post, oldest first.
    async fn active_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;
}

/// Tag repository.
#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError>;

    /// Tags attached to a post, by name.
    async fn tags_for_post(&self, post_id: Uuid) -> Result<Vec<Tag>, RepoError>;

    /// Attach tags to a post by name, creating tags that don't exist yet.
    /// Returns the post's full tag set afterwards.
    async fn tag_post(&self, post_id: Uuid, names: &[&str]) -> Result<Vec<Tag>, RepoError>;
}
