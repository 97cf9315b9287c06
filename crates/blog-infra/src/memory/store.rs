//! In-memory blog store implementing every repository port.
//!
//! Enforces the same constraints as the relational schema: unique usernames,
//! tag slugs and per-date post slugs, foreign keys, and cascading deletes
//! (user -> posts -> comments and tag links).
//! Note: Data is lost on process restart.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use blog_core::domain::{Comment, Post, PostStatus, Tag, User, slugify};
use blog_core::error::RepoError;
use blog_core::pagination::{Page, PageSelector, num_pages_for, offset_for};
use blog_core::ports::{
    BaseRepository, CommentRepository, PostRepository, SearchHit, TagRepository, UserRepository,
};

use super::search::rank;

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
    tags: HashMap<Uuid, Tag>,
    /// (post_id, tag_id)
    post_tags: BTreeSet<(Uuid, Uuid)>,
}

impl State {
    fn tag_ids_of(&self, post_id: Uuid) -> Vec<Uuid> {
        self.post_tags
            .range((post_id, Uuid::nil())..=(post_id, Uuid::from_u128(u128::MAX)))
            .map(|(_, tag_id)| *tag_id)
            .collect()
    }

    fn tags_of(&self, post_id: Uuid) -> Vec<Tag> {
        let mut tags: Vec<Tag> = self
            .tag_ids_of(post_id)
            .into_iter()
            .filter_map(|id| self.tags.get(&id).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        tags
    }

    fn hydrate(&self, post: &Post) -> Post {
        let mut post = post.clone();
        post.tags = self.tags_of(post.id);
        post
    }

    /// Published posts, newest first.
    fn published(&self) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self
            .posts
            .values()
            .filter(|p| p.status == PostStatus::Published)
            .collect();
        posts.sort_by(|a, b| newest_first(a, b));
        posts
    }

    fn remove_post(&mut self, post_id: Uuid) -> Option<Post> {
        let post = self.posts.remove(&post_id)?;
        self.comments.retain(|_, c| c.post_id != post_id);
        self.post_tags.retain(|(p, _)| *p != post_id);
        Some(post)
    }
}

fn newest_first(a: &Post, b: &Post) -> Ordering {
    b.publish
        .cmp(&a.publish)
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// In-memory store using HashMaps behind an async RwLock.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut state = self.state.write().await;

        if state
            .users
            .values()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(RepoError::Constraint(format!(
                "username '{}' already exists",
                user.username
            )));
        }

        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        state.users.remove(&id).ok_or(RepoError::NotFound)?;

        let owned: Vec<Uuid> = state
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            state.remove_post(post_id);
        }

        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let state = self.state.read().await;
        Ok(state.posts.get(&id).map(|p| state.hydrate(p)))
    }

    async fn save(&self, mut post: Post) -> Result<Post, RepoError> {
        let mut state = self.state.write().await;

        if !state.users.contains_key(&post.author_id) {
            return Err(RepoError::Constraint(format!(
                "author {} does not exist",
                post.author_id
            )));
        }

        let date = post.publish_date();
        if state
            .posts
            .values()
            .any(|p| p.id != post.id && p.slug == post.slug && p.publish_date() == date)
        {
            return Err(RepoError::Constraint(format!(
                "slug '{}' already used on {}",
                post.slug, date
            )));
        }

        // Tags are managed through the tag repository.
        post.tags.clear();
        state.posts.insert(post.id, post.clone());
        Ok(state.hydrate(&post))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        state.remove_post(id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn published_page(
        &self,
        tag_id: Option<Uuid>,
        selector: PageSelector,
        per_page: u64,
    ) -> Result<Page<Post>, RepoError> {
        let state = self.state.read().await;

        let matching: Vec<&Post> = state
            .published()
            .into_iter()
            .filter(|p| tag_id.is_none_or(|t| state.post_tags.contains(&(p.id, t))))
            .collect();

        let total = matching.len() as u64;
        let num_pages = num_pages_for(total, per_page);
        let number = selector.resolve(num_pages);

        let items = matching
            .into_iter()
            .skip(offset_for(number, per_page) as usize)
            .take(per_page as usize)
            .map(|p| state.hydrate(p))
            .collect();

        Ok(Page::new(items, number, num_pages, total))
    }

    async fn find_published(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .posts
            .get(&id)
            .filter(|p| p.is_published())
            .map(|p| state.hydrate(p)))
    }

    async fn find_published_by_date(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .published()
            .into_iter()
            .find(|p| p.slug == slug && p.publish_date() == date)
            .map(|p| state.hydrate(p)))
    }

    async fn similar_posts(&self, post: &Post, limit: u64) -> Result<Vec<Post>, RepoError> {
        let state = self.state.read().await;
        let target_tags: BTreeSet<Uuid> = state.tag_ids_of(post.id).into_iter().collect();
        if target_tags.is_empty() {
            return Ok(Vec::new());
        }

        let mut candidates: Vec<(usize, &Post)> = state
            .published()
            .into_iter()
            .filter(|p| p.id != post.id)
            .map(|p| {
                let shared = state
                    .tag_ids_of(p.id)
                    .iter()
                    .filter(|t| target_tags.contains(t))
                    .count();
                (shared, p)
            })
            .filter(|(shared, _)| *shared > 0)
            .collect();

        candidates.sort_by(|(sa, a), (sb, b)| sb.cmp(sa).then_with(|| newest_first(a, b)));

        Ok(candidates
            .into_iter()
            .take(limit as usize)
            .map(|(_, p)| state.hydrate(p))
            .collect())
    }

    async fn search(&self, query: &str, min_rank: f32) -> Result<Vec<SearchHit>, RepoError> {
        let state = self.state.read().await;

        let mut hits: Vec<SearchHit> = state
            .published()
            .into_iter()
            .filter_map(|p| {
                let rank = rank(query, &p.title, &p.body);
                (rank >= min_rank).then(|| SearchHit {
                    post: state.hydrate(p),
                    rank,
                })
            })
            .collect();

        // Stable sort keeps newest-first among equal ranks.
        hits.sort_by(|a, b| b.rank.total_cmp(&a.rank));
        Ok(hits)
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.state.read().await.comments.get(&id).cloned())
    }

    async fn save(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut state = self.state.write().await;

        if !state.posts.contains_key(&comment.post_id) {
            return Err(RepoError::Constraint(format!(
                "post {} does not exist",
                comment.post_id
            )));
        }

        state.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        state
            .comments
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn active_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let state = self.state.read().await;
        let mut comments: Vec<Comment> = state
            .comments
            .values()
            .filter(|c| c.post_id == post_id && c.active)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }
}

#[async_trait]
impl TagRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let state = self.state.read().await;
        Ok(state.tags.values().find(|t| t.slug == slug).cloned())
    }

    async fn tags_for_post(&self, post_id: Uuid) -> Result<Vec<Tag>, RepoError> {
        Ok(self.state.read().await.tags_of(post_id))
    }

    async fn tag_post(&self, post_id: Uuid, names: &[&str]) -> Result<Vec<Tag>, RepoError> {
        let mut state = self.state.write().await;

        if !state.posts.contains_key(&post_id) {
            return Err(RepoError::Constraint(format!(
                "post {} does not exist",
                post_id
            )));
        }

        for name in names {
            let name = name.trim();
            let slug = slugify(name);
            if slug.is_empty() {
                continue;
            }

            let existing = state.tags.values().find(|t| t.slug == slug).map(|t| t.id);
            let tag_id = match existing {
                Some(id) => id,
                None => {
                    let tag = Tag::new(name);
                    let id = tag.id;
                    state.tags.insert(id, tag);
                    id
                }
            };
            state.post_tags.insert((post_id, tag_id));
        }

        Ok(state.tags_of(post_id))
    }
}
