use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Post;

/// Comment entity - a reader's comment on a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub name: String,
    pub email: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Moderation gate. Inactive comments are never displayed.
    pub active: bool,
}

impl Comment {
    /// Create a new, active comment on a post.
    pub fn new(post_id: Uuid, name: String, email: String, body: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            post_id,
            name,
            email,
            body,
            created_at: now,
            updated_at: now,
            active: true,
        }
    }

    /// Display the comment against the post it belongs to.
    pub fn on<'a>(&'a self, post: &'a Post) -> CommentOn<'a> {
        CommentOn {
            comment: self,
            post,
        }
    }

    /// Hide the comment from readers.
    pub fn deactivate(mut self) -> Self {
        self.active = false;
        self.updated_at = Utc::now();
        self
    }
}

/// `Comment by {name} on {post title}`.
pub struct CommentOn<'a> {
    comment: &'a Comment,
    post: &'a Post,
}

impl fmt::Display for CommentOn<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Comment by {} on {}", self.comment.name, self.post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_author_and_post_title() {
        let post = Post::new(Uuid::new_v4(), "Who was Django Reinhardt?", "...").unwrap();
        let comment = Comment::new(post.id, "Ann".into(), "ann@example.com".into(), "Hi".into());

        assert_eq!(
            comment.on(&post).to_string(),
            "Comment by Ann on Who was Django Reinhardt?"
        );
    }

    #[test]
    fn deactivated_comment_is_hidden() {
        let comment = Comment::new(Uuid::new_v4(), "Bo".into(), "bo@example.com".into(), "Hi".into());
        assert!(comment.active);
        assert!(!comment.deactivate().active);
    }
}
