use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Tag;
use crate::error::DomainError;

/// Visibility gate of a post. Only published posts are ever shown to readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    /// Two-letter code persisted in the `status` column.
    pub fn code(self) -> &'static str {
        match self {
            PostStatus::Draft => "DF",
            PostStatus::Published => "PB",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "DF" => Some(PostStatus::Draft),
            "PB" => Some(PostStatus::Published),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PostStatus::Draft => "Draft",
            PostStatus::Published => "Published",
        }
    }
}

/// Post entity - represents a blog post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    /// Unique per publish date, not globally.
    pub slug: String,
    pub body: String,
    pub publish: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: PostStatus,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Post {
    pub const TITLE_MAX_LEN: usize = 250;
    pub const SLUG_MAX_LEN: usize = 250;

    /// Create a new draft post, deriving the slug from the title.
    pub fn new(
        author_id: Uuid,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let title = title.into();
        let slug = slugify(&title);
        let now = Utc::now();

        let post = Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            slug,
            body: body.into(),
            publish: now,
            created_at: now,
            updated_at: now,
            status: PostStatus::Draft,
            tags: Vec::new(),
        };
        post.validate()?;
        Ok(post)
    }

    /// Replace the derived slug.
    pub fn with_slug(mut self, slug: impl Into<String>) -> Result<Self, DomainError> {
        self.slug = slug.into();
        self.validate()?;
        Ok(self)
    }

    pub fn published(mut self) -> Self {
        self.status = PostStatus::Published;
        self
    }

    pub fn published_at(mut self, publish: DateTime<Utc>) -> Self {
        self.publish = publish;
        self.status = PostStatus::Published;
        self
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// Calendar date (UTC) the slug is scoped to.
    pub fn publish_date(&self) -> NaiveDate {
        self.publish.date_naive()
    }

    /// Path segments of the canonical detail URL: year, month, day, slug.
    pub fn url_segments(&self) -> [String; 4] {
        [
            self.publish.year().to_string(),
            self.publish.month().to_string(),
            self.publish.day().to_string(),
            self.slug.clone(),
        ]
    }

    /// Number of tags this post has in common with `other`.
    pub fn shared_tag_count(&self, other: &Post) -> usize {
        self.tags
            .iter()
            .filter(|tag| other.tags.iter().any(|t| t.id == tag.id))
            .count()
    }

    fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::Validation("Title must not be empty".into()));
        }
        if self.title.chars().count() > Self::TITLE_MAX_LEN {
            return Err(DomainError::Validation(format!(
                "Title must be at most {} characters",
                Self::TITLE_MAX_LEN
            )));
        }
        if self.slug.is_empty() || self.slug.chars().count() > Self::SLUG_MAX_LEN {
            return Err(DomainError::Validation(format!(
                "Slug must be between 1 and {} characters",
                Self::SLUG_MAX_LEN
            )));
        }
        if self.slug != slugify(&self.slug) {
            return Err(DomainError::Validation(format!(
                "Slug '{}' is not URL-safe",
                self.slug
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// Turn free text into a URL-safe slug: lowercase ASCII letters, digits,
/// underscores and single hyphens.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' {
            pending_dash = true;
        }
    }

    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn slugify_collapses_separators_and_drops_punctuation() {
        assert_eq!(slugify("Hello,  World!"), "hello-world");
        assert_eq!(slugify("  Rust -- the Book "), "rust-the-book");
        assert_eq!(slugify("Café & Crème"), "caf-crme");
        assert_eq!(slugify("__init__"), "init");
    }

    #[test]
    fn new_post_is_draft_with_derived_slug() {
        let post = Post::new(Uuid::new_v4(), "Who was Django Reinhardt?", "body").unwrap();
        assert_eq!(post.slug, "who-was-django-reinhardt");
        assert_eq!(post.status, PostStatus::Draft);
        assert!(!post.is_published());
        assert_eq!(post.to_string(), "Who was Django Reinhardt?");
    }

    #[test]
    fn title_length_is_bounded() {
        let long = "a".repeat(Post::TITLE_MAX_LEN + 1);
        assert!(matches!(
            Post::new(Uuid::new_v4(), long, "body"),
            Err(DomainError::Validation(_))
        ));
        assert!(Post::new(Uuid::new_v4(), "   ", "body").is_err());
    }

    #[test]
    fn custom_slug_must_be_url_safe() {
        let post = Post::new(Uuid::new_v4(), "Title", "body").unwrap();
        assert!(post.clone().with_slug("custom-slug").is_ok());
        assert!(post.with_slug("Not A Slug").is_err());
    }

    #[test]
    fn url_segments_use_unpadded_date_parts() {
        let publish = Utc.with_ymd_and_hms(2024, 3, 7, 22, 15, 0).unwrap();
        let post = Post::new(Uuid::new_v4(), "Spring notes", "body")
            .unwrap()
            .published_at(publish);

        assert_eq!(post.url_segments(), ["2024", "3", "7", "spring-notes"]);
        assert_eq!(post.publish_date(), NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
        assert!(post.is_published());
    }

    #[test]
    fn status_codes_round_trip() {
        for status in [PostStatus::Draft, PostStatus::Published] {
            assert_eq!(PostStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(PostStatus::from_code("XX"), None);
    }
}
