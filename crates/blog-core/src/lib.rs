//! # Blog Core
//!
//! The domain layer of the blog service.
//! This crate contains pure business logic with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod pagination;
pub mod ports;

pub use error::DomainError;
pub use pagination::{Page, PageSelector};

/// Number of posts shown on each listing page.
pub const POSTS_PER_PAGE: u64 = 3;

/// Maximum number of similar posts shown next to a post.
pub const SIMILAR_POSTS_LIMIT: u64 = 4;

/// Minimum relevance a search hit must reach to be returned.
pub const SEARCH_RANK_THRESHOLD: f32 = 0.3;
