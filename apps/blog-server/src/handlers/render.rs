//! Template rendering and the view models handed to templates.

use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse};
use serde::Serialize;
use tera::Context;
use uuid::Uuid;

use blog_core::Page;
use blog_core::domain::{Comment, Post, Tag};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const DATE_FORMAT: &str = "%b %-d, %Y";

#[derive(Debug, Serialize)]
pub struct TagView {
    pub name: String,
    pub slug: String,
    pub url: String,
}

impl TagView {
    pub fn new(req: &HttpRequest, tag: &Tag) -> AppResult<Self> {
        Ok(Self {
            name: tag.name.clone(),
            slug: tag.slug.clone(),
            url: req.url_for("post_list_by_tag", [&tag.slug])?.path().to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub author: String,
    pub publish: String,
    pub tags: Vec<TagView>,
    pub url: String,
    pub comment_url: String,
    pub share_url: String,
}

impl PostView {
    fn new(req: &HttpRequest, post: &Post, author: &str) -> AppResult<Self> {
        let id = post.id.to_string();
        Ok(Self {
            id: post.id,
            title: post.title.clone(),
            body: post.body.clone(),
            author: author.to_string(),
            publish: post.publish.format(DATE_FORMAT).to_string(),
            tags: post
                .tags
                .iter()
                .map(|tag| TagView::new(req, tag))
                .collect::<AppResult<_>>()?,
            url: req.url_for("post_detail", post.url_segments())?.path().to_string(),
            comment_url: req.url_for("post_comment", [&id])?.path().to_string(),
            share_url: req.url_for("post_share", [&id])?.path().to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub name: String,
    pub body: String,
    pub created: String,
}

impl From<&Comment> for CommentView {
    fn from(comment: &Comment) -> Self {
        Self {
            name: comment.name.clone(),
            body: comment.body.clone(),
            created: comment.created_at.format(DATE_FORMAT).to_string(),
        }
    }
}

/// Page metadata for the pagination controls.
#[derive(Debug, Serialize)]
pub struct PageView {
    pub number: u64,
    pub num_pages: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page_number: Option<u64>,
    pub next_page_number: Option<u64>,
}

impl<T> From<&Page<T>> for PageView {
    fn from(page: &Page<T>) -> Self {
        Self {
            number: page.number,
            num_pages: page.num_pages,
            has_previous: page.has_previous(),
            has_next: page.has_next(),
            previous_page_number: page.previous_page_number(),
            next_page_number: page.next_page_number(),
        }
    }
}

/// Build views for `posts`, looking up each distinct author once.
pub async fn post_views(
    req: &HttpRequest,
    state: &AppState,
    posts: &[Post],
) -> AppResult<Vec<PostView>> {
    let mut authors: HashMap<Uuid, String> = HashMap::new();
    for post in posts {
        if authors.contains_key(&post.author_id) {
            continue;
        }
        let name = state
            .users
            .find_by_id(post.author_id)
            .await?
            .map(|user| user.username)
            .unwrap_or_default();
        authors.insert(post.author_id, name);
    }

    posts
        .iter()
        .map(|post| {
            let author = authors.get(&post.author_id).map(String::as_str).unwrap_or("");
            PostView::new(req, post, author)
        })
        .collect()
}

pub async fn post_view(req: &HttpRequest, state: &AppState, post: &Post) -> AppResult<PostView> {
    post_views(req, state, std::slice::from_ref(post))
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal(format!("no view built for post {}", post.id)))
}

/// Render a page template into a 200 HTML response.
pub fn render(state: &AppState, template: &str, context: &Context) -> AppResult<HttpResponse> {
    let html = state.templates.render(template, context)?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html))
}
