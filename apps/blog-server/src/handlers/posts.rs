//! Read-only post pages: listing, detail and search.

use actix_web::{HttpRequest, HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use tera::Context;

use blog_core::domain::Tag;
use blog_core::{DomainError, POSTS_PER_PAGE, PageSelector, SEARCH_RANK_THRESHOLD, SIMILAR_POSTS_LIMIT};
use blog_shared::{CommentForm, FormErrors, SearchForm, clean};

use super::render::{CommentView, PageView, TagView, post_view, post_views, render};
use crate::middleware::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

/// GET /blog/
pub async fn post_list(
    req: HttpRequest,
    state: web::Data<AppState>,
    params: web::Query<ListParams>,
) -> AppResult<HttpResponse> {
    list(&req, &state, None, params.page.as_deref()).await
}

/// GET /blog/tag/{tag_slug}/
pub async fn post_list_by_tag(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<ListParams>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let tag = state
        .tags
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| DomainError::not_found("Tag", &slug))?;

    list(&req, &state, Some(tag), params.page.as_deref()).await
}

async fn list(
    req: &HttpRequest,
    state: &AppState,
    tag: Option<Tag>,
    page: Option<&str>,
) -> AppResult<HttpResponse> {
    let page = state
        .posts
        .published_page(
            tag.as_ref().map(|t| t.id),
            PageSelector::parse(page),
            POSTS_PER_PAGE,
        )
        .await?;

    let mut context = Context::new();
    context.insert("posts", &post_views(req, state, &page.items).await?);
    context.insert("page", &PageView::from(&page));
    context.insert(
        "tag",
        &tag.as_ref().map(|t| TagView::new(req, t)).transpose()?,
    );

    render(state, "blog/post/list.html", &context)
}

/// GET /blog/{year}/{month}/{day}/{slug}/
pub async fn post_detail(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(i32, u32, u32, String)>,
) -> AppResult<HttpResponse> {
    let (year, month, day, slug) = path.into_inner();
    let not_found = || DomainError::not_found("Post", format!("{year}/{month}/{day}/{slug}"));

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(not_found)?;
    let post = state
        .posts
        .find_published_by_date(date, &slug)
        .await?
        .ok_or_else(not_found)?;

    let comments = state.comments.active_for_post(post.id).await?;
    let similar = state.posts.similar_posts(&post, SIMILAR_POSTS_LIMIT).await?;

    tracing::debug!(
        post_id = %post.id,
        comments = comments.len(),
        similar = similar.len(),
        "Rendering post detail"
    );

    let mut context = Context::new();
    context.insert("post", &post_view(&req, &state, &post).await?);
    context.insert(
        "comments",
        &comments.iter().map(CommentView::from).collect::<Vec<_>>(),
    );
    context.insert("similar_posts", &post_views(&req, &state, &similar).await?);
    context.insert("form", &CommentForm::default());
    context.insert("errors", &FormErrors::default());

    render(&state, "blog/post/detail.html", &context)
}

/// GET /blog/search/?query=...
pub async fn post_search(
    req: HttpRequest,
    state: web::Data<AppState>,
    params: web::Query<SearchParams>,
) -> AppResult<HttpResponse> {
    let mut context = Context::new();
    let mut query = None;
    let mut results = Vec::new();

    match params.into_inner().query {
        None => {
            context.insert("form", &SearchForm::default());
            context.insert("errors", &FormErrors::default());
        }
        Some(raw) => match clean(SearchForm { query: raw }, SearchForm::cleaned) {
            Ok(form) => {
                let hits = state.posts.search(&form.query, SEARCH_RANK_THRESHOLD).await?;
                tracing::debug!(query = %form.query, hits = hits.len(), "Search finished");

                let posts: Vec<_> = hits.into_iter().map(|hit| hit.post).collect();
                results = post_views(&req, &state, &posts).await?;
                context.insert("errors", &FormErrors::default());
                context.insert("form", &form);
                query = Some(form.query);
            }
            Err((form, errors)) => {
                context.insert("form", &form);
                context.insert("errors", &errors);
            }
        },
    }

    context.insert("query", &query);
    context.insert("results", &results);

    render(&state, "blog/post/search.html", &context)
}
