//! Comment submission.

use actix_web::{HttpRequest, HttpResponse, web};
use tera::Context;
use uuid::Uuid;

use blog_core::DomainError;
use blog_core::domain::Comment;
use blog_shared::{CommentForm, FormErrors, clean};

use super::render::{CommentView, post_view, render};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /blog/{post_id}/comment/
///
/// Valid input stores an active comment; invalid input re-renders the form
/// with its errors and stores nothing.
pub async fn post_comment(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    form: Option<web::Form<CommentForm>>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let post = state
        .posts
        .find_published(post_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", post_id))?;

    let mut context = Context::new();
    context.insert("post", &post_view(&req, &state, &post).await?);

    // A body that is not a urlencoded form is treated as an empty submission.
    let form = form.map(web::Form::into_inner).unwrap_or_default();
    match clean(form, CommentForm::cleaned) {
        Ok(form) => {
            let comment = Comment::new(post.id, form.name, form.email, form.body);
            let comment = state.comments.save(comment).await?;
            tracing::info!(
                post_id = %post.id,
                comment_id = %comment.id,
                "{}",
                comment.on(&post)
            );

            context.insert("comment", &Some(CommentView::from(&comment)));
            context.insert("form", &CommentForm::default());
            context.insert("errors", &FormErrors::default());
        }
        Err((form, errors)) => {
            tracing::debug!(post_id = %post.id, ?errors, "Comment rejected");

            context.insert("comment", &None::<CommentView>);
            context.insert("form", &form);
            context.insert("errors", &errors);
        }
    }

    render(&state, "blog/post/comment.html", &context)
}
