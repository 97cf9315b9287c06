//! Share a post by email.

use actix_web::{HttpRequest, HttpResponse, web};
use tera::Context;
use uuid::Uuid;

use blog_core::DomainError;
use blog_core::domain::Post;
use blog_core::ports::EmailMessage;
use blog_infra::mail::mask_email;
use blog_shared::{EmailPostForm, FormErrors, clean};

use super::render::{post_view, render};
use crate::middleware::error::AppResult;
use crate::state::AppState;

async fn published_post(state: &AppState, post_id: Uuid) -> AppResult<Post> {
    let post = state
        .posts
        .find_published(post_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", post_id))?;
    Ok(post)
}

/// Compose the recommendation sent to the recipient.
fn share_message(from: &str, form: &EmailPostForm, post: &Post, post_url: &str) -> EmailMessage {
    EmailMessage {
        from: from.to_string(),
        to: form.to.clone(),
        subject: format!("{} recommends you read {}", form.name, post.title),
        body: format!(
            "Read {} at {}\n\n{}'s comments: {}",
            post.title, post_url, form.name, form.comments
        ),
    }
}

/// GET /blog/{post_id}/share/
pub async fn share_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = published_post(&state, path.into_inner()).await?;

    let mut context = Context::new();
    context.insert("post", &post_view(&req, &state, &post).await?);
    context.insert("form", &EmailPostForm::default());
    context.insert("errors", &FormErrors::default());
    context.insert("sent", &false);

    render(&state, "blog/post/share.html", &context)
}

/// POST /blog/{post_id}/share/
pub async fn share_send(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    form: Option<web::Form<EmailPostForm>>,
) -> AppResult<HttpResponse> {
    let post = published_post(&state, path.into_inner()).await?;

    let mut context = Context::new();
    context.insert("post", &post_view(&req, &state, &post).await?);

    // A body that is not a urlencoded form is treated as an empty submission.
    let form = form.map(web::Form::into_inner).unwrap_or_default();
    match clean(form, EmailPostForm::cleaned) {
        Ok(form) => {
            let post_url = req.url_for("post_detail", post.url_segments())?;
            let message = share_message(&state.from_email, &form, &post, post_url.as_str());

            state.mailer.send(message).await?;
            tracing::info!(post_id = %post.id, to = %mask_email(&form.to), "Post shared by email");

            context.insert("form", &form);
            context.insert("errors", &FormErrors::default());
            context.insert("sent", &true);
        }
        Err((form, errors)) => {
            context.insert("form", &form);
            context.insert("errors", &errors);
            context.insert("sent", &false);
        }
    }

    render(&state, "blog/post/share.html", &context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn message_names_sender_and_links_the_post() {
        let post = Post::new(Uuid::new_v4(), "Who was Django Reinhardt?", "...")
            .unwrap()
            .published_at(Utc.with_ymd_and_hms(2025, 3, 7, 9, 0, 0).unwrap());
        let form = EmailPostForm {
            name: "Ann".into(),
            email: "ann@example.com".into(),
            to: "bob@example.com".into(),
            comments: "Great read".into(),
        };

        let message = share_message(
            "blog@example.com",
            &form,
            &post,
            "http://localhost/blog/2025/3/7/who-was-django-reinhardt/",
        );

        assert_eq!(message.to, "bob@example.com");
        assert_eq!(message.from, "blog@example.com");
        assert_eq!(message.subject, "Ann recommends you read Who was Django Reinhardt?");
        assert_eq!(
            message.body,
            "Read Who was Django Reinhardt? at http://localhost/blog/2025/3/7/who-was-django-reinhardt/\n\nAnn's comments: Great read"
        );
    }
}
