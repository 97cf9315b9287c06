use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use chrono::{DateTime, Duration, TimeZone, Utc};

use blog_core::domain::{Comment, Post, User};
use blog_infra::{InMemoryMailer, InMemoryStore};

use super::configure_routes;
use crate::state::{AppState, DEFAULT_TEMPLATE_DIR, load_templates};

macro_rules! get_page {
    ($app:expr, $uri:expr) => {{
        let resp = test::call_service(&$app, test::TestRequest::get().uri($uri).to_request()).await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        (status, String::from_utf8_lossy(&body).into_owned())
    }};
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

struct Fixture {
    state: AppState,
    mailer: Arc<InMemoryMailer>,
    author: User,
}

async fn fixture_with(mailer: InMemoryMailer) -> Fixture {
    let mailer = Arc::new(mailer);
    let state = AppState::with_store(
        Arc::new(InMemoryStore::new()),
        mailer.clone(),
        Arc::new(load_templates(DEFAULT_TEMPLATE_DIR).unwrap()),
        "blog@example.com".to_string(),
    );
    let author = state
        .users
        .save(User::new("admin".into(), "admin@example.com".into()))
        .await
        .unwrap();

    Fixture {
        state,
        mailer,
        author,
    }
}

async fn fixture() -> Fixture {
    fixture_with(InMemoryMailer::new()).await
}

fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap() + Duration::days(n)
}

impl Fixture {
    async fn publish(&self, title: &str, body: &str, at: i64) -> Post {
        let post = Post::new(self.author.id, title, body)
            .unwrap()
            .published_at(day(at));
        self.state.posts.save(post).await.unwrap()
    }

    async fn draft(&self, title: &str) -> Post {
        let post = Post::new(self.author.id, title, "Not ready").unwrap();
        self.state.posts.save(post).await.unwrap()
    }

    async fn tag(&self, post: &Post, names: &[&str]) {
        self.state.tags.tag_post(post.id, names).await.unwrap();
    }
}

fn detail_path(post: &Post) -> String {
    let [year, month, day, slug] = post.url_segments();
    format!("/blog/{year}/{month}/{day}/{slug}/")
}

#[actix_web::test]
async fn health_reports_storage_backend() {
    let fx = fixture().await;
    let app = init_app!(fx.state);

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}

#[actix_web::test]
async fn listing_shows_published_posts_only() {
    let fx = fixture().await;
    fx.publish("Visible story", "Hello", 1).await;
    fx.draft("Hidden draft").await;
    let app = init_app!(fx.state);

    let (status, body) = get_page!(app, "/blog/");

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Visible story"));
    assert!(!body.contains("Hidden draft"));
    assert!(body.contains("Page 1 of 1."));
}

#[actix_web::test]
async fn listing_falls_back_on_bad_page_numbers() {
    let fx = fixture().await;
    for n in 0..5 {
        fx.publish(&format!("Entry {n}"), "Body", n).await;
    }
    let app = init_app!(fx.state);

    let (_, garbage) = get_page!(app, "/blog/?page=abc");
    assert!(garbage.contains("Entry 4"));
    assert!(garbage.contains("Page 1 of 2."));

    let (_, overflow) = get_page!(app, "/blog/?page=99");
    assert!(overflow.contains("Entry 0"));
    assert!(!overflow.contains("Entry 4"));
    assert!(overflow.contains("Page 2 of 2."));

    for uri in ["/blog/?page=2.0", "/blog/?page=1e1"] {
        let (_, decimal) = get_page!(app, uri);
        assert!(decimal.contains("Entry 4"));
        assert!(decimal.contains("Page 1 of 2."));
    }
}

#[actix_web::test]
async fn listing_by_tag_filters_and_rejects_unknown_tags() {
    let fx = fixture().await;
    let jazz = fx.publish("Gypsy swing", "Body", 1).await;
    fx.publish("Heavy metal", "Body", 2).await;
    fx.tag(&jazz, &["jazz"]).await;
    let app = init_app!(fx.state);

    let (status, body) = get_page!(app, "/blog/tag/jazz/");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Gypsy swing"));
    assert!(!body.contains("Heavy metal"));

    let (status, _) = get_page!(app, "/blog/tag/polka/");
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn detail_shows_active_comments_and_similar_posts() {
    let fx = fixture().await;
    let post = fx.publish("Main post", "Body", 5).await;
    let related = fx.publish("Related post", "Body", 3).await;
    let hidden = fx.draft("Draft cousin").await;
    fx.tag(&post, &["music"]).await;
    fx.tag(&related, &["music"]).await;
    fx.tag(&hidden, &["music"]).await;

    let visible = Comment::new(post.id, "Bo".into(), "bo@example.com".into(), "Lovely".into());
    let spam = Comment::new(post.id, "Cy".into(), "cy@example.com".into(), "Buy pills".into())
        .deactivate();
    fx.state.comments.save(visible).await.unwrap();
    fx.state.comments.save(spam).await.unwrap();
    let app = init_app!(fx.state);

    let (status, body) = get_page!(app, &detail_path(&post));

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<h1>Main post</h1>"));
    assert!(body.contains("Lovely"));
    assert!(!body.contains("Buy pills"));
    assert!(body.contains("1 comment</h2>"));
    assert!(body.contains("Related post"));
    assert!(!body.contains("Draft cousin"));
}

#[actix_web::test]
async fn detail_is_not_found_for_drafts_and_wrong_dates() {
    let fx = fixture().await;
    let post = fx.publish("Dated", "Body", 2).await;
    let draft = fx.draft("Unpublished").await;
    let app = init_app!(fx.state);

    let (status, _) = get_page!(app, &detail_path(&draft));
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get_page!(app, &format!("/blog/2025/2/30/{}/", post.slug));
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get_page!(app, &format!("/blog/2025/1/9/{}/", post.slug));
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get_page!(app, &format!("/blog/year/1/3/{}/", post.slug));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn comment_endpoint_only_accepts_post() {
    let fx = fixture().await;
    let post = fx.publish("Open thread", "Body", 1).await;
    let app = init_app!(fx.state);

    let (status, _) = get_page!(app, &format!("/blog/{}/comment/", post.id));

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[actix_web::test]
async fn valid_comment_is_stored() {
    let fx = fixture().await;
    let post = fx.publish("Open thread", "Body", 1).await;
    let app = init_app!(fx.state);

    let req = test::TestRequest::post()
        .uri(&format!("/blog/{}/comment/", post.id))
        .set_form([("name", "Bo"), ("email", "bo@example.com"), ("body", "First!")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8_lossy(&test::read_body(resp).await).into_owned();
    assert!(body.contains("Your comment has been added."));

    let stored = fx.state.comments.active_for_post(post.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].body, "First!");
}

#[actix_web::test]
async fn comment_without_email_is_rejected_inline() {
    let fx = fixture().await;
    let post = fx.publish("Open thread", "Body", 1).await;
    let app = init_app!(fx.state);

    let req = test::TestRequest::post()
        .uri(&format!("/blog/{}/comment/", post.id))
        .set_form([("name", "Bo"), ("body", "No address")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8_lossy(&test::read_body(resp).await).into_owned();
    assert!(body.contains("This field is required."));
    assert!(!body.contains("Your comment has been added."));
    assert!(fx.state.comments.active_for_post(post.id).await.unwrap().is_empty());
}

#[actix_web::test]
async fn comment_on_draft_or_missing_post_is_not_found() {
    let fx = fixture().await;
    let draft = fx.draft("Unpublished").await;
    let app = init_app!(fx.state);

    for id in [draft.id, uuid::Uuid::new_v4()] {
        let req = test::TestRequest::post()
            .uri(&format!("/blog/{id}/comment/"))
            .set_form([("name", "Bo"), ("email", "bo@example.com"), ("body", "Hi")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    assert!(fx.state.comments.active_for_post(draft.id).await.unwrap().is_empty());
}

#[actix_web::test]
async fn unpublished_post_is_not_found_whatever_the_body() {
    let fx = fixture().await;
    let draft = fx.draft("Unpublished").await;
    let app = init_app!(fx.state);

    for id in [draft.id, uuid::Uuid::new_v4()] {
        for action in ["comment", "share"] {
            let untyped = test::TestRequest::post()
                .uri(&format!("/blog/{id}/{action}/"))
                .set_payload("name=Bo")
                .to_request();
            let resp = test::call_service(&app, untyped).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);

            let json = test::TestRequest::post()
                .uri(&format!("/blog/{id}/{action}/"))
                .set_json(serde_json::json!({ "name": "Bo" }))
                .to_request();
            let resp = test::call_service(&app, json).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        }
    }

    assert!(fx.state.comments.active_for_post(draft.id).await.unwrap().is_empty());
    assert!(fx.mailer.sent().await.is_empty());
}

#[actix_web::test]
async fn unreadable_body_on_published_post_is_an_empty_form() {
    let fx = fixture().await;
    let post = fx.publish("Open thread", "Body", 1).await;
    let app = init_app!(fx.state);

    let req = test::TestRequest::post()
        .uri(&format!("/blog/{}/comment/", post.id))
        .set_payload("name=Bo")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8_lossy(&test::read_body(resp).await).into_owned();
    assert!(body.contains("This field is required."));
    assert!(fx.state.comments.active_for_post(post.id).await.unwrap().is_empty());
}

#[actix_web::test]
async fn share_form_starts_blank() {
    let fx = fixture().await;
    let post = fx.publish("Worth sharing", "Body", 1).await;
    let app = init_app!(fx.state);

    let (status, body) = get_page!(app, &format!("/blog/{}/share/", post.id));

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("by e-mail"));
    assert!(!body.contains("E-mail successfully sent"));
    assert!(fx.mailer.sent().await.is_empty());
}

#[actix_web::test]
async fn sharing_sends_one_message_to_the_recipient() {
    let fx = fixture().await;
    let post = fx.publish("Worth sharing", "Body", 1).await;
    let app = init_app!(fx.state);

    let req = test::TestRequest::post()
        .uri(&format!("/blog/{}/share/", post.id))
        .set_form([
            ("name", "Ann"),
            ("email", "ann@example.com"),
            ("to", "bob@example.com"),
            ("comments", "Have a look"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8_lossy(&test::read_body(resp).await).into_owned();
    assert!(body.contains("E-mail successfully sent"));

    let sent = fx.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "bob@example.com");
    assert_eq!(sent[0].from, "blog@example.com");
    assert_eq!(sent[0].subject, "Ann recommends you read Worth sharing");
    assert!(sent[0].body.contains(&detail_path(&post)));
    assert!(sent[0].body.ends_with("Ann's comments: Have a look"));
}

#[actix_web::test]
async fn invalid_share_sends_nothing() {
    let fx = fixture().await;
    let post = fx.publish("Worth sharing", "Body", 1).await;
    let app = init_app!(fx.state);

    let req = test::TestRequest::post()
        .uri(&format!("/blog/{}/share/", post.id))
        .set_form([("name", "Ann"), ("email", "ann@example.com"), ("to", "nobody")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8_lossy(&test::read_body(resp).await).into_owned();
    assert!(body.contains("Enter a valid email address."));
    assert!(fx.mailer.sent().await.is_empty());
}

#[actix_web::test]
async fn mail_failure_is_a_server_error() {
    let fx = fixture_with(InMemoryMailer::failing("connection refused")).await;
    let post = fx.publish("Worth sharing", "Body", 1).await;
    let app = init_app!(fx.state);

    let req = test::TestRequest::post()
        .uri(&format!("/blog/{}/share/", post.id))
        .set_form([("name", "Ann"), ("email", "ann@example.com"), ("to", "bob@example.com")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "Mail Delivery Failed");
}

#[actix_web::test]
async fn search_without_query_shows_blank_form() {
    let fx = fixture().await;
    let app = init_app!(fx.state);

    let (status, body) = get_page!(app, "/blog/search/");

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Search for posts"));
    assert!(!body.contains("This field is required."));
    assert!(!body.contains("Posts containing"));
}

#[actix_web::test]
async fn blank_search_query_reports_an_error() {
    let fx = fixture().await;
    let app = init_app!(fx.state);

    let (status, body) = get_page!(app, "/blog/search/?query=+++");

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("This field is required."));
    assert!(!body.contains("Posts containing"));
}

#[actix_web::test]
async fn search_keeps_relevant_published_posts() {
    let fx = fixture().await;
    fx.publish("Django Reinhardt", "A guitarist", 1).await;
    fx.publish("Guitar heroes", "Mentions django only in passing", 2).await;
    fx.draft("Django draft").await;
    let app = init_app!(fx.state);

    let (status, body) = get_page!(app, "/blog/search/?query=django");

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Posts containing \"django\""));
    assert!(body.contains("Found 1 result</h3>"));
    assert!(body.contains("Django Reinhardt"));
    assert!(!body.contains("Guitar heroes"));
    assert!(!body.contains("Django draft"));
}
