//! HTTP handlers and route configuration.

mod comments;
mod health;
mod posts;
mod render;
mod share;

#[cfg(test)]
mod tests;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api").route("/health", web::get().to(health::health_check)))
        .service(
            web::scope("/blog")
                .service(
                    web::resource("/")
                        .name("post_list")
                        .route(web::get().to(posts::post_list)),
                )
                .service(
                    web::resource("/search/")
                        .name("post_search")
                        .route(web::get().to(posts::post_search)),
                )
                .service(
                    web::resource("/tag/{tag_slug}/")
                        .name("post_list_by_tag")
                        .route(web::get().to(posts::post_list_by_tag)),
                )
                .service(
                    web::resource("/{year}/{month}/{day}/{slug}/")
                        .name("post_detail")
                        .route(web::get().to(posts::post_detail)),
                )
                // Resources answer 405 for methods without a route.
                .service(
                    web::resource("/{post_id}/comment/")
                        .name("post_comment")
                        .route(web::post().to(comments::post_comment)),
                )
                .service(
                    web::resource("/{post_id}/share/")
                        .name("post_share")
                        .route(web::get().to(share::share_form))
                        .route(web::post().to(share::share_send)),
                ),
        );
}
