//! HTTP handlers and route configuration.

mod auth;
mod feed;
mod health;

use actix_web::web;

/// Configure the REST routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        // Public auth routes
        .route("/signup", web::post().to(auth::signup))
        .route("/login", web::post().to(auth::login))
        // Status (auth required)
        .route("/status", web::get().to(feed::get_status))
        .route("/status", web::put().to(feed::update_status))
        // Feed
        .route("/posts", web::get().to(feed::get_posts))
        .route("/posts", web::post().to(feed::create_post))
        .route("/posts/{post_id}", web::get().to(feed::get_post))
        .route("/posts/{post_id}", web::put().to(feed::update_post))
        .route("/posts/{post_id}", web::delete().to(feed::delete_post))
        // Standalone upload used by the GraphQL create flow
        .route("/post-image", web::put().to(feed::upload_image));
}
