//! Route configuration
//!
//! Shared by the binary and the integration tests

use std::sync::Arc;

use actix_web::web;

use crate::handlers;
use crate::metrics;
use crate::middleware::JwtAuthMiddleware;
use crate::security::JwtKeys;

/// Configure all routes for the application
pub fn configure_routes(cfg: &mut web::ServiceConfig, jwt: Arc<JwtKeys>) {
    cfg.route("/health", web::get().to(handlers::health::health))
        .route("/metrics", web::get().to(metrics::serve_metrics))
        .service(
            web::scope("/auth")
                .route("/register", web::post().to(handlers::auth::register))
                .route("/is-taken/{username}", web::get().to(handlers::auth::is_taken))
                .route("/login", web::post().to(handlers::auth::login))
                .route(
                    "/reset/token",
                    web::post().to(handlers::auth::reset_password),
                )
                .route(
                    "/reset",
                    web::post().to(handlers::auth::request_password_reset),
                )
                .service(
                    web::resource("")
                        .wrap(JwtAuthMiddleware::new(jwt.clone()))
                        .route(web::get().to(handlers::auth::current_user)),
                )
                .service(
                    web::resource("/logout")
                        .wrap(JwtAuthMiddleware::new(jwt.clone()))
                        .route(web::post().to(handlers::auth::logout)),
                ),
        )
        .service(
            web::scope("/user")
                .wrap(JwtAuthMiddleware::new(jwt.clone()))
                .route("/info/{user_id}", web::get().to(handlers::users::info))
                .route("/profile/{username}", web::get().to(handlers::users::profile))
                .route("/update", web::patch().to(handlers::users::update_profile))
                .route("/search/{query}", web::get().to(handlers::users::search))
                .route("/follow/{user_id}", web::patch().to(handlers::users::follow))
                .route("/unfollow/{user_id}", web::patch().to(handlers::users::unfollow))
                .route("/followers/{user_id}", web::get().to(handlers::users::followers))
                .route("/following/{user_id}", web::get().to(handlers::users::following))
                .route(
                    "/notifications",
                    web::patch().to(handlers::users::mark_notifications_read),
                )
                .route(
                    "/settings/update-password",
                    web::patch().to(handlers::users::update_password),
                ),
        )
        .service(
            web::scope("/post")
                .wrap(JwtAuthMiddleware::new(jwt.clone()))
                .route("", web::get().to(handlers::posts::feed))
                .route("", web::post().to(handlers::posts::create_post))
                .route("/single/{post_id}", web::get().to(handlers::posts::single))
                .route("/user/{username}", web::get().to(handlers::posts::by_user))
                .route("/comment/{post_id}", web::post().to(handlers::posts::comment))
                .route(
                    "/comment/{post_id}/{comment_id}",
                    web::delete().to(handlers::posts::delete_comment),
                )
                .route("/like/{post_id}", web::patch().to(handlers::posts::like))
                .route("/unlike/{post_id}", web::patch().to(handlers::posts::unlike))
                .route("/likes/{post_id}", web::get().to(handlers::posts::likes))
                // Catch-all id segment goes last
                .route("/{post_id}", web::delete().to(handlers::posts::delete_post)),
        )
        .service(
            web::scope("/notifications")
                .wrap(JwtAuthMiddleware::new(jwt.clone()))
                .route("", web::get().to(handlers::notifications::list)),
        )
        .service(
            web::resource("/ws")
                .wrap(JwtAuthMiddleware::new(jwt))
                .route(web::get().to(handlers::websocket::connect)),
        );
}
