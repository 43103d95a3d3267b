/// HTTP surface of insta-service
///
/// - `social`: follow/like/comment toggles answering `{result: 0|1}`
/// - `feed`: explore, home and post detail
/// - `posts`: post creation, title edits, deletion
/// - `users`: signup, profiles, followers/following
pub mod feed;
pub mod posts;
pub mod social;
pub mod users;

use crate::metrics::serve_metrics;
use crate::state::AppState;
use actix_web::{error::InternalError, web, HttpResponse};

async fn readiness(state: web::Data<AppState>) -> HttpResponse {
    match state.store.health_check().await {
        Ok(()) => HttpResponse::Ok().body("READY"),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unhealthy",
                "error": "data store unavailable",
            }))
        }
    }
}

/// Toggle endpoints answer unreadable bodies with `result: 0` instead of a 400.
fn toggle_form_config() -> web::FormConfig {
    web::FormConfig::default().error_handler(|err, _req| {
        tracing::warn!(error = %err, "unreadable toggle form");
        InternalError::from_response(
            err,
            HttpResponse::Ok().json(serde_json::json!({ "result": 0 })),
        )
        .into()
    })
}

/// Register every route on an `App` or scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(|| async { "OK" }))
        .route("/ready", web::get().to(readiness))
        .route("/metrics", web::get().to(serve_metrics))
        .service(
            web::resource("/toggleFollow")
                .app_data(toggle_form_config())
                .route(web::post().to(social::toggle_follow)),
        )
        .service(
            web::resource("/addLike")
                .app_data(toggle_form_config())
                .route(web::post().to(social::add_like)),
        )
        .service(
            web::resource("/addComment")
                .app_data(toggle_form_config())
                .route(web::post().to(social::add_comment)),
        )
        .route("/signup", web::post().to(users::sign_up))
        .route("/explore", web::get().to(feed::explore))
        .route("/home", web::get().to(feed::home))
        .route("/posts", web::post().to(posts::create_post))
        .service(
            web::resource("/posts/{id}")
                .route(web::get().to(feed::post_detail))
                .route(web::patch().to(posts::update_post))
                .route(web::delete().to(posts::delete_post)),
        )
        .service(
            web::resource("/users/me")
                .route(web::get().to(users::my_profile))
                .route(web::patch().to(users::edit_profile))
                .route(web::delete().to(users::delete_account)),
        )
        .route("/users/{id}", web::get().to(users::get_profile))
        .route("/users/{id}/followers", web::get().to(users::followers))
        .route("/users/{id}/following", web::get().to(users::following))
        .route("/users/{id}/admin", web::put().to(users::set_admin));
}
