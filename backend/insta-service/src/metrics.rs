//! Prometheus metrics for insta-service.
//!
//! Counters for the follow/like/comment toggles and an HTTP handler for `/metrics`.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

lazy_static! {
    /// Follow toggles segmented by requested action and outcome.
    pub static ref FOLLOW_TOGGLES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "insta_follow_toggles_total",
        "Follow/unfollow requests segmented by action and result",
        &["action", "result"]
    )
    .expect("failed to register insta_follow_toggles_total");

    /// Like toggles segmented by resulting state (liked/unliked/failed).
    pub static ref LIKE_TOGGLES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "insta_like_toggles_total",
        "Like toggles segmented by resulting state",
        &["state"]
    )
    .expect("failed to register insta_like_toggles_total");

    /// Comment submissions segmented by outcome.
    pub static ref COMMENTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "insta_comments_total",
        "Comment submissions segmented by result",
        &["result"]
    )
    .expect("failed to register insta_comments_total");
}

pub fn result_label(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
