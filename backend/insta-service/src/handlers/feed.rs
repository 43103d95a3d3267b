use crate::error::ServiceResult;
use crate::middleware::UserId;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ExploreParams {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct HomeParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /explore - everyone's posts, oldest first, at most 20
pub async fn explore(
    state: web::Data<AppState>,
    _user_id: UserId,
    query: web::Query<ExploreParams>,
) -> ServiceResult<HttpResponse> {
    let posts = state.feed.explore(query.limit).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /home - posts by the users the caller follows
pub async fn home(
    state: web::Data<AppState>,
    user_id: UserId,
    query: web::Query<HomeParams>,
) -> ServiceResult<HttpResponse> {
    let posts = state.feed.home(user_id.0, query.limit, query.offset).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /posts/{id}
pub async fn post_detail(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
) -> ServiceResult<HttpResponse> {
    let detail = state.feed.post_detail(*post_id, user_id.0).await?;
    Ok(HttpResponse::Ok().json(detail))
}
