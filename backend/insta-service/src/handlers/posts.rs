/// Post handlers - HTTP endpoints for creating, editing and deleting posts
use crate::error::{ServiceError, ServiceResult};
use crate::media::decode_image;
use crate::middleware::UserId;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(max = 2200))]
    pub title: Option<String>,
    /// Base64 image data, optionally as a `data:` URL
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(max = 2200))]
    pub title: Option<String>,
}

/// POST /posts
pub async fn create_post(
    state: web::Data<AppState>,
    user_id: UserId,
    req: web::Json<CreatePostRequest>,
) -> ServiceResult<HttpResponse> {
    let req = req.into_inner();
    req.validate()
        .map_err(|e| ServiceError::InvalidInput(e.to_string()))?;

    let image = req.image.as_deref().map(decode_image).transpose()?;
    let post = state.posts.create_post(user_id.0, req.title, image).await?;

    Ok(HttpResponse::Created().json(post))
}

/// PATCH /posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
    req: web::Json<UpdatePostRequest>,
) -> ServiceResult<HttpResponse> {
    let req = req.into_inner();
    req.validate()
        .map_err(|e| ServiceError::InvalidInput(e.to_string()))?;

    let post = state
        .posts
        .update_title(*post_id, user_id.0, req.title)
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
) -> ServiceResult<HttpResponse> {
    state.posts.delete_post(*post_id, user_id.0).await?;
    Ok(HttpResponse::NoContent().finish())
}
