/// Account and profile endpoints
use crate::error::{ServiceError, ServiceResult};
use crate::media::decode_image;
use crate::middleware::UserId;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Usernames are trimmed and checked for blanks by `UserService`; the
/// length bound here applies to the raw value.
#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(email)]
    pub email: Option<String>,
    /// Base64 image data, optionally as a `data:` URL
    pub profile_pic: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EditProfileRequest {
    #[validate(length(min = 1, max = 150))]
    pub username: Option<String>,
    pub profile_pic: Option<String>,
}

/// POST /signup - register the authenticated identity as a user
pub async fn sign_up(
    state: web::Data<AppState>,
    user_id: UserId,
    req: web::Json<SignUpRequest>,
) -> ServiceResult<HttpResponse> {
    let req = req.into_inner();
    req.validate()
        .map_err(|e| ServiceError::InvalidInput(e.to_string()))?;

    let profile_pic = req.profile_pic.as_deref().map(decode_image).transpose()?;
    let user = state
        .users
        .sign_up(user_id.0, req.username, req.email, profile_pic)
        .await?;

    Ok(HttpResponse::Created().json(user))
}

#[derive(Debug, Deserialize)]
pub struct SetAdminRequest {
    pub is_admin: bool,
}

/// PUT /users/{id}/admin - admins only
pub async fn set_admin(
    state: web::Data<AppState>,
    actor: UserId,
    user_id: web::Path<Uuid>,
    req: web::Json<SetAdminRequest>,
) -> ServiceResult<HttpResponse> {
    let user = state
        .users
        .set_admin(actor.0, *user_id, req.is_admin)
        .await?;
    Ok(HttpResponse::Ok().json(user))
}

/// GET /users/me
pub async fn my_profile(
    state: web::Data<AppState>,
    user_id: UserId,
) -> ServiceResult<HttpResponse> {
    let profile = state.users.profile(user_id.0, user_id.0).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// GET /users/{id}
pub async fn get_profile(
    state: web::Data<AppState>,
    viewer: UserId,
    user_id: web::Path<Uuid>,
) -> ServiceResult<HttpResponse> {
    let profile = state.users.profile(*user_id, viewer.0).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// PATCH /users/me
pub async fn edit_profile(
    state: web::Data<AppState>,
    user_id: UserId,
    req: web::Json<EditProfileRequest>,
) -> ServiceResult<HttpResponse> {
    let req = req.into_inner();
    req.validate()
        .map_err(|e| ServiceError::InvalidInput(e.to_string()))?;

    let profile_pic = req.profile_pic.as_deref().map(decode_image).transpose()?;
    let user = state
        .users
        .edit_profile(user_id.0, req.username, profile_pic)
        .await?;

    Ok(HttpResponse::Ok().json(user))
}

/// DELETE /users/me
pub async fn delete_account(
    state: web::Data<AppState>,
    user_id: UserId,
) -> ServiceResult<HttpResponse> {
    state.users.delete_account(user_id.0).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /users/{id}/followers
pub async fn followers(
    state: web::Data<AppState>,
    _viewer: UserId,
    user_id: web::Path<Uuid>,
) -> ServiceResult<HttpResponse> {
    let users = state.users.followers(*user_id).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// GET /users/{id}/following
pub async fn following(
    state: web::Data<AppState>,
    _viewer: UserId,
    user_id: web::Path<Uuid>,
) -> ServiceResult<HttpResponse> {
    let users = state.users.following(*user_id).await?;
    Ok(HttpResponse::Ok().json(users))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_up_validation() {
        let valid = SignUpRequest {
            username: "alice".into(),
            email: Some("alice@example.com".into()),
            profile_pic: None,
        };
        assert!(valid.validate().is_ok());

        let empty_name = SignUpRequest {
            username: String::new(),
            email: None,
            profile_pic: None,
        };
        assert!(empty_name.validate().is_err());

        let bad_email = SignUpRequest {
            username: "alice".into(),
            email: Some("not-an-email".into()),
            profile_pic: None,
        };
        assert!(bad_email.validate().is_err());
    }
}
