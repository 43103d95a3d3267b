/// Follow, like and comment endpoints.
///
/// These always answer `200` with a `{result: 0|1, ...}` body: validation
/// failures, unknown ids and store errors all come back as `result: 0`.
use crate::domain::models::FollowAction;
use crate::middleware::UserId;
use crate::services::CommenterInfo;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ToggleFollowForm {
    #[serde(alias = "follow_user_pk")]
    pub follow_user_id: Option<String>,
    #[serde(rename = "type")]
    pub action: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ToggleFollowResponse {
    pub result: u8,
    #[serde(rename = "type")]
    pub action: Option<String>,
    pub follow_user_pk: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddLikeForm {
    #[serde(alias = "post_pk")]
    pub post_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AddLikeResponse {
    pub result: u8,
    pub post_pk: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddCommentForm {
    #[serde(alias = "post_pk")]
    pub post_id: Option<String>,
    pub comment_text: Option<String>,
}

/// Empty object on failure, `{username, comment_text}` on success
#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CommenterInfoBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_text: Option<String>,
}

impl From<CommenterInfo> for CommenterInfoBody {
    fn from(info: CommenterInfo) -> Self {
        Self {
            username: Some(info.username),
            comment_text: Some(info.comment_text),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AddCommentResponse {
    pub result: u8,
    pub post_pk: Option<String>,
    pub commenter_info: CommenterInfoBody,
}

fn parse_id(raw: Option<&str>, field: &str) -> Option<Uuid> {
    match raw.map(|s| Uuid::parse_str(s.trim())) {
        Some(Ok(id)) => Some(id),
        Some(Err(_)) => {
            warn!(field, value = raw.unwrap_or_default(), "malformed id");
            None
        }
        None => {
            warn!(field, "missing id");
            None
        }
    }
}

/// POST /toggleFollow
pub async fn toggle_follow(
    state: web::Data<AppState>,
    user_id: UserId,
    form: web::Form<ToggleFollowForm>,
) -> HttpResponse {
    let form = form.into_inner();

    let target = parse_id(form.follow_user_id.as_deref(), "follow_user_id");
    let action = form
        .action
        .as_deref()
        .and_then(|a| a.parse::<FollowAction>().ok());

    let success = match (target, action) {
        (Some(target_id), Some(action)) => {
            state
                .follow
                .toggle_follow(user_id.0, target_id, action)
                .await
                .success
        }
        (_, None) => {
            warn!(user_id = %user_id.0, action = ?form.action, "unknown follow action");
            false
        }
        (None, _) => false,
    };

    HttpResponse::Ok().json(ToggleFollowResponse {
        result: u8::from(success),
        action: form.action,
        follow_user_pk: form.follow_user_id,
    })
}

/// POST /addLike
pub async fn add_like(
    state: web::Data<AppState>,
    user_id: UserId,
    form: web::Form<AddLikeForm>,
) -> HttpResponse {
    let form = form.into_inner();

    let liked = match parse_id(form.post_id.as_deref(), "post_id") {
        Some(post_id) => state.engagement.toggle_like(post_id, user_id.0).await.liked,
        None => false,
    };

    HttpResponse::Ok().json(AddLikeResponse {
        result: u8::from(liked),
        post_pk: form.post_id,
    })
}

/// POST /addComment
pub async fn add_comment(
    state: web::Data<AppState>,
    user_id: UserId,
    form: web::Form<AddCommentForm>,
) -> HttpResponse {
    let form = form.into_inner();

    let outcome = match (
        parse_id(form.post_id.as_deref(), "post_id"),
        form.comment_text.as_deref(),
    ) {
        (Some(post_id), Some(text)) => {
            Some(state.engagement.add_comment(post_id, user_id.0, text).await)
        }
        (Some(_), None) => {
            warn!(user_id = %user_id.0, "comment_text missing");
            None
        }
        (None, _) => None,
    };

    let (success, commenter_info) = match outcome {
        Some(outcome) => (
            outcome.success,
            outcome.commenter.map(CommenterInfoBody::from).unwrap_or_default(),
        ),
        None => (false, CommenterInfoBody::default()),
    };

    HttpResponse::Ok().json(AddCommentResponse {
        result: u8::from(success),
        post_pk: form.post_id,
        commenter_info,
    })
}
