use crate::domain::models::{CommentView, MAX_COMMENT_LENGTH};
use crate::error::{ServiceError, ServiceResult};
use crate::metrics::{result_label, COMMENTS_TOTAL, LIKE_TOGGLES_TOTAL};
use crate::repository::SocialStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Outcome of a like toggle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LikeOutcome {
    /// False when the toggle could not be applied (unknown post, store error)
    pub success: bool,
    /// Resulting state; always false when `success` is false
    pub liked: bool,
    pub post_id: Uuid,
}

/// What the client needs to render a freshly added comment without refetching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommenterInfo {
    pub username: String,
    pub comment_text: String,
}

/// Outcome of adding a comment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentOutcome {
    pub success: bool,
    pub post_id: Uuid,
    pub commenter: Option<CommenterInfo>,
}

/// Likes and comments on posts
#[derive(Clone)]
pub struct EngagementService {
    store: Arc<dyn SocialStore>,
}

impl EngagementService {
    pub fn new(store: Arc<dyn SocialStore>) -> Self {
        Self { store }
    }

    /// Like the post if `user_id` has not liked it yet, otherwise remove the like.
    pub async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> LikeOutcome {
        let outcome = match self.store.toggle_like(post_id, user_id).await {
            Ok(liked) => {
                debug!(post_id = %post_id, user_id = %user_id, liked, "like toggled");
                LikeOutcome {
                    success: true,
                    liked,
                    post_id,
                }
            }
            Err(e) => {
                warn!(post_id = %post_id, user_id = %user_id, error = %e, "like toggle failed");
                LikeOutcome {
                    success: false,
                    liked: false,
                    post_id,
                }
            }
        };

        let state = match (outcome.success, outcome.liked) {
            (false, _) => "failed",
            (true, true) => "liked",
            (true, false) => "unliked",
        };
        LIKE_TOGGLES_TOTAL.with_label_values(&[state]).inc();

        outcome
    }

    pub async fn get_like_count(&self, post_id: Uuid) -> ServiceResult<i64> {
        self.store.count_likes(post_id).await
    }

    pub async fn is_liked_by(&self, post_id: Uuid, user_id: Uuid) -> ServiceResult<bool> {
        self.store.like_exists(post_id, user_id).await
    }

    /// Append a comment to a post.
    ///
    /// Failures (unknown post or user, text over 100 characters, store errors)
    /// are logged and reported as `success = false` with no commenter info.
    pub async fn add_comment(&self, post_id: Uuid, user_id: Uuid, text: &str) -> CommentOutcome {
        let outcome = match self.insert_comment(post_id, user_id, text).await {
            Ok(commenter) => CommentOutcome {
                success: true,
                post_id,
                commenter: Some(commenter),
            },
            Err(e) => {
                warn!(post_id = %post_id, user_id = %user_id, error = %e, "add comment failed");
                CommentOutcome {
                    success: false,
                    post_id,
                    commenter: None,
                }
            }
        };

        COMMENTS_TOTAL
            .with_label_values(&[result_label(outcome.success)])
            .inc();

        outcome
    }

    async fn insert_comment(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        text: &str,
    ) -> ServiceResult<CommenterInfo> {
        if text.chars().count() > MAX_COMMENT_LENGTH {
            return Err(ServiceError::InvalidInput(format!(
                "comment exceeds {} characters",
                MAX_COMMENT_LENGTH
            )));
        }

        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {}", user_id)))?;

        let comment = self.store.create_comment(post_id, user_id, text).await?;
        debug!(comment_id = %comment.id, post_id = %post_id, "comment created");

        Ok(CommenterInfo {
            username: user.username,
            comment_text: comment.comment,
        })
    }

    pub async fn get_comment_count(&self, post_id: Uuid) -> ServiceResult<i64> {
        self.store.count_comments(post_id).await
    }

    pub async fn comments_for_post(&self, post_id: Uuid) -> ServiceResult<Vec<CommentView>> {
        self.store.list_comments(post_id).await
    }
}
