use crate::domain::models::{Connection, FollowAction};
use crate::error::{ServiceError, ServiceResult};
use crate::metrics::{result_label, FOLLOW_TOGGLES_TOTAL};
use crate::repository::SocialStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Outcome of a follow/unfollow request, echoed back to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FollowOutcome {
    pub success: bool,
    pub action: FollowAction,
    pub target_id: Uuid,
}

/// Follow/unfollow state between users
#[derive(Clone)]
pub struct FollowService {
    store: Arc<dyn SocialStore>,
}

impl FollowService {
    pub fn new(store: Arc<dyn SocialStore>) -> Self {
        Self { store }
    }

    /// Apply `action` to the edge actor -> target.
    ///
    /// Never fails: self-follows, unknown targets and store errors are reported
    /// as `success = false`. Following twice keeps a single edge; unfollowing
    /// with no edge in place still succeeds.
    pub async fn toggle_follow(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        action: FollowAction,
    ) -> FollowOutcome {
        let success = match self.apply(actor_id, target_id, action).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    actor_id = %actor_id,
                    target_id = %target_id,
                    action = %action,
                    error = %e,
                    "follow toggle rejected"
                );
                false
            }
        };

        FOLLOW_TOGGLES_TOTAL
            .with_label_values(&[action.as_str(), result_label(success)])
            .inc();

        FollowOutcome {
            success,
            action,
            target_id,
        }
    }

    async fn apply(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        action: FollowAction,
    ) -> ServiceResult<()> {
        if actor_id == target_id {
            return Err(ServiceError::InvalidInput(
                "self-follow rejected".to_string(),
            ));
        }

        if self.store.get_user(target_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("user {}", target_id)));
        }

        match action {
            FollowAction::Follow => {
                let created = self.store.create_connection(actor_id, target_id).await?;
                debug!("{} follows {} (new edge: {})", actor_id, target_id, created);
            }
            FollowAction::Unfollow => {
                let removed = self.store.delete_connections(actor_id, target_id).await?;
                debug!("{} unfollowed {} (removed {})", actor_id, target_id, removed);
            }
        }
        Ok(())
    }

    /// Connections starting at `user_id` (who the user follows)
    pub async fn get_following(&self, user_id: Uuid) -> ServiceResult<Vec<Connection>> {
        self.store.connections_from(user_id).await
    }

    /// Connections ending at `user_id` (who follows the user)
    pub async fn get_followers(&self, user_id: Uuid) -> ServiceResult<Vec<Connection>> {
        self.store.connections_to(user_id).await
    }

    /// True if `other_id` follows `user_id`
    pub async fn is_followed_by(&self, user_id: Uuid, other_id: Uuid) -> ServiceResult<bool> {
        self.store.connection_exists(other_id, user_id).await
    }

    pub async fn follower_count(&self, user_id: Uuid) -> ServiceResult<i64> {
        self.store.count_connections_to(user_id).await
    }

    pub async fn following_count(&self, user_id: Uuid) -> ServiceResult<i64> {
        self.store.count_connections_from(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::NewUser;
    use crate::repository::MemorySocialStore;

    async fn setup() -> (FollowService, Uuid, Uuid) {
        let store = Arc::new(MemorySocialStore::new());
        let mut ids = Vec::new();
        for name in ["alice", "bob"] {
            let user = store
                .create_user(NewUser {
                    id: Uuid::new_v4(),
                    username: name.to_string(),
                    email: None,
                    profile_pic: None,
                })
                .await
                .unwrap();
            ids.push(user.id);
        }
        (FollowService::new(store), ids[0], ids[1])
    }

    #[tokio::test]
    async fn test_follow_then_unfollow_leaves_no_edge() {
        let (service, alice, bob) = setup().await;

        let outcome = service
            .toggle_follow(alice, bob, FollowAction::Follow)
            .await;
        assert!(outcome.success);
        assert_eq!(outcome.action, FollowAction::Follow);
        assert_eq!(outcome.target_id, bob);
        assert!(service.is_followed_by(bob, alice).await.unwrap());
        assert!(!service.is_followed_by(alice, bob).await.unwrap());

        let outcome = service
            .toggle_follow(alice, bob, FollowAction::Unfollow)
            .await;
        assert!(outcome.success);
        assert!(!service.is_followed_by(bob, alice).await.unwrap());
        assert!(service.get_following(alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_self_follow_rejected() {
        let (service, alice, _) = setup().await;

        let outcome = service
            .toggle_follow(alice, alice, FollowAction::Follow)
            .await;
        assert!(!outcome.success);
        assert_eq!(service.following_count(alice).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_repeated_follow_keeps_single_edge() {
        let (service, alice, bob) = setup().await;

        assert!(service.toggle_follow(alice, bob, FollowAction::Follow).await.success);
        assert!(service.toggle_follow(alice, bob, FollowAction::Follow).await.success);
        assert_eq!(service.get_followers(bob).await.unwrap().len(), 1);
        assert_eq!(service.follower_count(bob).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unfollow_without_edge_succeeds() {
        let (service, alice, bob) = setup().await;

        let outcome = service
            .toggle_follow(alice, bob, FollowAction::Unfollow)
            .await;
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn test_unknown_target_reports_failure() {
        let (service, alice, _) = setup().await;

        for action in [FollowAction::Follow, FollowAction::Unfollow] {
            let outcome = service.toggle_follow(alice, Uuid::new_v4(), action).await;
            assert!(!outcome.success);
        }
    }
}
