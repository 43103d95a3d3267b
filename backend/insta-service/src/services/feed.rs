use crate::domain::models::{Post, PostDetail, EXPLORE_MAX_LIMIT};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::SocialStore;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Default page size for the home feed
pub const HOME_DEFAULT_LIMIT: i64 = 20;
/// Largest page the home feed serves at once
pub const HOME_MAX_LIMIT: i64 = 50;

/// Explore, home and post-detail queries
#[derive(Clone)]
pub struct FeedService {
    store: Arc<dyn SocialStore>,
}

impl FeedService {
    pub fn new(store: Arc<dyn SocialStore>) -> Self {
        Self { store }
    }

    /// Every post, oldest first, at most 20. Not personalized.
    pub async fn explore(&self, limit: Option<i64>) -> ServiceResult<Vec<Post>> {
        let limit = limit
            .unwrap_or(EXPLORE_MAX_LIMIT)
            .clamp(0, EXPLORE_MAX_LIMIT);
        self.store.list_posts_oldest_first(limit).await
    }

    /// Posts written by the users `user_id` follows, newest first.
    pub async fn home(
        &self,
        user_id: Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> ServiceResult<Vec<Post>> {
        let limit = limit
            .unwrap_or(HOME_DEFAULT_LIMIT)
            .clamp(1, HOME_MAX_LIMIT);
        let offset = offset.unwrap_or(0).max(0);

        let posts = self
            .store
            .list_posts_by_followed(user_id, limit, offset)
            .await?;
        debug!(user_id = %user_id, count = posts.len(), "home feed assembled");
        Ok(posts)
    }

    /// A post with whether `viewer_id` liked it, its counters and its comments.
    pub async fn post_detail(&self, post_id: Uuid, viewer_id: Uuid) -> ServiceResult<PostDetail> {
        let post = self
            .store
            .get_post(post_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("post {}", post_id)))?;

        let liked_by_viewer = self.store.like_exists(post_id, viewer_id).await?;
        let like_count = self.store.count_likes(post_id).await?;
        let comments = self.store.list_comments(post_id).await?;
        let comment_count = self.store.count_comments(post_id).await?;

        Ok(PostDetail {
            post,
            liked_by_viewer,
            like_count,
            comment_count,
            comments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::NewUser;
    use crate::repository::MemorySocialStore;

    async fn new_user(store: &MemorySocialStore, name: &str) -> Uuid {
        store
            .create_user(NewUser {
                id: Uuid::new_v4(),
                username: name.to_string(),
                email: None,
                profile_pic: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_explore_caps_at_twenty_oldest_first() {
        let store = Arc::new(MemorySocialStore::new());
        let bob = new_user(&store, "bob").await;
        for i in 0..25 {
            store
                .create_post(bob, Some(format!("post {}", i)), None)
                .await
                .unwrap();
        }
        let service = FeedService::new(store);

        for requested in [None, Some(100), Some(20)] {
            let posts = service.explore(requested).await.unwrap();
            assert_eq!(posts.len(), 20);
            assert!(posts.windows(2).all(|w| w[0].created_at <= w[1].created_at));
            assert_eq!(posts[0].title.as_deref(), Some("post 0"));
        }

        assert_eq!(service.explore(Some(5)).await.unwrap().len(), 5);
        assert!(service.explore(Some(-1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_home_only_shows_followed_authors() {
        let store = Arc::new(MemorySocialStore::new());
        let alice = new_user(&store, "alice").await;
        let bob = new_user(&store, "bob").await;
        let carol = new_user(&store, "carol").await;

        let bob_old = store.create_post(bob, None, None).await.unwrap();
        store.create_post(carol, None, None).await.unwrap();
        store.create_post(alice, None, None).await.unwrap();
        let bob_new = store.create_post(bob, None, None).await.unwrap();
        store.create_connection(alice, bob).await.unwrap();

        let service = FeedService::new(store);
        let feed = service.home(alice, None, None).await.unwrap();
        let ids: Vec<Uuid> = feed.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![bob_new.id, bob_old.id]);

        let second_page = service.home(alice, Some(1), Some(1)).await.unwrap();
        assert_eq!(second_page.len(), 1);
        assert_eq!(second_page[0].id, bob_old.id);

        assert!(service.home(carol, None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_post_detail_reports_viewer_like() {
        let store = Arc::new(MemorySocialStore::new());
        let alice = new_user(&store, "alice").await;
        let bob = new_user(&store, "bob").await;
        let post = store.create_post(bob, None, None).await.unwrap();
        store.toggle_like(post.id, alice).await.unwrap();
        store.create_comment(post.id, alice, "hello").await.unwrap();

        let service = FeedService::new(store);
        let for_alice = service.post_detail(post.id, alice).await.unwrap();
        assert!(for_alice.liked_by_viewer);
        assert_eq!(for_alice.like_count, 1);
        assert_eq!(for_alice.comment_count, 1);
        assert_eq!(for_alice.comments[0].username, "alice");

        let for_bob = service.post_detail(post.id, bob).await.unwrap();
        assert!(!for_bob.liked_by_viewer);

        let missing = service.post_detail(Uuid::new_v4(), bob).await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));
    }
}
