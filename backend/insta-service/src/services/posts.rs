/// Post service - creation, title edits by the author, deletion by the author or an admin
use crate::domain::models::Post;
use crate::error::{ServiceError, ServiceResult};
use crate::media::{MediaKind, MediaStore};
use crate::repository::SocialStore;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn SocialStore>,
    media: Arc<dyn MediaStore>,
}

impl PostService {
    pub fn new(store: Arc<dyn SocialStore>, media: Arc<dyn MediaStore>) -> Self {
        Self { store, media }
    }

    pub async fn create_post(
        &self,
        author_id: Uuid,
        title: Option<String>,
        image: Option<Vec<u8>>,
    ) -> ServiceResult<Post> {
        if self.store.get_user(author_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("user {}", author_id)));
        }

        let image = match image {
            Some(bytes) => Some(self.media.store(MediaKind::PostImage, bytes).await?),
            None => None,
        };

        let post = self.store.create_post(author_id, title, image).await?;
        info!(post_id = %post.id, author_id = %author_id, "post created");
        Ok(post)
    }

    pub async fn get_post(&self, post_id: Uuid) -> ServiceResult<Post> {
        self.store
            .get_post(post_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("post {}", post_id)))
    }

    /// Change the title. Only the author may edit.
    pub async fn update_title(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        title: Option<String>,
    ) -> ServiceResult<Post> {
        self.require_owner(post_id, user_id).await?;
        self.store
            .update_post_title(post_id, title)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("post {}", post_id)))
    }

    /// Delete a post with its likes and comments. The author or an admin may delete.
    pub async fn delete_post(&self, post_id: Uuid, user_id: Uuid) -> ServiceResult<()> {
        let post = self.get_post(post_id).await?;
        if post.author_id != user_id {
            let is_admin = self
                .store
                .get_user(user_id)
                .await?
                .map_or(false, |u| u.is_admin);
            if !is_admin {
                return Err(ServiceError::Forbidden(
                    "only the author or an admin can delete this post".to_string(),
                ));
            }
            info!(post_id = %post_id, admin_id = %user_id, "post removed by admin");
        }

        if !self.store.delete_post(post_id).await? {
            return Err(ServiceError::NotFound(format!("post {}", post_id)));
        }
        info!(post_id = %post_id, "post deleted");
        Ok(())
    }

    async fn require_owner(&self, post_id: Uuid, user_id: Uuid) -> ServiceResult<()> {
        let post = self.get_post(post_id).await?;
        if post.author_id != user_id {
            return Err(ServiceError::Forbidden(
                "only the author can modify this post".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::NewUser;
    use crate::repository::MemorySocialStore;

    struct FailingMediaStore;

    #[async_trait::async_trait]
    impl MediaStore for FailingMediaStore {
        async fn store(&self, _kind: MediaKind, _bytes: Vec<u8>) -> ServiceResult<String> {
            Err(ServiceError::Media("disk full".to_string()))
        }
    }

    async fn setup() -> (PostService, Uuid, Uuid) {
        let (service, _, bob, mallory) = setup_with_store().await;
        (service, bob, mallory)
    }

    async fn setup_with_store() -> (PostService, Arc<MemorySocialStore>, Uuid, Uuid) {
        let store = Arc::new(MemorySocialStore::new());
        let mut ids = Vec::new();
        for name in ["bob", "mallory"] {
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
        (
            PostService::new(store.clone(), Arc::new(FailingMediaStore)),
            store,
            ids[0],
            ids[1],
        )
    }

    #[tokio::test]
    async fn test_owner_can_edit_and_delete() {
        let (service, bob, _) = setup().await;
        let post = service
            .create_post(bob, Some("first".into()), None)
            .await
            .unwrap();

        let edited = service
            .update_title(post.id, bob, Some("second".into()))
            .await
            .unwrap();
        assert_eq!(edited.title.as_deref(), Some("second"));
        assert_eq!(edited.created_at, post.created_at);

        service.delete_post(post.id, bob).await.unwrap();
        assert!(matches!(
            service.get_post(post.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_non_owner_is_forbidden() {
        let (service, bob, mallory) = setup().await;
        let post = service.create_post(bob, None, None).await.unwrap();

        assert!(matches!(
            service.update_title(post.id, mallory, None).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            service.delete_post(post.id, mallory).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(service.get_post(post.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_media_failure_creates_nothing() {
        let (service, bob, _) = setup().await;
        let err = service
            .create_post(bob, None, Some(vec![0xFF, 0xD8, 0xFF]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Media(_)));
    }

    #[tokio::test]
    async fn test_admin_deletes_any_post() {
        let (service, store, bob, mallory) = setup_with_store().await;
        let post = service.create_post(bob, None, None).await.unwrap();

        store.set_admin(mallory, true).await.unwrap();
        assert!(matches!(
            service.update_title(post.id, mallory, None).await,
            Err(ServiceError::Forbidden(_))
        ));
        service.delete_post(post.id, mallory).await.unwrap();
        assert!(matches!(
            service.get_post(post.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_author_is_checked_before_upload() {
        let (service, _, _) = setup().await;
        // The media store would fail; NotFound shows it was never reached
        let err = service
            .create_post(Uuid::new_v4(), None, Some(vec![0xFF, 0xD8, 0xFF]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
