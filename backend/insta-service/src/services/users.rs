use crate::domain::models::{NewUser, User, UserChanges, UserProfile};
use crate::error::{ServiceError, ServiceResult};
use crate::media::{MediaKind, MediaStore};
use crate::repository::SocialStore;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Account lifecycle and profile pages
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn SocialStore>,
    media: Arc<dyn MediaStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn SocialStore>, media: Arc<dyn MediaStore>) -> Self {
        Self { store, media }
    }

    /// Register the authenticated identity as a user.
    ///
    /// The username is trimmed and must not be blank. Id and username clashes
    /// are checked before the profile picture reaches the media store.
    pub async fn sign_up(
        &self,
        user_id: Uuid,
        username: String,
        email: Option<String>,
        profile_pic: Option<Vec<u8>>,
    ) -> ServiceResult<User> {
        let username = normalize_username(&username)?;
        if self.store.get_user(user_id).await?.is_some() {
            return Err(ServiceError::Conflict("user already exists".to_string()));
        }
        self.ensure_username_free(&username, None).await?;

        let profile_pic = match profile_pic {
            Some(bytes) => Some(self.media.store(MediaKind::ProfilePic, bytes).await?),
            None => None,
        };

        let user = self
            .store
            .create_user(NewUser {
                id: user_id,
                username,
                email,
                profile_pic,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "user signed up");
        Ok(user)
    }

    pub async fn get_user(&self, user_id: Uuid) -> ServiceResult<User> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {}", user_id)))
    }

    /// Profile of `user_id` as seen by `viewer_id`
    pub async fn profile(&self, user_id: Uuid, viewer_id: Uuid) -> ServiceResult<UserProfile> {
        let user = self.get_user(user_id).await?;
        let posts = self.store.list_posts_by_author(user_id).await?;
        let follower_count = self.store.count_connections_to(user_id).await?;
        let following_count = self.store.count_connections_from(user_id).await?;
        let followed_by_viewer = self.store.connection_exists(viewer_id, user_id).await?;

        Ok(UserProfile {
            user,
            posts,
            follower_count,
            following_count,
            followed_by_viewer,
        })
    }

    pub async fn edit_profile(
        &self,
        user_id: Uuid,
        username: Option<String>,
        profile_pic: Option<Vec<u8>>,
    ) -> ServiceResult<User> {
        let username = username.as_deref().map(normalize_username).transpose()?;
        self.get_user(user_id).await?;
        if let Some(username) = &username {
            self.ensure_username_free(username, Some(user_id)).await?;
        }

        let profile_pic = match profile_pic {
            Some(bytes) => Some(self.media.store(MediaKind::ProfilePic, bytes).await?),
            None => None,
        };

        self.store
            .update_user(
                user_id,
                UserChanges {
                    username,
                    profile_pic,
                },
            )
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {}", user_id)))
    }

    /// Grant or revoke admin rights. Only an admin may do this.
    pub async fn set_admin(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        is_admin: bool,
    ) -> ServiceResult<User> {
        if !self.get_user(actor_id).await?.is_admin {
            return Err(ServiceError::Forbidden(
                "only admins can change admin rights".to_string(),
            ));
        }

        let user = self
            .store
            .set_admin(target_id, is_admin)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {}", target_id)))?;
        info!(actor_id = %actor_id, user_id = %target_id, is_admin, "admin rights changed");
        Ok(user)
    }

    /// Delete the account with everything it owns.
    pub async fn delete_account(&self, user_id: Uuid) -> ServiceResult<()> {
        if !self.store.delete_user(user_id).await? {
            return Err(ServiceError::NotFound(format!("user {}", user_id)));
        }
        info!(user_id = %user_id, "user deleted");
        Ok(())
    }

    /// Users that follow `user_id`
    pub async fn followers(&self, user_id: Uuid) -> ServiceResult<Vec<User>> {
        let connections = self.store.connections_to(user_id).await?;
        self.resolve_users(connections.into_iter().map(|c| c.creator_id))
            .await
    }

    /// Users that `user_id` follows
    pub async fn following(&self, user_id: Uuid) -> ServiceResult<Vec<User>> {
        let connections = self.store.connections_from(user_id).await?;
        self.resolve_users(connections.into_iter().map(|c| c.following_id))
            .await
    }

    async fn ensure_username_free(&self, username: &str, owner: Option<Uuid>) -> ServiceResult<()> {
        match self.store.get_user_by_username(username).await? {
            Some(existing) if Some(existing.id) != owner => {
                Err(ServiceError::Conflict("username already taken".to_string()))
            }
            _ => Ok(()),
        }
    }

    async fn resolve_users(&self, ids: impl Iterator<Item = Uuid>) -> ServiceResult<Vec<User>> {
        let mut users = Vec::new();
        for id in ids {
            if let Some(user) = self.store.get_user(id).await? {
                users.push(user);
            }
        }
        Ok(users)
    }
}

fn normalize_username(raw: &str) -> ServiceResult<String> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(ServiceError::InvalidInput(
            "username must not be blank".to_string(),
        ));
    }
    Ok(username.to_string())
}
