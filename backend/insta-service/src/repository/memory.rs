use super::SocialStore;
use crate::domain::models::{
    Comment, CommentView, Connection, Like, NewUser, Post, User, UserChanges, MAX_COMMENT_LENGTH,
};
use crate::error::{ServiceError, ServiceResult};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    connections: Vec<Connection>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    likes: Vec<Like>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl State {
    /// Strictly increasing timestamps so creation order is always observable.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts
    }

    fn require_user(&self, user_id: Uuid) -> ServiceResult<()> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(ServiceError::NotFound(format!("user {}", user_id)))
        }
    }

    fn require_post(&self, post_id: Uuid) -> ServiceResult<()> {
        if self.posts.iter().any(|p| p.id == post_id) {
            Ok(())
        } else {
            Err(ServiceError::NotFound(format!("post {}", post_id)))
        }
    }

    fn username_taken(&self, username: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|u| u.username == username && Some(u.id) != except)
    }

    fn remove_post_cascade(&mut self, post_id: Uuid) -> bool {
        let before = self.posts.len();
        self.posts.retain(|p| p.id != post_id);
        self.comments.retain(|c| c.post_id != post_id);
        self.likes.retain(|l| l.post_id != post_id);
        self.posts.len() < before
    }
}

/// In-process store with the same constraints and cascade rules as the Postgres schema.
///
/// Backs the test suites and `STORE_BACKEND=memory` local runs.
#[derive(Default)]
pub struct MemorySocialStore {
    state: RwLock<State>,
}

impl MemorySocialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    posts
}

fn page<T>(items: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

#[async_trait::async_trait]
impl SocialStore for MemorySocialStore {
    async fn create_user(&self, new_user: NewUser) -> ServiceResult<User> {
        let mut state = self.state.write().await;
        if state.users.contains_key(&new_user.id) {
            return Err(ServiceError::Conflict("user already exists".to_string()));
        }
        if state.username_taken(&new_user.username, None) {
            return Err(ServiceError::Conflict("user already exists".to_string()));
        }

        let user = User {
            id: new_user.id,
            username: new_user.username,
            email: new_user.email,
            profile_pic: new_user.profile_pic,
            is_admin: false,
            created_at: state.next_timestamp(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: Uuid) -> ServiceResult<Option<User>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> ServiceResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn update_user(
        &self,
        user_id: Uuid,
        changes: UserChanges,
    ) -> ServiceResult<Option<User>> {
        let mut state = self.state.write().await;
        if let Some(username) = &changes.username {
            if state.username_taken(username, Some(user_id)) {
                return Err(ServiceError::Conflict("user already exists".to_string()));
            }
        }

        let Some(user) = state.users.get_mut(&user_id) else {
            return Ok(None);
        };
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(profile_pic) = changes.profile_pic {
            user.profile_pic = Some(profile_pic);
        }
        Ok(Some(user.clone()))
    }

    async fn set_admin(&self, user_id: Uuid, is_admin: bool) -> ServiceResult<Option<User>> {
        let mut state = self.state.write().await;
        Ok(state.users.get_mut(&user_id).map(|user| {
            user.is_admin = is_admin;
            user.clone()
        }))
    }

    async fn delete_user(&self, user_id: Uuid) -> ServiceResult<bool> {
        let mut state = self.state.write().await;
        if state.users.remove(&user_id).is_none() {
            return Ok(false);
        }

        let owned_posts: Vec<Uuid> = state
            .posts
            .iter()
            .filter(|p| p.author_id == user_id)
            .map(|p| p.id)
            .collect();
        for post_id in owned_posts {
            state.remove_post_cascade(post_id);
        }

        state
            .connections
            .retain(|c| c.creator_id != user_id && c.following_id != user_id);
        state.comments.retain(|c| c.user_id != user_id);
        state.likes.retain(|l| l.user_id != user_id);
        Ok(true)
    }

    async fn create_connection(
        &self,
        creator_id: Uuid,
        following_id: Uuid,
    ) -> ServiceResult<bool> {
        let mut state = self.state.write().await;
        state.require_user(creator_id)?;
        state.require_user(following_id)?;
        if creator_id == following_id {
            return Err(ServiceError::InvalidInput(
                "users cannot follow themselves".to_string(),
            ));
        }

        let exists = state
            .connections
            .iter()
            .any(|c| c.creator_id == creator_id && c.following_id == following_id);
        if exists {
            return Ok(false);
        }

        let created_at = state.next_timestamp();
        state.connections.push(Connection {
            id: Uuid::new_v4(),
            creator_id,
            following_id,
            created_at,
        });
        Ok(true)
    }

    async fn delete_connections(
        &self,
        creator_id: Uuid,
        following_id: Uuid,
    ) -> ServiceResult<u64> {
        let mut state = self.state.write().await;
        let before = state.connections.len();
        state
            .connections
            .retain(|c| !(c.creator_id == creator_id && c.following_id == following_id));
        Ok((before - state.connections.len()) as u64)
    }

    async fn connections_from(&self, user_id: Uuid) -> ServiceResult<Vec<Connection>> {
        let state = self.state.read().await;
        Ok(state
            .connections
            .iter()
            .filter(|c| c.creator_id == user_id)
            .cloned()
            .collect())
    }

    async fn connections_to(&self, user_id: Uuid) -> ServiceResult<Vec<Connection>> {
        let state = self.state.read().await;
        Ok(state
            .connections
            .iter()
            .filter(|c| c.following_id == user_id)
            .cloned()
            .collect())
    }

    async fn connection_exists(
        &self,
        creator_id: Uuid,
        following_id: Uuid,
    ) -> ServiceResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .connections
            .iter()
            .any(|c| c.creator_id == creator_id && c.following_id == following_id))
    }

    async fn count_connections_from(&self, user_id: Uuid) -> ServiceResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .connections
            .iter()
            .filter(|c| c.creator_id == user_id)
            .count() as i64)
    }

    async fn count_connections_to(&self, user_id: Uuid) -> ServiceResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .connections
            .iter()
            .filter(|c| c.following_id == user_id)
            .count() as i64)
    }

    async fn create_post(
        &self,
        author_id: Uuid,
        title: Option<String>,
        image: Option<String>,
    ) -> ServiceResult<Post> {
        let mut state = self.state.write().await;
        state.require_user(author_id)?;

        let post = Post {
            id: Uuid::new_v4(),
            author_id,
            title,
            image,
            created_at: state.next_timestamp(),
        };
        state.posts.push(post.clone());
        Ok(post)
    }

    async fn get_post(&self, post_id: Uuid) -> ServiceResult<Option<Post>> {
        let state = self.state.read().await;
        Ok(state.posts.iter().find(|p| p.id == post_id).cloned())
    }

    async fn update_post_title(
        &self,
        post_id: Uuid,
        title: Option<String>,
    ) -> ServiceResult<Option<Post>> {
        let mut state = self.state.write().await;
        Ok(state
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .map(|post| {
                post.title = title;
                post.clone()
            }))
    }

    async fn delete_post(&self, post_id: Uuid) -> ServiceResult<bool> {
        Ok(self.state.write().await.remove_post_cascade(post_id))
    }

    async fn list_posts_oldest_first(&self, limit: i64) -> ServiceResult<Vec<Post>> {
        let state = self.state.read().await;
        let mut posts = state.posts.clone();
        posts.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(page(posts, limit, 0))
    }

    async fn list_posts_by_followed(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Post>> {
        let state = self.state.read().await;
        let followed: Vec<Uuid> = state
            .connections
            .iter()
            .filter(|c| c.creator_id == user_id)
            .map(|c| c.following_id)
            .collect();
        let posts = state
            .posts
            .iter()
            .filter(|p| followed.contains(&p.author_id))
            .cloned()
            .collect();
        Ok(page(newest_first(posts), limit, offset))
    }

    async fn list_posts_by_author(&self, author_id: Uuid) -> ServiceResult<Vec<Post>> {
        let state = self.state.read().await;
        let posts = state
            .posts
            .iter()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect();
        Ok(newest_first(posts))
    }

    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> ServiceResult<bool> {
        // The write lock makes check-then-act a single step.
        let mut state = self.state.write().await;
        state.require_post(post_id)?;
        state.require_user(user_id)?;

        let existing = state
            .likes
            .iter()
            .position(|l| l.post_id == post_id && l.user_id == user_id);
        if let Some(pos) = existing {
            state.likes.remove(pos);
            return Ok(false);
        }

        let created_at = state.next_timestamp();
        state.likes.push(Like {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            created_at,
        });
        Ok(true)
    }

    async fn like_exists(&self, post_id: Uuid, user_id: Uuid) -> ServiceResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .likes
            .iter()
            .any(|l| l.post_id == post_id && l.user_id == user_id))
    }

    async fn count_likes(&self, post_id: Uuid) -> ServiceResult<i64> {
        let state = self.state.read().await;
        Ok(state.likes.iter().filter(|l| l.post_id == post_id).count() as i64)
    }

    async fn create_comment(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        text: &str,
    ) -> ServiceResult<Comment> {
        let mut state = self.state.write().await;
        state.require_post(post_id)?;
        state.require_user(user_id)?;
        if text.chars().count() > MAX_COMMENT_LENGTH {
            return Err(ServiceError::InvalidInput("comment value too long".to_string()));
        }

        let comment = Comment {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            comment: text.to_string(),
            posted_on: state.next_timestamp(),
        };
        state.comments.push(comment.clone());
        Ok(comment)
    }

    async fn count_comments(&self, post_id: Uuid) -> ServiceResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .count() as i64)
    }

    async fn list_comments(&self, post_id: Uuid) -> ServiceResult<Vec<CommentView>> {
        let state = self.state.read().await;
        Ok(state
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .filter_map(|c| {
                state.users.get(&c.user_id).map(|u| CommentView {
                    id: c.id,
                    post_id: c.post_id,
                    user_id: c.user_id,
                    username: u.username.clone(),
                    comment: c.comment.clone(),
                    posted_on: c.posted_on,
                })
            })
            .collect())
    }
}
