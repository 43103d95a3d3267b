pub mod memory;
pub mod postgres;

pub use memory::MemorySocialStore;
pub use postgres::PgSocialStore;

use crate::domain::models::{
    Comment, CommentView, Connection, NewUser, Post, User, UserChanges,
};
use crate::error::ServiceResult;
use uuid::Uuid;

/// Persistence interface for users, follow connections, posts, comments and likes.
///
/// Implementations must enforce the same invariants: unique usernames, at most one
/// like per (post, user), at most one connection per (creator, following), and
/// cascading deletes from users to everything they own or are referenced by.
#[async_trait::async_trait]
pub trait SocialStore: Send + Sync {
    // ---- users ----

    /// Insert a user. Duplicate username yields `Conflict`.
    async fn create_user(&self, new_user: NewUser) -> ServiceResult<User>;

    async fn get_user(&self, user_id: Uuid) -> ServiceResult<Option<User>>;

    async fn get_user_by_username(&self, username: &str) -> ServiceResult<Option<User>>;

    /// Apply profile edits, returning `None` when the user does not exist.
    async fn update_user(&self, user_id: Uuid, changes: UserChanges)
        -> ServiceResult<Option<User>>;

    /// Grant or revoke admin rights, returning `None` when the user does not exist.
    async fn set_admin(&self, user_id: Uuid, is_admin: bool) -> ServiceResult<Option<User>>;

    /// Delete a user and cascade to posts, comments, likes and connections.
    /// Returns false when no such user existed.
    async fn delete_user(&self, user_id: Uuid) -> ServiceResult<bool>;

    // ---- connections ----

    /// Insert creator -> following. Returns true if a new edge was stored,
    /// false if it already existed. Unknown users yield `NotFound`.
    async fn create_connection(&self, creator_id: Uuid, following_id: Uuid)
        -> ServiceResult<bool>;

    /// Delete every creator -> following edge, returning the number removed.
    async fn delete_connections(&self, creator_id: Uuid, following_id: Uuid)
        -> ServiceResult<u64>;

    /// Connections where `creator_id = user_id`, oldest first
    async fn connections_from(&self, user_id: Uuid) -> ServiceResult<Vec<Connection>>;

    /// Connections where `following_id = user_id`, oldest first
    async fn connections_to(&self, user_id: Uuid) -> ServiceResult<Vec<Connection>>;

    async fn connection_exists(&self, creator_id: Uuid, following_id: Uuid)
        -> ServiceResult<bool>;

    async fn count_connections_from(&self, user_id: Uuid) -> ServiceResult<i64>;

    async fn count_connections_to(&self, user_id: Uuid) -> ServiceResult<i64>;

    // ---- posts ----

    /// Insert a post. Unknown author yields `NotFound`.
    async fn create_post(
        &self,
        author_id: Uuid,
        title: Option<String>,
        image: Option<String>,
    ) -> ServiceResult<Post>;

    async fn get_post(&self, post_id: Uuid) -> ServiceResult<Option<Post>>;

    async fn update_post_title(&self, post_id: Uuid, title: Option<String>)
        -> ServiceResult<Option<Post>>;

    /// Delete a post with its comments and likes.
    async fn delete_post(&self, post_id: Uuid) -> ServiceResult<bool>;

    /// All posts ordered by creation time ascending
    async fn list_posts_oldest_first(&self, limit: i64) -> ServiceResult<Vec<Post>>;

    /// Posts authored by users that `user_id` follows, newest first
    async fn list_posts_by_followed(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Post>>;

    /// Posts by one author, newest first
    async fn list_posts_by_author(&self, author_id: Uuid) -> ServiceResult<Vec<Post>>;

    // ---- likes ----

    /// Flip the like state of (post, user) atomically.
    /// Returns true when the post is now liked, false when now unliked.
    /// Unknown post yields `NotFound`.
    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> ServiceResult<bool>;

    async fn like_exists(&self, post_id: Uuid, user_id: Uuid) -> ServiceResult<bool>;

    async fn count_likes(&self, post_id: Uuid) -> ServiceResult<i64>;

    // ---- comments ----

    /// Insert a comment. Unknown post/user yields `NotFound`; text over the
    /// column limit yields `InvalidInput`.
    async fn create_comment(&self, post_id: Uuid, user_id: Uuid, text: &str)
        -> ServiceResult<Comment>;

    async fn count_comments(&self, post_id: Uuid) -> ServiceResult<i64>;

    /// Comments on a post with commenter usernames, oldest first
    async fn list_comments(&self, post_id: Uuid) -> ServiceResult<Vec<CommentView>>;

    /// Health check (optional)
    async fn health_check(&self) -> ServiceResult<()> {
        Ok(())
    }
}
