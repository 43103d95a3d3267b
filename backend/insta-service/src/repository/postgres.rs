use super::SocialStore;
use crate::domain::models::{
    Comment, CommentView, Connection, NewUser, Post, User, UserChanges,
};
use crate::error::{ServiceError, ServiceResult};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

/// PostgreSQL-backed store (source of truth)
#[derive(Clone)]
pub struct PgSocialStore {
    pool: PgPool,
}

impl PgSocialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SocialStore for PgSocialStore {
    async fn create_user(&self, new_user: NewUser) -> ServiceResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, profile_pic, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, username, email, profile_pic, is_admin, created_at
            "#,
        )
        .bind(new_user.id)
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.profile_pic)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ServiceError::from_db(e, "user"))?;

        debug!("Created user in PostgreSQL: {} ({})", user.id, user.username);
        Ok(user)
    }

    async fn get_user(&self, user_id: Uuid) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, profile_pic, is_admin, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, profile_pic, is_admin, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_user(
        &self,
        user_id: Uuid,
        changes: UserChanges,
    ) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                profile_pic = COALESCE($3, profile_pic)
            WHERE id = $1
            RETURNING id, username, email, profile_pic, is_admin, created_at
            "#,
        )
        .bind(user_id)
        .bind(changes.username)
        .bind(changes.profile_pic)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ServiceError::from_db(e, "user"))?;

        Ok(user)
    }

    async fn set_admin(&self, user_id: Uuid, is_admin: bool) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_admin = $2
            WHERE id = $1
            RETURNING id, username, email, profile_pic, is_admin, created_at
            "#,
        )
        .bind(user_id)
        .bind(is_admin)
        .fetch_optional(&self.pool)
        .await?;

        debug!("Set admin in PostgreSQL: {} (is_admin={})", user_id, is_admin);
        Ok(user)
    }

    async fn delete_user(&self, user_id: Uuid) -> ServiceResult<bool> {
        // Posts, comments, likes and connections go with the user via ON DELETE CASCADE.
        let affected = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        debug!("Deleted user in PostgreSQL: {} (rows={})", user_id, affected);
        Ok(affected > 0)
    }

    async fn create_connection(
        &self,
        creator_id: Uuid,
        following_id: Uuid,
    ) -> ServiceResult<bool> {
        let inserted = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO user_connections (id, creator_id, following_id, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (creator_id, following_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(creator_id)
        .bind(following_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ServiceError::from_db(e, "connection"))?;

        debug!(
            "Created connection in PostgreSQL: {} -> {} (new={})",
            creator_id,
            following_id,
            inserted.is_some()
        );
        Ok(inserted.is_some())
    }

    async fn delete_connections(
        &self,
        creator_id: Uuid,
        following_id: Uuid,
    ) -> ServiceResult<u64> {
        let affected = sqlx::query(
            "DELETE FROM user_connections WHERE creator_id = $1 AND following_id = $2",
        )
        .bind(creator_id)
        .bind(following_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected)
    }

    async fn connections_from(&self, user_id: Uuid) -> ServiceResult<Vec<Connection>> {
        let connections = sqlx::query_as::<_, Connection>(
            r#"
            SELECT id, creator_id, following_id, created_at
            FROM user_connections
            WHERE creator_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(connections)
    }

    async fn connections_to(&self, user_id: Uuid) -> ServiceResult<Vec<Connection>> {
        let connections = sqlx::query_as::<_, Connection>(
            r#"
            SELECT id, creator_id, following_id, created_at
            FROM user_connections
            WHERE following_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(connections)
    }

    async fn connection_exists(
        &self,
        creator_id: Uuid,
        following_id: Uuid,
    ) -> ServiceResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM user_connections
                WHERE creator_id = $1 AND following_id = $2
            )
            "#,
        )
        .bind(creator_id)
        .bind(following_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn count_connections_from(&self, user_id: Uuid) -> ServiceResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM user_connections WHERE creator_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn count_connections_to(&self, user_id: Uuid) -> ServiceResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM user_connections WHERE following_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn create_post(
        &self,
        author_id: Uuid,
        title: Option<String>,
        image: Option<String>,
    ) -> ServiceResult<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (id, author_id, title, image, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, author_id, title, image, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(author_id)
        .bind(title)
        .bind(image)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ServiceError::from_db(e, "post"))?;

        Ok(post)
    }

    async fn get_post(&self, post_id: Uuid) -> ServiceResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, title, image, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn update_post_title(
        &self,
        post_id: Uuid,
        title: Option<String>,
    ) -> ServiceResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET title = $2
            WHERE id = $1
            RETURNING id, author_id, title, image, created_at
            "#,
        )
        .bind(post_id)
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn delete_post(&self, post_id: Uuid) -> ServiceResult<bool> {
        let affected = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }

    async fn list_posts_oldest_first(&self, limit: i64) -> ServiceResult<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, title, image, created_at
            FROM posts
            ORDER BY created_at ASC, id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn list_posts_by_followed(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.author_id, p.title, p.image, p.created_at
            FROM posts p
            WHERE p.author_id IN (
                SELECT following_id FROM user_connections WHERE creator_id = $1
            )
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn list_posts_by_author(&self, author_id: Uuid) -> ServiceResult<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, title, image, created_at
            FROM posts
            WHERE author_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> ServiceResult<bool> {
        let mut tx = self.pool.begin().await?;

        // Locking the post row serializes concurrent toggles on the same post.
        let post: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM posts WHERE id = $1 FOR UPDATE")
                .bind(post_id)
                .fetch_optional(&mut *tx)
                .await?;
        if post.is_none() {
            return Err(ServiceError::NotFound(format!("post {}", post_id)));
        }

        let existing: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM likes WHERE post_id = $1 AND user_id = $2")
                .bind(post_id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;

        let liked = match existing {
            Some(like_id) => {
                sqlx::query("DELETE FROM likes WHERE id = $1")
                    .bind(like_id)
                    .execute(&mut *tx)
                    .await?;
                false
            }
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO likes (id, post_id, user_id, created_at)
                    VALUES ($1, $2, $3, NOW())
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(post_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| ServiceError::from_db(e, "like"))?;
                true
            }
        };

        tx.commit().await?;
        Ok(liked)
    }

    async fn like_exists(&self, post_id: Uuid, user_id: Uuid) -> ServiceResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM likes
                WHERE post_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn count_likes(&self, post_id: Uuid) -> ServiceResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn create_comment(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        text: &str,
    ) -> ServiceResult<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (id, post_id, user_id, comment, posted_on)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, post_id, user_id, comment, posted_on
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post_id)
        .bind(user_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ServiceError::from_db(e, "comment"))?;

        Ok(comment)
    }

    async fn count_comments(&self, post_id: Uuid) -> ServiceResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn list_comments(&self, post_id: Uuid) -> ServiceResult<Vec<CommentView>> {
        let comments = sqlx::query_as::<_, CommentView>(
            r#"
            SELECT c.id, c.post_id, c.user_id, u.username, c.comment, c.posted_on
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.post_id = $1
            ORDER BY c.posted_on ASC, c.id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn health_check(&self) -> ServiceResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
