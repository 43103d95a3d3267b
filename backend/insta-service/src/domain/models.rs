use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Maximum comment length in characters (matches the `comments.comment` column)
pub const MAX_COMMENT_LENGTH: usize = 100;

/// Hard cap on the explore feed size
pub const EXPLORE_MAX_LIMIT: i64 = 20;

/// User entity - an account that can post, follow, like and comment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub profile_pic: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Connection entity - directed follow edge, `creator_id` follows `following_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Connection {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub following_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Post entity - an image post owned by its author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Comment entity - a short text comment on a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub comment: String,
    pub posted_on: DateTime<Utc>,
}

/// Like entity - at most one per (post, user)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Like {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Comment joined with the commenter's username, for post detail pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommentView {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub comment: String,
    pub posted_on: DateTime<Utc>,
}

/// Fields accepted when a user signs up
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub profile_pic: Option<String>,
}

/// Profile edits; `None` leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub profile_pic: Option<String>,
}

/// Post plus the viewer-dependent and aggregate fields shown on its detail page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetail {
    pub post: Post,
    pub liked_by_viewer: bool,
    pub like_count: i64,
    pub comment_count: i64,
    pub comments: Vec<CommentView>,
}

/// A user's profile page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user: User,
    pub posts: Vec<Post>,
    pub follower_count: i64,
    pub following_count: i64,
    pub followed_by_viewer: bool,
}

/// Requested follow-state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowAction {
    Follow,
    Unfollow,
}

impl FollowAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FollowAction::Follow => "follow",
            FollowAction::Unfollow => "unfollow",
        }
    }
}

impl fmt::Display for FollowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FollowAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "follow" => Ok(FollowAction::Follow),
            "unfollow" => Ok(FollowAction::Unfollow),
            other => Err(format!("unknown follow action: {}", other)),
        }
    }
}
