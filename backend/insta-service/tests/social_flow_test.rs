//! End-to-end service flows on the in-memory store.
//!
//! Covers follow/unfollow, like toggling, commenting, feeds and account
//! deletion cascades without a database.

use insta_service::domain::models::{FollowAction, NewUser};
use insta_service::media::{MediaKind, MediaStore};
use insta_service::{AppState, MemorySocialStore, ServiceError, ServiceResult, SocialStore};
use std::sync::Arc;
use uuid::Uuid;

struct NullMediaStore;

#[async_trait::async_trait]
impl MediaStore for NullMediaStore {
    async fn store(&self, kind: MediaKind, _bytes: Vec<u8>) -> ServiceResult<String> {
        Ok(format!("/media/{:?}/test.png", kind))
    }
}

fn setup() -> (AppState, Arc<dyn SocialStore>) {
    let store: Arc<dyn SocialStore> = Arc::new(MemorySocialStore::new());
    let state = AppState::new(store.clone(), Arc::new(NullMediaStore));
    (state, store)
}

async fn sign_up(state: &AppState, username: &str) -> Uuid {
    let id = Uuid::new_v4();
    state
        .users
        .sign_up(id, username.to_string(), None, None)
        .await
        .expect("sign up");
    id
}

#[tokio::test]
async fn test_follow_then_unfollow() {
    let (state, _) = setup();
    let alice = sign_up(&state, "alice").await;
    let bob = sign_up(&state, "bob").await;

    let outcome = state
        .follow
        .toggle_follow(alice, bob, FollowAction::Follow)
        .await;
    assert!(outcome.success);
    assert!(state.follow.is_followed_by(bob, alice).await.unwrap());
    assert_eq!(state.follow.follower_count(bob).await.unwrap(), 1);
    assert_eq!(state.follow.following_count(alice).await.unwrap(), 1);

    // Following twice keeps a single edge
    assert!(
        state
            .follow
            .toggle_follow(alice, bob, FollowAction::Follow)
            .await
            .success
    );
    assert_eq!(state.follow.follower_count(bob).await.unwrap(), 1);

    let outcome = state
        .follow
        .toggle_follow(alice, bob, FollowAction::Unfollow)
        .await;
    assert!(outcome.success);
    assert!(!state.follow.is_followed_by(bob, alice).await.unwrap());
    assert_eq!(state.follow.follower_count(bob).await.unwrap(), 0);
}

#[tokio::test]
async fn test_self_and_unknown_follow_fail() {
    let (state, _) = setup();
    let alice = sign_up(&state, "alice").await;

    assert!(
        !state
            .follow
            .toggle_follow(alice, alice, FollowAction::Follow)
            .await
            .success
    );
    assert!(
        !state
            .follow
            .toggle_follow(alice, Uuid::new_v4(), FollowAction::Follow)
            .await
            .success
    );
    assert_eq!(state.follow.following_count(alice).await.unwrap(), 0);
}

#[tokio::test]
async fn test_like_toggles_and_counts() {
    let (state, _) = setup();
    let alice = sign_up(&state, "alice").await;
    let bob = sign_up(&state, "bob").await;
    let post = state
        .posts
        .create_post(alice, Some("sunset".into()), None)
        .await
        .unwrap();

    let first = state.engagement.toggle_like(post.id, bob).await;
    assert!(first.success && first.liked);
    assert_eq!(state.engagement.get_like_count(post.id).await.unwrap(), 1);
    assert!(state.engagement.is_liked_by(post.id, bob).await.unwrap());

    let second = state.engagement.toggle_like(post.id, bob).await;
    assert!(second.success && !second.liked);
    assert_eq!(state.engagement.get_like_count(post.id).await.unwrap(), 0);

    let missing = state.engagement.toggle_like(Uuid::new_v4(), bob).await;
    assert!(!missing.success);
}

#[tokio::test]
async fn test_comments_echo_commenter_and_enforce_length() {
    let (state, _) = setup();
    let alice = sign_up(&state, "alice").await;
    let bob = sign_up(&state, "bob").await;
    let post = state.posts.create_post(alice, None, None).await.unwrap();

    let outcome = state.engagement.add_comment(post.id, bob, "nice shot").await;
    assert!(outcome.success);
    let commenter = outcome.commenter.unwrap();
    assert_eq!(commenter.username, "bob");
    assert_eq!(commenter.comment_text, "nice shot");

    let limit = "é".repeat(100);
    assert!(state.engagement.add_comment(post.id, bob, &limit).await.success);

    let too_long = "a".repeat(101);
    let outcome = state.engagement.add_comment(post.id, bob, &too_long).await;
    assert!(!outcome.success);
    assert!(outcome.commenter.is_none());

    assert_eq!(state.engagement.get_comment_count(post.id).await.unwrap(), 2);
    let comments = state.engagement.comments_for_post(post.id).await.unwrap();
    assert_eq!(comments[0].comment, "nice shot");
    assert_eq!(comments[0].username, "bob");
}

#[tokio::test]
async fn test_feeds() {
    let (state, _) = setup();
    let alice = sign_up(&state, "alice").await;
    let bob = sign_up(&state, "bob").await;
    let carol = sign_up(&state, "carol").await;

    let first = state.posts.create_post(bob, Some("one".into()), None).await.unwrap();
    let second = state.posts.create_post(bob, Some("two".into()), None).await.unwrap();
    let other = state.posts.create_post(carol, Some("three".into()), None).await.unwrap();

    let explore = state.feed.explore(None).await.unwrap();
    let ids: Vec<Uuid> = explore.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![first.id, second.id, other.id]);

    assert!(state.feed.home(alice, None, None).await.unwrap().is_empty());

    state
        .follow
        .toggle_follow(alice, bob, FollowAction::Follow)
        .await;
    let home = state.feed.home(alice, None, None).await.unwrap();
    let ids: Vec<Uuid> = home.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    let page = state.feed.home(alice, Some(1), Some(1)).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, first.id);
}

#[tokio::test]
async fn test_explore_is_capped() {
    let (state, _) = setup();
    let alice = sign_up(&state, "alice").await;
    for i in 0..25 {
        state
            .posts
            .create_post(alice, Some(format!("post {}", i)), None)
            .await
            .unwrap();
    }

    let explore = state.feed.explore(None).await.unwrap();
    assert_eq!(explore.len(), 20);
    assert_eq!(explore[0].title.as_deref(), Some("post 0"));
    assert_eq!(state.feed.explore(Some(500)).await.unwrap().len(), 20);
    assert_eq!(state.feed.explore(Some(5)).await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_post_detail_for_viewer() {
    let (state, _) = setup();
    let alice = sign_up(&state, "alice").await;
    let bob = sign_up(&state, "bob").await;
    let post = state.posts.create_post(alice, None, None).await.unwrap();

    state.engagement.toggle_like(post.id, bob).await;
    state.engagement.add_comment(post.id, bob, "hi").await;

    let for_bob = state.feed.post_detail(post.id, bob).await.unwrap();
    assert!(for_bob.liked_by_viewer);
    assert_eq!(for_bob.like_count, 1);
    assert_eq!(for_bob.comment_count, 1);

    let for_alice = state.feed.post_detail(post.id, alice).await.unwrap();
    assert!(!for_alice.liked_by_viewer);

    assert!(matches!(
        state.feed.post_detail(Uuid::new_v4(), alice).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_account_deletion_cascades() {
    let (state, store) = setup();
    let alice = sign_up(&state, "alice").await;
    let bob = sign_up(&state, "bob").await;

    let alice_post = state.posts.create_post(alice, None, None).await.unwrap();
    let bob_post = state.posts.create_post(bob, None, None).await.unwrap();

    state
        .follow
        .toggle_follow(bob, alice, FollowAction::Follow)
        .await;
    state
        .follow
        .toggle_follow(alice, bob, FollowAction::Follow)
        .await;
    state.engagement.toggle_like(bob_post.id, alice).await;
    state.engagement.add_comment(bob_post.id, alice, "hey").await;
    state.engagement.toggle_like(alice_post.id, bob).await;

    state.users.delete_account(alice).await.unwrap();

    assert!(store.get_user(alice).await.unwrap().is_none());
    assert!(store.get_post(alice_post.id).await.unwrap().is_none());
    assert_eq!(store.count_likes(bob_post.id).await.unwrap(), 0);
    assert_eq!(store.count_comments(bob_post.id).await.unwrap(), 0);
    assert_eq!(store.count_connections_to(bob).await.unwrap(), 0);
    assert_eq!(store.count_connections_from(bob).await.unwrap(), 0);

    assert!(matches!(
        state.users.delete_account(alice).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let (state, store) = setup();
    sign_up(&state, "alice").await;

    let result = store
        .create_user(NewUser {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: None,
            profile_pic: None,
        })
        .await;
    assert!(matches!(result, Err(ServiceError::Conflict(_))));
}

#[tokio::test]
async fn test_only_author_edits_post() {
    let (state, _) = setup();
    let alice = sign_up(&state, "alice").await;
    let bob = sign_up(&state, "bob").await;
    let post = state.posts.create_post(alice, Some("draft".into()), None).await.unwrap();

    assert!(matches!(
        state.posts.update_title(post.id, bob, Some("mine".into())).await,
        Err(ServiceError::Forbidden(_))
    ));
    assert!(matches!(
        state.posts.delete_post(post.id, bob).await,
        Err(ServiceError::Forbidden(_))
    ));

    let updated = state
        .posts
        .update_title(post.id, alice, Some("final".into()))
        .await
        .unwrap();
    assert_eq!(updated.title.as_deref(), Some("final"));

    state.posts.delete_post(post.id, alice).await.unwrap();
    assert!(matches!(
        state.posts.get_post(post.id).await,
        Err(ServiceError::NotFound(_))
    ));
}
