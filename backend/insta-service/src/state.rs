use crate::media::MediaStore;
use crate::repository::SocialStore;
use crate::services::{EngagementService, FeedService, FollowService, PostService, UserService};
use std::sync::Arc;

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SocialStore>,
    pub follow: FollowService,
    pub engagement: EngagementService,
    pub feed: FeedService,
    pub posts: PostService,
    pub users: UserService,
}

impl AppState {
    pub fn new(store: Arc<dyn SocialStore>, media: Arc<dyn MediaStore>) -> Self {
        Self {
            follow: FollowService::new(store.clone()),
            engagement: EngagementService::new(store.clone()),
            feed: FeedService::new(store.clone()),
            posts: PostService::new(store.clone(), media.clone()),
            users: UserService::new(store.clone(), media),
            store,
        }
    }
}
