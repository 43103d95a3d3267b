pub mod engagement;
pub mod feed;
pub mod follow;
pub mod posts;
pub mod users;

pub use engagement::{CommentOutcome, CommenterInfo, EngagementService, LikeOutcome};
pub use feed::FeedService;
pub use follow::{FollowOutcome, FollowService};
pub use posts::PostService;
pub use users::UserService;
