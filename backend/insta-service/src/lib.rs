pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod media;
pub mod metrics;
pub mod middleware;
pub mod repository;
pub mod services;
pub mod state;

pub use error::{ServiceError, ServiceResult};
pub use repository::{MemorySocialStore, PgSocialStore, SocialStore};
pub use state::AppState;
