//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities and ports.

pub mod action_log_service;
pub mod feed_service;
pub mod image_service;
pub mod relation_service;
pub mod user_service;

pub use action_log_service::ActionLogService;
pub use feed_service::{Dashboard, FeedEntry, FeedService, TargetSummary};
pub use image_service::ImageService;
pub use relation_service::RelationService;
pub use user_service::{
    find_active_user, resolve_user, validate_http_url, RegisterUser, UserDetail, UserService,
};
