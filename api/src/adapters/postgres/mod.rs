//! PostgreSQL adapters
//!
//! Implementations of repository traits using SeaORM and PostgreSQL.

pub mod action_repo;
pub mod follow_repo;
pub mod image_repo;
pub mod user_repo;


pub use action_repo::PostgresActionRepository;
pub use follow_repo::PostgresFollowRepository;
pub use image_repo::PostgresImageRepository;
pub use user_repo::PostgresUserRepository;
