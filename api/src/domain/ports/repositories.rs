//! Repository port traits
//!
//! These traits define the interface for data persistence.
//! Implementations are provided by adapters (e.g., PostgreSQL).

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{
    Action, ActionFilter, Image, ImageId, NewAction, NewImage, NewUser, ProfileUpdate, User,
    UserId,
};
use crate::error::DomainError;

/// Repository for user accounts (the user directory)
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by ID
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Find a user by username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// Find a user by API key hash
    async fn find_by_api_key_hash(&self, hash: &str) -> Result<Option<User>, DomainError>;

    /// Load several users at once. Unknown IDs are skipped.
    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, DomainError>;

    /// Active, non-superuser accounts ordered by username
    async fn find_listed(&self) -> Result<Vec<User>, DomainError>;

    /// Create a new user with an empty profile
    async fn create(&self, user: &NewUser) -> Result<User, DomainError>;

    /// Apply a partial account/profile update and return the updated user
    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<User, DomainError>;
}

/// Repository for follow edges (the relation store)
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Atomically insert the edge unless it already exists.
    /// Returns `true` when a new edge was written.
    async fn insert_if_absent(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<bool, DomainError>;

    /// Delete the edge if present. Returns `true` when an edge was removed.
    async fn delete(&self, follower: &UserId, followee: &UserId) -> Result<bool, DomainError>;

    /// Check whether `follower` follows `followee`
    async fn exists(&self, follower: &UserId, followee: &UserId) -> Result<bool, DomainError>;

    /// Users followed by `follower`
    async fn followees_of(&self, follower: &UserId) -> Result<HashSet<UserId>, DomainError>;

    /// Users following `followee`
    async fn followers_of(&self, followee: &UserId) -> Result<HashSet<UserId>, DomainError>;
}

/// Repository for the append-only action log
#[async_trait]
pub trait ActionRepository: Send + Sync {
    /// Append an action, stamping it with the current time
    async fn append(&self, action: &NewAction) -> Result<Action, DomainError>;

    /// Read actions matching `filter`, newest first (ties by insertion order)
    async fn query(&self, filter: &ActionFilter, limit: u64) -> Result<Vec<Action>, DomainError>;

    /// Append an action unless one with the same actor, verb and target was
    /// recorded at or after `since`. The check and the append are atomic.
    ///
    /// Returns `None` when the action was suppressed.
    async fn append_unless_recent(
        &self,
        action: &NewAction,
        since: DateTime<Utc>,
    ) -> Result<Option<Action>, DomainError>;
}

/// Repository for bookmarked images
#[async_trait]
pub trait ImageRepository: Send + Sync {
    /// Find an image by ID
    async fn find_by_id(&self, id: &ImageId) -> Result<Option<Image>, DomainError>;

    /// Load several images at once. Unknown IDs are skipped.
    async fn find_by_ids(&self, ids: &[ImageId]) -> Result<Vec<Image>, DomainError>;

    /// Most recently bookmarked images
    async fn find_recent(&self, limit: u64) -> Result<Vec<Image>, DomainError>;

    /// Images bookmarked by a user, newest first
    async fn find_by_owner(&self, owner: &UserId) -> Result<Vec<Image>, DomainError>;

    /// Store a new bookmark
    async fn create(
        &self,
        owner: &UserId,
        image: &NewImage,
        slug: &str,
    ) -> Result<Image, DomainError>;

    /// Remove a bookmark. Returns `false` if it did not exist.
    async fn delete(&self, id: &ImageId) -> Result<bool, DomainError>;
}
