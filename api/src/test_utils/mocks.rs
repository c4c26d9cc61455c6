//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and allow tests to verify behavior.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

use crate::domain::entities::{
    Action, ActionFilter, ActionId, ActionTarget, Image, ImageId, NewAction,
    NewImage, NewUser, Profile, ProfileUpdate, User, UserId,
};
use crate::domain::ports::{ActionRepository, FollowRepository, ImageRepository, UserRepository};
use crate::error::DomainError;

fn storage_down() -> DomainError {
    DomainError::Database("storage unavailable".to_string())
}

/// Sort actions newest first, breaking timestamp ties by insertion order.
/// Mirrors the `ORDER BY created_at DESC, id DESC` of the Postgres adapter.
pub fn sort_newest_first(actions: &mut [Action]) {
    actions.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

// ============================================================================
// In-Memory User Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a user for testing
    pub fn with_user(self, user: User) -> Self {
        self.users.write().unwrap().insert(user.id, user);
        self
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        Ok(self.users.read().unwrap().get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let users = self.users.read().unwrap();
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_api_key_hash(&self, hash: &str) -> Result<Option<User>, DomainError> {
        let users = self.users.read().unwrap();
        Ok(users.values().find(|u| u.api_key_hash == hash).cloned())
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, DomainError> {
        let users = self.users.read().unwrap();
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn find_listed(&self) -> Result<Vec<User>, DomainError> {
        let users = self.users.read().unwrap();
        let mut listed: Vec<User> = users.values().filter(|u| u.is_listed()).cloned().collect();
        listed.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(listed)
    }

    async fn create(&self, new_user: &NewUser) -> Result<User, DomainError> {
        let mut users = self.users.write().unwrap();

        if users.values().any(|u| u.username == new_user.username) {
            return Err(DomainError::AlreadyExists(format!(
                "User with username '{}' already exists",
                new_user.username
            )));
        }

        let user = User {
            id: UserId::new(),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            api_key_hash: new_user.api_key_hash.clone(),
            is_active: true,
            is_superuser: false,
            profile: Profile::default(),
            created_at: Utc::now(),
        };

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<User, DomainError> {
        let mut users = self.users.write().unwrap();
        let user = users
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("User {} not found", id)))?;

        update.apply_to(user);
        Ok(user.clone())
    }
}

// ============================================================================
// In-Memory Follow Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryFollowRepository {
    edges: Arc<RwLock<HashSet<(UserId, UserId)>>>,
    fail: bool,
}

impl InMemoryFollowRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a follow edge
    pub fn with_edge(self, follower: UserId, followee: UserId) -> Self {
        self.edges.write().unwrap().insert((follower, followee));
        self
    }

    /// Make every call fail with a database error
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn edge_count(&self) -> usize {
        self.edges.read().unwrap().len()
    }

    fn check(&self) -> Result<(), DomainError> {
        if self.fail {
            Err(storage_down())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl FollowRepository for InMemoryFollowRepository {
    async fn insert_if_absent(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<bool, DomainError> {
        self.check()?;
        Ok(self.edges.write().unwrap().insert((*follower, *followee)))
    }

    async fn delete(&self, follower: &UserId, followee: &UserId) -> Result<bool, DomainError> {
        self.check()?;
        Ok(self.edges.write().unwrap().remove(&(*follower, *followee)))
    }

    async fn exists(&self, follower: &UserId, followee: &UserId) -> Result<bool, DomainError> {
        self.check()?;
        Ok(self.edges.read().unwrap().contains(&(*follower, *followee)))
    }

    async fn followees_of(&self, follower: &UserId) -> Result<HashSet<UserId>, DomainError> {
        self.check()?;
        let edges = self.edges.read().unwrap();
        Ok(edges
            .iter()
            .filter(|(from, _)| from == follower)
            .map(|(_, to)| *to)
            .collect())
    }

    async fn followers_of(&self, followee: &UserId) -> Result<HashSet<UserId>, DomainError> {
        self.check()?;
        let edges = self.edges.read().unwrap();
        Ok(edges
            .iter()
            .filter(|(_, to)| to == followee)
            .map(|(from, _)| *from)
            .collect())
    }
}

// ============================================================================
// In-Memory Action Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryActionRepository {
    actions: Arc<RwLock<Vec<Action>>>,
    next_id: AtomicI64,
    fail: bool,
}

impl InMemoryActionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with an action stamped at a fixed time
    pub fn with_action_at(
        self,
        actor: UserId,
        verb: &str,
        target: ActionTarget,
        created_at: DateTime<Utc>,
    ) -> Self {
        let id = self.allocate_id();
        self.actions.write().unwrap().push(Action {
            id,
            actor,
            verb: verb.to_string(),
            target,
            created_at,
        });
        self
    }

    /// Make every call fail with a database error
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Every stored action in insertion order
    pub fn all(&self) -> Vec<Action> {
        self.actions.read().unwrap().clone()
    }

    fn allocate_id(&self) -> ActionId {
        ActionId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn push(&self, actions: &mut Vec<Action>, new_action: &NewAction) -> Action {
        let action = Action {
            id: self.allocate_id(),
            actor: new_action.actor,
            verb: new_action.verb.clone(),
            target: new_action.target,
            created_at: Utc::now(),
        };
        actions.push(action.clone());
        action
    }

    fn check(&self) -> Result<(), DomainError> {
        if self.fail {
            Err(storage_down())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ActionRepository for InMemoryActionRepository {
    async fn append(&self, new_action: &NewAction) -> Result<Action, DomainError> {
        self.check()?;
        let mut actions = self.actions.write().unwrap();
        Ok(self.push(&mut actions, new_action))
    }

    async fn query(&self, filter: &ActionFilter, limit: u64) -> Result<Vec<Action>, DomainError> {
        self.check()?;
        let mut matching: Vec<Action> = self
            .actions
            .read()
            .unwrap()
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        sort_newest_first(&mut matching);
        matching.truncate(limit as usize);
        Ok(matching)
    }

    async fn append_unless_recent(
        &self,
        new_action: &NewAction,
        since: DateTime<Utc>,
    ) -> Result<Option<Action>, DomainError> {
        self.check()?;
        let mut actions = self.actions.write().unwrap();
        let recent = actions.iter().any(|a| {
            a.actor == new_action.actor
                && a.verb == new_action.verb
                && a.target == new_action.target
                && a.created_at >= since
        });

        if recent {
            Ok(None)
        } else {
            Ok(Some(self.push(&mut actions, new_action)))
        }
    }
}

// ============================================================================
// In-Memory Image Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryImageRepository {
    images: Arc<RwLock<Vec<Image>>>,
}

impl InMemoryImageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with an image
    pub fn with_image(self, image: Image) -> Self {
        self.images.write().unwrap().push(image);
        self
    }
}

#[async_trait]
impl ImageRepository for InMemoryImageRepository {
    async fn find_by_id(&self, id: &ImageId) -> Result<Option<Image>, DomainError> {
        let images = self.images.read().unwrap();
        Ok(images.iter().find(|i| i.id == *id).cloned())
    }

    async fn find_by_ids(&self, ids: &[ImageId]) -> Result<Vec<Image>, DomainError> {
        let images = self.images.read().unwrap();
        Ok(images.iter().filter(|i| ids.contains(&i.id)).cloned().collect())
    }

    async fn find_recent(&self, limit: u64) -> Result<Vec<Image>, DomainError> {
        let images = self.images.read().unwrap();
        Ok(images.iter().rev().take(limit as usize).cloned().collect())
    }

    async fn find_by_owner(&self, owner: &UserId) -> Result<Vec<Image>, DomainError> {
        let images = self.images.read().unwrap();
        Ok(images
            .iter()
            .rev()
            .filter(|i| i.owner == *owner)
            .cloned()
            .collect())
    }

    async fn create(
        &self,
        owner: &UserId,
        new_image: &NewImage,
        slug: &str,
    ) -> Result<Image, DomainError> {
        let image = Image {
            id: ImageId::new(),
            owner: *owner,
            title: new_image.title.clone(),
            slug: slug.to_string(),
            url: new_image.url.clone(),
            description: new_image.description.clone().unwrap_or_default(),
            created_at: Utc::now(),
        };
        self.images.write().unwrap().push(image.clone());
        Ok(image)
    }

    async fn delete(&self, id: &ImageId) -> Result<bool, DomainError> {
        let mut images = self.images.write().unwrap();
        let before = images.len();
        images.retain(|i| i.id != *id);
        Ok(images.len() < before)
    }
}
