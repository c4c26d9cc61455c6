//! User service
//!
//! Handles registration, API key authentication, the people directory and
//! profile editing.

use std::sync::{Arc, LazyLock};

use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::app::ActionLogService;
use crate::domain::entities::{
    ActionTarget, FollowStats, NewUser, ProfileUpdate, User, UserId, VERB_REGISTERED,
};
use crate::domain::ports::{ActionRepository, FollowRepository, UserRepository};
use crate::error::{AppError, DomainError};

const MAX_USERNAME_LEN: usize = 150;
const MAX_EMAIL_LEN: usize = 254;
const MAX_NAME_LEN: usize = 150;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username regex"));

/// Registration request
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUser {
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// A user together with how they sit in the follow graph
#[derive(Debug, Clone, Serialize)]
pub struct UserDetail {
    pub user: User,
    pub stats: FollowStats,
}

/// Service for managing users
pub struct UserService<UR, FR, AR>
where
    UR: UserRepository + ?Sized,
    FR: FollowRepository + ?Sized,
    AR: ActionRepository + ?Sized,
{
    users: Arc<UR>,
    follows: Arc<FR>,
    action_log: Arc<ActionLogService<AR>>,
}

impl<UR, FR, AR> UserService<UR, FR, AR>
where
    UR: UserRepository + ?Sized,
    FR: FollowRepository + ?Sized,
    AR: ActionRepository + ?Sized,
{
    pub fn new(users: Arc<UR>, follows: Arc<FR>, action_log: Arc<ActionLogService<AR>>) -> Self {
        Self {
            users,
            follows,
            action_log,
        }
    }

    /// Register a new user
    ///
    /// Returns (user, api_key). The API key is only shown once; only its hash
    /// is stored.
    pub async fn register(&self, request: &RegisterUser) -> Result<(User, String), AppError> {
        let username = request.username.trim();
        validate_username(username)?;

        let email = request.email.trim();
        if !email.is_empty() {
            validate_email(email)?;
        }
        validate_name("first_name", &request.first_name)?;
        validate_name("last_name", &request.last_name)?;

        if self.users.find_by_username(username).await?.is_some() {
            return Err(AppError::Domain(DomainError::AlreadyExists(format!(
                "User with username '{}' already exists",
                username
            ))));
        }

        let api_key = generate_api_key();
        let new_user = NewUser {
            username: username.to_string(),
            email: email.to_string(),
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            api_key_hash: hash_api_key(&api_key),
        };

        let user = self.users.create(&new_user).await?;
        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        self.action_log
            .record(&user.id, VERB_REGISTERED, ActionTarget::None)
            .await?;

        Ok((user, api_key))
    }

    /// Look up the user owning an API key. Disabled accounts are not authenticated.
    pub async fn authenticate(&self, api_key: &str) -> Result<Option<User>, AppError> {
        let user = self
            .users
            .find_by_api_key_hash(&hash_api_key(api_key))
            .await?;

        match user {
            Some(user) if !user.is_active => {
                tracing::debug!(user_id = %user.id, "Rejected API key for disabled account");
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Resolve a user by UUID or username
    pub async fn resolve(&self, reference: &str) -> Result<User, AppError> {
        resolve_user(self.users.as_ref(), reference).await
    }

    /// Whether `id` names an existing, active account
    pub async fn is_active(&self, id: &UserId) -> Result<bool, AppError> {
        Ok(find_active_user(self.users.as_ref(), id).await?.is_some())
    }

    /// Active, non-superuser accounts
    pub async fn list_people(&self) -> Result<Vec<User>, AppError> {
        Ok(self.users.find_listed().await?)
    }

    /// Public profile of an active user, with follow counts relative to `viewer`
    pub async fn user_detail(&self, viewer: &UserId, username: &str) -> Result<UserDetail, AppError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| DomainError::NotFound(format!("User '{}' not found", username)))?;

        let followers = self.follows.followers_of(&user.id).await?;
        let following = self.follows.followees_of(&user.id).await?;
        let viewer_follows = self.follows.exists(viewer, &user.id).await?;

        let stats = FollowStats {
            followers: followers.len(),
            following: following.len(),
            viewer_follows,
        };

        Ok(UserDetail { user, stats })
    }

    /// Update account and profile fields of `user`
    pub async fn edit_profile(&self, user: &User, update: &ProfileUpdate) -> Result<User, AppError> {
        if update.is_empty() {
            return Err(AppError::BadRequest("Nothing to update".to_string()));
        }

        let mut update = update.clone();
        if let Some(email) = update.email.as_mut() {
            *email = email.trim().to_string();
            if !email.is_empty() {
                validate_email(email)?;
            }
        }
        if let Some(first_name) = &update.first_name {
            validate_name("first_name", first_name)?;
        }
        if let Some(last_name) = &update.last_name {
            validate_name("last_name", last_name)?;
        }
        if let Some(Some(photo_url)) = &update.photo_url {
            validate_http_url("photo_url", photo_url)?;
        }

        let updated = self.users.update_profile(&user.id, &update).await?;
        tracing::info!(user_id = %user.id, "Profile updated");

        Ok(updated)
    }
}

/// Resolve a user by UUID or username
pub async fn resolve_user<UR>(users: &UR, reference: &str) -> Result<User, AppError>
where
    UR: UserRepository + ?Sized,
{
    let reference = reference.trim();

    let user = match Uuid::parse_str(reference) {
        Ok(id) => users.find_by_id(&UserId(id)).await?,
        Err(_) => users.find_by_username(reference).await?,
    };

    user.ok_or_else(|| {
        AppError::Domain(DomainError::NotFound(format!(
            "User '{}' not found",
            reference
        )))
    })
}

/// Look up a user by ID, treating disabled accounts as absent
pub async fn find_active_user<UR>(users: &UR, id: &UserId) -> Result<Option<User>, AppError>
where
    UR: UserRepository + ?Sized,
{
    Ok(users.find_by_id(id).await?.filter(|u| u.is_active))
}

fn validate_username(username: &str) -> Result<(), AppError> {
    if username.is_empty() || username.chars().count() > MAX_USERNAME_LEN {
        return Err(DomainError::Validation(format!(
            "Username must be between 1 and {} characters",
            MAX_USERNAME_LEN
        ))
        .into());
    }
    if !USERNAME_RE.is_match(username) {
        return Err(DomainError::Validation(
            "Username may only contain letters, digits and @/./+/-/_".to_string(),
        )
        .into());
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AppError> {
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(DomainError::Validation(format!(
            "Email must be at most {} characters",
            MAX_EMAIL_LEN
        ))
        .into());
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(DomainError::Validation(format!("Invalid email address: {}", email)).into())
    }
}

fn validate_name(field: &str, value: &str) -> Result<(), AppError> {
    if value.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::Validation(format!(
            "{} must be at most {} characters",
            field, MAX_NAME_LEN
        ))
        .into());
    }
    Ok(())
}

/// Only absolute http(s) URLs are accepted for remote images
pub fn validate_http_url(field: &str, url: &str) -> Result<(), AppError> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));

    match rest {
        Some(rest) if !rest.is_empty() && !url.chars().any(char::is_whitespace) => Ok(()),
        _ => Err(DomainError::Validation(format!("{} must be an http(s) URL", field)).into()),
    }
}

/// Generate a random API key
fn generate_api_key() -> String {
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
    format!("sk-{}", hex::encode(bytes))
}

/// Hash an API key for storage
pub fn hash_api_key(api_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());
    hex::encode(hasher.finalize())
}
