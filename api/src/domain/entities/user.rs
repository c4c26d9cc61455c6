//! User domain entity
//!
//! Represents an account in the user directory, together with its profile.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Optional profile details attached to every account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub date_of_birth: Option<NaiveDate>,
    pub photo_url: Option<String>,
}

/// A registered user
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub api_key_hash: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Full name, falling back to the username when no name is set
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }

    /// Whether the user shows up in the people directory
    pub fn is_listed(&self) -> bool {
        self.is_active && !self.is_superuser
    }
}

/// Data needed to create a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub api_key_hash: String,
}

/// Partial update of account and profile fields.
///
/// `None` leaves a field untouched. For the nullable profile fields the inner
/// `Option` distinguishes "clear" from "set".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default, with = "double_option")]
    pub date_of_birth: Option<Option<NaiveDate>>,
    #[serde(default, with = "double_option")]
    pub photo_url: Option<Option<String>>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.date_of_birth.is_none()
            && self.photo_url.is_none()
    }

    /// Apply this update to a user in place
    pub fn apply_to(&self, user: &mut User) {
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(first_name) = &self.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &self.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(dob) = self.date_of_birth {
            user.profile.date_of_birth = dob;
        }
        if let Some(photo) = &self.photo_url {
            user.profile.photo_url = photo.clone();
        }
    }
}

/// Deserializes a present-but-null field as `Some(None)`
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: UserId::new(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            api_key_hash: "hash".to_string(),
            is_active: true,
            is_superuser: false,
            profile: Profile::default(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let mut u = user();
        assert_eq!(u.display_name(), "alice");

        u.first_name = "Alice".to_string();
        u.last_name = "Liddell".to_string();
        assert_eq!(u.display_name(), "Alice Liddell");
    }

    #[test]
    fn superusers_and_inactive_users_are_not_listed() {
        let mut u = user();
        assert!(u.is_listed());

        u.is_superuser = true;
        assert!(!u.is_listed());

        u.is_superuser = false;
        u.is_active = false;
        assert!(!u.is_listed());
    }

    #[test]
    fn profile_update_distinguishes_null_from_absent() {
        let update: ProfileUpdate =
            serde_json::from_str(r#"{"photo_url": null, "first_name": "Al"}"#).unwrap();
        assert_eq!(update.photo_url, Some(None));
        assert_eq!(update.date_of_birth, None);

        let mut u = user();
        u.profile.photo_url = Some("https://img.test/a.png".to_string());
        u.profile.date_of_birth = NaiveDate::from_ymd_opt(1990, 1, 2);
        update.apply_to(&mut u);

        assert_eq!(u.first_name, "Al");
        assert_eq!(u.profile.photo_url, None);
        assert_eq!(u.profile.date_of_birth, NaiveDate::from_ymd_opt(1990, 1, 2));
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(ProfileUpdate::default().is_empty());
        let update: ProfileUpdate = serde_json::from_str(r#"{"date_of_birth": null}"#).unwrap();
        assert!(!update.is_empty());
    }
}
