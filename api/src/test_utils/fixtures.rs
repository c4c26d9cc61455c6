//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.
//! Each fixture function creates a valid entity that can be customized.

use chrono::Utc;

use crate::domain::entities::{slugify, Image, ImageId, Profile, User, UserId};

/// Create a test user with default values
pub fn test_user() -> User {
    test_user_named("test-user")
}

/// Create an active test user with a specific username
pub fn test_user_named(username: &str) -> User {
    User {
        id: UserId::new(),
        username: username.to_string(),
        email: format!("{}@example.com", username),
        first_name: String::new(),
        last_name: String::new(),
        api_key_hash: format!("hash-{}", username),
        is_active: true,
        is_superuser: false,
        profile: Profile::default(),
        created_at: Utc::now(),
    }
}

/// Create a test image owned by `owner`
pub fn test_image(owner: UserId, title: &str) -> Image {
    let slug = slugify(title);
    Image {
        id: ImageId::new(),
        owner,
        title: title.to_string(),
        url: format!("https://img.example.com/{}.jpg", slug),
        slug,
        description: String::new(),
        created_at: Utc::now(),
    }
}
