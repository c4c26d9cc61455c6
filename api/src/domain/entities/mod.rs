//! Domain entities
//!
//! Pure domain models representing core business concepts.
//! These are separate from the SeaORM entities in the `entity` module.

pub mod action;
pub mod follow;
pub mod image;
pub mod user;

pub use action::{
    Action, ActionFilter, ActionId, ActionTarget, NewAction, VERB_BOOKMARKED_IMAGE,
    VERB_REGISTERED,
};
pub use follow::{FollowAction, FollowEdge, FollowStats};
pub use image::{slugify, Image, ImageId, NewImage};
pub use user::{NewUser, Profile, ProfileUpdate, User, UserId};
