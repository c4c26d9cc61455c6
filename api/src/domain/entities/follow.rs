//! Follow domain entity
//!
//! A directed edge in the social graph: `follower` follows `followee`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// Verb recorded for a follow
pub const VERB_FOLLOW: &str = "follow";
/// Verb recorded for an unfollow
pub const VERB_UNFOLLOW: &str = "unfollow";

/// A stored follow relationship
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FollowEdge {
    pub follower: UserId,
    pub followee: UserId,
    pub created_at: DateTime<Utc>,
}

/// Requested change to a follow relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowAction {
    Follow,
    Unfollow,
}

impl FollowAction {
    /// Verb written to the action log for this change
    pub fn verb(&self) -> &'static str {
        match self {
            FollowAction::Follow => VERB_FOLLOW,
            FollowAction::Unfollow => VERB_UNFOLLOW,
        }
    }
}

impl std::fmt::Display for FollowAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.verb())
    }
}

impl std::str::FromStr for FollowAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "follow" => Ok(FollowAction::Follow),
            "unfollow" => Ok(FollowAction::Unfollow),
            _ => Err(format!("Unknown follow action: {}", s)),
        }
    }
}

/// Follow statistics for a user, as seen by a viewer
#[derive(Debug, Clone, Default, Serialize)]
pub struct FollowStats {
    pub followers: usize,
    pub following: usize,
    pub viewer_follows: bool,
}
