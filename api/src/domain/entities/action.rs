//! Action domain entity
//!
//! An append-only record of something a user did. Actions drive the
//! activity feed shown on the dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ImageId, UserId};

/// Verb recorded when a user registers
pub const VERB_REGISTERED: &str = "has created an account";
/// Verb recorded when a user bookmarks an image
pub const VERB_BOOKMARKED_IMAGE: &str = "bookmarked image";

/// Sequential identifier for an action. Doubles as the insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId(pub i64);

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of object an action points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    User,
    Image,
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetKind::User => write!(f, "user"),
            TargetKind::Image => write!(f, "image"),
        }
    }
}

impl std::str::FromStr for TargetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(TargetKind::User),
            "image" => Ok(TargetKind::Image),
            _ => Err(format!("Unknown target kind: {}", s)),
        }
    }
}

/// What an action was performed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ActionTarget {
    #[default]
    None,
    User(UserId),
    Image(ImageId),
}

impl ActionTarget {
    /// Split into the (kind, id) column pair used for storage
    pub fn to_parts(&self) -> (Option<TargetKind>, Option<Uuid>) {
        match self {
            ActionTarget::None => (None, None),
            ActionTarget::User(id) => (Some(TargetKind::User), Some(id.0)),
            ActionTarget::Image(id) => (Some(TargetKind::Image), Some(id.0)),
        }
    }

    /// Rebuild from stored columns. A half-populated pair is treated as no target.
    pub fn from_parts(kind: Option<TargetKind>, id: Option<Uuid>) -> Self {
        match (kind, id) {
            (Some(TargetKind::User), Some(id)) => ActionTarget::User(UserId(id)),
            (Some(TargetKind::Image), Some(id)) => ActionTarget::Image(ImageId(id)),
            _ => ActionTarget::None,
        }
    }
}

/// A recorded action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Action {
    pub id: ActionId,
    pub actor: UserId,
    pub verb: String,
    pub target: ActionTarget,
    pub created_at: DateTime<Utc>,
}

/// Data needed to append a new action
#[derive(Debug, Clone, PartialEq)]
pub struct NewAction {
    pub actor: UserId,
    pub verb: String,
    pub target: ActionTarget,
}

impl NewAction {
    pub fn new(actor: UserId, verb: impl Into<String>, target: ActionTarget) -> Self {
        Self {
            actor,
            verb: verb.into(),
            target,
        }
    }
}

/// Filter applied when reading the action log
#[derive(Debug, Clone, Default)]
pub struct ActionFilter {
    /// Drop actions authored by this user
    pub exclude_actor: Option<UserId>,
    /// Keep only actions authored by one of these users
    pub actor_in: Option<Vec<UserId>>,
}

impl ActionFilter {
    pub fn matches(&self, action: &Action) -> bool {
        if self.exclude_actor == Some(action.actor) {
            return false;
        }
        match &self.actor_in {
            Some(actors) => actors.contains(&action.actor),
            None => true,
        }
    }
}
