//! Feed service
//!
//! Builds the activity feed shown on a user's dashboard: recent actions by
//! the people they follow, or by everyone when they follow nobody yet.
//! The feed is computed fresh on every request.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::ActionLogService;
use crate::domain::entities::{
    Action, ActionFilter, ActionId, ActionTarget, Image, ImageId, User, UserId,
};
use crate::domain::ports::{ActionRepository, FollowRepository, ImageRepository, UserRepository};
use crate::error::AppError;

/// Default number of feed entries
pub const DEFAULT_FEED_LIMIT: u64 = 10;

/// A rendered dashboard for a user
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    /// `false` when the viewer follows nobody and the global feed is shown
    pub personalized: bool,
    pub entries: Vec<FeedEntry>,
}

/// One action, joined with the users and objects it refers to
#[derive(Debug, Clone, Serialize)]
pub struct FeedEntry {
    pub id: ActionId,
    pub actor: UserSummary,
    pub verb: String,
    /// `None` when the action has no target or the target no longer exists
    pub target: Option<TargetSummary>,
    pub created_at: DateTime<Utc>,
}

/// Public view of a user inside the feed
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub display_name: String,
    pub photo_url: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            display_name: user.display_name(),
            photo_url: user.profile.photo_url.clone(),
        }
    }
}

/// Public view of an image inside the feed
#[derive(Debug, Clone, Serialize)]
pub struct ImageSummary {
    pub id: ImageId,
    pub title: String,
    pub slug: String,
    pub url: String,
}

impl From<&Image> for ImageSummary {
    fn from(image: &Image) -> Self {
        Self {
            id: image.id,
            title: image.title.clone(),
            slug: image.slug.clone(),
            url: image.url.clone(),
        }
    }
}

/// The object an action was performed on
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetSummary {
    User(UserSummary),
    Image(ImageSummary),
}

/// Service for generating activity feeds
pub struct FeedService<UR, FR, AR, IR>
where
    UR: UserRepository + ?Sized,
    FR: FollowRepository + ?Sized,
    AR: ActionRepository + ?Sized,
    IR: ImageRepository + ?Sized,
{
    users: Arc<UR>,
    follows: Arc<FR>,
    action_log: Arc<ActionLogService<AR>>,
    images: Arc<IR>,
    default_limit: u64,
    max_limit: u64,
}

impl<UR, FR, AR, IR> FeedService<UR, FR, AR, IR>
where
    UR: UserRepository + ?Sized,
    FR: FollowRepository + ?Sized,
    AR: ActionRepository + ?Sized,
    IR: ImageRepository + ?Sized,
{
    pub fn new(
        users: Arc<UR>,
        follows: Arc<FR>,
        action_log: Arc<ActionLogService<AR>>,
        images: Arc<IR>,
    ) -> Self {
        Self {
            users,
            follows,
            action_log,
            images,
            default_limit: DEFAULT_FEED_LIMIT,
            max_limit: DEFAULT_FEED_LIMIT,
        }
    }

    /// Override the default and maximum number of entries
    pub fn with_limits(mut self, default_limit: u64, max_limit: u64) -> Self {
        self.max_limit = max_limit.max(1);
        self.default_limit = default_limit.clamp(1, self.max_limit);
        self
    }

    /// Clamp a caller-supplied limit to `1..=max_limit`
    pub fn effective_limit(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit)
    }

    /// Recent actions for `viewer`, newest first, at most `limit` entries
    pub async fn feed_for(&self, viewer: &UserId, limit: u64) -> Result<Vec<Action>, AppError> {
        let (_, actions) = self.compose(viewer, limit).await?;
        Ok(actions)
    }

    /// The feed for `viewer` with actors and targets resolved
    pub async fn dashboard(&self, viewer: &UserId, limit: u64) -> Result<Dashboard, AppError> {
        let (personalized, actions) = self.compose(viewer, limit).await?;

        let mut user_ids: HashSet<UserId> = HashSet::new();
        let mut image_ids: HashSet<ImageId> = HashSet::new();
        for action in &actions {
            user_ids.insert(action.actor);
            match action.target {
                ActionTarget::User(id) => {
                    user_ids.insert(id);
                }
                ActionTarget::Image(id) => {
                    image_ids.insert(id);
                }
                ActionTarget::None => {}
            }
        }

        let user_ids: Vec<UserId> = user_ids.into_iter().collect();
        let image_ids: Vec<ImageId> = image_ids.into_iter().collect();

        let users: HashMap<UserId, User> = self
            .users
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        let images: HashMap<ImageId, Image> = self
            .images
            .find_by_ids(&image_ids)
            .await?
            .into_iter()
            .map(|i| (i.id, i))
            .collect();

        let entries = actions
            .into_iter()
            .filter_map(|action| {
                let actor = match users.get(&action.actor) {
                    Some(actor) => UserSummary::from(actor),
                    None => {
                        tracing::warn!(action_id = %action.id, actor = %action.actor, "Dropping action with unknown actor");
                        return None;
                    }
                };

                let target = match action.target {
                    ActionTarget::User(id) => {
                        users.get(&id).map(|u| TargetSummary::User(u.into()))
                    }
                    ActionTarget::Image(id) => {
                        images.get(&id).map(|i| TargetSummary::Image(i.into()))
                    }
                    ActionTarget::None => None,
                };

                Some(FeedEntry {
                    id: action.id,
                    actor,
                    verb: action.verb,
                    target,
                    created_at: action.created_at,
                })
            })
            .collect();

        Ok(Dashboard {
            personalized,
            entries,
        })
    }

    /// Select the actions for `viewer`. Returns whether the result was
    /// restricted to followed users.
    async fn compose(&self, viewer: &UserId, limit: u64) -> Result<(bool, Vec<Action>), AppError> {
        let followed = self.follows.followees_of(viewer).await?;

        let mut filter = ActionFilter {
            exclude_actor: Some(*viewer),
            actor_in: None,
        };

        // Users who follow nobody see everyone's activity instead of an empty feed
        let personalized = !followed.is_empty();
        if personalized {
            let mut actors: Vec<UserId> = followed.into_iter().collect();
            actors.sort();
            filter.actor_in = Some(actors);
        }

        let actions = self.action_log.query(&filter, limit).await?;
        tracing::debug!(
            viewer = %viewer,
            personalized,
            count = actions.len(),
            "Feed composed"
        );

        Ok((personalized, actions))
    }
}
