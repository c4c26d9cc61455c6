//! Relation service
//!
//! Maintains the follow graph. Follow and unfollow are idempotent; each
//! successful call is written to the action log.

use std::collections::HashSet;
use std::sync::Arc;

use crate::app::{find_active_user, resolve_user, ActionLogService};
use crate::domain::entities::{ActionTarget, FollowAction, User, UserId};
use crate::domain::ports::{ActionRepository, FollowRepository, UserRepository};
use crate::error::{AppError, DomainError};

/// Outcome of a follow or unfollow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationChange {
    pub action: FollowAction,
    pub followee: UserId,
    /// `false` when the edge was already in the requested state
    pub changed: bool,
}

/// Service for the follow graph
pub struct RelationService<UR, FR, AR>
where
    UR: UserRepository + ?Sized,
    FR: FollowRepository + ?Sized,
    AR: ActionRepository + ?Sized,
{
    users: Arc<UR>,
    follows: Arc<FR>,
    action_log: Arc<ActionLogService<AR>>,
}

impl<UR, FR, AR> RelationService<UR, FR, AR>
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

    /// Make `follower` follow `followee`. Following twice is a no-op.
    pub async fn follow(
        &self,
        follower: &User,
        followee: &UserId,
    ) -> Result<RelationChange, AppError> {
        if follower.id == *followee {
            return Err(DomainError::Validation("You cannot follow yourself".to_string()).into());
        }

        let target = find_active_user(self.users.as_ref(), followee)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("User {} not found", followee)))?;

        let changed = self
            .follows
            .insert_if_absent(&follower.id, &target.id)
            .await?;

        let logged = self
            .action_log
            .record(
                &follower.id,
                FollowAction::Follow.verb(),
                ActionTarget::User(target.id),
            )
            .await;

        if let Err(e) = logged {
            if changed {
                self.undo(FollowAction::Follow, &follower.id, &target.id).await;
            }
            return Err(e);
        }

        tracing::info!(
            follower = %follower.id,
            followee = %target.id,
            changed,
            "Follow"
        );

        Ok(RelationChange {
            action: FollowAction::Follow,
            followee: target.id,
            changed,
        })
    }

    /// Make `follower` stop following `followee`. Unfollowing a user that is
    /// not followed is a no-op.
    pub async fn unfollow(
        &self,
        follower: &User,
        followee: &UserId,
    ) -> Result<RelationChange, AppError> {
        let target = self
            .users
            .find_by_id(followee)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("User {} not found", followee)))?;

        let changed = self.follows.delete(&follower.id, &target.id).await?;

        let logged = self
            .action_log
            .record(
                &follower.id,
                FollowAction::Unfollow.verb(),
                ActionTarget::User(target.id),
            )
            .await;

        if let Err(e) = logged {
            if changed {
                self.undo(FollowAction::Unfollow, &follower.id, &target.id).await;
            }
            return Err(e);
        }

        tracing::info!(
            follower = %follower.id,
            followee = %target.id,
            changed,
            "Unfollow"
        );

        Ok(RelationChange {
            action: FollowAction::Unfollow,
            followee: target.id,
            changed,
        })
    }

    /// Apply a follow/unfollow request where the target is given by UUID or
    /// username
    pub async fn toggle(
        &self,
        viewer: &User,
        target_ref: &str,
        action: FollowAction,
    ) -> Result<RelationChange, AppError> {
        let target = resolve_user(self.users.as_ref(), target_ref).await?;

        match action {
            FollowAction::Follow => self.follow(viewer, &target.id).await,
            FollowAction::Unfollow => self.unfollow(viewer, &target.id).await,
        }
    }

    /// Users followed by `follower`
    pub async fn followees_of(&self, follower: &UserId) -> Result<HashSet<UserId>, AppError> {
        Ok(self.follows.followees_of(follower).await?)
    }

    /// Users following `followee`
    pub async fn followers_of(&self, followee: &UserId) -> Result<HashSet<UserId>, AppError> {
        Ok(self.follows.followers_of(followee).await?)
    }

    pub async fn is_following(&self, follower: &UserId, followee: &UserId) -> Result<bool, AppError> {
        Ok(self.follows.exists(follower, followee).await?)
    }

    /// Put the edge back the way it was after the action log rejected a change
    async fn undo(&self, action: FollowAction, follower: &UserId, followee: &UserId) {
        let restored = match action {
            FollowAction::Follow => self.follows.delete(follower, followee).await,
            FollowAction::Unfollow => self.follows.insert_if_absent(follower, followee).await,
        };

        match restored {
            Ok(_) => tracing::warn!(
                follower = %follower,
                followee = %followee,
                action = action.verb(),
                "Reverted follow graph change after action log failure"
            ),
            Err(e) => tracing::error!(
                follower = %follower,
                followee = %followee,
                action = action.verb(),
                error = %e,
                "Failed to revert follow graph change"
            ),
        }
    }
}
