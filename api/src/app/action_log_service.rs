//! Action log service
//!
//! Records what users do and reads it back for the activity feed.
//! Repeating the same action in quick succession (e.g. toggling follow on and
//! off) is recorded once per window.

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::domain::entities::{Action, ActionFilter, ActionTarget, NewAction, UserId};
use crate::domain::ports::ActionRepository;
use crate::error::AppError;

/// Service for appending to and querying the action log
pub struct ActionLogService<AR>
where
    AR: ActionRepository + ?Sized,
{
    actions: Arc<AR>,
    dedup_window: Option<Duration>,
}

impl<AR> ActionLogService<AR>
where
    AR: ActionRepository + ?Sized,
{
    /// `dedup_window_secs <= 0` records every action
    pub fn new(actions: Arc<AR>, dedup_window_secs: i64) -> Self {
        let dedup_window = (dedup_window_secs > 0).then(|| Duration::seconds(dedup_window_secs));
        Self {
            actions,
            dedup_window,
        }
    }

    /// Record an action unless an identical one was recorded within the window.
    /// Concurrent identical calls record at most one action.
    ///
    /// Returns the stored action, or `None` when it was suppressed.
    pub async fn record(
        &self,
        actor: &UserId,
        verb: &str,
        target: ActionTarget,
    ) -> Result<Option<Action>, AppError> {
        let action = NewAction::new(*actor, verb, target);

        let stored = match self.dedup_window {
            Some(window) => {
                let since = Utc::now() - window;
                match self.actions.append_unless_recent(&action, since).await? {
                    Some(stored) => stored,
                    None => {
                        tracing::debug!(user_id = %actor, verb, "Skipping repeated action");
                        return Ok(None);
                    }
                }
            }
            None => self.actions.append(&action).await?,
        };
        tracing::debug!(user_id = %actor, verb, action_id = %stored.id, "Action recorded");

        Ok(Some(stored))
    }

    /// Read actions matching `filter`, newest first
    pub async fn query(&self, filter: &ActionFilter, limit: u64) -> Result<Vec<Action>, AppError> {
        Ok(self.actions.query(filter, limit).await?)
    }
}
