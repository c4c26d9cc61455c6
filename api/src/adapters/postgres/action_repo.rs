//! PostgreSQL adapter for ActionRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};

use crate::domain::entities::{Action, ActionFilter, ActionId, ActionTarget, NewAction, UserId};
use crate::domain::ports::ActionRepository;
use crate::entity::{actions, users};
use crate::error::DomainError;

/// PostgreSQL implementation of ActionRepository
pub struct PostgresActionRepository {
    db: DatabaseConnection,
}

impl PostgresActionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ActionRepository for PostgresActionRepository {
    async fn append(&self, action: &NewAction) -> Result<Action, DomainError> {
        let result = new_model(action)
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }

    async fn query(&self, filter: &ActionFilter, limit: u64) -> Result<Vec<Action>, DomainError> {
        let mut select = actions::Entity::find();

        if let Some(excluded) = filter.exclude_actor {
            select = select.filter(actions::Column::ActorId.ne(excluded.0));
        }
        if let Some(actors) = &filter.actor_in {
            select = select.filter(actions::Column::ActorId.is_in(actors.iter().map(|a| a.0)));
        }

        let results = select
            .order_by_desc(actions::Column::CreatedAt)
            .order_by_desc(actions::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn append_unless_recent(
        &self,
        action: &NewAction,
        since: DateTime<Utc>,
    ) -> Result<Option<Action>, DomainError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        // Row lock on the actor serializes concurrent writers for the same user
        users::Entity::find_by_id(action.actor.0)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let recent = identical_since(action, since)
            .count(&txn)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        if recent > 0 {
            txn.rollback()
                .await
                .map_err(|e| DomainError::Database(e.to_string()))?;
            return Ok(None);
        }

        let result = new_model(action)
            .insert(&txn)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(Some(result.into()))
    }
}

fn new_model(action: &NewAction) -> actions::ActiveModel {
    let (target_kind, target_id) = action.target.to_parts();

    actions::ActiveModel {
        id: NotSet,
        actor_id: Set(action.actor.0),
        verb: Set(action.verb.clone()),
        target_kind: Set(target_kind.map(|k| k.to_string())),
        target_id: Set(target_id),
        created_at: Set(Utc::now().fixed_offset()),
    }
}

/// Actions with the same actor, verb and target recorded at or after `since`
fn identical_since(action: &NewAction, since: DateTime<Utc>) -> Select<actions::Entity> {
    let (target_kind, target_id) = action.target.to_parts();

    let select = actions::Entity::find()
        .filter(actions::Column::ActorId.eq(action.actor.0))
        .filter(actions::Column::Verb.eq(action.verb.as_str()))
        .filter(actions::Column::CreatedAt.gte(since.fixed_offset()));

    match (target_kind, target_id) {
        (Some(kind), Some(id)) => select
            .filter(actions::Column::TargetKind.eq(kind.to_string()))
            .filter(actions::Column::TargetId.eq(id)),
        _ => select
            .filter(actions::Column::TargetKind.is_null())
            .filter(actions::Column::TargetId.is_null()),
    }
}

/// Convert SeaORM model to domain entity
impl From<actions::Model> for Action {
    fn from(model: actions::Model) -> Self {
        let kind = model.target_kind.and_then(|k| k.parse().ok());

        Action {
            id: ActionId(model.id),
            actor: UserId(model.actor_id),
            verb: model.verb,
            target: ActionTarget::from_parts(kind, model.target_id),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
