//! PostgreSQL adapter for FollowRepository
//!
//! The `(follower_id, followee_id)` primary key makes follow an atomic
//! insert-if-absent: concurrent duplicate follows collapse into one row.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set,
};

use crate::domain::entities::{FollowEdge, UserId};
use crate::domain::ports::FollowRepository;
use crate::entity::follows;
use crate::error::DomainError;

/// PostgreSQL implementation of FollowRepository
pub struct PostgresFollowRepository {
    db: DatabaseConnection,
}

impl PostgresFollowRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    async fn insert_if_absent(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<bool, DomainError> {
        let model = follows::ActiveModel {
            follower_id: Set(follower.0),
            followee_id: Set(followee.0),
            created_at: Set(Utc::now().fixed_offset()),
        };

        let inserted = follows::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([follows::Column::FollowerId, follows::Column::FolloweeId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(inserted > 0)
    }

    async fn delete(&self, follower: &UserId, followee: &UserId) -> Result<bool, DomainError> {
        let result = follows::Entity::delete_many()
            .filter(follows::Column::FollowerId.eq(follower.0))
            .filter(follows::Column::FolloweeId.eq(followee.0))
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    async fn exists(&self, follower: &UserId, followee: &UserId) -> Result<bool, DomainError> {
        let count = follows::Entity::find()
            .filter(follows::Column::FollowerId.eq(follower.0))
            .filter(follows::Column::FolloweeId.eq(followee.0))
            .count(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    async fn followees_of(&self, follower: &UserId) -> Result<HashSet<UserId>, DomainError> {
        let results = follows::Entity::find()
            .filter(follows::Column::FollowerId.eq(follower.0))
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results
            .into_iter()
            .map(|m| FollowEdge::from(m).followee)
            .collect())
    }

    async fn followers_of(&self, followee: &UserId) -> Result<HashSet<UserId>, DomainError> {
        let results = follows::Entity::find()
            .filter(follows::Column::FolloweeId.eq(followee.0))
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results
            .into_iter()
            .map(|m| FollowEdge::from(m).follower)
            .collect())
    }
}

/// Convert SeaORM model to domain entity
impl From<follows::Model> for FollowEdge {
    fn from(model: follows::Model) -> Self {
        FollowEdge {
            follower: UserId(model.follower_id),
            followee: UserId(model.followee_id),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
