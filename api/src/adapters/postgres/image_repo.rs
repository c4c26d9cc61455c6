//! PostgreSQL adapter for ImageRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::domain::entities::{Image, ImageId, NewImage, UserId};
use crate::domain::ports::ImageRepository;
use crate::entity::images;
use crate::error::DomainError;

/// PostgreSQL implementation of ImageRepository
pub struct PostgresImageRepository {
    db: DatabaseConnection,
}

impl PostgresImageRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ImageRepository for PostgresImageRepository {
    async fn find_by_id(&self, id: &ImageId) -> Result<Option<Image>, DomainError> {
        let result = images::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_by_ids(&self, ids: &[ImageId]) -> Result<Vec<Image>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let results = images::Entity::find()
            .filter(images::Column::Id.is_in(ids.iter().map(|id| id.0)))
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn find_recent(&self, limit: u64) -> Result<Vec<Image>, DomainError> {
        let results = images::Entity::find()
            .order_by_desc(images::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn find_by_owner(&self, owner: &UserId) -> Result<Vec<Image>, DomainError> {
        let results = images::Entity::find()
            .filter(images::Column::OwnerId.eq(owner.0))
            .order_by_desc(images::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn create(
        &self,
        owner: &UserId,
        image: &NewImage,
        slug: &str,
    ) -> Result<Image, DomainError> {
        let model = images::ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(owner.0),
            title: Set(image.title.clone()),
            slug: Set(slug.to_string()),
            url: Set(image.url.clone()),
            description: Set(image.description.clone().unwrap_or_default()),
            created_at: Set(Utc::now().fixed_offset()),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }

    async fn delete(&self, id: &ImageId) -> Result<bool, DomainError> {
        let result = images::Entity::delete_by_id(id.0)
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

/// Convert SeaORM model to domain entity
impl From<images::Model> for Image {
    fn from(model: images::Model) -> Self {
        Image {
            id: ImageId(model.id),
            owner: UserId(model.owner_id),
            title: model.title,
            slug: model.slug,
            url: model.url,
            description: model.description,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
