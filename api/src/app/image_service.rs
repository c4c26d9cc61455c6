//! Image bookmark service

use std::sync::Arc;

use crate::app::{validate_http_url, ActionLogService};
use crate::domain::entities::{
    slugify, ActionTarget, Image, ImageId, NewImage, User, UserId, VERB_BOOKMARKED_IMAGE,
};
use crate::domain::ports::{ActionRepository, ImageRepository};
use crate::error::{AppError, DomainError};

const MAX_TITLE_LEN: usize = 200;
const FALLBACK_SLUG: &str = "image";

/// Service for bookmarking images
pub struct ImageService<IR, AR>
where
    IR: ImageRepository + ?Sized,
    AR: ActionRepository + ?Sized,
{
    images: Arc<IR>,
    action_log: Arc<ActionLogService<AR>>,
}

impl<IR, AR> ImageService<IR, AR>
where
    IR: ImageRepository + ?Sized,
    AR: ActionRepository + ?Sized,
{
    pub fn new(images: Arc<IR>, action_log: Arc<ActionLogService<AR>>) -> Self {
        Self { images, action_log }
    }

    /// Bookmark an image for `owner` and record it in the action log
    pub async fn bookmark(&self, owner: &User, request: &NewImage) -> Result<Image, AppError> {
        let title = request.title.trim();
        if title.is_empty() || title.chars().count() > MAX_TITLE_LEN {
            return Err(DomainError::Validation(format!(
                "Title must be between 1 and {} characters",
                MAX_TITLE_LEN
            ))
            .into());
        }

        let url = request.url.trim();
        validate_http_url("url", url)?;

        let mut slug = slugify(title);
        if slug.is_empty() {
            slug = FALLBACK_SLUG.to_string();
        }

        let cleaned = NewImage {
            title: title.to_string(),
            url: url.to_string(),
            description: request
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        };

        let image = self.images.create(&owner.id, &cleaned, &slug).await?;
        tracing::info!(image_id = %image.id, owner = %owner.id, slug = %image.slug, "Image bookmarked");

        let logged = self
            .action_log
            .record(&owner.id, VERB_BOOKMARKED_IMAGE, ActionTarget::Image(image.id))
            .await;

        if let Err(e) = logged {
            match self.images.delete(&image.id).await {
                Ok(_) => tracing::warn!(image_id = %image.id, "Removed bookmark after action log failure"),
                Err(undo) => tracing::error!(
                    image_id = %image.id,
                    error = %undo,
                    "Failed to remove bookmark after action log failure"
                ),
            }
            return Err(e);
        }

        Ok(image)
    }

    pub async fn get(&self, id: &ImageId) -> Result<Image, AppError> {
        self.images
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Domain(DomainError::NotFound(format!("Image {} not found", id))))
    }

    pub async fn list_recent(&self, limit: u64) -> Result<Vec<Image>, AppError> {
        Ok(self.images.find_recent(limit).await?)
    }

    pub async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Image>, AppError> {
        Ok(self.images.find_by_owner(owner).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{test_user_named, InMemoryActionRepository, InMemoryImageRepository};

    fn create_service(
        actions: Arc<InMemoryActionRepository>,
    ) -> ImageService<InMemoryImageRepository, InMemoryActionRepository> {
        ImageService::new(
            Arc::new(InMemoryImageRepository::new()),
            Arc::new(ActionLogService::new(actions, 0)),
        )
    }

    fn request(title: &str, url: &str) -> NewImage {
        NewImage {
            title: title.to_string(),
            url: url.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn bookmark_stores_image_and_records_action() {
        let actions = Arc::new(InMemoryActionRepository::new());
        let service = create_service(actions.clone());
        let alice = test_user_named("alice");

        let image = service
            .bookmark(
                &alice,
                &request("  Golden Gate at dusk ", "https://img.example.com/gg.jpg"),
            )
            .await
            .unwrap();

        assert_eq!(image.title, "Golden Gate at dusk");
        assert_eq!(image.slug, "golden-gate-at-dusk");
        assert_eq!(image.owner, alice.id);

        let logged = actions.all();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].verb, VERB_BOOKMARKED_IMAGE);
        assert_eq!(logged[0].target, ActionTarget::Image(image.id));

        let fetched = service.get(&image.id).await.unwrap();
        assert_eq!(fetched.id, image.id);
    }

    #[tokio::test]
    async fn bookmark_is_removed_when_logging_fails() {
        let service = create_service(Arc::new(InMemoryActionRepository::new().failing()));
        let alice = test_user_named("alice");

        let result = service
            .bookmark(&alice, &request("Pier", "https://img.example.com/pier.jpg"))
            .await;

        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::Database(_)))
        ));
        assert!(service.list_recent(10).await.unwrap().is_empty());
        assert!(service.list_by_owner(&alice.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn untitled_slug_falls_back() {
        let service = create_service(Arc::new(InMemoryActionRepository::new()));

        let image = service
            .bookmark(&test_user_named("alice"), &request("???", "http://example.com/a.png"))
            .await
            .unwrap();

        assert_eq!(image.slug, "image");
    }

    #[tokio::test]
    async fn invalid_requests_are_rejected() {
        let actions = Arc::new(InMemoryActionRepository::new());
        let service = create_service(actions.clone());
        let alice = test_user_named("alice");

        for bad in [
            request("   ", "https://example.com/a.png"),
            request(&"x".repeat(201), "https://example.com/a.png"),
            request("Title", "ftp://example.com/a.png"),
            request("Title", "https://"),
        ] {
            let result = service.bookmark(&alice, &bad).await;
            assert!(matches!(
                result,
                Err(AppError::Domain(DomainError::Validation(_)))
            ));
        }
        assert!(actions.all().is_empty());
    }

    #[tokio::test]
    async fn list_by_owner_only_returns_owned_images() {
        let service = create_service(Arc::new(InMemoryActionRepository::new()));
        let alice = test_user_named("alice");
        let bob = test_user_named("bob");

        service
            .bookmark(&alice, &request("One", "https://example.com/1.png"))
            .await
            .unwrap();
        service
            .bookmark(&bob, &request("Two", "https://example.com/2.png"))
            .await
            .unwrap();

        let owned = service.list_by_owner(&alice.id).await.unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].title, "One");

        assert_eq!(service.list_recent(10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn get_unknown_image_is_not_found() {
        let service = create_service(Arc::new(InMemoryActionRepository::new()));

        let result = service.get(&ImageId::new()).await;

        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::NotFound(_)))
        ));
    }
}
