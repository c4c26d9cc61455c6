//! Image bookmark handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::entities::{Image, ImageId, NewImage, User};
use crate::error::AppError;
use crate::AppState;

const DEFAULT_IMAGE_LIMIT: u64 = 20;
const MAX_IMAGE_LIMIT: u64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct ListImagesParams {
    pub limit: Option<u64>,
}

/// POST /images
pub async fn create_image(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<NewImage>,
) -> Result<(StatusCode, Json<Image>), AppError> {
    let image = state.image_service.bookmark(&user, &request).await?;
    Ok((StatusCode::CREATED, Json(image)))
}

/// GET /images
pub async fn list_images(
    State(state): State<AppState>,
    Query(params): Query<ListImagesParams>,
) -> Result<Json<Vec<Image>>, AppError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_IMAGE_LIMIT)
        .clamp(1, MAX_IMAGE_LIMIT);
    let images = state.image_service.list_recent(limit).await?;
    Ok(Json(images))
}

/// GET /images/:id
pub async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Image>, AppError> {
    let image = state.image_service.get(&ImageId(id)).await?;
    Ok(Json(image))
}
