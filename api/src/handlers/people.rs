//! People handlers
//!
//! The user directory, public profiles and the follow toggle.

use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Extension, Form, Json,
};
use serde::{Deserialize, Serialize};

use super::{text, wants_json};
use crate::app::UserDetail;
use crate::domain::entities::{FollowAction, Image, User};
use crate::error::AppError;
use crate::feed::{render_people, render_user_detail};
use crate::AppState;

/// GET /account/users
pub async fn user_list(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let people = state.user_service.list_people().await?;

    if wants_json(&headers) {
        Ok(Json(people).into_response())
    } else {
        Ok(text(render_people(&people, &user)).into_response())
    }
}

/// Response body for a user's public profile
#[derive(Debug, Serialize)]
pub struct UserDetailResponse {
    #[serde(flatten)]
    pub detail: UserDetail,
    pub images: Vec<Image>,
}

/// GET /account/users/:username
pub async fn user_detail(
    State(state): State<AppState>,
    Extension(viewer): Extension<User>,
    Path(username): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let detail = state.user_service.user_detail(&viewer.id, &username).await?;
    let images = state.image_service.list_by_owner(&detail.user.id).await?;

    if wants_json(&headers) {
        Ok(Json(UserDetailResponse { detail, images }).into_response())
    } else {
        Ok(text(render_user_detail(&detail, &images)).into_response())
    }
}

/// Form body for the follow toggle
#[derive(Debug, Default, Deserialize)]
pub struct FollowForm {
    /// UUID or username of the user to (un)follow
    pub id: Option<String>,
    /// `follow` or `unfollow`
    pub action: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowStatus {
    Ok,
    Ko,
}

#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub status: FollowStatus,
}

/// POST /account/users/follow
///
/// Follow or unfollow a user. Guards run before this handler; everything
/// that goes wrong after them is reported as `{"status": "ko"}`.
pub async fn user_follow(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    form: Result<Form<FollowForm>, FormRejection>,
) -> Json<FollowResponse> {
    let status = match toggle(&state, &user, form).await {
        Ok(()) => FollowStatus::Ok,
        Err(e) => {
            tracing::debug!(user_id = %user.id, error = %e, "Follow toggle failed");
            FollowStatus::Ko
        }
    };

    Json(FollowResponse { status })
}

async fn toggle(
    state: &AppState,
    user: &User,
    form: Result<Form<FollowForm>, FormRejection>,
) -> Result<(), AppError> {
    let Form(form) = form.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let target = form
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing id".to_string()))?;

    let action: FollowAction = form
        .action
        .as_deref()
        .map(str::trim)
        .filter(|action| !action.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing action".to_string()))?
        .parse()
        .map_err(AppError::BadRequest)?;

    state
        .relation_service
        .toggle(user, target, action)
        .await
        .map(|_| ())
}
