//! Account handlers
//!
//! Registration and the authenticated user's own account.

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Serialize;

use crate::app::RegisterUser;
use crate::domain::entities::{ProfileUpdate, User};
use crate::error::AppError;
use crate::AppState;

/// Response body for registration
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: User,
    /// API key for authenticated calls (Authorization: Bearer <api_key>)
    pub api_key: String,
    pub message: String,
}

/// POST /account/register
///
/// Register a new user. The API key is only shown once.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterUser>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let (user, api_key) = state.user_service.register(&request).await?;

    let message = format!(
        "Welcome, {}! Save your API key - it won't be shown again.\n\n\
         API Usage:\n\
           curl -H \"Authorization: Bearer {}\" /account/",
        user.display_name(),
        api_key
    );

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user,
            api_key,
            message,
        }),
    ))
}

/// GET /account/me
pub async fn me(Extension(user): Extension<User>) -> Json<User> {
    Json(user)
}

/// PATCH /account/edit
///
/// Partial update of account and profile fields. Omitted fields are left
/// untouched; `null` clears `date_of_birth` and `photo_url`.
pub async fn edit(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<User>, AppError> {
    let updated = state.user_service.edit_profile(&user, &update).await?;
    Ok(Json(updated))
}
