//! Dashboard handler
//!
//! Supports content negotiation: Accept: application/json for JSON, otherwise text/plain.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;

use super::{text, wants_json};
use crate::domain::entities::User;
use crate::error::AppError;
use crate::feed::render_dashboard;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    pub limit: Option<u64>,
}

/// GET /account/
///
/// Recent activity of the people the user follows, or of everyone when they
/// follow nobody.
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(params): Query<DashboardParams>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let limit = state.feed_service.effective_limit(params.limit);
    let dashboard = state.feed_service.dashboard(&user.id, limit).await?;

    if wants_json(&headers) {
        Ok(Json(dashboard).into_response())
    } else {
        Ok(text(render_dashboard(&dashboard, &user)).into_response())
    }
}
