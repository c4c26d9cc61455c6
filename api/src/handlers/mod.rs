//! HTTP handlers
//!
//! Axum request handlers for the API endpoints.

pub mod accounts;
pub mod dashboard;
pub mod images;
pub mod people;

use axum::http::{header, HeaderMap};

pub use accounts::{edit, me, register};
pub use dashboard::dashboard;
pub use images::{create_image, get_image, list_images};
pub use people::{user_detail, user_follow, user_list};

/// Check if the client wants JSON response
fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("application/json"))
        .unwrap_or(false)
}

/// Plain-text response body
fn text(body: String) -> ([(header::HeaderName, &'static str); 1], String) {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body)
}
