//! Feed module
//!
//! Plain-text rendering of the dashboard and people directory.

pub mod renderer;

pub use renderer::{render_dashboard, render_people, render_user_detail};
