//! Authentication and request guards

pub mod api_key;
pub mod guards;

pub use api_key::{auth_middleware, extract_api_key};
pub use guards::{enforce, follow_toggle_chain};
