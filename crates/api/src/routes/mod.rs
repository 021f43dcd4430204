pub mod api;
pub mod auth;
pub mod common;
pub mod health;
pub mod users;

pub use api::{build_api_router, AppState};
