use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
mod repo;
pub mod services;

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    handlers::profile_routes(max_upload_bytes)
}
