use axum::{Router, routing::put};

use crate::modules::users::controller::update_user_status;
use crate::state::AppState;

/// Admin routes; the caller mounts them behind `require_admin`.
pub fn init_users_router() -> Router<AppState> {
    Router::new().route("/{id}/status", put(update_user_status))
}
