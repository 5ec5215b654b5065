use axum::{Router, routing::get};

use crate::modules::access::controller::check_level_access;
use crate::state::AppState;

pub fn init_access_router() -> Router<AppState> {
    Router::new().route("/levels/{level}", get(check_level_access))
}
