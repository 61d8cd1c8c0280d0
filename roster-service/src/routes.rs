//! 路由模块

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::home))
        .route(
            "/settings",
            get(handlers::show_settings).post(handlers::submit_settings),
        )
        .route("/updateRole", post(handlers::update_role))
        .route("/api/sources", get(handlers::list_sources))
        .route("/api/health", get(handlers::health_check))
}
