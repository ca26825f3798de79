use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/periods", get(handlers::list_periods))
        .route("/api/range", get(handlers::get_range))
        .route("/api/series", get(handlers::get_series))
        .route("/api/ui", get(handlers::get_ui).post(handlers::apply_ui_action))
        .route(
            "/api/notifications",
            get(handlers::list_notifications).post(handlers::notify),
        )
        .route("/api/notifications/:id", delete(handlers::dismiss_notification))
        .with_state(state)
}
