use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/welcome", get(handlers::welcome))
        .route("/select", post(handlers::select))
        .route("/tab", post(handlers::tab))
        .route("/categories", post(handlers::add_category))
        .route("/goals", post(handlers::goals))
        .route("/modal/add", post(handlers::open_add))
        .route("/modal/goals", post(handlers::open_goals))
        .route("/modal/close", post(handlers::close_modal))
        .route("/activities", post(handlers::submit_activity))
        .route("/activities/:id", post(handlers::update_activity))
        .route("/activities/:id/edit", post(handlers::edit_activity))
        .route("/activities/:id/delete", post(handlers::delete_activity))
        .route("/activities/:id/toggle", post(handlers::toggle_activity))
        .route("/ai", post(handlers::open_ai))
        .route("/ai/close", post(handlers::close_ai))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/refresh", post(handlers::refresh))
        .route("/api/activities", post(handlers::create_activity_json))
        .route("/api/activities/:id/toggle", post(handlers::toggle_json))
        .route("/api/ai", get(handlers::get_ai))
        .with_state(state)
}
