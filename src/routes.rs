// routes.rs
use std::sync::Arc;

use axum::{routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        agents::agents_handler,
        chat::chat_handler,
        favorites::{favorites_handler, saved_handler},
        map::map_handler,
        properties::property_handler,
        users::users_handler,
    },
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .nest("/users", users_handler())
        .nest("/agents", agents_handler())
        .nest("/properties", property_handler())
        .nest("/favorites", favorites_handler())
        .nest("/saved", saved_handler())
        .nest("/chat", chat_handler())
        .nest("/map", map_handler())
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
}
