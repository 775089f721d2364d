use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::{
    dtos::{
        bookmarkdtos::{BookmarkQueryDto, BookmarkStatusDto, UserQueryDto},
        propertydtos::PropertyDto,
    },
    error::HttpError,
    AppState,
};

pub fn favorites_handler() -> Router {
    Router::new()
        .route("/user/:user_id", get(list_bookmarks))
        .route("/check", get(check_favorite))
        .route("/add", post(add_favorite))
        .route("/remove", delete(remove_favorite))
}

/// Same bookmarks as favorites, addressed by property path.
pub fn saved_handler() -> Router {
    Router::new()
        .route("/user/:user_id", get(list_bookmarks))
        .route("/:property_id", post(save_property).delete(unsave_property))
}

pub async fn list_bookmarks(
    Path(user_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let properties = app_state.bookmark_service.list(user_id).await?;
    let properties = PropertyDto::from_properties(&properties);

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "properties": properties,
            "total": properties.len()
        }
    })))
}

pub async fn check_favorite(
    Query(query_params): Query<BookmarkQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let is_favorite = app_state
        .bookmark_service
        .is_bookmarked(query_params.user_id, query_params.property_id)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": BookmarkStatusDto { is_favorite }
    })))
}

async fn add_bookmark(
    app_state: &AppState,
    user_id: Uuid,
    property_id: Uuid,
) -> Result<impl IntoResponse, HttpError> {
    let bookmark = app_state.bookmark_service.add(user_id, property_id).await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Added to favorites",
        "data": {
            "propertyId": bookmark.property_id,
            "savedAt": bookmark.saved_at
        }
    })))
}

async fn remove_bookmark(
    app_state: &AppState,
    user_id: Uuid,
    property_id: Uuid,
) -> Result<impl IntoResponse, HttpError> {
    app_state.bookmark_service.remove(user_id, property_id).await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Removed from favorites"
    })))
}

pub async fn add_favorite(
    Query(query_params): Query<BookmarkQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    add_bookmark(&app_state, query_params.user_id, query_params.property_id).await
}

pub async fn remove_favorite(
    Query(query_params): Query<BookmarkQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    remove_bookmark(&app_state, query_params.user_id, query_params.property_id).await
}

pub async fn save_property(
    Path(property_id): Path<Uuid>,
    Query(query_params): Query<UserQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    add_bookmark(&app_state, query_params.user_id, property_id).await
}

pub async fn unsave_property(
    Path(property_id): Path<Uuid>,
    Query(query_params): Query<UserQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    remove_bookmark(&app_state, query_params.user_id, property_id).await
}
