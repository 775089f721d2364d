use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::chatdb::ChatExt,
    dtos::chatdtos::{ConversationQueryDto, SendMessageDto},
    error::HttpError,
    AppState,
};

pub fn chat_handler() -> Router {
    Router::new()
        .route("/send", post(send_message))
        .route("/conversation", get(get_conversation))
        .route("/agent/:agent_id", get(get_agent_messages))
}

pub async fn send_message(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<SendMessageDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let message = body.message.as_deref().map(str::trim).unwrap_or_default();
    let (Some(property_id), Some(buyer_id), Some(agent_id)) =
        (body.property_id, body.buyer_id, body.agent_id)
    else {
        return Err(HttpError::bad_request("Invalid chat data"));
    };
    if message.is_empty() {
        return Err(HttpError::bad_request("Invalid chat data"));
    }

    let saved = app_state
        .db_client
        .save_message(property_id, buyer_id, agent_id, message)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "message": saved
        }
    })))
}

pub async fn get_conversation(
    Query(query_params): Query<ConversationQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let messages = app_state
        .db_client
        .get_conversation(query_params.property_id, query_params.buyer_id, query_params.agent_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "messages": messages,
            "total": messages.len()
        }
    })))
}

pub async fn get_agent_messages(
    Path(agent_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let messages = app_state
        .db_client
        .get_agent_messages(agent_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "messages": messages,
            "total": messages.len()
        }
    })))
}
