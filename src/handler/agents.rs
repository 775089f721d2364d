use std::sync::Arc;

use axum::{extract::Path, response::IntoResponse, routing::get, Extension, Json, Router};
use uuid::Uuid;

use crate::{
    db::userdb::UserExt,
    dtos::{propertydtos::PropertyDto, userdtos::FilterUserDto},
    error::HttpError,
    AppState,
};

pub fn agents_handler() -> Router {
    Router::new()
        .route("/", get(get_agents))
        .route("/:agent_id", get(get_agent_profile))
}

pub async fn get_agents(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let agents = app_state
        .db_client
        .get_agents()
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let agents: Vec<serde_json::Value> = agents
        .iter()
        .map(|agent| {
            serde_json::json!({
                "id": agent.id,
                "name": agent.name,
                "email": agent.email,
                "phone": agent.phone,
                "city": agent.city,
                "profilePicture": agent.profile_picture,
                "agencyName": agent.agency_name,
                "experience": agent.experience,
                "specialties": agent.specialties,
                "propertiesListed": agent.properties_listed,
                "propertiesUnlisted": agent.properties_unlisted,
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "agents": agents,
            "total": agents.len()
        }
    })))
}

/// Public agent profile: only listings anyone may see, split by featured.
pub async fn get_agent_profile(
    Path(agent_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let agent = app_state
        .db_client
        .get_user(Some(agent_id), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .filter(|user| user.is_agent())
        .ok_or_else(|| HttpError::not_found("Agent not found"))?;

    let properties = app_state
        .listing_service
        .list_for_agent(agent.id, None)
        .await?;

    let (featured, other): (Vec<_>, Vec<_>) = properties.into_iter().partition(|p| p.featured);

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "agent": FilterUserDto::filter_user(&agent),
            "featuredProperties": PropertyDto::from_properties(&featured),
            "otherProperties": PropertyDto::from_properties(&other),
        }
    })))
}
