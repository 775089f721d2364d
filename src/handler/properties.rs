use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query},
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::propertydtos::{
        AdminPropertyDto, AgentQueryDto, CreatePropertyDto, DeleteQueryDto, FeatureQueryDto,
        ListedQueryDto, PropertyDto, PurposeQueryDto, RegionQueryDto, RequesterQueryDto,
        UpdatePropertyDto, ViewerQueryDto,
    },
    error::{ErrorMessage, HttpError},
    service::aggregation::pin_code_stats,
    AppState,
};

pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

pub fn property_handler() -> Router {
    Router::new()
        .route("/", get(get_properties).post(create_property))
        .route("/upload", post(upload_property))
        .route("/all", get(get_all_properties))
        .route("/countByPincode", get(count_by_pincode))
        .route("/agent/:agent_id", get(get_agent_properties))
        .route(
            "/:property_id",
            get(get_property)
                .put(update_property)
                .delete(delete_property),
        )
        .route("/:property_id/listed", put(set_listed))
        .route("/:property_id/sold", put(mark_sold))
        .route("/:property_id/feature", put(feature_property))
        .route("/:property_id/view", post(record_view))
}

pub async fn get_properties(
    Query(query_params): Query<PurposeQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let properties = app_state
        .listing_service
        .list_public(query_params.purpose.as_deref())
        .await?;

    let properties = PropertyDto::from_properties(&properties);

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "properties": properties,
            "total": properties.len()
        }
    })))
}

pub async fn get_property(
    Path(property_id): Path<Uuid>,
    Query(query_params): Query<ViewerQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let property = app_state
        .listing_service
        .get_listing(property_id, query_params.agent_id)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "property": PropertyDto::from_property(&property)
        }
    })))
}

pub async fn create_property(
    Query(query_params): Query<AgentQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreatePropertyDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let property = app_state
        .listing_service
        .create_listing(query_params.agent_id, body)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Property created successfully",
        "data": {
            "property": PropertyDto::from_property(&property)
        }
    })))
}

/// Multipart create: one `property` part holding the JSON payload and any
/// number of `photos` file parts. The agent is checked before any photo is
/// written, and stored photos are removed again if the insert fails.
pub async fn upload_property(
    Query(query_params): Query<AgentQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpError> {
    let mut property_json: Option<String> = None;
    let mut files: Vec<(Option<String>, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HttpError::bad_request(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "property" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| HttpError::bad_request(e.to_string()))?;
                property_json = Some(text);
            }
            "photos" => {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| HttpError::bad_request(e.to_string()))?;
                if !bytes.is_empty() {
                    files.push((file_name, bytes.to_vec()));
                }
            }
            other => {
                tracing::debug!("ignoring multipart field '{}'", other);
            }
        }
    }

    let property_json = property_json
        .ok_or_else(|| HttpError::bad_request("Missing 'property' part"))?;
    let mut body: CreatePropertyDto = serde_json::from_str(&property_json)
        .map_err(|e| HttpError::bad_request(format!("Invalid property payload: {}", e)))?;

    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let agent = app_state
        .listing_service
        .require_agent(query_params.agent_id)
        .await?;

    let mut stored = Vec::with_capacity(files.len());
    for (file_name, bytes) in &files {
        match app_state.photo_storage.store(file_name.as_deref(), bytes).await {
            Ok(reference) => stored.push(reference),
            Err(err) => {
                discard_photos(&app_state, &stored).await;
                return Err(err.into());
            }
        }
    }
    body.photos.extend(stored.iter().cloned());

    tracing::info!(agent_id = %agent.id, photos = stored.len(), "property upload");

    let property = match app_state.listing_service.create_listing_for(&agent, body).await {
        Ok(property) => property,
        Err(err) => {
            discard_photos(&app_state, &stored).await;
            return Err(err.into());
        }
    };

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Property created successfully",
        "data": {
            "property": PropertyDto::from_property(&property)
        }
    })))
}

async fn discard_photos(app_state: &AppState, references: &[String]) {
    for reference in references {
        if let Err(err) = app_state.photo_storage.remove(reference).await {
            tracing::warn!(file = %reference, "failed to remove orphaned photo: {}", err);
        }
    }
}

pub fn admin_key_matches(headers: &HeaderMap, configured: Option<&str>) -> bool {
    let Some(expected) = configured else {
        return false;
    };

    headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map_or(false, |supplied| supplied == expected)
}

pub async fn get_all_properties(
    headers: HeaderMap,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    if !admin_key_matches(&headers, app_state.env.admin_key.as_deref()) {
        tracing::warn!("rejected admin listing request");
        return Err(HttpError::forbidden(ErrorMessage::AdminKeyRequired.to_string()));
    }

    let properties = app_state.listing_service.list_all().await?;
    let properties: Vec<AdminPropertyDto> = properties
        .iter()
        .map(|p| AdminPropertyDto {
            property: PropertyDto::from_property(p),
            deleted: p.deleted,
        })
        .collect();

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "properties": properties,
            "total": properties.len()
        }
    })))
}

pub async fn get_agent_properties(
    Path(agent_id): Path<Uuid>,
    Query(query_params): Query<RequesterQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let properties = app_state
        .listing_service
        .list_for_agent(agent_id, query_params.requester_id)
        .await?;

    let properties = PropertyDto::from_properties(&properties);

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "properties": properties,
            "total": properties.len()
        }
    })))
}

pub async fn update_property(
    Path(property_id): Path<Uuid>,
    Query(query_params): Query<AgentQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<UpdatePropertyDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let property = app_state
        .listing_service
        .update_listing(property_id, query_params.agent_id, body)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Property updated successfully",
        "data": {
            "property": PropertyDto::from_property(&property)
        }
    })))
}

pub async fn set_listed(
    Path(property_id): Path<Uuid>,
    Query(query_params): Query<ListedQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let property = app_state
        .listing_service
        .set_listed(property_id, query_params.agent_id, query_params.listed)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "property": PropertyDto::from_property(&property)
        }
    })))
}

pub async fn mark_sold(
    Path(property_id): Path<Uuid>,
    Query(query_params): Query<AgentQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let property = app_state
        .listing_service
        .set_listed(property_id, query_params.agent_id, false)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Property marked as sold",
        "data": {
            "property": PropertyDto::from_property(&property)
        }
    })))
}

pub async fn delete_property(
    Path(property_id): Path<Uuid>,
    Query(query_params): Query<DeleteQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .listing_service
        .delete_listing(property_id, query_params.agent_id, query_params.soft)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Property deleted successfully"
    })))
}

pub async fn feature_property(
    Path(property_id): Path<Uuid>,
    Query(query_params): Query<FeatureQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let property = app_state
        .listing_service
        .set_featured(property_id, query_params.agent_id, query_params.featured)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "property": PropertyDto::from_property(&property)
        }
    })))
}

pub async fn record_view(
    Path(property_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let views = app_state.listing_service.record_view(property_id).await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "views": views
        }
    })))
}

pub async fn count_by_pincode(
    Query(query_params): Query<RegionQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let regions = pin_code_stats(&app_state.db_client, &query_params).await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": regions
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_admin_key_required_and_matched() {
        let mut headers = HeaderMap::new();
        assert!(!admin_key_matches(&headers, Some("s3cret")));

        headers.insert(ADMIN_KEY_HEADER, HeaderValue::from_static("wrong"));
        assert!(!admin_key_matches(&headers, Some("s3cret")));

        headers.insert(ADMIN_KEY_HEADER, HeaderValue::from_static("s3cret"));
        assert!(admin_key_matches(&headers, Some("s3cret")));

        // No configured key disables the bypass entirely
        assert!(!admin_key_matches(&headers, None));
    }
}
