use std::{path::PathBuf, sync::Arc};

use axum::{extract::Path, response::IntoResponse, routing::get, Extension, Json, Router};

use crate::{error::HttpError, AppState};

pub fn map_handler() -> Router {
    Router::new().route("/:city", get(get_city_geojson))
}

/// City names map straight onto file names, so only letters, `_` and `-`.
pub fn geojson_path(geo_dir: &str, city: &str) -> Option<PathBuf> {
    let valid = !city.is_empty()
        && city.chars().all(|c| c.is_ascii_alphabetic() || c == '_' || c == '-');

    valid.then(|| PathBuf::from(geo_dir).join(format!("{}.geojson", city.to_lowercase())))
}

pub async fn get_city_geojson(
    Path(city): Path<String>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let path = geojson_path(&app_state.env.geo_dir, &city)
        .ok_or_else(|| HttpError::bad_request("Invalid city name"))?;

    let raw = match tokio::fs::read_to_string(&path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(HttpError::not_found(format!("No map data for '{}'", city)));
        }
        Err(e) => return Err(HttpError::server_error(e.to_string())),
    };

    let geojson: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| HttpError::server_error(format!("Corrupt map data: {}", e)))?;

    Ok(Json(geojson))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geojson_path_rejects_traversal() {
        assert_eq!(
            geojson_path("geo", "Ahmedabad"),
            Some(PathBuf::from("geo/ahmedabad.geojson"))
        );
        assert!(geojson_path("geo", "new-delhi").is_some());
        assert!(geojson_path("geo", "../secrets").is_none());
        assert!(geojson_path("geo", "city.json").is_none());
        assert!(geojson_path("geo", "").is_none());
    }
}
