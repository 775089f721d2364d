use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Photo references are persisted as one comma-joined column.
pub const PHOTO_SEPARATOR: char = ',';

pub const MAX_FEATURED_PER_AGENT: i64 = 3;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Property {
    pub id: Uuid,

    // Basic property info
    pub title: String,
    pub description: Option<String>,
    pub property_type: String,
    pub purpose: Option<String>,
    pub price: f64,
    pub area: f64,

    // Specifications
    pub bhk: Option<i32>,
    pub bathrooms: Option<i32>,
    pub balconies: Option<i32>,
    pub floor: Option<i32>,
    pub total_floors: Option<i32>,
    pub facing: Option<String>,
    pub furnishing: Option<String>,
    pub age: Option<String>,
    pub amenities: Option<String>,

    // Location
    pub city: Option<String>,
    pub address: Option<String>,
    pub location: Option<String>,
    pub pin_code: Option<String>,

    pub photos: Option<String>,

    // Snapshot of the posting agent
    pub agent_id: Uuid,
    pub agent_name: Option<String>,
    pub agent_email: Option<String>,

    pub listed: bool,
    pub deleted: bool,
    pub featured: bool,
    pub views: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    pub fn photo_list(&self) -> Vec<String> {
        split_photos(self.photos.as_deref())
    }
}

pub fn split_photos(raw: Option<&str>) -> Vec<String> {
    raw.map(|photos| {
        photos
            .split(PHOTO_SEPARATOR)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

pub fn join_photos(photos: &[String]) -> Option<String> {
    let joined = photos
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(&PHOTO_SEPARATOR.to_string());

    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

/// One heatmap bucket as returned by the grouping query.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct PinCodeStats {
    pub pin_code: String,
    pub count: i64,
    pub avg_price_per_area: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_list_roundtrip_drops_blanks() {
        let joined = join_photos(&[
            "a.jpg".to_string(),
            " ".to_string(),
            " b.png ".to_string(),
        ]);
        assert_eq!(joined.as_deref(), Some("a.jpg,b.png"));
        assert_eq!(split_photos(joined.as_deref()), vec!["a.jpg", "b.png"]);
    }

    #[test]
    fn test_empty_photos() {
        assert_eq!(join_photos(&[]), None);
        assert!(split_photos(None).is_empty());
        assert!(split_photos(Some(",,")).is_empty());
    }
}
