use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    models::propertymodel::{PinCodeStats, Property},
    service::purpose::{normalize, CanonicalPurpose},
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyDto {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50, message = "Property type is required"))]
    pub property_type: String,

    pub purpose: Option<String>,

    #[validate(range(min = 0.01, message = "Price must be positive"))]
    pub price: f64,

    #[validate(range(min = 0.0, message = "Area cannot be negative"))]
    #[serde(default)]
    pub area: f64,

    #[validate(range(min = 0, message = "BHK cannot be negative"))]
    pub bhk: Option<i32>,
    #[validate(range(min = 0, message = "Bathrooms cannot be negative"))]
    pub bathrooms: Option<i32>,
    #[validate(range(min = 0, message = "Balconies cannot be negative"))]
    pub balconies: Option<i32>,
    pub floor: Option<i32>,
    pub total_floors: Option<i32>,
    pub facing: Option<String>,
    pub furnishing: Option<String>,
    pub age: Option<String>,
    pub amenities: Option<String>,

    pub city: Option<String>,
    #[validate(length(max = 500, message = "Address must be at most 500 characters"))]
    pub address: Option<String>,
    pub location: Option<String>,
    #[validate(custom = "validate_pin_code")]
    pub pin_code: Option<String>,

    #[serde(default)]
    pub photos: Vec<String>,
}

/// Partial update: absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePropertyDto {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50, message = "Property type cannot be empty"))]
    pub property_type: Option<String>,
    pub purpose: Option<String>,
    #[validate(range(min = 0.01, message = "Price must be positive"))]
    pub price: Option<f64>,
    #[validate(range(min = 0.0, message = "Area cannot be negative"))]
    pub area: Option<f64>,
    #[validate(range(min = 0, message = "BHK cannot be negative"))]
    pub bhk: Option<i32>,
    #[validate(range(min = 0, message = "Bathrooms cannot be negative"))]
    pub bathrooms: Option<i32>,
    #[validate(range(min = 0, message = "Balconies cannot be negative"))]
    pub balconies: Option<i32>,
    pub floor: Option<i32>,
    pub total_floors: Option<i32>,
    pub facing: Option<String>,
    pub furnishing: Option<String>,
    pub age: Option<String>,
    pub amenities: Option<String>,
    pub city: Option<String>,
    #[validate(length(max = 500, message = "Address must be at most 500 characters"))]
    pub address: Option<String>,
    pub location: Option<String>,
    #[validate(custom = "validate_pin_code")]
    pub pin_code: Option<String>,
    pub photos: Option<Vec<String>>,
}

/// Pin codes are region keys, not numbers: leading zeros must survive.
pub fn validate_pin_code(pin_code: &str) -> Result<(), ValidationError> {
    let trimmed = pin_code.trim();
    let valid = !trimmed.is_empty()
        && trimmed.len() <= 12
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-');

    if !valid {
        let mut error = ValidationError::new("invalid_pin_code");
        error.message = Some(Cow::from(
            "Pin code must be 1-12 letters, digits, spaces or dashes",
        ));
        return Err(error);
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDto {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub property_type: String,
    pub purpose: CanonicalPurpose,
    pub price: f64,
    pub area: f64,
    pub bhk: Option<i32>,
    pub bathrooms: Option<i32>,
    pub balconies: Option<i32>,
    pub floor: Option<i32>,
    pub total_floors: Option<i32>,
    pub facing: Option<String>,
    pub furnishing: Option<String>,
    pub age: Option<String>,
    pub amenities: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub location: Option<String>,
    pub pin_code: Option<String>,
    pub photos: Vec<String>,
    pub agent_id: Uuid,
    pub agent_name: Option<String>,
    pub agent_email: Option<String>,
    pub listed: bool,
    pub featured: bool,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PropertyDto {
    pub fn from_property(property: &Property) -> Self {
        Self {
            id: property.id,
            title: property.title.clone(),
            description: property.description.clone(),
            property_type: property.property_type.clone(),
            purpose: normalize(property.purpose.as_deref(), &property.title),
            price: property.price,
            area: property.area,
            bhk: property.bhk,
            bathrooms: property.bathrooms,
            balconies: property.balconies,
            floor: property.floor,
            total_floors: property.total_floors,
            facing: property.facing.clone(),
            furnishing: property.furnishing.clone(),
            age: property.age.clone(),
            amenities: property.amenities.clone(),
            city: property.city.clone(),
            address: property.address.clone(),
            location: property.location.clone(),
            pin_code: property.pin_code.clone(),
            photos: property.photo_list(),
            agent_id: property.agent_id,
            agent_name: property.agent_name.clone(),
            agent_email: property.agent_email.clone(),
            listed: property.listed,
            featured: property.featured,
            views: property.views,
            created_at: property.created_at,
            updated_at: property.updated_at,
        }
    }

    pub fn from_properties(properties: &[Property]) -> Vec<Self> {
        properties.iter().map(Self::from_property).collect()
    }
}

/// Admin view: same as [`PropertyDto`] plus the tombstone flag.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminPropertyDto {
    #[serde(flatten)]
    pub property: PropertyDto,
    pub deleted: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegionStatsDto {
    pub count: i64,
    pub avg_price_per_area: f64,
}

impl RegionStatsDto {
    pub fn from_stats(stats: &PinCodeStats) -> Self {
        Self {
            count: stats.count,
            avg_price_per_area: round2(stats.avg_price_per_area.unwrap_or(0.0)),
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct PurposeQueryDto {
    pub purpose: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct RegionQueryDto {
    pub city: Option<String>,
    pub purpose: Option<String>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentQueryDto {
    pub agent_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ViewerQueryDto {
    pub agent_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RequesterQueryDto {
    pub requester_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureQueryDto {
    pub agent_id: Uuid,
    pub featured: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedQueryDto {
    pub agent_id: Uuid,
    pub listed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteQueryDto {
    pub agent_id: Uuid,
    #[serde(default)]
    pub soft: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::visibility::tests::sample_property;

    #[test]
    fn test_create_dto_validation() {
        let mut dto = CreatePropertyDto {
            title: "Studio for Rent".into(),
            property_type: "Apartment".into(),
            price: 15000.0,
            area: 450.0,
            pin_code: Some("012345".into()),
            ..Default::default()
        };
        assert!(dto.validate().is_ok());

        dto.price = 0.0;
        assert!(dto.validate().is_err());

        dto.price = 10.0;
        dto.pin_code = Some("38@001".into());
        assert!(dto.validate().is_err());

        dto.pin_code = Some("380001".into());
        dto.bhk = Some(-1);
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_create_dto_reads_camel_case() {
        let dto: CreatePropertyDto = serde_json::from_str(
            r#"{"title":"Villa","type":"Villa","price":10,"pinCode":"007001","totalFloors":3}"#,
        )
        .unwrap();
        assert_eq!(dto.pin_code.as_deref(), Some("007001"));
        assert_eq!(dto.total_floors, Some(3));
        assert_eq!(dto.area, 0.0);
        assert!(dto.photos.is_empty());
    }

    #[test]
    fn test_dto_normalizes_legacy_purpose() {
        let mut property = sample_property(Uuid::new_v4());
        property.purpose = Some("For Rent".into());
        assert_eq!(PropertyDto::from_property(&property).purpose, CanonicalPurpose::ForRent);

        property.purpose = None;
        property.title = "Studio for Rent".into();
        let dto = PropertyDto::from_property(&property);
        assert_eq!(dto.purpose, CanonicalPurpose::ForRent);

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["purpose"], "ForRent");
        assert_eq!(json["pinCode"], "380001");
        assert_eq!(json["type"], "Apartment");
    }

    #[test]
    fn test_region_stats_rounding() {
        let stats = PinCodeStats {
            pin_code: "380001".into(),
            count: 3,
            avg_price_per_area: Some(4666.666_666),
        };
        assert_eq!(
            RegionStatsDto::from_stats(&stats),
            RegionStatsDto { count: 3, avg_price_per_area: 4666.67 }
        );
        assert_eq!(round2(1.005_1), 1.01);
    }
}
