use std::{borrow::Cow, sync::OnceLock};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::usermodel::*;

fn gmail_pattern() -> Option<&'static Regex> {
    static GMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    GMAIL
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@gmail\.com$").ok())
        .as_ref()
}

pub fn is_valid_gmail(email: &str) -> bool {
    gmail_pattern().map_or(false, |re| re.is_match(email))
}

pub fn validate_gmail(email: &str) -> Result<(), ValidationError> {
    if !is_valid_gmail(email) {
        let mut error = ValidationError::new("invalid_email");
        error.message = Some(Cow::from("Only valid Gmail addresses are allowed"));
        return Err(error);
    }
    Ok(())
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupUserDto {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,

    #[validate(custom = "validate_gmail")]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    /// "BUYER" or "AGENT", any casing. Defaults to BUYER.
    pub role: Option<String>,

    #[validate(length(max = 20, message = "Phone number must be at most 20 characters"))]
    pub phone: Option<String>,
    pub city: Option<String>,
    #[validate(length(max = 12, message = "Pincode must be at most 12 characters"))]
    pub pincode: Option<String>,
    pub bio: Option<String>,
    pub agency_name: Option<String>,
    pub experience: Option<String>,
    pub specialties: Option<String>,
}

/// Fields are optional so a missing credential becomes a 400 with a readable
/// message instead of a JSON rejection.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct LoginUserDto {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct NameUpdateDto {
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Partial profile update. Only supplied fields are written.
#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileDto {
    #[validate(length(min = 1, max = 100, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(max = 20, message = "Phone number must be at most 20 characters"))]
    pub phone: Option<String>,
    pub city: Option<String>,
    #[validate(length(max = 12, message = "Pincode must be at most 12 characters"))]
    pub pincode: Option<String>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub agency_name: Option<String>,
    pub experience: Option<String>,
    pub specialties: Option<String>,
}

impl UpdateProfileDto {
    pub fn touches_professional_fields(&self) -> bool {
        self.agency_name.is_some() || self.experience.is_some() || self.specialties.is_some()
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterUserDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub pincode: Option<String>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agency_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialties: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FilterUserDto {
    pub fn filter_user(user: &User) -> Self {
        let professional = |field: &Option<String>| {
            if user.is_agent() { field.clone() } else { None }
        };

        FilterUserDto {
            id: user.id.to_string(),
            name: user.name.to_owned(),
            email: user.email.to_owned(),
            role: user.role.to_str().to_string(),
            phone: user.phone.clone(),
            city: user.city.clone(),
            pincode: user.pincode.clone(),
            profile_picture: user.profile_picture.clone(),
            bio: user.bio.clone(),
            agency_name: professional(&user.agency_name),
            experience: professional(&user.experience),
            specialties: professional(&user.specialties),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserData {
    pub user: FilterUserDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponseDto {
    pub status: String,
    pub data: UserData,
}
