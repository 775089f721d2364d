use chrono::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    #[default]
    Buyer,
    Agent,
}

impl UserRole {
    pub fn to_str(&self) -> &str {
        match self {
            UserRole::Buyer => "BUYER",
            UserRole::Agent => "AGENT",
        }
    }

    /// Role names arrive from clients in any casing ("agent", "Agent", "AGENT").
    pub fn parse(raw: &str) -> Option<UserRole> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "BUYER" => Some(UserRole::Buyer),
            "AGENT" => Some(UserRole::Agent),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: uuid::Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,

    pub phone: Option<String>,
    pub city: Option<String>,
    pub pincode: Option<String>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,

    // Only meaningful for agents
    pub agency_name: Option<String>,
    pub experience: Option<String>,
    pub specialties: Option<String>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_agent(&self) -> bool {
        self.role == UserRole::Agent
    }
}

/// Agent directory row: the agent plus listing counts computed in SQL.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct AgentSummary {
    pub id: uuid::Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub profile_picture: Option<String>,
    pub agency_name: Option<String>,
    pub experience: Option<String>,
    pub specialties: Option<String>,
    pub properties_listed: i64,
    pub properties_unlisted: i64,
}
