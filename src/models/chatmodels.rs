use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub property_id: Uuid,
    pub buyer_id: Uuid,
    pub agent_id: Uuid,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
