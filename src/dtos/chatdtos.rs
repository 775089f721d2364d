use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Ids are optional so missing ones surface as "Invalid chat data" (400).
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageDto {
    pub property_id: Option<Uuid>,
    pub buyer_id: Option<Uuid>,
    pub agent_id: Option<Uuid>,
    #[validate(length(max = 4000, message = "Message must be at most 4000 characters"))]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationQueryDto {
    pub property_id: Uuid,
    pub buyer_id: Uuid,
    pub agent_id: Uuid,
}
