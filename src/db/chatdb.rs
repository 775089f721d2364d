use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::chatmodels::ChatMessage;

const CHAT_COLUMNS: &str = "id, property_id, buyer_id, agent_id, message, created_at";

#[async_trait]
pub trait ChatExt {
    async fn save_message(
        &self,
        property_id: Uuid,
        buyer_id: Uuid,
        agent_id: Uuid,
        message: &str,
    ) -> Result<ChatMessage, sqlx::Error>;

    async fn get_conversation(
        &self,
        property_id: Uuid,
        buyer_id: Uuid,
        agent_id: Uuid,
    ) -> Result<Vec<ChatMessage>, sqlx::Error>;

    async fn get_agent_messages(&self, agent_id: Uuid) -> Result<Vec<ChatMessage>, sqlx::Error>;
}

#[async_trait]
impl ChatExt for DBClient {
    async fn save_message(
        &self,
        property_id: Uuid,
        buyer_id: Uuid,
        agent_id: Uuid,
        message: &str,
    ) -> Result<ChatMessage, sqlx::Error> {
        sqlx::query_as::<_, ChatMessage>(&format!(
            r#"
            INSERT INTO chat_messages (property_id, buyer_id, agent_id, message)
            VALUES ($1, $2, $3, $4)
            RETURNING {CHAT_COLUMNS}
            "#
        ))
        .bind(property_id)
        .bind(buyer_id)
        .bind(agent_id)
        .bind(message)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_conversation(
        &self,
        property_id: Uuid,
        buyer_id: Uuid,
        agent_id: Uuid,
    ) -> Result<Vec<ChatMessage>, sqlx::Error> {
        sqlx::query_as::<_, ChatMessage>(&format!(
            r#"
            SELECT {CHAT_COLUMNS} FROM chat_messages
            WHERE property_id = $1 AND buyer_id = $2 AND agent_id = $3
            ORDER BY created_at ASC
            "#
        ))
        .bind(property_id)
        .bind(buyer_id)
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_agent_messages(&self, agent_id: Uuid) -> Result<Vec<ChatMessage>, sqlx::Error> {
        sqlx::query_as::<_, ChatMessage>(&format!(
            "SELECT {CHAT_COLUMNS} FROM chat_messages WHERE agent_id = $1 ORDER BY created_at DESC"
        ))
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await
    }
}
