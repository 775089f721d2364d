use async_trait::async_trait;
use uuid::Uuid;

use super::{db::DBClient, propertydb::qualified_property_columns};
use crate::models::propertymodel::Property;

#[async_trait]
pub trait BookmarkExt {
    async fn bookmark_exists(
        &self,
        user_id: Uuid,
        property_id: Uuid,
    ) -> Result<bool, sqlx::Error>;

    /// Bookmarked properties the user may still see, newest bookmark first.
    async fn get_bookmarked_properties(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Property>, sqlx::Error>;

    async fn remove_bookmark(
        &self,
        user_id: Uuid,
        property_id: Uuid,
    ) -> Result<bool, sqlx::Error>;
}

#[async_trait]
impl BookmarkExt for DBClient {
    async fn bookmark_exists(
        &self,
        user_id: Uuid,
        property_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM bookmarks WHERE user_id = $1 AND property_id = $2)",
        )
        .bind(user_id)
        .bind(property_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_bookmarked_properties(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Property>, sqlx::Error> {
        let columns = qualified_property_columns("p");
        sqlx::query_as::<_, Property>(&format!(
            r#"
            SELECT {columns}
            FROM bookmarks b
            JOIN properties p ON p.id = b.property_id
            WHERE b.user_id = $1
            AND p.deleted = FALSE
            AND (p.listed = TRUE OR p.agent_id = $1)
            ORDER BY b.saved_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn remove_bookmark(
        &self,
        user_id: Uuid,
        property_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE user_id = $1 AND property_id = $2")
            .bind(user_id)
            .bind(property_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
