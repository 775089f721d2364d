// service/bookmark_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{
        bookmarkdb::BookmarkExt,
        db::DBClient,
        propertydb::PropertyExt,
    },
    models::{
        bookmarkmodel::{Bookmark, MAX_BOOKMARKS_PER_USER},
        propertymodel::Property,
    },
    service::{error::ServiceError, visibility::require_visible},
};

/// Favorites and saved properties share one bookmark relation and one quota.
#[derive(Debug, Clone)]
pub struct BookmarkService {
    db_client: Arc<DBClient>,
}

impl BookmarkService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Property>, ServiceError> {
        Ok(self.db_client.get_bookmarked_properties(user_id).await?)
    }

    pub async fn is_bookmarked(&self, user_id: Uuid, property_id: Uuid) -> Result<bool, ServiceError> {
        Ok(self.db_client.bookmark_exists(user_id, property_id).await?)
    }

    /// The user row is locked while counting so concurrent adds cannot push
    /// a user past the quota.
    pub async fn add(&self, user_id: Uuid, property_id: Uuid) -> Result<Bookmark, ServiceError> {
        let property = self.db_client.get_property_by_id(property_id).await?;
        require_visible(property, Some(user_id))?;

        let mut tx = self.db_client.pool.begin().await?;

        let user = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

        if user.is_none() {
            tx.rollback().await?;
            return Err(ServiceError::NotFound("User not found".to_string()));
        }

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookmarks WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        if count >= MAX_BOOKMARKS_PER_USER {
            tx.rollback().await?;
            return Err(ServiceError::QuotaExceeded(format!(
                "Maximum {} favorites allowed",
                MAX_BOOKMARKS_PER_USER
            )));
        }

        let bookmark = sqlx::query_as::<_, Bookmark>(
            r#"
            INSERT INTO bookmarks (user_id, property_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, property_id) DO NOTHING
            RETURNING id, user_id, property_id, saved_at
            "#,
        )
        .bind(user_id)
        .bind(property_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(bookmark) = bookmark else {
            tx.rollback().await?;
            return Err(ServiceError::Conflict("Already in favorites".to_string()));
        };

        tx.commit().await?;

        tracing::debug!(user_id = %user_id, property_id = %property_id, "bookmark added");
        Ok(bookmark)
    }

    pub async fn remove(&self, user_id: Uuid, property_id: Uuid) -> Result<(), ServiceError> {
        if !self.db_client.remove_bookmark(user_id, property_id).await? {
            return Err(ServiceError::NotFound("Favorite not found".to_string()));
        }
        Ok(())
    }
}
