use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const MAX_BOOKMARKS_PER_USER: i64 = 10;

/// A user's bookmark on a property. Favorites and saved properties are two
/// views over this one relation.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Bookmark {
    pub id: Uuid,
    pub user_id: Uuid,
    pub property_id: Uuid,
    pub saved_at: DateTime<Utc>,
}
