use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;
use crate::{
    dtos::propertydtos::{CreatePropertyDto, RegionQueryDto, UpdatePropertyDto},
    models::{
        propertymodel::{join_photos, PinCodeStats, Property},
        usermodel::User,
    },
    service::purpose::{purpose_filter_patterns, CanonicalPurpose},
};

pub const PROPERTY_COLUMNS: &str = r#"
    id, title, description, property_type, purpose, price, area,
    bhk, bathrooms, balconies, floor, total_floors, facing, furnishing, age, amenities,
    city, address, location, pin_code, photos,
    agent_id, agent_name, agent_email,
    listed, deleted, featured, views,
    created_at, updated_at
"#;

/// [`PROPERTY_COLUMNS`] prefixed with a table alias, for joins.
pub fn qualified_property_columns(alias: &str) -> String {
    PROPERTY_COLUMNS
        .split(',')
        .map(|column| format!("{}.{}", alias, column.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Heatmap filters. Each `None` leaves that dimension unconstrained.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RegionFilters {
    pub city: Option<String>,
    pub purpose_patterns: Option<Vec<String>>,
    pub property_type: Option<String>,
}

impl RegionFilters {
    pub fn from_query(query: &RegionQueryDto) -> Self {
        Self {
            city: non_blank(query.city.as_deref()),
            purpose_patterns: purpose_filter_patterns(query.purpose.as_deref()),
            property_type: non_blank(query.property_type.as_deref()),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).map(str::to_string)
}

#[async_trait]
pub trait PropertyExt {
    async fn create_property(
        &self,
        agent: &User,
        property_data: &CreatePropertyDto,
        purpose: CanonicalPurpose,
    ) -> Result<Property, sqlx::Error>;

    async fn get_property_by_id(
        &self,
        property_id: Uuid,
    ) -> Result<Option<Property>, sqlx::Error>;

    async fn get_public_properties(
        &self,
        purpose_patterns: Option<Vec<String>>,
    ) -> Result<Vec<Property>, sqlx::Error>;

    async fn get_properties_by_agent(
        &self,
        agent_id: Uuid,
        include_unlisted: bool,
    ) -> Result<Vec<Property>, sqlx::Error>;

    async fn get_all_properties(&self) -> Result<Vec<Property>, sqlx::Error>;

    async fn update_property(
        &self,
        property_id: Uuid,
        agent_id: Uuid,
        patch: &UpdatePropertyDto,
        purpose: Option<CanonicalPurpose>,
    ) -> Result<Option<Property>, sqlx::Error>;

    async fn update_property_listed(
        &self,
        property_id: Uuid,
        agent_id: Uuid,
        listed: bool,
    ) -> Result<Option<Property>, sqlx::Error>;

    async fn soft_delete_property(
        &self,
        property_id: Uuid,
        agent_id: Uuid,
    ) -> Result<bool, sqlx::Error>;

    async fn hard_delete_property(
        &self,
        property_id: Uuid,
        agent_id: Uuid,
    ) -> Result<bool, sqlx::Error>;

    async fn increment_views(
        &self,
        property_id: Uuid,
    ) -> Result<Option<i64>, sqlx::Error>;

    async fn count_by_pin_code(
        &self,
        filters: &RegionFilters,
    ) -> Result<Vec<PinCodeStats>, sqlx::Error>;
}

#[async_trait]
impl PropertyExt for DBClient {
    async fn create_property(
        &self,
        agent: &User,
        property_data: &CreatePropertyDto,
        purpose: CanonicalPurpose,
    ) -> Result<Property, sqlx::Error> {
        sqlx::query_as::<_, Property>(&format!(
            r#"
            INSERT INTO properties (
                title, description, property_type, purpose, price, area,
                bhk, bathrooms, balconies, floor, total_floors, facing, furnishing, age, amenities,
                city, address, location, pin_code, photos,
                agent_id, agent_name, agent_email, listed, deleted, featured, views
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                $16, $17, $18, $19, $20, $21, $22, $23, TRUE, FALSE, FALSE, 0
            )
            RETURNING {PROPERTY_COLUMNS}
            "#
        ))
        .bind(property_data.title.trim())
        .bind(&property_data.description)
        .bind(property_data.property_type.trim())
        .bind(purpose.as_str())
        .bind(property_data.price)
        .bind(property_data.area)
        .bind(property_data.bhk)
        .bind(property_data.bathrooms)
        .bind(property_data.balconies)
        .bind(property_data.floor)
        .bind(property_data.total_floors)
        .bind(&property_data.facing)
        .bind(&property_data.furnishing)
        .bind(&property_data.age)
        .bind(&property_data.amenities)
        .bind(trimmed(&property_data.city))
        .bind(&property_data.address)
        .bind(&property_data.location)
        .bind(trimmed(&property_data.pin_code))
        .bind(join_photos(&property_data.photos))
        .bind(agent.id)
        .bind(&agent.name)
        .bind(&agent.email)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_property_by_id(
        &self,
        property_id: Uuid,
    ) -> Result<Option<Property>, sqlx::Error> {
        sqlx::query_as::<_, Property>(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = $1"
        ))
        .bind(property_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_public_properties(
        &self,
        purpose_patterns: Option<Vec<String>>,
    ) -> Result<Vec<Property>, sqlx::Error> {
        sqlx::query_as::<_, Property>(&format!(
            r#"
            SELECT {PROPERTY_COLUMNS}
            FROM properties
            WHERE listed = TRUE AND deleted = FALSE
            AND ($1::text[] IS NULL OR purpose ILIKE ANY($1::text[]))
            ORDER BY created_at DESC
            "#
        ))
        .bind(purpose_patterns)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_properties_by_agent(
        &self,
        agent_id: Uuid,
        include_unlisted: bool,
    ) -> Result<Vec<Property>, sqlx::Error> {
        sqlx::query_as::<_, Property>(&format!(
            r#"
            SELECT {PROPERTY_COLUMNS}
            FROM properties
            WHERE agent_id = $1 AND deleted = FALSE
            AND ($2 OR listed = TRUE)
            ORDER BY featured DESC, created_at DESC
            "#
        ))
        .bind(agent_id)
        .bind(include_unlisted)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_all_properties(&self) -> Result<Vec<Property>, sqlx::Error> {
        sqlx::query_as::<_, Property>(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn update_property(
        &self,
        property_id: Uuid,
        agent_id: Uuid,
        patch: &UpdatePropertyDto,
        purpose: Option<CanonicalPurpose>,
    ) -> Result<Option<Property>, sqlx::Error> {
        let photos = patch.photos.as_deref().map(join_photos);

        sqlx::query_as::<_, Property>(&format!(
            r#"
            UPDATE properties
            SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                property_type = COALESCE($5, property_type),
                purpose = COALESCE($6, purpose),
                price = COALESCE($7, price),
                area = COALESCE($8, area),
                bhk = COALESCE($9, bhk),
                bathrooms = COALESCE($10, bathrooms),
                balconies = COALESCE($11, balconies),
                floor = COALESCE($12, floor),
                total_floors = COALESCE($13, total_floors),
                facing = COALESCE($14, facing),
                furnishing = COALESCE($15, furnishing),
                age = COALESCE($16, age),
                amenities = COALESCE($17, amenities),
                city = COALESCE($18, city),
                address = COALESCE($19, address),
                location = COALESCE($20, location),
                pin_code = COALESCE($21, pin_code),
                photos = CASE WHEN $22 THEN $23 ELSE photos END,
                updated_at = NOW()
            WHERE id = $1 AND agent_id = $2 AND deleted = FALSE
            RETURNING {PROPERTY_COLUMNS}
            "#
        ))
        .bind(property_id)
        .bind(agent_id)
        .bind(trimmed(&patch.title))
        .bind(&patch.description)
        .bind(trimmed(&patch.property_type))
        .bind(purpose.map(|p| p.as_str()))
        .bind(patch.price)
        .bind(patch.area)
        .bind(patch.bhk)
        .bind(patch.bathrooms)
        .bind(patch.balconies)
        .bind(patch.floor)
        .bind(patch.total_floors)
        .bind(&patch.facing)
        .bind(&patch.furnishing)
        .bind(&patch.age)
        .bind(&patch.amenities)
        .bind(trimmed(&patch.city))
        .bind(&patch.address)
        .bind(&patch.location)
        .bind(trimmed(&patch.pin_code))
        .bind(photos.is_some())
        .bind(photos.flatten())
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_property_listed(
        &self,
        property_id: Uuid,
        agent_id: Uuid,
        listed: bool,
    ) -> Result<Option<Property>, sqlx::Error> {
        sqlx::query_as::<_, Property>(&format!(
            r#"
            UPDATE properties
            SET listed = $3, updated_at = NOW()
            WHERE id = $1 AND agent_id = $2 AND deleted = FALSE
            RETURNING {PROPERTY_COLUMNS}
            "#
        ))
        .bind(property_id)
        .bind(agent_id)
        .bind(listed)
        .fetch_optional(&self.pool)
        .await
    }

    async fn soft_delete_property(
        &self,
        property_id: Uuid,
        agent_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        // A tombstoned listing gives up its featured slot
        let result = sqlx::query(
            r#"
            UPDATE properties
            SET deleted = TRUE, featured = FALSE, updated_at = NOW()
            WHERE id = $1 AND agent_id = $2 AND deleted = FALSE
            "#,
        )
        .bind(property_id)
        .bind(agent_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn hard_delete_property(
        &self,
        property_id: Uuid,
        agent_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let owned = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM properties WHERE id = $1 AND agent_id = $2 FOR UPDATE",
        )
        .bind(property_id)
        .bind(agent_id)
        .fetch_optional(&mut *tx)
        .await?;

        if owned.is_none() {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("DELETE FROM bookmarks WHERE property_id = $1")
            .bind(property_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(property_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(true)
    }

    async fn increment_views(
        &self,
        property_id: Uuid,
    ) -> Result<Option<i64>, sqlx::Error> {
        // Single UPDATE so concurrent viewers never lose an increment
        sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE properties
            SET views = views + 1
            WHERE id = $1 AND deleted = FALSE
            RETURNING views
            "#,
        )
        .bind(property_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn count_by_pin_code(
        &self,
        filters: &RegionFilters,
    ) -> Result<Vec<PinCodeStats>, sqlx::Error> {
        sqlx::query_as::<_, PinCodeStats>(
            r#"
            SELECT
                pin_code,
                COUNT(*) AS count,
                AVG(price / area) AS avg_price_per_area
            FROM properties
            WHERE listed = TRUE AND deleted = FALSE
            AND area > 0
            AND pin_code IS NOT NULL AND pin_code <> ''
            AND ($1::text IS NULL OR LOWER(city) = LOWER($1::text))
            AND ($2::text[] IS NULL OR purpose ILIKE ANY($2::text[]))
            AND ($3::text IS NULL OR LOWER(property_type) = LOWER($3::text))
            GROUP BY pin_code
            ORDER BY pin_code
            "#,
        )
        .bind(&filters.city)
        .bind(&filters.purpose_patterns)
        .bind(&filters.property_type)
        .fetch_all(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_columns_cover_every_column() {
        let columns = qualified_property_columns("p");
        assert!(columns.starts_with("p.id, p.title"));
        assert!(columns.ends_with("p.updated_at"));
        assert_eq!(
            columns.matches("p.").count(),
            PROPERTY_COLUMNS.split(',').count()
        );
        assert!(!columns.contains('\n'));
    }

    #[test]
    fn test_region_filters_drop_blanks() {
        let query = RegionQueryDto {
            city: Some("  ".into()),
            purpose: Some("".into()),
            property_type: None,
        };
        assert_eq!(RegionFilters::from_query(&query), RegionFilters::default());
    }

    #[test]
    fn test_region_filters_keep_supplied_dimensions() {
        let query = RegionQueryDto {
            city: Some(" Ahmedabad ".into()),
            purpose: Some("buy".into()),
            property_type: Some("Villa".into()),
        };
        let filters = RegionFilters::from_query(&query);
        assert_eq!(filters.city.as_deref(), Some("Ahmedabad"));
        assert_eq!(
            filters.purpose_patterns,
            Some(vec!["%sale%".to_string(), "%buy%".to_string()])
        );
        assert_eq!(filters.property_type.as_deref(), Some("Villa"));
    }
}
