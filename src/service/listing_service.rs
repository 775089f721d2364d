// service/listing_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{
        db::DBClient,
        propertydb::{PropertyExt, PROPERTY_COLUMNS},
        userdb::UserExt,
    },
    dtos::propertydtos::{CreatePropertyDto, UpdatePropertyDto},
    error::ErrorMessage,
    models::{
        propertymodel::{Property, MAX_FEATURED_PER_AGENT},
        usermodel::User,
    },
    service::{
        error::ServiceError,
        purpose::{normalize, purpose_filter_patterns},
        visibility::{featured_first, require_owner, require_visible},
    },
};

#[derive(Debug, Clone)]
pub struct ListingService {
    db_client: Arc<DBClient>,
}

impl ListingService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    /// Resolves `agent_id` to a user allowed to post listings.
    pub async fn require_agent(&self, agent_id: Uuid) -> Result<User, ServiceError> {
        let agent = self
            .db_client
            .get_user(Some(agent_id), None)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Agent not found".to_string()))?;

        if !agent.is_agent() {
            return Err(ServiceError::Forbidden(ErrorMessage::AgentOnly.to_string()));
        }
        Ok(agent)
    }

    pub async fn create_listing(
        &self,
        agent_id: Uuid,
        property_data: CreatePropertyDto,
    ) -> Result<Property, ServiceError> {
        let agent = self.require_agent(agent_id).await?;
        self.create_listing_for(&agent, property_data).await
    }

    /// Insert for an agent already checked by [`Self::require_agent`].
    pub async fn create_listing_for(
        &self,
        agent: &User,
        property_data: CreatePropertyDto,
    ) -> Result<Property, ServiceError> {
        let purpose = normalize(property_data.purpose.as_deref(), &property_data.title);

        let property = self
            .db_client
            .create_property(agent, &property_data, purpose)
            .await?;

        tracing::info!(
            property_id = %property.id,
            agent_id = %agent.id,
            purpose = %purpose,
            "property created"
        );

        Ok(property)
    }

    pub async fn get_listing(
        &self,
        property_id: Uuid,
        requester_id: Option<Uuid>,
    ) -> Result<Property, ServiceError> {
        let property = self.db_client.get_property_by_id(property_id).await?;
        require_visible(property, requester_id)
    }

    /// Public catalogue, optionally narrowed to one purpose bucket.
    pub async fn list_public(&self, purpose: Option<&str>) -> Result<Vec<Property>, ServiceError> {
        let properties = self
            .db_client
            .get_public_properties(purpose_filter_patterns(purpose))
            .await?;
        Ok(properties)
    }

    /// An agent's listings, featured first. Unlisted ones appear only when
    /// the agent asks for their own.
    pub async fn list_for_agent(
        &self,
        agent_id: Uuid,
        requester_id: Option<Uuid>,
    ) -> Result<Vec<Property>, ServiceError> {
        let include_unlisted = requester_id == Some(agent_id);
        let properties = self
            .db_client
            .get_properties_by_agent(agent_id, include_unlisted)
            .await?;
        Ok(featured_first(properties))
    }

    pub async fn list_all(&self) -> Result<Vec<Property>, ServiceError> {
        Ok(self.db_client.get_all_properties().await?)
    }

    pub async fn update_listing(
        &self,
        property_id: Uuid,
        agent_id: Uuid,
        patch: UpdatePropertyDto,
    ) -> Result<Property, ServiceError> {
        let existing = require_owner(
            self.db_client.get_property_by_id(property_id).await?,
            agent_id,
        )?;

        let purpose = patch.purpose.as_deref().map(|raw| {
            let title = patch.title.as_deref().unwrap_or(&existing.title);
            normalize(Some(raw), title)
        });

        self.db_client
            .update_property(property_id, agent_id, &patch, purpose)
            .await?
            .ok_or_else(|| ServiceError::NotFound(ErrorMessage::PropertyNotFound.to_string()))
    }

    pub async fn set_listed(
        &self,
        property_id: Uuid,
        agent_id: Uuid,
        listed: bool,
    ) -> Result<Property, ServiceError> {
        require_owner(
            self.db_client.get_property_by_id(property_id).await?,
            agent_id,
        )?;

        self.db_client
            .update_property_listed(property_id, agent_id, listed)
            .await?
            .ok_or_else(|| ServiceError::NotFound(ErrorMessage::PropertyNotFound.to_string()))
    }

    /// Hard delete removes the row and every bookmark on it; soft delete
    /// keeps a tombstone that is hidden from all reads.
    pub async fn delete_listing(
        &self,
        property_id: Uuid,
        agent_id: Uuid,
        soft: bool,
    ) -> Result<(), ServiceError> {
        require_owner(
            self.db_client.get_property_by_id(property_id).await?,
            agent_id,
        )?;

        let removed = if soft {
            self.db_client.soft_delete_property(property_id, agent_id).await?
        } else {
            self.db_client.hard_delete_property(property_id, agent_id).await?
        };

        if !removed {
            return Err(ServiceError::NotFound(ErrorMessage::PropertyNotFound.to_string()));
        }

        tracing::info!(property_id = %property_id, soft, "property deleted");
        Ok(())
    }

    pub async fn record_view(&self, property_id: Uuid) -> Result<i64, ServiceError> {
        self.db_client
            .increment_views(property_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(ErrorMessage::PropertyNotFound.to_string()))
    }

    /// Sets (or, with `featured == None`, toggles) the featured flag.
    ///
    /// The agent row is locked for the duration so two concurrent requests
    /// cannot both take the last of the agent's featured slots.
    pub async fn set_featured(
        &self,
        property_id: Uuid,
        agent_id: Uuid,
        featured: Option<bool>,
    ) -> Result<Property, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(agent_id)
            .fetch_optional(&mut *tx)
            .await?;

        let property = sqlx::query_as::<_, Property>(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = $1 FOR UPDATE"
        ))
        .bind(property_id)
        .fetch_optional(&mut *tx)
        .await?;

        let property = require_owner(property, agent_id)?;
        let target = featured.unwrap_or(!property.featured);

        if target == property.featured {
            tx.rollback().await?;
            return Ok(property);
        }

        if target {
            let featured_count = sqlx::query_scalar::<_, i64>(
                r#"
                SELECT COUNT(*) FROM properties
                WHERE agent_id = $1 AND featured = TRUE AND deleted = FALSE AND id <> $2
                "#,
            )
            .bind(agent_id)
            .bind(property_id)
            .fetch_one(&mut *tx)
            .await?;

            if featured_count >= MAX_FEATURED_PER_AGENT {
                tx.rollback().await?;
                return Err(ServiceError::QuotaExceeded(format!(
                    "You can feature at most {} properties",
                    MAX_FEATURED_PER_AGENT
                )));
            }
        }

        let updated = sqlx::query_as::<_, Property>(&format!(
            r#"
            UPDATE properties SET featured = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {PROPERTY_COLUMNS}
            "#
        ))
        .bind(property_id)
        .bind(target)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(property_id = %property_id, featured = target, "featured flag changed");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::testing::{create_user, test_client},
        models::usermodel::UserRole,
        service::purpose::CanonicalPurpose,
    };

    fn listing(title: &str, purpose: Option<&str>) -> CreatePropertyDto {
        CreatePropertyDto {
            title: title.to_string(),
            property_type: "Apartment".to_string(),
            purpose: purpose.map(str::to_string),
            price: 1_500_000.0,
            area: 750.0,
            city: Some("Ahmedabad".to_string()),
            pin_code: Some(format!("T{}", &Uuid::new_v4().simple().to_string()[..8])),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_buyer_cannot_create_listing() {
        let Some(client) = test_client().await else { return };
        let service = ListingService::new(Arc::new(client.clone()));
        let buyer = create_user(&client, UserRole::Buyer).await;

        let result = service.create_listing(buyer.id, listing("Flat", None)).await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_create_normalizes_purpose_from_title() {
        let Some(client) = test_client().await else { return };
        let service = ListingService::new(Arc::new(client.clone()));
        let agent = create_user(&client, UserRole::Agent).await;

        let property = service
            .create_listing(agent.id, listing("Studio for Rent", None))
            .await
            .unwrap();
        assert_eq!(property.purpose.as_deref(), Some(CanonicalPurpose::ForRent.as_str()));
        assert!(property.listed);
        assert_eq!(property.views, 0);
    }

    #[tokio::test]
    async fn test_concurrent_views_are_not_lost() {
        let Some(client) = test_client().await else { return };
        let service = Arc::new(ListingService::new(Arc::new(client.clone())));
        let agent = create_user(&client, UserRole::Agent).await;
        let property = service
            .create_listing(agent.id, listing("Busy flat", Some("sale")))
            .await
            .unwrap();

        let views = (0..25).map(|_| {
            let service = service.clone();
            async move { service.record_view(property.id).await.unwrap() }
        });
        futures::future::join_all(views).await;

        let reloaded = service.get_listing(property.id, None).await.unwrap();
        assert_eq!(reloaded.views, 25);
    }

    #[tokio::test]
    async fn test_fourth_featured_listing_is_rejected() {
        let Some(client) = test_client().await else { return };
        let service = ListingService::new(Arc::new(client.clone()));
        let agent = create_user(&client, UserRole::Agent).await;

        let mut ids = Vec::new();
        for i in 0..4 {
            let property = service
                .create_listing(agent.id, listing(&format!("Flat {}", i), None))
                .await
                .unwrap();
            ids.push(property.id);
        }

        for id in &ids[..3] {
            let property = service.set_featured(*id, agent.id, Some(true)).await.unwrap();
            assert!(property.featured);
        }

        let fourth = service.set_featured(ids[3], agent.id, Some(true)).await;
        assert!(matches!(fourth, Err(ServiceError::QuotaExceeded(_))));

        // Re-featuring an already featured listing does not count twice
        assert!(service.set_featured(ids[0], agent.id, Some(true)).await.is_ok());

        // Toggling one off frees a slot
        let toggled = service.set_featured(ids[0], agent.id, None).await.unwrap();
        assert!(!toggled.featured);
        assert!(service.set_featured(ids[3], agent.id, Some(true)).await.is_ok());

        let own = service.list_for_agent(agent.id, Some(agent.id)).await.unwrap();
        assert!(own[..3].iter().all(|p| p.featured));
        assert!(!own[3].featured);
    }

    #[tokio::test]
    async fn test_concurrent_featuring_respects_limit() {
        let Some(client) = test_client().await else { return };
        let service = Arc::new(ListingService::new(Arc::new(client.clone())));
        let agent = create_user(&client, UserRole::Agent).await;

        let mut ids = Vec::new();
        for i in 0..6 {
            let property = service
                .create_listing(agent.id, listing(&format!("Race {}", i), None))
                .await
                .unwrap();
            ids.push(property.id);
        }

        let attempts = ids.iter().map(|id| {
            let service = service.clone();
            let id = *id;
            async move { service.set_featured(id, agent.id, Some(true)).await }
        });
        let results = futures::future::join_all(attempts).await;

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 3);
    }

    #[tokio::test]
    async fn test_unlisted_and_deleted_visibility() {
        let Some(client) = test_client().await else { return };
        let service = ListingService::new(Arc::new(client.clone()));
        let agent = create_user(&client, UserRole::Agent).await;
        let stranger = create_user(&client, UserRole::Buyer).await;

        let property = service
            .create_listing(agent.id, listing("Quiet villa", None))
            .await
            .unwrap();

        service.set_listed(property.id, agent.id, false).await.unwrap();
        assert!(service.get_listing(property.id, Some(agent.id)).await.is_ok());
        assert!(matches!(
            service.get_listing(property.id, Some(stranger.id)).await,
            Err(ServiceError::NotFound(_))
        ));

        assert!(matches!(
            service.delete_listing(property.id, stranger.id, true).await,
            Err(ServiceError::Forbidden(_))
        ));

        service.delete_listing(property.id, agent.id, true).await.unwrap();
        assert!(matches!(
            service.get_listing(property.id, Some(agent.id)).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.record_view(property.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_is_partial() {
        let Some(client) = test_client().await else { return };
        let service = ListingService::new(Arc::new(client.clone()));
        let agent = create_user(&client, UserRole::Agent).await;

        let property = service
            .create_listing(agent.id, listing("Corner shop", Some("commercial")))
            .await
            .unwrap();

        let updated = service
            .update_listing(
                property.id,
                agent.id,
                UpdatePropertyDto {
                    price: Some(2_000_000.0),
                    purpose: Some("to let / rent".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.price, 2_000_000.0);
        assert_eq!(updated.title, "Corner shop");
        assert_eq!(updated.area, property.area);
        assert_eq!(updated.purpose.as_deref(), Some("ForRent"));
    }

    #[tokio::test]
    async fn test_public_catalogue_hides_unlisted_and_deleted() {
        let Some(client) = test_client().await else { return };
        let service = ListingService::new(Arc::new(client.clone()));
        let agent = create_user(&client, UserRole::Agent).await;
        let stranger = create_user(&client, UserRole::Buyer).await;

        let sale = service
            .create_listing(agent.id, listing("Family home", Some("Buy")))
            .await
            .unwrap();
        let rent = service
            .create_listing(agent.id, listing("Studio for Rent", None))
            .await
            .unwrap();
        let hidden = service
            .create_listing(agent.id, listing("Hidden flat", Some("sale")))
            .await
            .unwrap();
        service.set_listed(hidden.id, agent.id, false).await.unwrap();
        let gone = service
            .create_listing(agent.id, listing("Old flat", Some("sale")))
            .await
            .unwrap();
        service.delete_listing(gone.id, agent.id, true).await.unwrap();

        let ids = |properties: &[Property]| properties.iter().map(|p| p.id).collect::<Vec<_>>();

        let public = ids(&service.list_public(None).await.unwrap());
        assert!(public.contains(&sale.id));
        assert!(public.contains(&rent.id));
        assert!(!public.contains(&hidden.id));
        assert!(!public.contains(&gone.id));

        let buy = ids(&service.list_public(Some("buy")).await.unwrap());
        assert!(buy.contains(&sale.id));
        assert!(!buy.contains(&rent.id));
        assert!(!buy.contains(&hidden.id));

        let rentals = ids(&service.list_public(Some("rent")).await.unwrap());
        assert!(rentals.contains(&rent.id));
        assert!(!rentals.contains(&sale.id));

        let as_stranger = ids(&service.list_for_agent(agent.id, Some(stranger.id)).await.unwrap());
        assert_eq!(as_stranger.len(), 2);
        assert!(!as_stranger.contains(&hidden.id));

        let own = ids(&service.list_for_agent(agent.id, Some(agent.id)).await.unwrap());
        assert_eq!(own.len(), 3);
        assert!(own.contains(&hidden.id));
        assert!(!own.contains(&gone.id));

        let all = service.list_all().await.unwrap();
        let tombstone = all.iter().find(|p| p.id == gone.id).unwrap();
        assert!(tombstone.deleted);
        assert!(all.iter().any(|p| p.id == hidden.id && !p.listed));
    }
}
