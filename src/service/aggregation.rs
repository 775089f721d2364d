// service/aggregation.rs
use std::collections::BTreeMap;

use crate::{
    db::{db::DBClient, propertydb::{PropertyExt, RegionFilters}},
    dtos::propertydtos::{RegionQueryDto, RegionStatsDto},
    models::propertymodel::PinCodeStats,
    service::error::ServiceError,
};

/// Per pin code: how many public listings there are and their mean price per
/// unit area. Listings without a pin code or with zero area are left out.
pub async fn pin_code_stats(
    db_client: &DBClient,
    query: &RegionQueryDto,
) -> Result<BTreeMap<String, RegionStatsDto>, ServiceError> {
    let filters = RegionFilters::from_query(query);
    let rows = db_client.count_by_pin_code(&filters).await?;

    tracing::debug!(buckets = rows.len(), ?filters, "pin code aggregation");
    Ok(into_region_map(&rows))
}

pub fn into_region_map(rows: &[PinCodeStats]) -> BTreeMap<String, RegionStatsDto> {
    rows.iter()
        .filter(|row| !row.pin_code.trim().is_empty())
        .map(|row| (row.pin_code.trim().to_string(), RegionStatsDto::from_stats(row)))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;

    use super::*;
    use crate::{
        db::testing::{create_user, test_client},
        dtos::propertydtos::CreatePropertyDto,
        models::usermodel::UserRole,
        service::listing_service::ListingService,
    };

    #[test]
    fn test_region_map_keys_by_pin_code() {
        let rows = vec![
            PinCodeStats { pin_code: "380001".into(), count: 2, avg_price_per_area: Some(1500.0) },
            PinCodeStats { pin_code: " ".into(), count: 9, avg_price_per_area: Some(1.0) },
            PinCodeStats { pin_code: "007001".into(), count: 1, avg_price_per_area: None },
        ];

        let map = into_region_map(&rows);
        assert_eq!(map.len(), 2);
        assert_eq!(map["380001"], RegionStatsDto { count: 2, avg_price_per_area: 1500.0 });
        assert_eq!(map["007001"].avg_price_per_area, 0.0);
    }

    fn listing(title: &str, purpose: Option<&str>, price: f64, area: f64, pin: &str) -> CreatePropertyDto {
        CreatePropertyDto {
            title: title.to_string(),
            property_type: "Apartment".to_string(),
            purpose: purpose.map(str::to_string),
            price,
            area,
            city: Some("Testville".to_string()),
            pin_code: Some(pin.to_string()),
            ..Default::default()
        }
    }

    fn unique_pin() -> String {
        format!("Z{}", &Uuid::new_v4().simple().to_string()[..10])
    }

    #[tokio::test]
    async fn test_zero_area_listing_is_excluded() {
        let Some(client) = test_client().await else { return };
        let listings = ListingService::new(Arc::new(client.clone()));
        let agent = create_user(&client, UserRole::Agent).await;
        let pin = unique_pin();

        listings
            .create_listing(agent.id, listing("A", Some("sale"), 1_000_000.0, 1000.0, &pin))
            .await
            .unwrap();
        listings
            .create_listing(agent.id, listing("B", Some("sale"), 3_000_000.0, 1000.0, &pin))
            .await
            .unwrap();
        listings
            .create_listing(agent.id, listing("Plot", Some("sale"), 500_000.0, 0.0, &pin))
            .await
            .unwrap();

        let map = pin_code_stats(&client, &RegionQueryDto::default()).await.unwrap();
        assert_eq!(map[&pin], RegionStatsDto { count: 2, avg_price_per_area: 2000.0 });
    }

    #[tokio::test]
    async fn test_rent_listing_flows_into_heatmap_until_deleted() {
        let Some(client) = test_client().await else { return };
        let listings = ListingService::new(Arc::new(client.clone()));
        let agent = create_user(&client, UserRole::Agent).await;
        let pin = unique_pin();

        let studio = listings
            .create_listing(agent.id, listing("Studio for Rent", None, 15_000.0, 300.0, &pin))
            .await
            .unwrap();
        listings
            .create_listing(agent.id, listing("Family home", Some("Buy"), 9_000_000.0, 1800.0, &pin))
            .await
            .unwrap();

        let rent = RegionQueryDto { purpose: Some("rent".into()), ..Default::default() };
        let map = pin_code_stats(&client, &rent).await.unwrap();
        assert_eq!(map[&pin], RegionStatsDto { count: 1, avg_price_per_area: 50.0 });

        let sale = RegionQueryDto {
            city: Some("testville".into()),
            purpose: Some("sale".into()),
            property_type: Some("apartment".into()),
        };
        let map = pin_code_stats(&client, &sale).await.unwrap();
        assert_eq!(map[&pin].count, 1);

        listings.delete_listing(studio.id, agent.id, false).await.unwrap();
        let map = pin_code_stats(&client, &rent).await.unwrap();
        assert!(!map.contains_key(&pin));
    }

    #[tokio::test]
    async fn test_unlisted_listing_leaves_heatmap() {
        let Some(client) = test_client().await else { return };
        let listings = ListingService::new(Arc::new(client.clone()));
        let agent = create_user(&client, UserRole::Agent).await;
        let pin = unique_pin();

        let villa = listings
            .create_listing(agent.id, listing("Villa", Some("sale"), 8_000_000.0, 2000.0, &pin))
            .await
            .unwrap();

        let map = pin_code_stats(&client, &RegionQueryDto::default()).await.unwrap();
        assert_eq!(map[&pin].count, 1);

        listings.set_listed(villa.id, agent.id, false).await.unwrap();
        let map = pin_code_stats(&client, &RegionQueryDto::default()).await.unwrap();
        assert!(!map.contains_key(&pin));

        listings.set_listed(villa.id, agent.id, true).await.unwrap();
        let map = pin_code_stats(&client, &RegionQueryDto::default()).await.unwrap();
        assert_eq!(map[&pin], RegionStatsDto { count: 1, avg_price_per_area: 4000.0 });
    }
}
